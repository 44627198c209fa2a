mod common;

#[test]
fn equality_between_bools() {
    let interpreter = common::run_ok(
        "a := true == true; b := true == false; c := false == false; d := true != false;",
    );
    let env = interpreter.environment();
    assert_eq!(common::boolean(env, "a"), Some(true));
    assert_eq!(common::boolean(env, "b"), Some(false));
    assert_eq!(common::boolean(env, "c"), Some(true));
    assert_eq!(common::boolean(env, "d"), Some(true));
}

#[test]
fn comparing_an_int_to_a_bool_is_a_type_error() {
    match common::run("x := 1 == true;") {
        common::Outcome::Diagnostics(_) => {}
        _ => panic!("expected a type-mismatch diagnostic"),
    }
}

#[test]
fn negation() {
    let interpreter = common::run_ok("a := !true; b := !false; c := !!true;");
    let env = interpreter.environment();
    assert_eq!(common::boolean(env, "a"), Some(false));
    assert_eq!(common::boolean(env, "b"), Some(true));
    assert_eq!(common::boolean(env, "c"), Some(true));
}

#[test]
fn negating_an_int_is_a_type_error() {
    match common::run("x := !1;") {
        common::Outcome::Diagnostics(_) => {}
        _ => panic!("expected a type-mismatch diagnostic"),
    }
}
