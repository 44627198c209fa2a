mod common;

#[test]
fn empty_block_is_a_no_op() {
    let interpreter = common::run_ok("x := 1; {}");
    assert_eq!(common::int(interpreter.environment(), "x"), Some(1));
}

#[test]
fn nested_block_can_shadow_an_outer_binding() {
    let interpreter = common::run_ok(
        "x := 1; { x := 2; }",
    );
    assert_eq!(common::int(interpreter.environment(), "x"), Some(1));
}

#[test]
fn block_locals_do_not_escape_their_scope() {
    match common::run("{ x := 1; } y := x;") {
        common::Outcome::Diagnostics(_) => {}
        _ => panic!("expected a reference-error diagnostic for 'x' outside its scope"),
    }
}

#[test]
fn a_block_can_mutate_an_outer_binding() {
    let interpreter = common::run_ok("x := 1; { x = 2; }");
    assert_eq!(common::int(interpreter.environment(), "x"), Some(2));
}
