mod common;

#[test]
fn runs_the_then_branch_when_true() {
    let interpreter = common::run_ok("x := 0; if true { x = 1; } else { x = 2; }");
    assert_eq!(common::int(interpreter.environment(), "x"), Some(1));
}

#[test]
fn runs_the_else_branch_when_false() {
    let interpreter = common::run_ok("x := 0; if false { x = 1; } else { x = 2; }");
    assert_eq!(common::int(interpreter.environment(), "x"), Some(2));
}

#[test]
fn else_is_optional() {
    let interpreter = common::run_ok("x := 0; if false { x = 1; }");
    assert_eq!(common::int(interpreter.environment(), "x"), Some(0));
}

#[test]
fn a_non_bool_condition_is_a_type_error() {
    match common::run("if 1 { x := 1; }") {
        common::Outcome::Diagnostics(_) => {}
        _ => panic!("expected 'condition must be Bool' diagnostic"),
    }
}

#[test]
fn nested_if_chooses_the_innermost_matching_branch() {
    let interpreter = common::run_ok(
        "x := 0; if true { if false { x = 1; } else { x = 2; } }",
    );
    assert_eq!(common::int(interpreter.environment(), "x"), Some(2));
}
