mod common;

#[test]
fn a_line_comment_is_ignored() {
    let interpreter = common::run_ok("x := 1; # this sets x to one\n");
    assert_eq!(common::int(interpreter.environment(), "x"), Some(1));
}

#[test]
fn a_comment_with_no_trailing_newline_at_eof_is_ignored() {
    let interpreter = common::run_ok("x := 1; # trailing comment, no newline");
    assert_eq!(common::int(interpreter.environment(), "x"), Some(1));
}

#[test]
fn a_file_consisting_only_of_a_comment_does_nothing() {
    let interpreter = common::run_ok("# just a comment\n");
    assert_eq!(common::int(interpreter.environment(), "x"), None);
}

#[test]
fn a_comment_can_follow_a_statement_on_the_same_line() {
    let interpreter = common::run_ok("x := 1; # inline\ny := 2; # another\n");
    let env = interpreter.environment();
    assert_eq!(common::int(env, "x"), Some(1));
    assert_eq!(common::int(env, "y"), Some(2));
}
