mod common;

#[test]
fn breaks_out_of_a_while_loop() {
    let interpreter = common::run_ok(
        "i := 0; while i < 10 { if i == 3 { break; } i++; }",
    );
    assert_eq!(common::int(interpreter.environment(), "i"), Some(3));
}

#[test]
fn breaks_out_of_a_for_loop() {
    let interpreter = common::run_ok(
        "sum := 0; for i := 0; i < 10; i++ { if i == 3 { break; } sum += i; }",
    );
    assert_eq!(common::int(interpreter.environment(), "sum"), Some(0 + 1 + 2));
}

#[test]
fn an_inner_loops_break_does_not_escape_to_the_outer_loop() {
    let interpreter = common::run_ok(
        "outer := 0; \
         for i := 0; i < 2; i++ { \
             for j := 0; j < 5; j++ { \
                 if j == 1 { break; } \
             } \
             outer++; \
         }",
    );
    assert_eq!(common::int(interpreter.environment(), "outer"), Some(2));
}

#[test]
fn breaking_outside_a_loop_is_a_diagnostic() {
    match common::run("break;") {
        common::Outcome::Diagnostics(_) => {}
        _ => panic!("expected a diagnostic for 'break' outside a loop"),
    }
}
