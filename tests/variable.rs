mod common;

use common::Outcome;

#[test]
fn colon_equal_declares_a_new_binding() {
    let i = common::run_ok("x := 1;");
    assert_eq!(common::int(i.environment(), "x"), Some(1));
}

#[test]
fn explicit_declaration_pins_the_declared_type() {
    let i = common::run_ok("int x = 1; bool y = true;");
    assert_eq!(common::int(i.environment(), "x"), Some(1));
    assert_eq!(common::boolean(i.environment(), "y"), Some(true));
}

#[test]
fn explicit_declaration_type_mismatch_is_a_diagnostic() {
    match common::run("int x = true;") {
        Outcome::Diagnostics(_) => {}
        _ => panic!("expected a declared/initializer type mismatch diagnostic"),
    }
}

#[test]
fn redeclaring_with_colon_equal_in_the_same_scope_is_a_diagnostic() {
    match common::run("x := 1; x := 2;") {
        Outcome::Diagnostics(_) => {}
        _ => panic!("expected \"'x' is already declared in this scope\""),
    }
}

#[test]
fn redeclaring_with_an_explicit_type_in_the_same_scope_is_a_diagnostic() {
    match common::run("int x = 1; int x = 2;") {
        Outcome::Diagnostics(_) => {}
        _ => panic!("expected a redeclaration diagnostic"),
    }
}

#[test]
fn shadowing_across_a_nested_scope_is_allowed() {
    let i = common::run_ok("x := 1; { x := true; }");
    assert_eq!(common::int(i.environment(), "x"), Some(1));
}

#[test]
fn shadowing_inside_a_block_does_not_escape_it() {
    let i = common::run_ok("x := 1; { x := 99; } y := x;");
    assert_eq!(common::int(i.environment(), "y"), Some(1));
}

#[test]
fn plain_equal_reassigns_an_existing_binding() {
    let i = common::run_ok("x := 1; x = 2;");
    assert_eq!(common::int(i.environment(), "x"), Some(2));
}

#[test]
fn plain_equal_to_an_undeclared_name_is_a_diagnostic() {
    match common::run("x = 1;") {
        Outcome::Diagnostics(_) => {}
        _ => panic!("expected \"undefined variable 'x'\""),
    }
}

#[test]
fn plain_equal_type_mismatch_is_a_diagnostic() {
    match common::run("x := 1; x = true;") {
        Outcome::Diagnostics(_) => {}
        _ => panic!("expected a reassignment type mismatch diagnostic"),
    }
}

#[test]
fn reading_an_undefined_variable_is_a_diagnostic() {
    match common::run("y := x;") {
        Outcome::Diagnostics(_) => {}
        _ => panic!("expected \"undefined variable 'x'\""),
    }
}

#[test]
fn a_block_scoped_variable_is_unreachable_outside_its_block() {
    match common::run("if true { a := 1; } b := a;") {
        Outcome::Diagnostics(_) => {}
        _ => panic!("expected 'a' to be undefined outside its scope"),
    }
}

#[test]
fn compound_assignment_reads_and_writes_the_existing_binding() {
    let i = common::run_ok("x := 10; x += 5; x -= 2; x *= 3; x /= 13; x %= 3;");
    assert_eq!(common::int(i.environment(), "x"), Some(0));
}

#[test]
fn compound_assignment_on_a_bool_binding_is_a_diagnostic() {
    match common::run("x := true; x += 1;") {
        Outcome::Diagnostics(_) => {}
        _ => panic!("expected \"'+=' requires an Int binding\""),
    }
}

#[test]
fn increment_and_decrement_mutate_by_one() {
    let i = common::run_ok("x := 5; x++; x++; x--;");
    assert_eq!(common::int(i.environment(), "x"), Some(6));
}

#[test]
fn increment_on_a_bool_binding_is_a_diagnostic() {
    match common::run("x := true; x++;") {
        Outcome::Diagnostics(_) => {}
        _ => panic!("expected \"'++' requires an Int binding\""),
    }
}

#[test]
fn a_variable_can_be_used_in_its_own_initializer_via_an_outer_binding() {
    let i = common::run_ok("x := 1; { x := x + 1; }");
    assert_eq!(common::int(i.environment(), "x"), Some(1));
}
