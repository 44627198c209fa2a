mod common;

use common::Outcome;

fn int(interpreter: &simpl_lang::interpreter::Interpreter, name: &str) -> Option<i64> {
    common::int(interpreter.environment(), name)
}

fn boolean(interpreter: &simpl_lang::interpreter::Interpreter, name: &str) -> Option<bool> {
    common::boolean(interpreter.environment(), name)
}

// ---- arithmetic -----------------------------------------------------------

#[test]
fn add() {
    let i = common::run_ok("a := 2 + 3;");
    assert_eq!(int(&i, "a"), Some(5));
}

#[test]
fn subtract() {
    let i = common::run_ok("a := 7 - 3;");
    assert_eq!(int(&i, "a"), Some(4));
}

#[test]
fn subtract_can_go_negative() {
    let i = common::run_ok("a := 3 - 7;");
    assert_eq!(int(&i, "a"), Some(-4));
}

#[test]
fn multiply() {
    let i = common::run_ok("a := 5 * 3;");
    assert_eq!(int(&i, "a"), Some(15));
}

#[test]
fn divide_truncates_toward_zero() {
    let i = common::run_ok("a := 7 / 2;");
    assert_eq!(int(&i, "a"), Some(3));
}

#[test]
fn modulo() {
    let i = common::run_ok("a := 7 % 2;");
    assert_eq!(int(&i, "a"), Some(1));
}

#[test]
fn divide_by_zero_is_a_runtime_error() {
    match common::run("a := 1 / 0;") {
        Outcome::RuntimeError => {}
        _ => panic!("expected a runtime error for division by zero"),
    }
}

#[test]
fn modulo_by_zero_is_a_runtime_error() {
    match common::run("a := 1 % 0;") {
        Outcome::RuntimeError => {}
        _ => panic!("expected a runtime error for modulo by zero"),
    }
}

#[test]
fn arithmetic_operand_must_be_int() {
    for op in ["+", "-", "*", "/", "%"] {
        let source = format!("a := true {op} 1;");
        match common::run(&source) {
            Outcome::Diagnostics(_) => {}
            _ => panic!("expected a type error for '{op}' on a Bool operand"),
        }
    }
}

// ---- relational -------------------------------------------------------

#[test]
fn relational_operators_compare_ints() {
    let i = common::run_ok(
        "a := 1 < 2; b := 2 < 1; c := 2 > 1; d := 1 > 2; \
         e := 1 <= 1; f := 2 <= 1; g := 1 >= 1; h := 1 >= 2;",
    );
    assert_eq!(boolean(&i, "a"), Some(true));
    assert_eq!(boolean(&i, "b"), Some(false));
    assert_eq!(boolean(&i, "c"), Some(true));
    assert_eq!(boolean(&i, "d"), Some(false));
    assert_eq!(boolean(&i, "e"), Some(true));
    assert_eq!(boolean(&i, "f"), Some(false));
    assert_eq!(boolean(&i, "g"), Some(true));
    assert_eq!(boolean(&i, "h"), Some(false));
}

#[test]
fn relational_operand_must_be_int() {
    for op in ["<", ">", "<=", ">="] {
        let source = format!("a := true {op} false;");
        match common::run(&source) {
            Outcome::Diagnostics(_) => {}
            _ => panic!("expected a type error for '{op}' on Bool operands"),
        }
    }
}

// ---- equality -----------------------------------------------------------

#[test]
fn equals_compares_ints() {
    let i = common::run_ok("a := 1 == 1; b := 1 == 2; c := 1 != 2; d := 1 != 1;");
    assert_eq!(boolean(&i, "a"), Some(true));
    assert_eq!(boolean(&i, "b"), Some(false));
    assert_eq!(boolean(&i, "c"), Some(true));
    assert_eq!(boolean(&i, "d"), Some(false));
}

#[test]
fn equals_compares_bools() {
    let i = common::run_ok("a := true == true; b := true == false;");
    assert_eq!(boolean(&i, "a"), Some(true));
    assert_eq!(boolean(&i, "b"), Some(false));
}

#[test]
fn equals_between_mismatched_types_is_a_diagnostic() {
    match common::run("a := 1 == true;") {
        Outcome::Diagnostics(_) => {}
        _ => panic!("expected 'cannot compare Int with Bool'"),
    }
}

#[test]
fn equals_on_function_values_is_a_diagnostic() {
    match common::run("def f() {} def g() {} a := f == g;") {
        Outcome::Diagnostics(_) => {}
        _ => panic!("expected 'function values cannot be compared'"),
    }
}

// ---- logical --------------------------------------------------------------

#[test]
fn and_short_circuits() {
    let i = common::run_ok("a := false && (1 == 1);");
    assert_eq!(boolean(&i, "a"), Some(false));
}

#[test]
fn or_short_circuits() {
    let i = common::run_ok("a := true || (1 == 2);");
    assert_eq!(boolean(&i, "a"), Some(true));
}

#[test]
fn logical_operand_must_be_bool() {
    for op in ["&&", "||"] {
        let source = format!("a := 1 {op} true;");
        match common::run(&source) {
            Outcome::Diagnostics(_) => {}
            _ => panic!("expected a type error for '{op}' on an Int operand"),
        }
    }
}

#[test]
fn not_negates_a_bool() {
    let i = common::run_ok("a := !true; b := !false; c := !!true;");
    assert_eq!(boolean(&i, "a"), Some(false));
    assert_eq!(boolean(&i, "b"), Some(true));
    assert_eq!(boolean(&i, "c"), Some(true));
}

#[test]
fn not_operand_must_be_bool() {
    match common::run("a := !1;") {
        Outcome::Diagnostics(_) => {}
        _ => panic!("expected \"'!' expects a Bool operand\""),
    }
}

// ---- precedence -----------------------------------------------------------

#[test]
fn multiplication_binds_tighter_than_addition() {
    let i = common::run_ok("a := 2 + 3 * 4;");
    assert_eq!(int(&i, "a"), Some(14));
}

#[test]
fn parentheses_override_precedence() {
    let i = common::run_ok("a := (2 + 3) * 4;");
    assert_eq!(int(&i, "a"), Some(20));
}

#[test]
fn and_binds_tighter_than_or() {
    let i = common::run_ok("a := true || false && false;");
    assert_eq!(boolean(&i, "a"), Some(true));
}

#[test]
fn relational_binds_tighter_than_logical() {
    let i = common::run_ok("a := 1 < 2 && 3 < 4;");
    assert_eq!(boolean(&i, "a"), Some(true));
}
