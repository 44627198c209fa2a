use std::rc::Rc;

use crate::ast::{Block, DataType, Expr, Program, ScopeRef, Stmt};
use crate::environment::Environment;
use crate::error::{Diagnostic, RuntimeError};
use crate::token::{Token, Type};
use crate::value::{FunctionValue, Value};

/// An unwind signal produced while executing a statement. Ordinary
/// completion is `None`; `break`/`continue`/`return` are first-class
/// variants rather than exceptions or global flags, and propagate upward
/// through block execution until a loop or function call catches the one
/// it owns.
enum Signal {
    None,
    Break,
    Continue,
    Return(Value),
}

/// Tree-walking evaluator. Owns the single [`Environment`] that backs every
/// variable and function binding live during a run.
pub struct Interpreter {
    env: Environment,
}

impl Interpreter {
    pub fn new() -> Interpreter {
        Interpreter { env: Environment::new() }
    }

    /// Interprets a full program (or, from the REPL, one more chunk of
    /// top-level statements appended to a long-lived environment). Returns
    /// `Ok(())` on normal completion or the first runtime error encountered,
    /// already reported to stderr.
    pub fn interpret(&mut self, program: &Program) -> Result<(), RuntimeError> {
        match self.execute_block(program, &[])? {
            Signal::Return(_) => unreachable!("return outside of function body should have been rejected by the analyzer"),
            Signal::Break | Signal::Continue => unreachable!("break/continue outside of loop should have been rejected by the analyzer"),
            Signal::None => Ok(()),
        }
    }

    /// Dumps every binding currently live in the environment, per the
    /// `Ints:`/`Bools:` report printed after a successful run.
    pub fn dump_environment(&self) {
        self.env.dump();
    }

    /// The live environment, for callers (tests, the REPL) that need to
    /// inspect bindings after a run rather than just its pass/fail result.
    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Executes a sequence of statements. `branches` is the enclosing
    /// function's return-expression table, empty at top level; `Return`
    /// statements index into it rather than carrying their expression
    /// inline (see [`crate::ast::Stmt::Return`]).
    fn execute_block(&mut self, block: &Block, branches: &[Expr]) -> Result<Signal, RuntimeError> {
        for stmt in block {
            match self.execute(stmt, branches)? {
                Signal::None => continue,
                signal => return Ok(signal),
            }
        }
        Ok(Signal::None)
    }

    fn execute(&mut self, stmt: &Stmt, branches: &[Expr]) -> Result<Signal, RuntimeError> {
        match stmt {
            Stmt::OpenScope => {
                self.env.push();
                Ok(Signal::None)
            }
            Stmt::CloseScope => {
                self.env.pop();
                Ok(Signal::None)
            }
            Stmt::Assignment { target, operator, value, scope, .. } => {
                self.execute_assignment(target, operator, value.as_ref(), *scope)?;
                Ok(Signal::None)
            }
            Stmt::Conditional { token, condition, then_block, else_block } if token.r#type == Type::While => {
                self.execute_while(condition, then_block, else_block.as_deref(), branches)
            }
            Stmt::Conditional { condition, then_block, else_block, .. } => {
                if self.eval(condition)?.as_bool() {
                    self.env.push();
                    let signal = self.execute_block(then_block, branches);
                    self.env.pop();
                    signal
                } else if let Some(else_block) = else_block {
                    self.env.push();
                    let signal = self.execute_block(else_block, branches);
                    self.env.pop();
                    signal
                } else {
                    Ok(Signal::None)
                }
            }
            Stmt::For { init, condition, post, body, .. } => self.execute_for(init, condition, post, body, branches),
            Stmt::Def { name, params, return_type, body, return_branches, .. } => {
                let func = Rc::new(FunctionValue {
                    name: name.lexeme.clone(),
                    params: params.clone(),
                    return_type: *return_type,
                    body: body.clone(),
                    return_branches: return_branches.clone(),
                });
                self.env.define_func(&name.lexeme, func);
                Ok(Signal::None)
            }
            Stmt::Return { branch, .. } => match branch {
                None => Ok(Signal::Return(Value::Bool(false))),
                Some(index) => {
                    let value = self.eval(&branches[*index])?;
                    Ok(Signal::Return(value))
                }
            },
            Stmt::VoidCall { name, args, scope, .. } => {
                self.call(name, args, *scope)?;
                Ok(Signal::None)
            }
            Stmt::Break { .. } => Ok(Signal::Break),
            Stmt::Continue { .. } => Ok(Signal::Continue),
        }
    }

    /// The `else` block of a `while`, if present, runs exactly when the
    /// condition was false the very first time it was tested — i.e. the
    /// loop body never ran at all.
    fn execute_while(
        &mut self,
        condition: &Expr,
        body: &Block,
        else_block: Option<&Block>,
        branches: &[Expr],
    ) -> Result<Signal, RuntimeError> {
        let mut ran_once = false;

        while self.eval(condition)?.as_bool() {
            ran_once = true;
            self.env.push();
            let signal = self.execute_block(body, branches);
            self.env.pop();

            match signal? {
                Signal::Break => break,
                Signal::Return(value) => return Ok(Signal::Return(value)),
                Signal::None | Signal::Continue => {}
            }
        }

        if !ran_once {
            if let Some(else_block) = else_block {
                self.env.push();
                let signal = self.execute_block(else_block, branches);
                self.env.pop();
                return signal;
            }
        }

        Ok(Signal::None)
    }

    /// A single frame covers the whole construct (the loop variable stays
    /// alive across every iteration, matching the parser's single push for
    /// the entire `for`); `continue` still has to fall through to `post`
    /// rather than short-circuiting it.
    fn execute_for(
        &mut self,
        init: &Stmt,
        condition: &Expr,
        post: &Stmt,
        body: &Block,
        branches: &[Expr],
    ) -> Result<Signal, RuntimeError> {
        self.env.push();
        let result = self.execute_for_body(init, condition, post, body, branches);
        self.env.pop();
        result
    }

    fn execute_for_body(
        &mut self,
        init: &Stmt,
        condition: &Expr,
        post: &Stmt,
        body: &Block,
        branches: &[Expr],
    ) -> Result<Signal, RuntimeError> {
        self.execute(init, branches)?;

        while self.eval(condition)?.as_bool() {
            // The parser pushes a single analyzer scope for the whole `for`
            // construct (init, condition, post, and body all resolve at that
            // one depth), so the body runs directly in this frame rather
            // than one pushed fresh per iteration.
            match self.execute_block(body, branches)? {
                Signal::Break => break,
                Signal::Return(value) => return Ok(Signal::Return(value)),
                Signal::None | Signal::Continue => {}
            }

            self.execute(post, branches)?;
        }

        Ok(Signal::None)
    }

    fn execute_assignment(
        &mut self,
        target: &Token,
        operator: &Token,
        value: Option<&Expr>,
        scope: ScopeRef,
    ) -> Result<(), RuntimeError> {
        match operator.r#type {
            Type::ColonEqual => {
                // A fresh declaration always lands in the current (topmost)
                // frame, which at runtime is the one the parser pushed to
                // mirror this exact declaration site.
                match self.eval(value.expect("':=' always carries a value"))? {
                    Value::Int(n) => self.env.define_int(&target.lexeme, n),
                    Value::Bool(b) => self.env.define_bool(&target.lexeme, b),
                    Value::Func(_) => unreachable!("function values are never assignable"),
                }
                Ok(())
            }
            Type::Equal => {
                match self.eval(value.expect("'=' always carries a value"))? {
                    Value::Int(n) => self.env.set_int(&target.lexeme, scope, n),
                    Value::Bool(b) => self.env.set_bool(&target.lexeme, scope, b),
                    Value::Func(_) => unreachable!("function values are never assignable"),
                }
                Ok(())
            }
            Type::PlusEqual | Type::MinusEqual | Type::StarEqual | Type::SlashEqual | Type::ModuloEqual => {
                let rhs = self.eval(value.expect("compound assignment always carries a value"))?.as_int();
                let current = self.env.get_int(&target.lexeme, scope).expect("analyzer resolved this binding");
                let next = self.apply_int_op(operator, current, rhs)?;
                self.env.set_int(&target.lexeme, scope, next);
                Ok(())
            }
            Type::DoublePlus | Type::DoubleMinus => {
                let current = self.env.get_int(&target.lexeme, scope).expect("analyzer resolved this binding");
                let delta = if operator.r#type == Type::DoublePlus { 1 } else { -1 };
                self.env.set_int(&target.lexeme, scope, current + delta);
                Ok(())
            }
            other => unreachable!("unhandled assignment operator {other:?}"),
        }
    }

    fn apply_int_op(&self, operator: &Token, lhs: i64, rhs: i64) -> Result<i64, RuntimeError> {
        match operator.r#type {
            Type::PlusEqual => Ok(lhs + rhs),
            Type::MinusEqual => Ok(lhs - rhs),
            Type::StarEqual => Ok(lhs * rhs),
            Type::SlashEqual => {
                if rhs == 0 {
                    Err(self.runtime_error(operator, "division by zero"))
                } else {
                    Ok(lhs / rhs)
                }
            }
            Type::ModuloEqual => {
                if rhs == 0 {
                    Err(self.runtime_error(operator, "modulo by zero"))
                } else {
                    Ok(lhs % rhs)
                }
            }
            other => unreachable!("{other:?} is not a compound-assignment operator"),
        }
    }

    fn runtime_error(&self, token: &Token, message: &str) -> RuntimeError {
        let error = RuntimeError { token: token.clone(), message: message.to_string() };
        error.report();
        error
    }

    fn eval(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr.token.r#type {
            Type::Number => Ok(Value::Int(expr.token.as_int())),
            Type::True => Ok(Value::Bool(true)),
            Type::False => Ok(Value::Bool(false)),
            Type::Identifier if expr.is_call => {
                let scope = expr.scope.expect("call expressions always carry a scope");
                self.call(&expr.token, &expr.args, scope)
            }
            Type::Identifier => {
                let scope = expr.scope.expect("identifier expressions always carry a scope");
                Ok(self.env.get(&expr.token.lexeme, scope).expect("analyzer resolved this identifier"))
            }
            Type::Bang => {
                let operand = self.eval(expr.left.as_ref().expect("unary node always has a left operand"))?;
                Ok(Value::Bool(!operand.as_bool()))
            }
            Type::And => {
                let left = self.eval(expr.left.as_ref().unwrap())?.as_bool();
                if !left {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(self.eval(expr.right.as_ref().unwrap())?.as_bool()))
            }
            Type::Or => {
                let left = self.eval(expr.left.as_ref().unwrap())?.as_bool();
                if left {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(self.eval(expr.right.as_ref().unwrap())?.as_bool()))
            }
            Type::DoubleEqual | Type::NotEqual => {
                let left = self.eval(expr.left.as_ref().unwrap())?;
                let right = self.eval(expr.right.as_ref().unwrap())?;
                let equal = values_equal(&left, &right);
                Ok(Value::Bool(if expr.token.r#type == Type::DoubleEqual { equal } else { !equal }))
            }
            Type::Plus | Type::Minus | Type::Star | Type::Slash | Type::Modulo => {
                let left = self.eval(expr.left.as_ref().unwrap())?.as_int();
                let right = self.eval(expr.right.as_ref().unwrap())?.as_int();
                self.apply_arithmetic(&expr.token, left, right)
            }
            Type::Less | Type::Greater | Type::LessEqual | Type::GreaterEqual => {
                let left = self.eval(expr.left.as_ref().unwrap())?.as_int();
                let right = self.eval(expr.right.as_ref().unwrap())?.as_int();
                Ok(Value::Bool(match expr.token.r#type {
                    Type::Less => left < right,
                    Type::Greater => left > right,
                    Type::LessEqual => left <= right,
                    Type::GreaterEqual => left >= right,
                    _ => unreachable!(),
                }))
            }
            other => unreachable!("{other:?} cannot appear as an expression node"),
        }
    }

    fn apply_arithmetic(&self, operator: &Token, left: i64, right: i64) -> Result<Value, RuntimeError> {
        match operator.r#type {
            Type::Plus => Ok(Value::Int(left + right)),
            Type::Minus => Ok(Value::Int(left - right)),
            Type::Star => Ok(Value::Int(left * right)),
            Type::Slash => {
                if right == 0 {
                    Err(self.runtime_error(operator, "division by zero"))
                } else {
                    Ok(Value::Int(left / right))
                }
            }
            Type::Modulo => {
                if right == 0 {
                    Err(self.runtime_error(operator, "modulo by zero"))
                } else {
                    Ok(Value::Int(left % right))
                }
            }
            other => unreachable!("{other:?} is not an arithmetic operator"),
        }
    }

    /// Calls a user-defined function: evaluates its arguments in the
    /// caller's environment, pushes a single fresh frame for the callee
    /// (first-order functions never capture the caller's locals, so this
    /// frame plus the outer cache the analyzer already bound each
    /// identifier to is the whole of the callee's visible state), binds
    /// parameters, and runs the body until a `Return` signal surfaces or
    /// the body runs out.
    fn call(&mut self, name: &Token, args: &[Expr], scope: ScopeRef) -> Result<Value, RuntimeError> {
        let func = self.env.get_func(&name.lexeme, scope).expect("analyzer resolved this call target");

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval(arg)?);
        }

        self.env.push();
        for (param, value) in func.params.iter().zip(values) {
            match value {
                Value::Int(n) => self.env.define_int(&param.name.lexeme, n),
                Value::Bool(b) => self.env.define_bool(&param.name.lexeme, b),
                Value::Func(_) => unreachable!("functions cannot be passed as arguments"),
            }
        }

        let result = self.execute_block(&func.body, &func.return_branches);
        self.env.pop();

        match result? {
            Signal::Return(value) => Ok(value),
            Signal::None => Ok(default_value(func.return_type)),
            Signal::Break | Signal::Continue => {
                unreachable!("break/continue cannot escape a function body, analyzer rejects this")
            }
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        _ => false,
    }
}

fn default_value(data_type: DataType) -> Value {
    match data_type {
        DataType::Int => Value::Int(0),
        DataType::Bool | DataType::Void => Value::Bool(false),
        DataType::Func | DataType::Invalid => unreachable!("a function cannot declare this as its return type"),
    }
}
