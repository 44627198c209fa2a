use std::collections::HashMap;

use crate::ast::{DataType, Expr, Param, Program, ScopeRef, Stmt};
use crate::error::{Error, ParseError};
use crate::token::{Token, Type};

/// A function's call signature, as registered in the scope it was declared in.
#[derive(Debug, Clone)]
struct FunctionSignature {
    params: Vec<DataType>,
    return_type: DataType,
}

/// One level of the analyzer's outer (file-level) scope cache.
#[derive(Debug, Default)]
struct Scope {
    vars: HashMap<String, DataType>,
    funcs: HashMap<String, FunctionSignature>,
}

/// Parsing state specific to the body of the function currently being parsed.
/// Nested function definitions are forbidden, so at most one of these is ever
/// live at a time; its own `locals` stack is independent of the outer `scopes`
/// stack so that a function's identifiers never resolve against the caller's
/// frames (see [`ScopeRef`]).
struct FunctionContext {
    params: Vec<Param>,
    return_type: DataType,
    has_value_return: bool,
    return_branches: Vec<Expr>,
    locals: Vec<HashMap<String, DataType>>,
}

/// Parses a token vector into a [`Program`] while simultaneously resolving
/// names and checking types. A single `Parser` is meant to be reused across
/// calls to [`Parser::parse`] (the REPL driver does this) so that top-level
/// declarations from one call remain visible to the next; `Parser::new`
/// starts it at an empty global scope.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    scopes: Vec<Scope>,
    function: Option<FunctionContext>,
    in_loop: bool,
}

type PResult<T> = Result<T, ParseError>;

impl Parser {
    pub fn new() -> Parser {
        Parser {
            tokens: Vec::new(),
            current: 0,
            scopes: vec![Scope::default()],
            function: None,
            in_loop: false,
        }
    }

    /// Parses `tokens` as a sequence of top-level statements, extending this
    /// parser's persistent global scope. Returns the parsed statements
    /// together with every non-fatal diagnostic collected along the way, or
    /// a single fatal [`ParseError`] if a structural failure stopped parsing
    /// outright.
    pub fn parse(&mut self, tokens: Vec<Token>) -> Result<(Program, Vec<Error>), ParseError> {
        self.tokens = tokens;
        self.current = 0;
        self.in_loop = false;
        self.function = None;

        let mut diagnostics = Vec::new();
        let program = self.parse_statements_until(Type::EOF, &mut diagnostics)?;

        if self.scopes.len() != 1 {
            return Err(self.fatal("unbalanced '{' at end of input"));
        }

        Ok((program, diagnostics))
    }

    // ---- token stream primitives ----------------------------------------

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn peek_at(&self, offset: usize) -> &Token {
        let i = (self.current + offset).min(self.tokens.len() - 1);
        &self.tokens[i]
    }

    fn is_at_end(&self) -> bool {
        self.peek().r#type == Type::EOF
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.current].clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    fn check(&self, r#type: Type) -> bool {
        self.peek().r#type == r#type
    }

    fn match_type(&mut self, r#type: Type) -> Option<Token> {
        if self.check(r#type) {
            Some(self.advance())
        } else {
            None
        }
    }

    fn consume(&mut self, r#type: Type, message: &str) -> PResult<Token> {
        if self.check(r#type) {
            Ok(self.advance())
        } else {
            Err(self.fatal(message))
        }
    }

    fn fatal(&self, message: &str) -> ParseError {
        ParseError { token: self.peek().clone(), message: message.to_string() }
    }

    fn fatal_at(&self, token: &Token, message: &str) -> ParseError {
        ParseError { token: token.clone(), message: message.to_string() }
    }

    // ---- scope cache -------------------------------------------------

    fn push_scope(&mut self) {
        if let Some(func) = &mut self.function {
            func.locals.push(HashMap::new());
        } else {
            self.scopes.push(Scope::default());
        }
    }

    fn pop_scope(&mut self) {
        if let Some(func) = &mut self.function {
            func.locals.pop();
        } else {
            self.scopes.pop();
        }
    }

    fn is_defined_in_current(&self, name: &str) -> bool {
        if let Some(func) = &self.function {
            if func.params.iter().any(|p| p.name.lexeme == name) {
                return true;
            }
            func.locals.last().is_some_and(|s| s.contains_key(name))
        } else {
            self.scopes.last().is_some_and(|s| s.vars.contains_key(name))
        }
    }

    fn define_var(&mut self, name: &str, data_type: DataType) {
        if let Some(func) = &mut self.function {
            func.locals.last_mut().expect("function body always has a root frame").insert(name.to_string(), data_type);
        } else {
            self.scopes.last_mut().expect("global scope always exists").vars.insert(name.to_string(), data_type);
        }
    }

    /// The scope index a declaration or lookup in the *current* frame would
    /// be recorded under: `FromTop` inside a function body, otherwise the
    /// depth of the current outer-cache frame.
    fn current_scope_ref(&self) -> ScopeRef {
        if self.function.is_some() {
            ScopeRef::FromTop
        } else {
            ScopeRef::At(self.scopes.len() - 1)
        }
    }

    /// Resolves an identifier: function parameters, then the function's own
    /// local scopes (innermost first), then the outer cache (innermost
    /// first). Appends an "undefined variable" diagnostic and returns
    /// `Invalid`/`At(0)` if nothing matches.
    fn resolve_identifier(&mut self, name: &Token, diagnostics: &mut Vec<Error>) -> (DataType, ScopeRef) {
        if let Some(func) = &self.function {
            if let Some(param) = func.params.iter().find(|p| p.name.lexeme == name.lexeme) {
                return (param.data_type, ScopeRef::FromTop);
            }
            for scope in func.locals.iter().rev() {
                if let Some(data_type) = scope.get(&name.lexeme) {
                    return (*data_type, ScopeRef::FromTop);
                }
            }
        }

        for (depth, scope) in self.scopes.iter().enumerate().rev() {
            if let Some(data_type) = scope.vars.get(&name.lexeme) {
                return (*data_type, ScopeRef::At(depth));
            }
        }

        diagnostics.push(Error::reference_error(name.clone(), format!("undefined variable '{}'", name.lexeme)));
        (DataType::Invalid, ScopeRef::At(0))
    }

    /// Resolves a call target. Unlike [`Self::resolve_identifier`], a
    /// function can only ever be declared in the outer cache (nested `def`s
    /// are a fatal error), so this never consults the function context.
    fn resolve_callee(&mut self, name: &Token, diagnostics: &mut Vec<Error>) -> Option<FunctionSignature> {
        for scope in self.scopes.iter().rev() {
            if let Some(sig) = scope.funcs.get(&name.lexeme) {
                return Some(sig.clone());
            }
            if scope.vars.contains_key(&name.lexeme) {
                diagnostics.push(Error::type_error(name.clone(), format!("'{}' is not a function", name.lexeme)));
                return None;
            }
        }
        diagnostics.push(Error::reference_error(name.clone(), format!("undefined function '{}'", name.lexeme)));
        None
    }

    // ---- statement sequences ----------------------------------------

    /// Parses statements until the next token is `stop` or EOF. A bare `{`
    /// (one owned by no control-flow statement) is expanded inline into
    /// `OpenScope`, its contents, and `CloseScope`, per the grammar's
    /// statement-dispatch table.
    fn parse_statements_until(&mut self, stop: Type, diagnostics: &mut Vec<Error>) -> PResult<Program> {
        let mut out = Vec::new();
        while !self.is_at_end() && !self.check(stop) {
            if self.check(Type::LeftBrace) {
                self.advance();
                self.push_scope();
                let inner = self.parse_statements_until(Type::RightBrace, diagnostics)?;
                self.pop_scope();
                self.consume(Type::RightBrace, "expected '}' to close block")?;
                out.push(Stmt::OpenScope);
                out.extend(inner);
                out.push(Stmt::CloseScope);
            } else {
                out.push(self.parse_statement(diagnostics)?);
            }
        }
        Ok(out)
    }

    /// Parses a `{ ... }` block owned by a control-flow statement (`if`,
    /// `while`). Pushes its own frame around the body, unlike the bare-block
    /// case above which emits explicit markers for the evaluator to
    /// push/pop instead.
    fn parse_owned_block(&mut self, diagnostics: &mut Vec<Error>) -> PResult<Vec<Stmt>> {
        self.consume(Type::LeftBrace, "expected '{'")?;
        self.push_scope();
        let body = self.parse_statements_until(Type::RightBrace, diagnostics)?;
        self.pop_scope();
        self.consume(Type::RightBrace, "expected '}' to close block")?;
        Ok(body)
    }

    fn parse_statement(&mut self, diagnostics: &mut Vec<Error>) -> PResult<Stmt> {
        match self.peek().r#type {
            Type::IntType | Type::BoolType => self.parse_assignment(Type::Semicolon, true, diagnostics),
            Type::Identifier => {
                if self.peek_at(1).r#type == Type::LeftParen {
                    self.parse_void_call(diagnostics)
                } else {
                    self.parse_assignment(Type::Semicolon, true, diagnostics)
                }
            }
            Type::If | Type::While => self.parse_conditional(diagnostics),
            Type::For => self.parse_for(diagnostics),
            Type::Break | Type::Continue => self.parse_break_or_continue(diagnostics),
            Type::Def => self.parse_def(diagnostics),
            Type::Return => self.parse_return(diagnostics),
            Type::RightBrace => Err(self.fatal("unexpected '}' with no matching '{'")),
            _ => Err(self.fatal(&format!("unexpected token '{}'", self.peek().lexeme))),
        }
    }

    // ---- expressions (Pratt) -----------------------------------------

    /// `2`-through-`7` per the precedence table; anything else (`;`, `{`,
    /// `)`, `,`, ...) simply isn't an infix operator and ends the expression.
    fn infix_precedence(r#type: Type) -> Option<u8> {
        use Type::*;
        match r#type {
            Less | Greater | DoubleEqual | NotEqual | LessEqual | GreaterEqual => Some(2),
            Plus | Minus => Some(3),
            Star | Slash => Some(4),
            Modulo => Some(5),
            Or => Some(6),
            And => Some(7),
            _ => None,
        }
    }

    fn parse_expression(&mut self, min_prec: u8, diagnostics: &mut Vec<Error>) -> PResult<Expr> {
        let mut left = self.parse_unary(diagnostics)?;

        while let Some(prec) = Self::infix_precedence(self.peek().r#type) {
            if prec <= min_prec {
                break;
            }
            let operator = self.advance();
            let right = self.parse_expression(prec, diagnostics)?;
            let data_type = self.check_binary(&operator, &left, &right, diagnostics);
            left = Expr::binary(operator, data_type, left, right);
        }

        Ok(left)
    }

    fn parse_unary(&mut self, diagnostics: &mut Vec<Error>) -> PResult<Expr> {
        if self.check(Type::Bang) {
            let operator = self.advance();
            let operand = self.parse_unary(diagnostics)?;
            if !operand.data_type.suppresses() && operand.data_type != DataType::Bool {
                diagnostics.push(Error::type_error(
                    operator.clone(),
                    format!("'!' expects a Bool operand, found {:?}", operand.data_type),
                ));
            }
            return Ok(Expr::unary(operator, DataType::Bool, operand));
        }
        self.parse_primary(diagnostics)
    }

    fn parse_primary(&mut self, diagnostics: &mut Vec<Error>) -> PResult<Expr> {
        match self.peek().r#type {
            Type::Number => {
                let token = self.advance();
                Ok(Expr::leaf(token, DataType::Int))
            }
            Type::True | Type::False => {
                let token = self.advance();
                Ok(Expr::leaf(token, DataType::Bool))
            }
            Type::LeftParen => {
                self.advance();
                let inner = self.parse_expression(0, diagnostics)?;
                self.consume(Type::RightParen, "expected ')' after expression")?;
                Ok(inner)
            }
            Type::Identifier => {
                let name = self.advance();
                if self.check(Type::LeftParen) {
                    let (args, scope, return_type) = self.parse_call(&name, diagnostics)?;
                    if return_type == DataType::Void {
                        diagnostics.push(Error::type_error(
                            name.clone(),
                            format!("'{}' returns no value and cannot be used in an expression", name.lexeme),
                        ));
                    }
                    Ok(Expr::call(name, return_type, args, scope))
                } else {
                    let (data_type, scope) = self.resolve_identifier(&name, diagnostics);
                    Ok(Expr::variable(name, data_type, scope))
                }
            }
            _ => Err(self.fatal("expected expression")),
        }
    }

    fn check_binary(&mut self, operator: &Token, left: &Expr, right: &Expr, diagnostics: &mut Vec<Error>) -> DataType {
        use Type::*;
        match operator.r#type {
            Plus | Minus | Star | Slash | Modulo => {
                self.expect_operand(operator, left, DataType::Int, diagnostics);
                self.expect_operand(operator, right, DataType::Int, diagnostics);
                DataType::Int
            }
            Less | Greater | LessEqual | GreaterEqual => {
                self.expect_operand(operator, left, DataType::Int, diagnostics);
                self.expect_operand(operator, right, DataType::Int, diagnostics);
                DataType::Bool
            }
            And | Or => {
                self.expect_operand(operator, left, DataType::Bool, diagnostics);
                self.expect_operand(operator, right, DataType::Bool, diagnostics);
                DataType::Bool
            }
            DoubleEqual | NotEqual => {
                if !left.data_type.suppresses() && !right.data_type.suppresses() {
                    if left.data_type != right.data_type {
                        diagnostics.push(Error::type_error(
                            operator.clone(),
                            format!("cannot compare {:?} with {:?}", left.data_type, right.data_type),
                        ));
                    } else if left.data_type == DataType::Func {
                        diagnostics.push(Error::type_error(operator.clone(), "function values cannot be compared"));
                    }
                }
                DataType::Bool
            }
            _ => unreachable!("'{:?}' is not an infix operator", operator.r#type),
        }
    }

    fn expect_operand(&mut self, operator: &Token, operand: &Expr, expected: DataType, diagnostics: &mut Vec<Error>) {
        if operand.data_type.suppresses() || operand.data_type == expected {
            return;
        }
        diagnostics.push(Error::type_error(
            operator.clone(),
            format!("'{}' expects a {:?} operand, found {:?}", operator.lexeme, expected, operand.data_type),
        ));
    }

    /// Parses `(arg, ...)` following a call's name, resolving the callee and
    /// checking its arity and argument types. Shared between call-as-value
    /// ([`Self::parse_primary`]) and call-as-statement ([`Self::parse_void_call`]).
    fn parse_call(&mut self, name: &Token, diagnostics: &mut Vec<Error>) -> PResult<(Vec<Expr>, ScopeRef, DataType)> {
        self.consume(Type::LeftParen, "expected '(' to start call arguments")?;
        let mut args = Vec::new();
        if !self.check(Type::RightParen) {
            loop {
                args.push(self.parse_expression(0, diagnostics)?);
                if self.match_type(Type::Comma).is_some() {
                    continue;
                }
                break;
            }
        }
        self.consume(Type::RightParen, "expected ')' after call arguments")?;

        let scope = ScopeRef::At(self.scopes.len() - 1);
        let sig = self.resolve_callee(name, diagnostics);
        let return_type = match &sig {
            Some(sig) => {
                if args.len() != sig.params.len() {
                    diagnostics.push(Error::type_error(
                        name.clone(),
                        format!("'{}' expects {} argument(s), found {}", name.lexeme, sig.params.len(), args.len()),
                    ));
                } else {
                    for (arg, expected) in args.iter().zip(&sig.params) {
                        if !arg.data_type.suppresses() && arg.data_type != *expected {
                            diagnostics.push(Error::type_error(
                                name.clone(),
                                format!("argument of type {:?} does not match parameter type {:?}", arg.data_type, expected),
                            ));
                        }
                    }
                }
                sig.return_type
            }
            None => DataType::Invalid,
        };

        Ok((args, scope, return_type))
    }

    fn parse_void_call(&mut self, diagnostics: &mut Vec<Error>) -> PResult<Stmt> {
        let name = self.advance();
        let token = name.clone();
        let (args, scope, return_type) = self.parse_call(&name, diagnostics)?;
        if return_type != DataType::Void && return_type != DataType::Invalid {
            diagnostics.push(Error::type_error(
                name.clone(),
                format!("'{}' returns a value; result would be discarded", name.lexeme),
            ));
        }
        self.consume(Type::Semicolon, "expected ';' after call")?;
        Ok(Stmt::VoidCall { token, name, args, scope })
    }

    // ---- assignment ----------------------------------------------------

    fn parse_assignment(&mut self, term: Type, consume_term: bool, diagnostics: &mut Vec<Error>) -> PResult<Stmt> {
        if matches!(self.peek().r#type, Type::IntType | Type::BoolType) {
            return self.parse_explicit_assignment(term, consume_term, diagnostics);
        }
        self.parse_implicit_assignment(term, consume_term, diagnostics)
    }

    fn end_clause(&mut self, term: Type, consume: bool) -> PResult<()> {
        if consume {
            self.consume(term, &format!("expected '{term:?}'"))?;
        } else if !self.check(term) {
            return Err(self.fatal(&format!("expected '{term:?}'")));
        }
        Ok(())
    }

    fn parse_explicit_assignment(&mut self, term: Type, consume_term: bool, diagnostics: &mut Vec<Error>) -> PResult<Stmt> {
        let type_token = self.advance();
        let declared = if type_token.r#type == Type::IntType { DataType::Int } else { DataType::Bool };
        let target = self.consume(Type::Identifier, "expected a variable name")?;
        let operator = self.consume(Type::Equal, "expected '=' in a typed declaration")?;

        if self.is_defined_in_current(&target.lexeme) {
            diagnostics.push(Error::reference_error(
                target.clone(),
                format!("'{}' is already declared in this scope", target.lexeme),
            ));
        }

        let value = self.parse_expression(0, diagnostics)?;
        self.end_clause(term, consume_term)?;

        if !value.data_type.suppresses() && value.data_type != declared {
            diagnostics.push(Error::type_error(
                operator.clone(),
                format!("declared type {declared:?} does not match initializer type {:?}", value.data_type),
            ));
        }

        self.define_var(&target.lexeme, declared);
        let scope = self.current_scope_ref();

        Ok(Stmt::Assignment { target, operator, value: Some(value), data_type: declared, explicit: true, scope })
    }

    fn parse_implicit_assignment(&mut self, term: Type, consume_term: bool, diagnostics: &mut Vec<Error>) -> PResult<Stmt> {
        let target = self.consume(Type::Identifier, "expected a variable name")?;
        let operator = self.advance();

        match operator.r#type {
            Type::ColonEqual => {
                if self.is_defined_in_current(&target.lexeme) {
                    diagnostics.push(Error::reference_error(
                        target.clone(),
                        format!("'{}' is already declared in this scope", target.lexeme),
                    ));
                }
                let value = self.parse_expression(0, diagnostics)?;
                self.end_clause(term, consume_term)?;
                let mut data_type = value.data_type;
                if data_type == DataType::Func {
                    diagnostics.push(Error::type_error(
                        operator.clone(),
                        format!("'{}' cannot bind a function value; call it instead", target.lexeme),
                    ));
                    data_type = DataType::Invalid;
                }
                self.define_var(&target.lexeme, data_type);
                let scope = self.current_scope_ref();
                Ok(Stmt::Assignment { target, operator, value: Some(value), data_type, explicit: false, scope })
            }
            Type::Equal => {
                let (existing, scope) = self.resolve_identifier(&target, diagnostics);
                let value = self.parse_expression(0, diagnostics)?;
                self.end_clause(term, consume_term)?;
                if !value.data_type.suppresses() && !existing.suppresses() && value.data_type != existing {
                    diagnostics.push(Error::type_error(
                        operator.clone(),
                        format!("cannot assign {:?} to a binding of type {:?}", value.data_type, existing),
                    ));
                }
                Ok(Stmt::Assignment { target, operator, value: Some(value), data_type: existing, explicit: false, scope })
            }
            Type::PlusEqual | Type::MinusEqual | Type::StarEqual | Type::SlashEqual | Type::ModuloEqual => {
                let (existing, scope) = self.resolve_identifier(&target, diagnostics);
                if !existing.suppresses() && existing != DataType::Int {
                    diagnostics.push(Error::type_error(
                        operator.clone(),
                        format!("'{}' requires an Int binding, found {:?}", operator.lexeme, existing),
                    ));
                }
                let value = self.parse_expression(0, diagnostics)?;
                self.end_clause(term, consume_term)?;
                if !value.data_type.suppresses() && value.data_type != DataType::Int {
                    diagnostics.push(Error::type_error(
                        operator.clone(),
                        format!("'{}' requires an Int operand, found {:?}", operator.lexeme, value.data_type),
                    ));
                }
                Ok(Stmt::Assignment { target, operator, value: Some(value), data_type: DataType::Int, explicit: false, scope })
            }
            Type::DoublePlus | Type::DoubleMinus => {
                let (existing, scope) = self.resolve_identifier(&target, diagnostics);
                if !existing.suppresses() && existing != DataType::Int {
                    diagnostics.push(Error::type_error(
                        operator.clone(),
                        format!("'{}' requires an Int binding, found {:?}", operator.lexeme, existing),
                    ));
                }
                self.end_clause(term, consume_term)?;
                Ok(Stmt::Assignment { target, operator, value: None, data_type: DataType::Int, explicit: false, scope })
            }
            _ => Err(self.fatal_at(&operator, "expected an assignment operator")),
        }
    }

    // ---- control flow ---------------------------------------------------

    fn parse_conditional(&mut self, diagnostics: &mut Vec<Error>) -> PResult<Stmt> {
        let token = self.advance();
        let is_while = token.r#type == Type::While;

        let condition = self.parse_expression(0, diagnostics)?;
        if !condition.data_type.suppresses() && condition.data_type != DataType::Bool {
            diagnostics.push(Error::type_error(token.clone(), format!("condition must be Bool, found {:?}", condition.data_type)));
        }

        let saved_in_loop = self.in_loop;
        if is_while {
            self.in_loop = true;
        }
        let then_block = self.parse_owned_block(diagnostics)?;
        self.in_loop = saved_in_loop;

        let else_block = if self.match_type(Type::Else).is_some() {
            Some(self.parse_owned_block(diagnostics)?)
        } else {
            None
        };

        Ok(Stmt::Conditional { token, condition, then_block, else_block })
    }

    fn parse_for(&mut self, diagnostics: &mut Vec<Error>) -> PResult<Stmt> {
        let token = self.advance();

        // A single frame covers the loop variable, the condition, the post
        // statement and the body: `for` pushes one frame for the whole
        // construct rather than a fresh one per iteration (unlike `while`).
        self.push_scope();

        let init = self.parse_assignment(Type::Semicolon, true, diagnostics)?;
        let condition = self.parse_expression(0, diagnostics)?;
        if !condition.data_type.suppresses() && condition.data_type != DataType::Bool {
            diagnostics.push(Error::type_error(token.clone(), format!("condition must be Bool, found {:?}", condition.data_type)));
        }
        self.consume(Type::Semicolon, "expected ';' after for-loop condition")?;

        let saved_in_loop = self.in_loop;
        self.in_loop = true;
        let post = self.parse_assignment(Type::LeftBrace, false, diagnostics)?;

        self.consume(Type::LeftBrace, "expected '{' to start for-loop body")?;
        let body = self.parse_statements_until(Type::RightBrace, diagnostics)?;
        self.consume(Type::RightBrace, "expected '}' to end for-loop body")?;
        self.in_loop = saved_in_loop;

        self.pop_scope();

        Ok(Stmt::For { token, init: Box::new(init), condition, post: Box::new(post), body })
    }

    fn parse_break_or_continue(&mut self, diagnostics: &mut Vec<Error>) -> PResult<Stmt> {
        let token = self.advance();
        if !self.in_loop {
            diagnostics.push(Error::reference_error(token.clone(), format!("'{}' outside of a loop", token.lexeme)));
        }
        self.consume(Type::Semicolon, "expected ';'")?;
        if token.r#type == Type::Break {
            Ok(Stmt::Break { token })
        } else {
            Ok(Stmt::Continue { token })
        }
    }

    // ---- functions -------------------------------------------------------

    fn parse_type_keyword(&mut self) -> PResult<DataType> {
        if self.match_type(Type::IntType).is_some() {
            Ok(DataType::Int)
        } else if self.match_type(Type::BoolType).is_some() {
            Ok(DataType::Bool)
        } else {
            Err(self.fatal("expected a type ('int' or 'bool')"))
        }
    }

    fn parse_def(&mut self, diagnostics: &mut Vec<Error>) -> PResult<Stmt> {
        let token = self.advance();

        if self.function.is_some() {
            return Err(self.fatal_at(&token, "nested function definitions are not allowed"));
        }

        let name = self.consume(Type::Identifier, "expected a function name")?;
        self.consume(Type::LeftParen, "expected '(' after function name")?;

        let mut params = Vec::new();
        if !self.check(Type::RightParen) {
            loop {
                let data_type = self.parse_type_keyword()?;
                let pname = self.consume(Type::Identifier, "expected a parameter name")?;
                params.push(Param { name: pname, data_type });
                if self.match_type(Type::Comma).is_some() {
                    if self.check(Type::RightParen) {
                        return Err(self.fatal("trailing comma is not allowed in a parameter list"));
                    }
                    continue;
                }
                break;
            }
        }
        self.consume(Type::RightParen, "expected ')' after parameters")?;

        let return_type = if self.match_type(Type::IntType).is_some() {
            DataType::Int
        } else if self.match_type(Type::BoolType).is_some() {
            DataType::Bool
        } else {
            DataType::Void
        };

        let scope = self.scopes.last_mut().expect("global scope always exists");
        if scope.funcs.contains_key(&name.lexeme) || scope.vars.contains_key(&name.lexeme) {
            diagnostics.push(Error::reference_error(
                name.clone(),
                format!("'{}' is already declared in this scope", name.lexeme),
            ));
        } else {
            scope.funcs.insert(
                name.lexeme.clone(),
                FunctionSignature { params: params.iter().map(|p| p.data_type).collect(), return_type },
            );
            scope.vars.insert(name.lexeme.clone(), DataType::Func);
        }

        self.function = Some(FunctionContext {
            params: params.clone(),
            return_type,
            has_value_return: false,
            return_branches: Vec::new(),
            locals: vec![HashMap::new()],
        });
        let saved_in_loop = self.in_loop;
        self.in_loop = false;

        self.consume(Type::LeftBrace, "expected '{' to start function body")?;
        let body = self.parse_statements_until(Type::RightBrace, diagnostics)?;
        self.consume(Type::RightBrace, "expected '}' to end function body")?;

        self.in_loop = saved_in_loop;
        let func = self.function.take().expect("function context set at start of parse_def");

        if return_type != DataType::Void && !func.has_value_return {
            diagnostics.push(Error::type_error(
                name.clone(),
                format!("function '{}' must return a value of type {return_type:?}", name.lexeme),
            ));
        }

        Ok(Stmt::Def { token, name, params, return_type, body, return_branches: func.return_branches })
    }

    fn parse_return(&mut self, diagnostics: &mut Vec<Error>) -> PResult<Stmt> {
        let token = self.advance();

        if self.match_type(Type::Semicolon).is_some() {
            match &self.function {
                None => diagnostics.push(Error::reference_error(token.clone(), "return outside of function body")),
                Some(func) if func.return_type != DataType::Void => {
                    diagnostics.push(Error::type_error(
                        token.clone(),
                        format!("expected a return value of type {:?}", func.return_type),
                    ));
                }
                Some(_) => {}
            }
            return Ok(Stmt::Return { token, branch: None });
        }

        let value = self.parse_expression(0, diagnostics)?;
        self.consume(Type::Semicolon, "expected ';' after return value")?;

        match &mut self.function {
            None => {
                diagnostics.push(Error::reference_error(token.clone(), "return outside of function body"));
                Ok(Stmt::Return { token, branch: None })
            }
            Some(func) => {
                if !value.data_type.suppresses() && value.data_type != func.return_type {
                    diagnostics.push(Error::type_error(
                        token.clone(),
                        format!("returned {:?} does not match declared return type {:?}", value.data_type, func.return_type),
                    ));
                }
                func.has_value_return = true;
                let branch = func.return_branches.len();
                func.return_branches.push(value);
                Ok(Stmt::Return { token, branch: Some(branch) })
            }
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}
