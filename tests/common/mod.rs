use simpl_lang::ast::ScopeRef;
use simpl_lang::environment::Environment;
use simpl_lang::error::Error;
use simpl_lang::interpreter::Interpreter;
use simpl_lang::parser::Parser;
use simpl_lang::scanner::Scanner;

/// The outcome of driving `source` through the full scan/parse/evaluate
/// pipeline, stopping at whichever stage first reports trouble.
pub enum Outcome {
    /// Scanning or parsing produced diagnostics; evaluation never ran.
    Diagnostics(Vec<String>),
    /// Parsing succeeded but evaluation hit a runtime error.
    RuntimeError,
    /// The whole pipeline completed; the final environment is attached.
    Ok(Interpreter),
}

/// Scans, parses, and (if clean) evaluates `source` against a fresh
/// environment, mirroring what [`simpl_lang::Simpl::run_file`] does for a
/// single script.
pub fn run(source: &str) -> Outcome {
    let (tokens, syntax_errors) = Scanner::new(source, "test").scan_tokens();
    if !syntax_errors.is_empty() {
        return Outcome::Diagnostics(syntax_errors.iter().map(|e| e.message.clone()).collect());
    }

    let mut parser = Parser::new();
    let (program, diagnostics) = match parser.parse(tokens) {
        Ok(result) => result,
        Err(fatal) => return Outcome::Diagnostics(vec![fatal.message]),
    };

    if !diagnostics.is_empty() {
        return Outcome::Diagnostics(diagnostics.iter().map(describe).collect());
    }

    let mut interpreter = Interpreter::new();
    match interpreter.interpret(&program) {
        Ok(()) => Outcome::Ok(interpreter),
        Err(_) => Outcome::RuntimeError,
    }
}

fn describe(error: &Error) -> String {
    match error {
        Error::Type(e) => e.message.clone(),
        Error::Reference(e) => e.message.clone(),
    }
}

/// Runs `source` and panics (with the diagnostics attached) unless it
/// completed cleanly, handing back the interpreter for assertions.
pub fn run_ok(source: &str) -> Interpreter {
    match run(source) {
        Outcome::Ok(interpreter) => interpreter,
        Outcome::Diagnostics(messages) => panic!("unexpected diagnostics: {messages:?}"),
        Outcome::RuntimeError => panic!("unexpected runtime error"),
    }
}

/// The value bound to `name` in the global frame after a successful run.
pub fn int(env: &Environment, name: &str) -> Option<i64> {
    env.get_int(name, ScopeRef::At(0))
}

pub fn boolean(env: &Environment, name: &str) -> Option<bool> {
    env.get_bool(name, ScopeRef::At(0))
}
