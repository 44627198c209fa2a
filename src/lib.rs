//! `simpl` is a small statically typed, tree-walking interpreter.
//!
//! A program is scalars (`int`, `bool`), arithmetic and logical operators,
//! lexically scoped blocks, `if`/`while`/`for` control flow, and first-order
//! functions that take value parameters and return at most one scalar. There
//! are no strings, no heap-allocated values, no closures, and no classes:
//! every binding in the language fits in a machine word.
//!
//! ## Pipeline
//! Source text flows through four stages, each documented in its own module:
//! the [`scanner`] turns bytes into a token stream, the [`parser`] is a
//! single fused pass that builds the typed AST (see [`ast`]) while also
//! resolving names and checking types, and the [`interpreter`] walks the
//! resulting tree against a stacked [`environment`]. Diagnostics from any
//! stage are collected through the common [`error::Diagnostic`] trait.
//!
//! Surrounding the core, this crate also provides a line-oriented REPL
//! (backed by `rustyline`, with history persisted under the user's home
//! directory), a `--ast` flag that prints the parsed tree instead of running
//! it ([`printer`]), and a `--time` flag that reports evaluation wall-clock
//! time.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use log::{debug, info, warn};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

pub mod ast;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod parser;
pub mod printer;
pub mod scanner;
pub mod token;
pub mod value;

use error::Diagnostic;
use interpreter::Interpreter;
use parser::Parser;
use scanner::Scanner;

/// The exit code the CLI returns for any usage error, diagnostic, or
/// runtime failure. Matches the one-argument contract documented for
/// `simpl <script>`.
pub const EXIT_FAILURE: u8 = 64;

/// Peripheral flags layered on top of the one-argument `simpl <script>`
/// contract; neither changes exit-code behavior.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunOptions {
    /// Print the parsed program's tree form instead of executing it.
    pub print_ast: bool,
    /// Report the wall-clock duration of the evaluation phase.
    pub time: bool,
}

/// Drives the scanner, parser, and interpreter over one or more chunks of
/// source text. A single `Simpl` is meant to live for the whole process: the
/// REPL reuses its `Parser`/`Interpreter` across every line, so declarations
/// from one line stay visible (and correctly typed) on the next.
pub struct Simpl {
    parser: Parser,
    interpreter: Interpreter,
}

impl Simpl {
    pub fn new() -> Self {
        Simpl { parser: Parser::new(), interpreter: Interpreter::new() }
    }

    /// Reads and runs `path`, returning the process exit code.
    pub fn run_file(&mut self, path: &str, options: RunOptions) -> ExitCode {
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                eprintln!("simpl: could not read '{path}': {err}");
                return ExitCode::from(EXIT_FAILURE);
            }
        };

        if self.run(&source, path, options) {
            ExitCode::SUCCESS
        } else {
            ExitCode::from(EXIT_FAILURE)
        }
    }

    /// Starts an interactive REPL: each line is scanned, parsed, and
    /// evaluated against the same persistent environment, mirroring the
    /// semantics of a single program that keeps growing. Line history is
    /// edited with `rustyline` and persisted to a file under the user's
    /// home directory across sessions.
    pub fn run_prompt(&mut self) -> ExitCode {
        let mut editor = match DefaultEditor::new() {
            Ok(editor) => editor,
            Err(err) => {
                eprintln!("simpl: could not start line editor: {err}");
                return ExitCode::from(EXIT_FAILURE);
            }
        };

        let history_path = history_path();
        if let Some(path) = &history_path {
            if editor.load_history(path).is_err() {
                debug!("no existing REPL history at {}", path.display());
            }
        }

        loop {
            match editor.readline("simpl> ") {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let _ = editor.add_history_entry(line.as_str());
                    self.run(&line, "<repl>", RunOptions::default());
                    error::reset_error();
                }
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
                Err(err) => {
                    eprintln!("simpl: {err}");
                    break;
                }
            }
        }

        if let Some(path) = &history_path {
            if let Err(err) = editor.save_history(path) {
                warn!("could not persist REPL history to {}: {err}", path.display());
            }
        }

        ExitCode::SUCCESS
    }

    /// Runs `source` (a full file or one REPL line) through the whole
    /// pipeline. Returns whether the run completed without any diagnostic.
    fn run(&mut self, source: &str, file: &str, options: RunOptions) -> bool {
        let (tokens, _) = Scanner::new(source, file).scan_tokens();
        info!("scanned {} tokens from {file}", tokens.len());

        // Scanner diagnostics are already reported (and HAD_ERROR flipped)
        // as they're found; the stage boundary only needs to check the flag.
        if error::did_error() {
            return false;
        }

        let (program, diagnostics) = match self.parser.parse(tokens) {
            Ok(result) => result,
            Err(fatal) => {
                fatal.report_with_context(source);
                return false;
            }
        };

        for diagnostic in &diagnostics {
            diagnostic.report_with_context(source);
        }
        if error::did_error() {
            return false;
        }

        if options.print_ast {
            println!("{}", printer::print_program(&program));
            return true;
        }

        let start = Instant::now();
        self.interpreter.interpret(&program).ok();
        let elapsed = start.elapsed();

        if options.time {
            println!("# evaluated in {elapsed:?}");
        }

        if error::did_runtime_error() {
            return false;
        }

        self.interpreter.dump_environment();
        true
    }
}

impl Default for Simpl {
    fn default() -> Self {
        Self::new()
    }
}

/// `~/.simpl_history`, or `None` if the home directory can't be resolved
/// (history persistence is a convenience, not a hard requirement).
fn history_path() -> Option<PathBuf> {
    home::home_dir().map(|home| home.join(".simpl_history"))
}
