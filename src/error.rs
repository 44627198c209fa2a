use crate::token::{Location, Token};

static mut HAD_ERROR: bool = false;
static mut HAD_RUNTIME_ERROR: bool = false;

/// Checks if a diagnostic has fired since the last [`reset_error`].
pub fn did_error() -> bool {
    unsafe { HAD_ERROR || HAD_RUNTIME_ERROR }
}

/// Checks if a runtime (as opposed to syntax/type/reference) error fired.
pub fn did_runtime_error() -> bool {
    unsafe { HAD_RUNTIME_ERROR }
}

/// Clears both error flags. Used between REPL lines so one bad line doesn't
/// poison the exit code of everything that follows it.
pub fn reset_error() {
    unsafe {
        HAD_ERROR = false;
        HAD_RUNTIME_ERROR = false;
    }
}

/// Every diagnostic kind implements this so the driver can print and account
/// for it uniformly, without each call site hand-rolling `eprintln!`.
pub trait Diagnostic {
    /// Formats this diagnostic as `<file>:<line>:<col>: <kind>: <message>`.
    fn message(&self) -> String;

    /// Where in the source this diagnostic points.
    fn location(&self) -> Location;

    /// Prints the diagnostic to stderr and flips the relevant error flag.
    fn report(&self);

    /// Like [`Self::report`], but also echoes the offending source line
    /// beneath the message when `source` is long enough to contain it.
    fn report_with_context(&self, source: &str) {
        self.report();
        if let Some(line) = source_line(source, self.location().line) {
            eprintln!("    {line}");
            eprintln!("    {}^", " ".repeat(self.location().column.saturating_sub(1)));
        }
    }
}

/// Extracts line `line` (1-based) from `source` using byte-offset slicing.
fn source_line(source: &str, line: usize) -> Option<&str> {
    use substring::Substring;

    let mut start = 0;
    let mut current = 1;
    for (i, b) in source.bytes().enumerate() {
        if current == line {
            break;
        }
        if b == b'\n' {
            current += 1;
            start = i + 1;
        }
    }
    if current != line {
        return None;
    }
    let end = source[start..].find('\n').map(|i| start + i).unwrap_or(source.len());
    Some(source.substring(start, end))
}

fn format_diagnostic(kind: &str, file: &str, location: Location, message: &str) -> String {
    format!("{file}:{line}:{col}: {kind}: {message}", line = location.line, col = location.column)
}

/// A lexical error: a byte the scanner could not classify.
#[derive(Debug)]
pub struct SyntaxError {
    pub file: String,
    pub location: Location,
    pub message: String,
}

impl Diagnostic for SyntaxError {
    fn message(&self) -> String {
        format_diagnostic("syntax error", &self.file, self.location, &self.message)
    }

    fn location(&self) -> Location {
        self.location
    }

    fn report(&self) {
        eprintln!("{}", self.message());
        unsafe { HAD_ERROR = true; }
    }
}

/// A structural parsing failure severe enough to stop parsing outright.
#[derive(Debug)]
pub struct ParseError {
    pub token: Token,
    pub message: String,
}

impl Diagnostic for ParseError {
    fn message(&self) -> String {
        format_diagnostic("syntax error", &self.token.file, self.token.location, &self.message)
    }

    fn location(&self) -> Location {
        self.token.location
    }

    fn report(&self) {
        eprintln!("{}", self.message());
        unsafe { HAD_ERROR = true; }
    }
}

/// A static type mismatch caught during analysis.
#[derive(Debug)]
pub struct TypeError {
    pub token: Token,
    pub message: String,
}

impl Diagnostic for TypeError {
    fn message(&self) -> String {
        format_diagnostic("type error", &self.token.file, self.token.location, &self.message)
    }

    fn location(&self) -> Location {
        self.token.location
    }

    fn report(&self) {
        eprintln!("{}", self.message());
        unsafe { HAD_ERROR = true; }
    }
}

/// An unresolved or illegally placed name caught during analysis.
#[derive(Debug)]
pub struct ReferenceError {
    pub token: Token,
    pub message: String,
}

impl Diagnostic for ReferenceError {
    fn message(&self) -> String {
        format_diagnostic("reference error", &self.token.file, self.token.location, &self.message)
    }

    fn location(&self) -> Location {
        self.token.location
    }

    fn report(&self) {
        eprintln!("{}", self.message());
        unsafe { HAD_ERROR = true; }
    }
}

/// An error only detectable while the program is actually running.
#[derive(Debug)]
pub struct RuntimeError {
    pub token: Token,
    pub message: String,
}

impl Diagnostic for RuntimeError {
    fn message(&self) -> String {
        format_diagnostic("runtime error", &self.token.file, self.token.location, &self.message)
    }

    fn location(&self) -> Location {
        self.token.location
    }

    fn report(&self) {
        eprintln!("{}", self.message());
        unsafe { HAD_RUNTIME_ERROR = true; }
    }
}

/// A non-fatal diagnostic raised by the analyzer while parsing continues.
///
/// The parser never emits [`SyntaxError`] (that's the scanner's domain) or
/// [`RuntimeError`] (the evaluator's); it only ever appends one of these two
/// kinds to its diagnostic vector, or aborts outright with a [`ParseError`].
#[derive(Debug)]
pub enum Error {
    Type(TypeError),
    Reference(ReferenceError),
}

impl Diagnostic for Error {
    fn message(&self) -> String {
        match self {
            Error::Type(e) => e.message(),
            Error::Reference(e) => e.message(),
        }
    }

    fn location(&self) -> Location {
        match self {
            Error::Type(e) => e.location(),
            Error::Reference(e) => e.location(),
        }
    }

    fn report(&self) {
        match self {
            Error::Type(e) => e.report(),
            Error::Reference(e) => e.report(),
        }
    }
}

impl Error {
    pub fn type_error(token: Token, message: impl Into<String>) -> Error {
        Error::Type(TypeError { token, message: message.into() })
    }

    pub fn reference_error(token: Token, message: impl Into<String>) -> Error {
        Error::Reference(ReferenceError { token, message: message.into() })
    }
}
