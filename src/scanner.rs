use std::str::Bytes;

use peekmore::{PeekMore, PeekMoreIterator};

use crate::error::{Diagnostic, SyntaxError};
use crate::token::{Location, Token, Type};

/// Byte-oriented, single-pass scanner. Operates on bytes rather than chars
/// since the language's alphabet (identifiers, digits, operators) is ASCII;
/// this keeps cursor arithmetic (`start`, `current`, columns) a matter of
/// counting bytes instead of walking a `char_indices` map.
pub struct Scanner<'a> {
    source: PeekMoreIterator<Bytes<'a>>,
    file: String,
    tokens: Vec<Token>,
    diagnostics: Vec<SyntaxError>,
    start: usize,
    current: usize,
    line: usize,
    line_start: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str, file: &str) -> Scanner<'a> {
        Scanner {
            source: source.bytes().peekmore(),
            file: file.to_string(),
            tokens: Vec::new(),
            diagnostics: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
            line_start: 0,
        }
    }

    /// Scans the whole source and returns its tokens (always EOF-terminated)
    /// together with any syntax diagnostics collected along the way.
    pub fn scan_tokens(mut self) -> (Vec<Token>, Vec<SyntaxError>) {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }

        self.tokens.push(Token::new(
            Type::EOF,
            String::new(),
            self.file.clone(),
            Location::new(self.line, 0),
        ));

        (self.tokens, self.diagnostics)
    }

    fn is_at_end(&mut self) -> bool {
        self.source.peek().is_none()
    }

    fn advance(&mut self) -> u8 {
        let byte = self.source.next().expect("advance past end of source");
        self.current += 1;
        byte
    }

    fn peek(&mut self) -> u8 {
        self.source.peek().copied().unwrap_or(0)
    }

    fn peek_next(&mut self) -> u8 {
        self.source.peek_next().copied().unwrap_or(0)
    }

    fn match_next(&mut self, expected: u8) -> bool {
        if self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    fn column(&self) -> usize {
        self.start - self.line_start + 1
    }

    fn add_token(&mut self, r#type: Type, lexeme: String) {
        let location = Location::new(self.line, self.column());
        self.tokens.push(Token::new(r#type, lexeme, self.file.clone(), location));
    }

    fn add_single(&mut self, r#type: Type) {
        let c = self.advance();
        self.add_token(r#type, (c as char).to_string());
    }

    fn add_double(&mut self, r#type: Type, first: u8, second: u8) {
        self.advance();
        self.advance();
        self.add_token(r#type, format!("{}{}", first as char, second as char));
    }

    /// A token kind that can end an expression. Used to decide whether a
    /// `-` should be read as a binary minus or folded into a following
    /// digit run as part of a negative literal.
    fn last_can_end_expr(&self) -> bool {
        matches!(
            self.tokens.last().map(|t| t.r#type),
            Some(Type::Number | Type::Identifier | Type::True | Type::False | Type::RightParen)
        )
    }

    fn number(&mut self) {
        let mut value = Vec::new();

        if self.peek() == b'-' {
            value.push(self.advance());
        }

        while self.peek().is_ascii_digit() {
            value.push(self.advance());
        }

        let lexeme = String::from_utf8(value).expect("digits and '-' are valid utf8");
        self.add_token(Type::Number, lexeme);
    }

    fn identifier(&mut self) {
        let mut value = Vec::new();

        while self.peek().is_ascii_alphanumeric() || self.peek() == b'_' {
            value.push(self.advance());
        }

        let lexeme = String::from_utf8(value).expect("identifier bytes are valid utf8");
        let r#type = match lexeme.as_str() {
            "true" => Type::True,
            "false" => Type::False,
            "if" => Type::If,
            "else" => Type::Else,
            "while" => Type::While,
            "for" => Type::For,
            "break" => Type::Break,
            "continue" => Type::Continue,
            "int" => Type::IntType,
            "bool" => Type::BoolType,
            "def" => Type::Def,
            "return" => Type::Return,
            _ => Type::Identifier,
        };

        self.add_token(r#type, lexeme);
    }

    fn scan_token(&mut self) {
        let c = self.peek();
        match c {
            b',' => self.add_single(Type::Comma),
            b';' => self.add_single(Type::Semicolon),
            b'{' => self.add_single(Type::LeftBrace),
            b'}' => self.add_single(Type::RightBrace),
            b'(' => self.add_single(Type::LeftParen),
            b')' => self.add_single(Type::RightParen),

            b'+' => {
                if self.peek_next() == b'+' {
                    self.add_double(Type::DoublePlus, b'+', b'+');
                } else if self.peek_next() == b'=' {
                    self.add_double(Type::PlusEqual, b'+', b'=');
                } else {
                    self.add_single(Type::Plus);
                }
            },
            b'-' => {
                if self.peek_next() == b'-' {
                    self.add_double(Type::DoubleMinus, b'-', b'-');
                } else if self.peek_next() == b'=' {
                    self.add_double(Type::MinusEqual, b'-', b'=');
                } else if self.peek_next().is_ascii_digit() && !self.last_can_end_expr() {
                    self.number();
                } else {
                    self.add_single(Type::Minus);
                }
            },
            b'*' => {
                if self.peek_next() == b'=' {
                    self.add_double(Type::StarEqual, b'*', b'=');
                } else {
                    self.add_single(Type::Star);
                }
            },
            b'/' => {
                if self.peek_next() == b'=' {
                    self.add_double(Type::SlashEqual, b'/', b'=');
                } else {
                    self.add_single(Type::Slash);
                }
            },
            b'%' => {
                if self.peek_next() == b'=' {
                    self.add_double(Type::ModuloEqual, b'%', b'=');
                } else {
                    self.add_single(Type::Modulo);
                }
            },
            b':' => {
                if self.peek_next() == b'=' {
                    self.add_double(Type::ColonEqual, b':', b'=');
                } else {
                    self.advance();
                    self.diagnostic("expected '=' after ':'");
                }
            },
            b'=' => {
                if self.peek_next() == b'=' {
                    self.add_double(Type::DoubleEqual, b'=', b'=');
                } else {
                    self.add_single(Type::Equal);
                }
            },
            b'!' => {
                if self.peek_next() == b'=' {
                    self.add_double(Type::NotEqual, b'!', b'=');
                } else {
                    self.add_single(Type::Bang);
                }
            },
            b'<' => {
                if self.peek_next() == b'=' {
                    self.add_double(Type::LessEqual, b'<', b'=');
                } else {
                    self.add_single(Type::Less);
                }
            },
            b'>' => {
                if self.peek_next() == b'=' {
                    self.add_double(Type::GreaterEqual, b'>', b'=');
                } else {
                    self.add_single(Type::Greater);
                }
            },
            b'|' => {
                if self.peek_next() == b'|' {
                    self.add_double(Type::Or, b'|', b'|');
                } else {
                    self.advance();
                    self.diagnostic("expected '||'");
                }
            },
            b'&' => {
                if self.peek_next() == b'&' {
                    self.add_double(Type::And, b'&', b'&');
                } else {
                    self.advance();
                    self.diagnostic("expected '&&'");
                }
            },

            b'#' => {
                while self.peek() != b'\n' && !self.is_at_end() {
                    self.advance();
                }
            },

            b' ' | b'\r' | b'\t' => {
                self.advance();
            },
            b'\n' => {
                self.advance();
                self.line += 1;
                self.line_start = self.current;
            },

            c if c.is_ascii_digit() => self.number(),
            c if c.is_ascii_alphabetic() || c == b'_' => self.identifier(),

            c => {
                self.advance();
                self.diagnostic(&format!("unexpected character '{}'", c as char));
            },
        }
    }

    fn diagnostic(&mut self, message: &str) {
        let location = Location::new(self.line, self.column());
        let error = SyntaxError { file: self.file.clone(), location, message: message.to_string() };
        error.report();
        self.diagnostics.push(error);
        self.add_token(Type::Unpermitted, String::new());
    }
}
