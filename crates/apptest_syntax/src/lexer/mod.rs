//! Lexer for test scripts.
//!
//! Handles tokenization including:
//! - Keywords (`class`, `def`, `end`, `require`, `true`, `false`, `nil`)
//! - Identifiers, integers, and strings (single-quoted literal, double-quoted with `#{...}` interpolation)
//! - `#` line comments
//! - Newlines, which terminate statements (as does `;`)

pub mod tokens;

pub use tokens::{StringPart, Token, TokenKind};

use crate::ast::Span;
use crate::diagnostics::SyntaxError;

/// Lexer for script source code.
pub struct Lexer<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            tokens: Vec::new(),
        }
    }

    /// Tokenize the entire source code.
    ///
    /// The token stream always ends with an `Eof` token.
    pub fn tokenize(mut self) -> Result<Vec<Token>, SyntaxError> {
        while let Some((start, c)) = self.chars.next() {
            self.scan_token(start, c)?;
        }

        let end = self.source.len();
        self.tokens.push(Token::new(TokenKind::Eof, Span::new(end, end)));
        Ok(self.tokens)
    }

    // ========================================================================
    // Core character handling
    // ========================================================================

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn pos(&mut self) -> usize {
        self.chars.peek().map(|(i, _)| *i).unwrap_or(self.source.len())
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        let end = self.pos();
        self.tokens.push(Token::new(kind, Span::new(start, end)));
    }

    fn scan_token(&mut self, start: usize, c: char) -> Result<(), SyntaxError> {
        match c {
            ' ' | '\t' | '\r' => {}
            '\n' => self.push(TokenKind::Newline, start),
            '#' => {
                while let Some(next) = self.peek() {
                    if next == '\n' {
                        break;
                    }
                    self.chars.next();
                }
            }
            '"' => {
                let parts = self.double_quoted(start)?;
                self.push(TokenKind::Str(parts), start);
            }
            '\'' => {
                let text = self.single_quoted(start)?;
                self.push(TokenKind::Str(vec![StringPart::Literal(text)]), start);
            }
            '-' if self.peek().is_some_and(|n| n.is_ascii_digit()) => self.number(start, c)?,
            c if c.is_ascii_digit() => self.number(start, c)?,
            c if is_ident_start(c) => {
                let mut name = String::from(c);
                while let Some(next) = self.peek() {
                    if !is_ident_continue(next) {
                        break;
                    }
                    name.push(next);
                    self.chars.next();
                }
                let kind = tokens::keyword(&name).unwrap_or(TokenKind::Ident(name));
                self.push(kind, start);
            }
            '<' => self.push(TokenKind::Lt, start),
            ',' => self.push(TokenKind::Comma, start),
            '(' => self.push(TokenKind::LParen, start),
            ')' => self.push(TokenKind::RParen, start),
            ';' => self.push(TokenKind::Semi, start),
            ':' if self.peek() == Some(':') => {
                self.chars.next();
                self.push(TokenKind::ColonColon, start);
            }
            '=' => {
                if self.peek() == Some('=') {
                    self.chars.next();
                    self.push(TokenKind::EqEq, start);
                } else {
                    self.push(TokenKind::Assign, start);
                }
            }
            '!' if self.peek() == Some('=') => {
                self.chars.next();
                self.push(TokenKind::NotEq, start);
            }
            other => {
                return Err(SyntaxError::new(
                    format!("unexpected character '{}'", other),
                    Span::new(start, start + other.len_utf8()),
                ));
            }
        }
        Ok(())
    }

    fn number(&mut self, start: usize, first: char) -> Result<(), SyntaxError> {
        let mut text = String::from(first);
        while let Some(next) = self.peek() {
            if next.is_ascii_digit() {
                text.push(next);
                self.chars.next();
            } else if next == '_' {
                self.chars.next();
            } else {
                break;
            }
        }
        let end = self.pos();
        let value = text
            .parse::<i64>()
            .map_err(|_| SyntaxError::new(format!("integer literal {} is out of range", text), Span::new(start, end)))?;
        self.push(TokenKind::Int(value), start);
        Ok(())
    }

    fn single_quoted(&mut self, start: usize) -> Result<String, SyntaxError> {
        let mut text = String::new();
        while let Some((_, c)) = self.chars.next() {
            match c {
                '\'' => return Ok(text),
                '\\' => match self.chars.next() {
                    Some((_, '\'')) => text.push('\''),
                    Some((_, '\\')) => text.push('\\'),
                    Some((_, other)) => {
                        text.push('\\');
                        text.push(other);
                    }
                    None => break,
                },
                other => text.push(other),
            }
        }
        Err(unterminated(start))
    }

    fn double_quoted(&mut self, start: usize) -> Result<Vec<StringPart>, SyntaxError> {
        let mut parts = Vec::new();
        let mut literal = String::new();

        while let Some((_, c)) = self.chars.next() {
            match c {
                '"' => {
                    if !literal.is_empty() || parts.is_empty() {
                        parts.push(StringPart::Literal(literal));
                    }
                    return Ok(parts);
                }
                '\\' => match self.chars.next() {
                    Some((_, 'n')) => literal.push('\n'),
                    Some((_, 't')) => literal.push('\t'),
                    Some((_, 'r')) => literal.push('\r'),
                    Some((_, '0')) => literal.push('\0'),
                    Some((_, other @ ('"' | '\\' | '#'))) => literal.push(other),
                    Some((_, other)) => {
                        literal.push('\\');
                        literal.push(other);
                    }
                    None => break,
                },
                '#' if self.peek() == Some('{') => {
                    self.chars.next();
                    if !literal.is_empty() {
                        parts.push(StringPart::Literal(std::mem::take(&mut literal)));
                    }
                    let offset = self.pos();
                    let source = self.interpolation(start)?;
                    parts.push(StringPart::Expr { source, offset });
                }
                other => literal.push(other),
            }
        }
        Err(unterminated(start))
    }

    /// Collect the raw text of `#{...}` up to the matching `}`.
    fn interpolation(&mut self, string_start: usize) -> Result<String, SyntaxError> {
        let mut depth = 0usize;
        let mut text = String::new();
        while let Some((_, c)) = self.chars.next() {
            match c {
                '{' => depth += 1,
                '}' if depth == 0 => return Ok(text),
                '}' => depth -= 1,
                _ => {}
            }
            text.push(c);
        }
        Err(unterminated(string_start))
    }
}

fn unterminated(start: usize) -> SyntaxError {
    SyntaxError::new("unterminated string meets end of file", Span::new(start, start + 1))
}

/// Check if a character can start an identifier (ASCII-only).
fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Check if a character can continue an identifier (ASCII-only).
fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Convenience function to lex a source string.
///
/// This is a shorthand for `Lexer::new(source).tokenize()`.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn lex(source: &str) -> Result<Vec<Token>, SyntaxError> {
    Lexer::new(source).tokenize()
}

// ============================================================================
// TESTS
// ============================================================================
