//! Token types for the script lexer.

use crate::ast::Span;

// ============================================================================
// TOKEN TYPES
// ============================================================================

/// Kind of token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ========== Keywords ==========
    Class,
    Def,
    End,
    Require,
    True,
    False,
    Nil,

    // ========== Identifiers and Literals ==========
    Ident(String),
    Int(i64),
    /// Single-quoted strings produce one `Literal` part.
    Str(Vec<StringPart>),

    // ========== Punctuation / operators ==========
    Lt,         // <
    ColonColon, // ::
    Comma,
    LParen,
    RParen,
    Assign, // =
    EqEq,   // ==
    NotEq,  // !=
    Semi,

    // ========== Layout ==========
    Newline,
    Eof,
}

/// Part of a double-quoted string.
#[derive(Debug, Clone, PartialEq)]
pub enum StringPart {
    Literal(String),
    /// Raw `#{...}` contents; `offset` is the byte position of the first character in the script.
    Expr { source: String, offset: usize },
}

/// A token with its kind and source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    /// Construct a new token.
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Resolve an identifier spelling to a keyword token, if reserved.
pub fn keyword(name: &str) -> Option<TokenKind> {
    match name {
        "class" => Some(TokenKind::Class),
        "def" => Some(TokenKind::Def),
        "end" => Some(TokenKind::End),
        "require" => Some(TokenKind::Require),
        "true" => Some(TokenKind::True),
        "false" => Some(TokenKind::False),
        "nil" => Some(TokenKind::Nil),
        _ => None,
    }
}

/// Human-readable description used in "unexpected ..." messages.
pub fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Class => "'class'".to_string(),
        TokenKind::Def => "'def'".to_string(),
        TokenKind::End => "'end'".to_string(),
        TokenKind::Require => "'require'".to_string(),
        TokenKind::True => "'true'".to_string(),
        TokenKind::False => "'false'".to_string(),
        TokenKind::Nil => "'nil'".to_string(),
        TokenKind::Ident(name) => format!("identifier '{}'", name),
        TokenKind::Int(n) => format!("integer {}", n),
        TokenKind::Str(_) => "string literal".to_string(),
        TokenKind::Lt => "'<'".to_string(),
        TokenKind::ColonColon => "'::'".to_string(),
        TokenKind::Comma => "','".to_string(),
        TokenKind::LParen => "'('".to_string(),
        TokenKind::RParen => "')'".to_string(),
        TokenKind::Assign => "'='".to_string(),
        TokenKind::EqEq => "'=='".to_string(),
        TokenKind::NotEq => "'!='".to_string(),
        TokenKind::Semi => "';'".to_string(),
        TokenKind::Newline => "end of line".to_string(),
        TokenKind::Eof => "end of file".to_string(),
    }
}
