//! Abstract Syntax Tree definitions for test scripts.

/// Source location span (byte offsets)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Move the span by `offset` bytes (used for interpolated expressions lexed out of a string).
    pub fn shifted(self, offset: usize) -> Span {
        Span {
            start: self.start + offset,
            end: self.end + offset,
        }
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        (span.start, span.end.saturating_sub(span.start)).into()
    }
}

/// A node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// A whole test script.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Script {
    /// `require "..."` directives, in source order. They have no effect on execution.
    pub requires: Vec<Spanned<String>>,
    pub classes: Vec<Spanned<ClassDecl>>,
}

/// `class Name [< Base] ... end`
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: String,
    pub superclass: Option<String>,
    pub methods: Vec<Spanned<MethodDecl>>,
}

impl ClassDecl {
    /// Look up a method by name.
    pub fn method(&self, name: &str) -> Option<&MethodDecl> {
        self.methods.iter().map(|m| &m.node).find(|m| m.name == name)
    }
}

/// `def name ... end`
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub name: String,
    pub body: Vec<Spanned<Statement>>,
}

/// Statements inside a method body.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `name = expr`
    Assign(String, Spanned<Expr>),
    /// `name arg, arg` or `name(arg, arg)`; `puts`, `assert`, `skip`, ...
    Command(String, Vec<Spanned<Expr>>),
}

/// Expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Str(String),
    Interpolated(Vec<InterpPart>),
    Int(i64),
    Bool(bool),
    Nil,
    Var(String),
    Call(String, Vec<Spanned<Expr>>),
    Binary(Box<Spanned<Expr>>, BinaryOp, Box<Spanned<Expr>>),
}

/// One piece of an interpolated string.
#[derive(Debug, Clone, PartialEq)]
pub enum InterpPart {
    Literal(String),
    Expr(Spanned<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    NotEq,
}
