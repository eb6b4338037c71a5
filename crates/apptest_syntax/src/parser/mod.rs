//! Parser for test scripts.
//!
//! Grammar (informal):
//!
//! ```text
//! script    := sep* (item sep+)* item? EOF
//! item      := "require" STRING | class
//! class     := "class" IDENT ("<" IDENT ("::" IDENT)*)? sep* (method sep*)* "end"
//! method    := "def" IDENT sep* (stmt sep+)* stmt? "end"
//! stmt      := IDENT "=" expr | IDENT args?
//! args      := "(" (expr ("," expr)*)? ")"   -- only when "(" touches the name
//!            | expr ("," expr)*
//! expr      := primary (("==" | "!=") primary)?
//! primary   := STRING | INT | "true" | "false" | "nil" | IDENT call_args? | "(" expr ")"
//! sep       := NEWLINE | ";"
//! ```
//!
//! The parser stops at the first error; a script either loads completely or not at all.

use crate::ast::{BinaryOp, ClassDecl, Expr, InterpPart, MethodDecl, Script, Span, Spanned, Statement};
use crate::diagnostics::SyntaxError;
use crate::lexer::{self, StringPart, Token, TokenKind, tokens::describe};

/// Deepest expression nesting accepted, counting parentheses, call arguments, and `#{...}` bodies.
pub const MAX_NESTING: usize = 64;

/// Parser state.
pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser for a token stream.
    ///
    /// ## Parameters
    /// - `tokens`: Token stream produced by [`crate::lexer::lex`]; must end with `Eof`.
    pub fn new(tokens: &'a [Token]) -> Self {
        Self::nested(tokens, 0)
    }

    fn nested(tokens: &'a [Token], depth: usize) -> Self {
        Self { tokens, pos: 0, depth }
    }

    /// Parse the entire token stream into a [`Script`].
    pub fn parse(mut self) -> Result<Script, SyntaxError> {
        let mut script = Script::default();
        self.skip_separators();

        while !self.at(&TokenKind::Eof) {
            let token = self.advance();
            match &token.kind {
                TokenKind::Require => {
                    let (parts, span) = self.expect_string("a file name after 'require'")?;
                    let name = parts
                        .into_iter()
                        .map(|p| match p {
                            StringPart::Literal(s) => s,
                            StringPart::Expr { source, .. } => source,
                        })
                        .collect::<String>();
                    script.requires.push(Spanned::new(name, token.span.merge(span)));
                }
                TokenKind::Class => {
                    let class = self.class_body(token.span)?;
                    script.classes.push(class);
                }
                other => return Err(unexpected(other, token.span, "'class' or 'require'")),
            }
            self.end_of_item()?;
        }

        Ok(script)
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn class_body(&mut self, start: Span) -> Result<Spanned<ClassDecl>, SyntaxError> {
        let (name, _) = self.expect_ident("class name")?;
        let superclass = if self.eat(&TokenKind::Lt) {
            let (mut path, _) = self.expect_ident("superclass name")?;
            while self.eat(&TokenKind::ColonColon) {
                let (segment, _) = self.expect_ident("constant name after '::'")?;
                path.push_str("::");
                path.push_str(&segment);
            }
            Some(path)
        } else {
            None
        };

        let mut methods = Vec::new();
        loop {
            self.skip_separators();
            let token = self.advance();
            match &token.kind {
                TokenKind::End => {
                    let span = start.merge(token.span);
                    return Ok(Spanned::new(
                        ClassDecl {
                            name,
                            superclass,
                            methods,
                        },
                        span,
                    ));
                }
                TokenKind::Def => methods.push(self.method_body(token.span)?),
                other => return Err(unexpected(other, token.span, "'def' or 'end'")),
            }
        }
    }

    fn method_body(&mut self, start: Span) -> Result<Spanned<MethodDecl>, SyntaxError> {
        let (name, _) = self.expect_ident("method name")?;
        let mut body = Vec::new();

        loop {
            self.skip_separators();
            if let TokenKind::End = self.peek().kind {
                let end = self.advance().span;
                return Ok(Spanned::new(MethodDecl { name, body }, start.merge(end)));
            }
            body.push(self.statement()?);
            self.end_of_statement()?;
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn statement(&mut self) -> Result<Spanned<Statement>, SyntaxError> {
        let (name, name_span) = self.expect_ident("statement")?;

        if self.eat(&TokenKind::Assign) {
            let value = self.expression()?;
            let span = name_span.merge(value.span);
            return Ok(Spanned::new(Statement::Assign(name, value), span));
        }

        let (args, end) = if self.touching_paren(name_span) {
            self.call_args()?
        } else if self.at_statement_end() {
            (Vec::new(), name_span)
        } else {
            let mut args = vec![self.expression()?];
            while self.eat(&TokenKind::Comma) {
                self.skip_newlines();
                args.push(self.expression()?);
            }
            let end = args.last().map(|a| a.span).unwrap_or(name_span);
            (args, end)
        };

        Ok(Spanned::new(Statement::Command(name, args), name_span.merge(end)))
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn expression(&mut self) -> Result<Spanned<Expr>, SyntaxError> {
        if self.depth >= MAX_NESTING {
            return Err(SyntaxError::new("expression nested too deeply", self.peek().span));
        }
        self.depth += 1;
        let expr = self.comparison();
        self.depth -= 1;
        expr
    }

    fn comparison(&mut self) -> Result<Spanned<Expr>, SyntaxError> {
        let lhs = self.primary()?;
        let op = match self.peek().kind {
            TokenKind::EqEq => BinaryOp::Eq,
            TokenKind::NotEq => BinaryOp::NotEq,
            _ => return Ok(lhs),
        };
        self.advance();
        let rhs = self.primary()?;
        let span = lhs.span.merge(rhs.span);
        Ok(Spanned::new(Expr::Binary(Box::new(lhs), op, Box::new(rhs)), span))
    }

    fn primary(&mut self) -> Result<Spanned<Expr>, SyntaxError> {
        let token = self.advance();
        let span = token.span;
        let expr = match &token.kind {
            TokenKind::Int(n) => Expr::Int(*n),
            TokenKind::True => Expr::Bool(true),
            TokenKind::False => Expr::Bool(false),
            TokenKind::Nil => Expr::Nil,
            TokenKind::Str(parts) => string_expr(parts, self.depth)?,
            TokenKind::Ident(name) => {
                if self.touching_paren(span) {
                    let (args, end) = self.call_args()?;
                    return Ok(Spanned::new(Expr::Call(name.clone(), args), span.merge(end)));
                }
                Expr::Var(name.clone())
            }
            TokenKind::LParen => {
                let inner = self.expression()?;
                let close = self.expect(&TokenKind::RParen, "')'")?;
                return Ok(Spanned::new(inner.node, span.merge(close)));
            }
            other => return Err(unexpected(other, span, "an expression")),
        };
        Ok(Spanned::new(expr, span))
    }

    /// Parse `( args )`; the opening paren is the current token.
    fn call_args(&mut self) -> Result<(Vec<Spanned<Expr>>, Span), SyntaxError> {
        self.advance();
        let mut args = Vec::new();
        self.skip_newlines();
        if !self.at(&TokenKind::RParen) {
            loop {
                args.push(self.expression()?);
                self.skip_newlines();
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
                self.skip_newlines();
            }
        }
        let close = self.expect(&TokenKind::RParen, "')'")?;
        Ok((args, close))
    }

    // ========================================================================
    // Token helpers
    // ========================================================================

    fn peek(&self) -> &'a Token {
        // The lexer always terminates the stream with `Eof`; stay on it once reached.
        &self.tokens[self.pos.min(self.tokens.len().saturating_sub(1))]
    }

    fn advance(&mut self) -> &'a Token {
        let token = self.peek();
        if !matches!(token.kind, TokenKind::Eof) {
            self.pos += 1;
        }
        token
    }

    fn at(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> Result<Span, SyntaxError> {
        let token = self.advance();
        if &token.kind == kind {
            Ok(token.span)
        } else {
            Err(unexpected(&token.kind, token.span, what))
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<(String, Span), SyntaxError> {
        let token = self.advance();
        match &token.kind {
            TokenKind::Ident(name) => Ok((name.clone(), token.span)),
            other => Err(unexpected(other, token.span, what)),
        }
    }

    fn expect_string(&mut self, what: &str) -> Result<(Vec<StringPart>, Span), SyntaxError> {
        let token = self.advance();
        match &token.kind {
            TokenKind::Str(parts) => Ok((parts.clone(), token.span)),
            other => Err(unexpected(other, token.span, what)),
        }
    }

    fn touching_paren(&self, prev: Span) -> bool {
        let next = self.peek();
        matches!(next.kind, TokenKind::LParen) && next.span.start == prev.end
    }

    fn at_statement_end(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Newline | TokenKind::Semi | TokenKind::End | TokenKind::Eof
        )
    }

    fn skip_separators(&mut self) {
        while matches!(self.peek().kind, TokenKind::Newline | TokenKind::Semi) {
            self.advance();
        }
    }

    fn skip_newlines(&mut self) {
        while matches!(self.peek().kind, TokenKind::Newline) {
            self.advance();
        }
    }

    fn end_of_statement(&mut self) -> Result<(), SyntaxError> {
        match self.peek().kind {
            TokenKind::Newline | TokenKind::Semi | TokenKind::End => Ok(()),
            _ => {
                let token = self.peek();
                Err(unexpected(&token.kind, token.span, "end of statement"))
            }
        }
    }

    fn end_of_item(&mut self) -> Result<(), SyntaxError> {
        match self.peek().kind {
            TokenKind::Eof => Ok(()),
            TokenKind::Newline | TokenKind::Semi => {
                self.skip_separators();
                Ok(())
            }
            _ => {
                let token = self.peek();
                Err(unexpected(&token.kind, token.span, "end of line"))
            }
        }
    }
}

/// Build an expression from string parts, parsing each `#{...}` body.
fn string_expr(parts: &[StringPart], depth: usize) -> Result<Expr, SyntaxError> {
    if let [StringPart::Literal(text)] = parts {
        return Ok(Expr::Str(text.clone()));
    }

    let mut out = Vec::with_capacity(parts.len());
    for part in parts {
        match part {
            StringPart::Literal(text) => out.push(InterpPart::Literal(text.clone())),
            StringPart::Expr { source, offset } => out.push(InterpPart::Expr(interpolated_expr(source, *offset, depth)?)),
        }
    }
    Ok(Expr::Interpolated(out))
}

fn interpolated_expr(source: &str, offset: usize, depth: usize) -> Result<Spanned<Expr>, SyntaxError> {
    let shift = |mut e: SyntaxError| {
        e.span = e.span.shifted(offset);
        e
    };
    let mut tokens = lexer::lex(source).map_err(shift)?;
    for token in &mut tokens {
        token.span = token.span.shifted(offset);
    }

    let mut parser = Parser::nested(&tokens, depth);
    let expr = parser.expression()?;
    if !parser.at(&TokenKind::Eof) {
        let token = parser.peek();
        return Err(unexpected(&token.kind, token.span, "'}'"));
    }
    Ok(expr)
}

fn unexpected(found: &TokenKind, span: Span, expected: &str) -> SyntaxError {
    SyntaxError::new(format!("unexpected {}, expecting {}", describe(found), expected), span)
}

/// Convenience function to parse a token stream.
#[tracing::instrument(skip_all, fields(token_count = tokens.len()))]
pub fn parse(tokens: &[Token]) -> Result<Script, SyntaxError> {
    Parser::new(tokens).parse()
}

#[cfg(test)]
mod tests;
