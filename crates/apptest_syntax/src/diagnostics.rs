//! Syntax diagnostics for test scripts.

use crate::ast::Span;

/// A lexing or parsing error with its location.
#[derive(Debug, Clone, PartialEq, thiserror::Error, miette::Diagnostic)]
#[error("{message}")]
#[diagnostic(code(apptest::syntax_error))]
pub struct SyntaxError {
    pub message: String,
    #[label("here")]
    pub span: Span,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }

    /// 1-based line and column of the error in `source`. Columns count characters, not bytes.
    pub fn location(&self, source: &str) -> (usize, usize) {
        let offset = self.span.start.min(source.len());
        let mut line = 1;
        let mut column = 1;

        for (i, c) in source.char_indices() {
            if i >= offset {
                break;
            }
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }

        (line, column)
    }

    /// Render as `SyntaxError: <file>:<line>:<col>: <message>`.
    pub fn render(&self, file_name: &str, source: &str) -> String {
        let (line, col) = self.location(source);
        format!("SyntaxError: {}:{}:{}: {}", file_name, line, col, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_on_second_line() {
        let source = "require \"x\"\ndef; end\n";
        let err = SyntaxError::new("unexpected ';'", Span::new(15, 16));
        assert_eq!(err.location(source), (2, 4));
        assert_eq!(
            err.render("test/models/error_test.rt", source),
            "SyntaxError: test/models/error_test.rt:2:4: unexpected ';'"
        );
    }

    #[test]
    fn test_location_past_end_is_clamped() {
        let err = SyntaxError::new("unexpected end of file", Span::new(99, 99));
        assert_eq!(err.location("ab"), (1, 3));
    }

    #[test]
    fn test_location_column_counts_characters() {
        let source = "puts \"é\"; ;\n";
        let semicolon = source.rfind(';').unwrap();
        let err = SyntaxError::new("unexpected ';'", Span::new(semicolon, semicolon + 1));
        assert_eq!(err.location(source), (1, 11));
    }
}
