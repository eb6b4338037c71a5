//! Syntax frontend for apptest test scripts: lexer, parser, AST, diagnostics.
//!
//! Test scripts are small, line-oriented files that declare test classes and methods:
//!
//! ```text
//! require "test_helper"
//!
//! class FooTest
//!   def test_truth
//!     puts "FooTest"
//!     assert true
//!   end
//! end
//! ```
//!
//! ## Notes
//! - This crate is “syntax-only”: it does not evaluate anything. Statement names such as `assert` or `puts` are
//!   plain commands here; the runner's engine gives them meaning.
//!
//! ## Examples
//! ```rust
//! use apptest_syntax::{lexer, parser};
//!
//! let tokens = lexer::lex("class FooTest\n  def test_a\n    assert true\n  end\nend\n").unwrap();
//! let script = parser::parse(&tokens).unwrap();
//! assert_eq!(script.classes.len(), 1);
//! ```

pub mod ast;
pub mod diagnostics;
pub mod lexer;
pub mod parser;

pub use diagnostics::SyntaxError;

/// Lex and parse a script in one step.
///
/// ## Errors
/// Returns the first [`SyntaxError`] found by either the lexer or the parser.
pub fn parse_script(source: &str) -> Result<ast::Script, SyntaxError> {
    let tokens = lexer::lex(source)?;
    parser::parse(&tokens)
}
