#![forbid(unsafe_code)]
//! apptest: test-suite discovery and execution for conventional application layouts
//!
//! Resolves command-line selectors (test files, suite keywords such as `models` or `functionals`, directories) into
//! an ordered set of test files, selects the environment, preloads fixtures when the run calls for it, loads every
//! file into one execution engine while isolating per-file load errors, and reports aggregate counts.
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **True invariants**: If a panic represents a runner bug (logic error), use `.expect("INVARIANT: reason")` with a
//!   clear explanation.

pub mod cli;
pub mod config;
pub mod engine;
pub mod runner;

pub use config::RunnerConfig;
pub use engine::ScriptEngine;
pub use runner::{RunRequest, RunResult, TestError};
