//! Provide the shared, pure vocabulary and policy helpers for the apptest runner.
//!
//! This crate is intentionally small and dependency-free. It holds the pieces both the runner and its tooling need
//! to agree on:
//! - the suite keyword registry (`models`, `units`, `functionals`, ...),
//! - the script vocabulary registries (commands such as `assert`, builtins such as `env`),
//! - project layout conventions (test root, `_test` suffix, script extension),
//! - selection policy (environment precedence, fixture preloading).
//!
//! ## Notes
//!
//! - This is a “policy core” crate: **no IO**, no global state, and no runner-specific types.

pub mod builtins;
pub mod commands;
pub mod conventions;
pub mod policy;
pub mod suites;

pub use policy::{select_environment, should_preload_fixtures};
