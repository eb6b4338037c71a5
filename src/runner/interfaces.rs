//! Runner I/O boundary interfaces
//!
//! This module defines trait-based abstractions for everything the runner consumes from outside:
//! - Filesystem access (existence checks, directory listing, file reads)
//! - The execution engine (load one file, run every registered case)
//! - Fixture loading
//! - The environment-variable source
//!
//! The driver only ever talks to these traits, so tests can swap in an in-memory filesystem or a fake environment.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::environment::Environment;
use super::fixtures::FixtureSet;
use super::reporter::TestReporter;
use super::EngineReport;
use crate::config::ConfigError;
use crate::engine::NameFilter;

/// Errors that occur while selecting, loading, or running tests
#[derive(Debug, Error)]
pub enum TestError {
    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// Rendered syntax error (`SyntaxError: <file>:<line>:<col>: <message>`).
    #[error("{0}")]
    Syntax(String),

    #[error("failed to load {}: {message}", path.display())]
    FileLoad { path: PathBuf, message: String },

    #[error("failed to load fixtures from {}: {message}", path.display())]
    Fixture { path: PathBuf, message: String },

    #[error("environment '{0}' is already loaded")]
    EnvironmentReloaded(String),

    #[error("invalid name filter '{pattern}': {message}")]
    InvalidFilter { pattern: String, message: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// Filesystem Interface
// ============================================================================

/// Filesystem capabilities the resolver, driver, and fixture loader need.
pub trait FileSystem {
    fn is_file(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Direct children of `path`, in no particular order.
    fn list_dir(&self, path: &Path) -> Result<Vec<PathBuf>, TestError>;

    fn read_to_string(&self, path: &Path) -> Result<String, TestError>;

    /// Absolute, normalized form of an existing path; the input itself when that is not possible.
    fn canonicalize(&self, path: &Path) -> PathBuf;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<PathBuf>, TestError> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            entries.push(entry?.path());
        }
        Ok(entries)
    }

    fn read_to_string(&self, path: &Path) -> Result<String, TestError> {
        fs::read_to_string(path).map_err(|e| TestError::FileLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn canonicalize(&self, path: &Path) -> PathBuf {
        fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
    }
}

// ============================================================================
// Execution Engine Interface
// ============================================================================

/// What test code can observe while it runs.
#[derive(Debug, Clone, Copy)]
pub struct RunContext<'a> {
    pub environment: &'a Environment,
    pub fixtures: &'a FixtureSet,
}

/// Load test files into one shared registry, then run every registered case.
///
/// This trait separates "what a test file is" from the orchestration around it: the driver decides which files
/// load and in which order, the engine decides how a file turns into cases and how a case executes.
pub trait ExecutionEngine {
    /// Load one file and register its test cases.
    ///
    /// Returns the number of cases registered. On error nothing from the file is registered.
    fn load_file(&mut self, path: &Path, source: &str) -> Result<usize, TestError>;

    /// Run every registered case that passes `filter`, reporting output and outcomes as they happen.
    fn run(&mut self, ctx: RunContext<'_>, filter: Option<&NameFilter>, reporter: &mut dyn TestReporter)
    -> EngineReport;
}

// ============================================================================
// Fixture Interface
// ============================================================================

/// Load all fixture data for an environment.
pub trait FixtureLoader {
    fn load_all(&self, environment: &Environment) -> Result<FixtureSet, TestError>;
}

// ============================================================================
// Environment Source Interface
// ============================================================================

/// Read environment variables.
pub trait EnvSource {
    fn var(&self, name: &str) -> Option<String>;
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl<F> EnvSource for F
where
    F: Fn(&str) -> Option<String>,
{
    fn var(&self, name: &str) -> Option<String> {
        self(name)
    }
}
