//! Test selection, sequencing, and environment orchestration.
//!
//! ## Pipeline
//!
//! ```text
//! RunRequest ─► EnvironmentLoader ─► PathResolver ─► FixtureGate ─► ExecutionDriver ─► TestReporter
//! ```
//!
//! ## Modules
//!
//! - `interfaces` - collaborator traits (filesystem, execution engine, fixtures, environment source)
//! - `resolver` - selector classification and test file discovery
//! - `environment` - environment selection, loaded once per run
//! - `fixtures` - fixture preload policy and the YAML fixture loader
//! - `driver` - the load/run state machine
//! - `reporter` - console and JSON output

pub mod driver;
pub mod environment;
pub mod fixtures;
pub mod interfaces;
pub mod reporter;
pub mod resolver;

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

pub use driver::{DriverState, ExecutionDriver};
pub use environment::{Environment, EnvironmentLoader};
pub use fixtures::{FixtureGate, FixtureSet, YamlFixtureLoader};
pub use interfaces::{EnvSource, ExecutionEngine, FileSystem, FixtureLoader, OsFileSystem, ProcessEnv, TestError};
pub use reporter::{ConsoleReporter, JsonReporter, TestReporter};
pub use resolver::{PathResolver, ResolvedFileSet, Selector, SuiteTable};

// ============================================================================
// Request
// ============================================================================

/// A normalized invocation, built once from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    /// Project root; the test root and fixtures are found below it.
    pub root: PathBuf,
    /// Raw selectors in command-line order (files, suite keywords, directories).
    pub selectors: Vec<String>,
    /// `-e` override.
    pub environment: Option<String>,
    /// `-n` filter: an exact test name, or `/regex/`.
    pub name_filter: Option<String>,
    /// `-f`: preload fixtures even for a single file.
    pub force_fixtures: bool,
}

impl RunRequest {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            selectors: Vec::new(),
            environment: None,
            name_filter: None,
            force_fixtures: false,
        }
    }

    pub fn with_selectors<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selectors = selectors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn with_name_filter(mut self, filter: impl Into<String>) -> Self {
        self.name_filter = Some(filter.into());
        self
    }

    pub fn with_force_fixtures(mut self, force: bool) -> Self {
        self.force_fixtures = force;
        self
    }
}

// ============================================================================
// Test cases and outcomes
// ============================================================================

/// Identity of one registered test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestCaseInfo {
    pub path: PathBuf,
    pub class_name: String,
    pub method: String,
}

impl TestCaseInfo {
    /// `Class#method`
    pub fn full_name(&self) -> String {
        format!("{}#{}", self.class_name, self.method)
    }
}

/// Result of running a single test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum TestOutcome {
    Passed,
    Failed(String),
    Errored(String),
    Skipped(String),
}

impl TestOutcome {
    /// One-character progress mark.
    pub fn mark(&self) -> char {
        match self {
            TestOutcome::Passed => '.',
            TestOutcome::Failed(_) => 'F',
            TestOutcome::Errored(_) => 'E',
            TestOutcome::Skipped(_) => 'S',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    Failure,
    Error,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultKind::Failure => write!(f, "Failure"),
            FaultKind::Error => write!(f, "Error"),
        }
    }
}

/// A failed or errored test case, kept for the end-of-run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestFault {
    pub kind: FaultKind,
    pub case: TestCaseInfo,
    pub message: String,
}

// ============================================================================
// Results
// ============================================================================

/// Aggregate counters of the test run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub tests: usize,
    pub assertions: usize,
    pub failures: usize,
    pub errors: usize,
    pub skips: usize,
}

impl RunSummary {
    /// Count one finished case.
    pub fn record(&mut self, outcome: &TestOutcome, assertions: usize) {
        self.tests += 1;
        self.assertions += assertions;
        match outcome {
            TestOutcome::Passed => {}
            TestOutcome::Failed(_) => self.failures += 1,
            TestOutcome::Errored(_) => self.errors += 1,
            TestOutcome::Skipped(_) => self.skips += 1,
        }
    }

    /// `"<t> tests, <a> assertions, <f> failures, <e> errors, <s> skips"`
    pub fn summary_line(&self) -> String {
        format!(
            "{} tests, {} assertions, {} failures, {} errors, {} skips",
            self.tests, self.assertions, self.failures, self.errors, self.skips
        )
    }
}

/// What the execution engine hands back after the aggregate run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineReport {
    pub summary: RunSummary,
    pub faults: Vec<TestFault>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    Loaded { cases: usize },
    LoadError { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerFileOutcome {
    pub path: PathBuf,
    #[serde(flatten)]
    pub status: FileStatus,
}

/// Everything a finished run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    pub environment: String,
    pub fixtures_loaded: bool,
    pub summary: RunSummary,
    pub files: Vec<PerFileOutcome>,
    pub faults: Vec<TestFault>,
    pub duration: Duration,
}

impl RunResult {
    /// Files that failed to load.
    pub fn load_errors(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.files.iter().filter_map(|f| match &f.status {
            FileStatus::LoadError { message } => Some((f.path.as_path(), message.as_str())),
            FileStatus::Loaded { .. } => None,
        })
    }

    /// No failures, no errors, and every file loaded.
    pub fn is_success(&self) -> bool {
        self.summary.failures == 0 && self.summary.errors == 0 && self.load_errors().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_line_shows_zero_fields() {
        let summary = RunSummary::default();
        assert_eq!(summary.summary_line(), "0 tests, 0 assertions, 0 failures, 0 errors, 0 skips");
    }

    #[test]
    fn test_record_counts_each_outcome() {
        let mut summary = RunSummary::default();
        summary.record(&TestOutcome::Passed, 2);
        summary.record(&TestOutcome::Failed("no".into()), 1);
        summary.record(&TestOutcome::Errored("boom".into()), 0);
        summary.record(&TestOutcome::Skipped("later".into()), 0);
        assert_eq!(summary.summary_line(), "4 tests, 3 assertions, 1 failures, 1 errors, 1 skips");
    }

    #[test]
    fn test_file_outcome_serializes_status_inline() {
        let loaded = PerFileOutcome {
            path: PathBuf::from("test/models/user_test.rt"),
            status: FileStatus::Loaded { cases: 2 },
        };
        let failed = PerFileOutcome {
            path: PathBuf::from("test/models/broken_test.rt"),
            status: FileStatus::LoadError {
                message: "unexpected end".into(),
            },
        };
        assert_eq!(
            serde_json::to_value(&loaded).unwrap(),
            serde_json::json!({"path": "test/models/user_test.rt", "status": "loaded", "cases": 2})
        );
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            serde_json::json!({"path": "test/models/broken_test.rt", "status": "load_error", "message": "unexpected end"})
        );
    }

    #[test]
    fn test_load_error_makes_run_unsuccessful() {
        let result = RunResult {
            environment: "test".into(),
            fixtures_loaded: false,
            summary: RunSummary {
                tests: 1,
                assertions: 1,
                ..RunSummary::default()
            },
            files: vec![PerFileOutcome {
                path: PathBuf::from("test/models/error_test.rt"),
                status: FileStatus::LoadError {
                    message: "SyntaxError".into(),
                },
            }],
            faults: Vec::new(),
            duration: Duration::ZERO,
        };
        assert!(!result.is_success());
        assert_eq!(result.load_errors().count(), 1);
    }
}
