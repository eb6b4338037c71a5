//! CLI module for the apptest runner
//!
//! ```text
//! apptest [SELECTORS]... [-n NAME] [-e ENV] [-f] [-v] [--root DIR] [--format console|json] [--banner]
//! ```
//!
//! Selectors are test files, suite keywords (`models`, `units`, `functionals`, `all`, ...) or directories. Comma or
//! space separated lists inside one argument are accepted. No selector runs every suite.
//!
//! ## Modules
//!
//! - `test_runner` - wires the CLI options to the runner and maps results to exit codes
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod test_runner;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};

use crate::runner::RunRequest;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    /// Failures, errors, or files that did not load.
    pub const FAILURE: ExitCode = ExitCode(1);
    /// Bad selectors, filters, fixtures, or configuration; nothing ran.
    pub const USAGE: ExitCode = ExitCode(2);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a usage error (exit code 2).
    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::USAGE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Progress marks, failure details, and the summary line
    #[default]
    Console,
    /// One JSON document describing the whole run
    Json,
}

/// Run application tests by file, suite, or directory
#[derive(Parser, Debug)]
#[command(name = "apptest")]
#[command(version = VERSION)]
#[command(about = "Run application tests by file, suite keyword, or directory", long_about = None)]
pub struct Cli {
    /// Test files, suite keywords, or directories (default: all suites)
    #[arg(value_name = "SELECTOR")]
    pub selectors: Vec<String>,

    /// Only run tests whose name matches (`test_foo`, `FooTest#test_foo`, or `/regex/`)
    #[arg(short = 'n', long = "name", value_name = "NAME")]
    pub name: Option<String>,

    /// Environment to run in (overrides the environment variable)
    #[arg(short = 'e', long = "environment", value_name = "ENV")]
    pub environment: Option<String>,

    /// Load fixtures even when running a single file
    #[arg(short = 'f', long = "fixtures")]
    pub fixtures: bool,

    /// One line per test instead of progress marks
    #[arg(short, long)]
    pub verbose: bool,

    /// Project root
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Console)]
    pub format: OutputFormat,

    /// Print the engine's run banners
    #[arg(long)]
    pub banner: bool,
}

impl Cli {
    /// Split the parsed arguments into the run request and output options.
    pub fn into_parts(self) -> (RunRequest, test_runner::OutputOptions) {
        let mut request = RunRequest::new(self.root)
            .with_selectors(self.selectors)
            .with_force_fixtures(self.fixtures);
        if let Some(environment) = self.environment {
            request = request.with_environment(environment);
        }
        if let Some(name) = self.name {
            request = request.with_name_filter(name);
        }
        let options = test_runner::OutputOptions {
            verbose: self.verbose,
            format: self.format,
            banner: self.banner,
        };
        (request, options)
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    let (request, options) = cli.into_parts();
    test_runner::run_tests(request, &options)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_defaults() {
        let cli = Cli::try_parse_from(["apptest"]).unwrap();
        assert!(cli.selectors.is_empty());
        assert_eq!(cli.root, PathBuf::from("."));
        assert_eq!(cli.format, OutputFormat::Console);
        assert!(!cli.fixtures && !cli.verbose && !cli.banner);
    }

    #[test]
    fn test_cli_parse_selectors_and_flags() {
        let cli = Cli::try_parse_from([
            "apptest",
            "models",
            "test/unit/foo_test.rt",
            "-n",
            "test_rikka",
            "-e",
            "development",
            "-f",
            "-v",
        ])
        .unwrap();
        let (request, options) = cli.into_parts();
        assert_eq!(request.selectors, vec!["models", "test/unit/foo_test.rt"]);
        assert_eq!(request.name_filter.as_deref(), Some("test_rikka"));
        assert_eq!(request.environment.as_deref(), Some("development"));
        assert!(request.force_fixtures);
        assert!(options.verbose);
    }

    #[test]
    fn test_cli_parse_format() {
        let cli = Cli::try_parse_from(["apptest", "--format", "json", "--root", "app"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.root, PathBuf::from("app"));

        assert!(Cli::try_parse_from(["apptest", "--format", "xml"]).is_err());
    }
}
