//! Wires command-line options to the runner.
//!
//! Builds the collaborators (filesystem, fixture loader, script engine, reporter) for one run, executes it through
//! the [`ExecutionDriver`], and maps the outcome to an exit code:
//!
//! - `0`: every file loaded and no test failed or errored
//! - `1`: failures, errors, or load errors
//! - `2`: the run could not start (configuration, selector, filter, or fixture errors)

use std::io::{self, Write};

use super::{CliError, CliResult, ExitCode, OutputFormat};
use crate::config::RunnerConfig;
use crate::engine::ScriptEngine;
use crate::runner::{
    ConsoleReporter, EnvSource, ExecutionDriver, JsonReporter, OsFileSystem, ProcessEnv, RunRequest,
    YamlFixtureLoader,
};

/// How results are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputOptions {
    pub verbose: bool,
    pub format: OutputFormat,
    /// Show engine banners regardless of configuration.
    pub banner: bool,
}

/// Run tests against the process streams and environment.
pub fn run_tests(request: RunRequest, options: &OutputOptions) -> CliResult<ExitCode> {
    let mut out = io::stdout().lock();
    let mut err = io::stderr().lock();
    run_tests_with(request, options, &mut out, &mut err, &ProcessEnv)
}

/// Run tests with explicit output streams and environment source.
pub fn run_tests_with(
    request: RunRequest,
    options: &OutputOptions,
    out: &mut dyn Write,
    err: &mut dyn Write,
    env: &dyn EnvSource,
) -> CliResult<ExitCode> {
    let config = RunnerConfig::load(&request.root).map_err(|e| CliError::usage(format!("apptest: {e}")))?;
    let show_banner = options.banner || config.show_banner;

    let fs = OsFileSystem;
    let fixtures = YamlFixtureLoader::new(&fs, config.fixtures_path(&request.root));
    let mut engine = ScriptEngine::new();
    let mut driver = ExecutionDriver::new(&fs, &mut engine, &fixtures, env, &config);

    let result = match options.format {
        OutputFormat::Console => {
            let mut reporter = ConsoleReporter::new(&mut *out, &mut *err)
                .verbose(options.verbose)
                .show_banner(show_banner);
            driver.run(request, &mut reporter)
        }
        OutputFormat::Json => {
            let mut reporter = JsonReporter::new(&mut *out, &mut *err);
            driver.run(request, &mut reporter)
        }
    };

    match result {
        Ok(result) if result.is_success() => Ok(ExitCode::SUCCESS),
        Ok(result) => {
            tracing::debug!(
                failures = result.summary.failures,
                errors = result.summary.errors,
                load_errors = result.load_errors().count(),
                "run failed"
            );
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(CliError::usage(format!("apptest: {e}"))),
    }
}
