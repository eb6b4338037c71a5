//! The load/run state machine.
//!
//! ```text
//! Idle ─► Loading(0) ─► Loaded(0) | LoadFailed(0) ─► Loading(1) ─► … ─► Running ─► Finished
//! ```
//!
//! The environment is resolved and initialized first, then selectors are resolved and fixtures conditionally
//! preloaded. Files load one at a time into a single engine. A file that fails to load is recorded and reported,
//! and loading continues with the next file; nothing already loaded is rolled back. The aggregate run then covers
//! every case from the files that did load.

use std::fmt;
use std::path::Path;
use std::time::Instant;

use super::environment::EnvironmentLoader;
use super::fixtures::{FixtureGate, FixtureSet};
use super::interfaces::{EnvSource, ExecutionEngine, FileSystem, FixtureLoader, RunContext, TestError};
use super::reporter::TestReporter;
use super::resolver::{PathResolver, SuiteTable};
use super::{FileStatus, PerFileOutcome, RunRequest, RunResult};
use crate::config::RunnerConfig;
use crate::engine::NameFilter;

/// Where the driver is in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Loading { index: usize },
    LoadFailed { index: usize },
    Loaded { index: usize },
    Running,
    Finished,
}

impl fmt::Display for DriverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverState::Idle => write!(f, "idle"),
            DriverState::Loading { index } => write!(f, "loading({index})"),
            DriverState::LoadFailed { index } => write!(f, "load-failed({index})"),
            DriverState::Loaded { index } => write!(f, "loaded({index})"),
            DriverState::Running => write!(f, "running"),
            DriverState::Finished => write!(f, "finished"),
        }
    }
}

/// Sequences one run over its collaborators.
pub struct ExecutionDriver<'a> {
    fs: &'a dyn FileSystem,
    engine: &'a mut dyn ExecutionEngine,
    fixtures: &'a dyn FixtureLoader,
    env_source: &'a dyn EnvSource,
    config: &'a RunnerConfig,
    suites: SuiteTable,
    environment: EnvironmentLoader,
    state: DriverState,
}

impl<'a> ExecutionDriver<'a> {
    pub fn new(
        fs: &'a dyn FileSystem,
        engine: &'a mut dyn ExecutionEngine,
        fixtures: &'a dyn FixtureLoader,
        env_source: &'a dyn EnvSource,
        config: &'a RunnerConfig,
    ) -> Self {
        Self {
            fs,
            engine,
            fixtures,
            env_source,
            config,
            suites: SuiteTable::builtin().with_extra(&config.suites),
            environment: EnvironmentLoader::new(),
            state: DriverState::Idle,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Execute one run end to end.
    ///
    /// ## Errors
    /// Fatal errors only, all raised before any file loads:
    /// - [`TestError::EnvironmentReloaded`] when the driver already ran.
    /// - [`TestError::InvalidSelector`], [`TestError::InvalidFilter`], [`TestError::Fixture`].
    ///
    /// Load errors of individual files are not errors here; they end up in [`RunResult::files`].
    #[tracing::instrument(skip_all, fields(root = %request.root.display()))]
    pub fn run(&mut self, request: RunRequest, reporter: &mut dyn TestReporter) -> Result<RunResult, TestError> {
        let started = Instant::now();

        let from_var = self.env_source.var(&self.config.env_var);
        let environment = self
            .environment
            .resolve(request.environment.as_deref(), from_var.as_deref());
        self.environment.initialize(&environment)?;

        let resolver = PathResolver::new(self.fs, &self.suites, &self.config.test_root, &self.config.extension);
        let files = resolver.resolve(&request.selectors, &request.root)?;
        let filter = request.name_filter.as_deref().map(NameFilter::parse).transpose()?;

        let fixtures_loaded = FixtureGate::should_preload(&files, request.force_fixtures);
        let fixtures = if fixtures_loaded {
            self.fixtures.load_all(&environment)?
        } else {
            FixtureSet::default()
        };
        tracing::debug!(fixtures_loaded, tables = fixtures.table_count(), files = files.len(), "prepared run");

        let display_root = self.fs.canonicalize(&request.root);
        let mut outcomes = Vec::with_capacity(files.len());
        for (index, path) in files.iter().enumerate() {
            self.transition(DriverState::Loading { index });
            let shown = path.strip_prefix(&display_root).unwrap_or(path);

            let status = match self.load_one(path, shown) {
                Ok(cases) => {
                    self.transition(DriverState::Loaded { index });
                    reporter.on_file_loaded(shown, cases);
                    FileStatus::Loaded { cases }
                }
                Err(e) => {
                    self.transition(DriverState::LoadFailed { index });
                    let message = e.to_string();
                    tracing::warn!(file = %shown.display(), "load failed");
                    reporter.on_load_error(shown, &message);
                    FileStatus::LoadError { message }
                }
            };
            outcomes.push(PerFileOutcome {
                path: shown.to_path_buf(),
                status,
            });
        }

        self.transition(DriverState::Running);
        let ctx = RunContext {
            environment: &environment,
            fixtures: &fixtures,
        };
        let report = self.engine.run(ctx, filter.as_ref(), reporter);
        self.transition(DriverState::Finished);

        let result = RunResult {
            environment: environment.to_string(),
            fixtures_loaded,
            summary: report.summary,
            files: outcomes,
            faults: report.faults,
            duration: started.elapsed(),
        };
        reporter.on_run_complete(&result);
        Ok(result)
    }

    fn load_one(&mut self, path: &Path, shown: &Path) -> Result<usize, TestError> {
        let source = self.fs.read_to_string(path)?;
        self.engine.load_file(shown, &source)
    }

    fn transition(&mut self, next: DriverState) {
        tracing::debug!(from = %self.state, to = %next, "driver state");
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::path::PathBuf;

    use super::*;
    use crate::runner::environment::Environment;
    use crate::runner::interfaces::OsFileSystem;
    use crate::runner::{EngineReport, TestCaseInfo, TestOutcome};

    /// Registers one case per loaded file; files containing `BROKEN` fail to load.
    #[derive(Default)]
    struct FakeEngine {
        cases: Vec<TestCaseInfo>,
        seen_fixtures: Option<usize>,
        seen_environment: Option<String>,
    }

    impl ExecutionEngine for FakeEngine {
        fn load_file(&mut self, path: &Path, source: &str) -> Result<usize, TestError> {
            if source.contains("BROKEN") {
                return Err(TestError::Syntax(format!("SyntaxError: {}:1:1: broken", path.display())));
            }
            self.cases.push(TestCaseInfo {
                path: path.to_path_buf(),
                class_name: "FakeTest".into(),
                method: source.trim().to_string(),
            });
            Ok(1)
        }

        fn run(
            &mut self,
            ctx: RunContext<'_>,
            filter: Option<&NameFilter>,
            reporter: &mut dyn TestReporter,
        ) -> EngineReport {
            self.seen_fixtures = Some(ctx.fixtures.count("users"));
            self.seen_environment = Some(ctx.environment.to_string());
            let mut report = EngineReport::default();
            for case in &self.cases {
                if filter.is_some_and(|f| !f.matches(&case.class_name, &case.method)) {
                    continue;
                }
                reporter.on_test_complete(case, &TestOutcome::Passed, 1);
                report.summary.record(&TestOutcome::Passed, 1);
            }
            report
        }
    }

    struct FakeFixtures {
        calls: RefCell<usize>,
    }

    impl FixtureLoader for FakeFixtures {
        fn load_all(&self, _environment: &Environment) -> Result<FixtureSet, TestError> {
            *self.calls.borrow_mut() += 1;
            let mut set = FixtureSet::default();
            let records: serde_yaml::Mapping = serde_yaml::from_str("a: {}\nb: {}\n").unwrap();
            set.insert("users", records);
            Ok(set)
        }
    }

    #[derive(Default)]
    struct RecordingReporter {
        load_errors: Vec<String>,
        completed: Vec<String>,
        finished: usize,
    }

    impl TestReporter for RecordingReporter {
        fn on_load_error(&mut self, _path: &Path, message: &str) {
            self.load_errors.push(message.to_string());
        }

        fn on_test_output(&mut self, _case: &TestCaseInfo, _text: &str) {}

        fn on_test_complete(&mut self, case: &TestCaseInfo, _outcome: &TestOutcome, _assertions: usize) {
            self.completed.push(case.method.clone());
        }

        fn on_run_complete(&mut self, _result: &RunResult) {
            self.finished += 1;
        }
    }

    fn project(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (path, body) in files {
            let full = dir.path().join(path);
            std::fs::create_dir_all(full.parent().unwrap()).unwrap();
            std::fs::write(full, body).unwrap();
        }
        dir
    }

    struct Harness {
        engine: FakeEngine,
        fixtures: FakeFixtures,
        config: RunnerConfig,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                engine: FakeEngine::default(),
                fixtures: FakeFixtures { calls: RefCell::new(0) },
                config: RunnerConfig::default(),
            }
        }

        fn run(&mut self, request: RunRequest, env_var: Option<&str>) -> (Result<RunResult, TestError>, RecordingReporter) {
            let env_var = env_var.map(str::to_string);
            let env = move |_: &str| env_var.clone();
            let mut reporter = RecordingReporter::default();
            let result = ExecutionDriver::new(&OsFileSystem, &mut self.engine, &self.fixtures, &env, &self.config)
                .run(request, &mut reporter);
            (result, reporter)
        }
    }

    #[test]
    fn test_load_error_is_isolated() {
        let dir = project(&[
            ("test/models/a_test.rt", "test_a"),
            ("test/models/error_test.rt", "BROKEN"),
            ("test/models/z_test.rt", "test_z"),
        ]);
        let mut harness = Harness::new();
        let (result, reporter) = harness.run(RunRequest::new(dir.path()).with_selectors(["models"]), None);
        let result = result.unwrap();

        assert_eq!(result.summary.tests, 2);
        assert_eq!(result.load_errors().count(), 1);
        assert!(!result.is_success());
        assert_eq!(reporter.load_errors.len(), 1);
        assert!(reporter.load_errors[0].starts_with("SyntaxError: test/models/error_test.rt"));
        assert_eq!(reporter.completed, vec!["test_a", "test_z"]);
        assert_eq!(reporter.finished, 1);
        assert_eq!(result.files[0].path, PathBuf::from("test/models/a_test.rt"));
    }

    #[test]
    fn test_single_file_skips_fixtures_unless_forced() {
        let dir = project(&[("test/models/a_test.rt", "test_a")]);

        let mut harness = Harness::new();
        let (result, _) = harness.run(
            RunRequest::new(dir.path()).with_selectors(["test/models/a_test.rt"]),
            None,
        );
        assert!(!result.unwrap().fixtures_loaded);
        assert_eq!(*harness.fixtures.calls.borrow(), 0);
        assert_eq!(harness.engine.seen_fixtures, Some(0));

        let mut harness = Harness::new();
        let (result, _) = harness.run(
            RunRequest::new(dir.path())
                .with_selectors(["test/models/a_test.rt"])
                .with_force_fixtures(true),
            None,
        );
        assert!(result.unwrap().fixtures_loaded);
        assert_eq!(harness.engine.seen_fixtures, Some(2));
    }

    #[test]
    fn test_suite_with_one_file_still_preloads() {
        let dir = project(&[("test/models/a_test.rt", "test_a")]);
        let mut harness = Harness::new();
        let (result, _) = harness.run(RunRequest::new(dir.path()).with_selectors(["models"]), None);
        assert!(result.unwrap().fixtures_loaded);
        assert_eq!(*harness.fixtures.calls.borrow(), 1);
    }

    #[test]
    fn test_environment_precedence_reaches_the_engine() {
        let dir = project(&[("test/unit/test_test.rt", "test_truth")]);

        let mut harness = Harness::new();
        let (result, _) = harness.run(
            RunRequest::new(dir.path()).with_environment("development"),
            Some("production"),
        );
        assert_eq!(result.unwrap().environment, "development");
        assert_eq!(harness.engine.seen_environment.as_deref(), Some("development"));

        let mut harness = Harness::new();
        let (result, _) = harness.run(RunRequest::new(dir.path()), Some("production"));
        assert_eq!(result.unwrap().environment, "production");

        let mut harness = Harness::new();
        let (result, _) = harness.run(RunRequest::new(dir.path()), None);
        assert_eq!(result.unwrap().environment, "test");
    }

    #[test]
    fn test_name_filter_restricts_the_run() {
        let dir = project(&[("test/models/a_test.rt", "test_a"), ("test/models/b_test.rt", "test_b")]);
        let mut harness = Harness::new();
        let (result, reporter) = harness.run(
            RunRequest::new(dir.path())
                .with_selectors(["models"])
                .with_name_filter("test_a"),
            None,
        );
        assert_eq!(result.unwrap().summary.summary_line(), "1 tests, 1 assertions, 0 failures, 0 errors, 0 skips");
        assert_eq!(reporter.completed, vec!["test_a"]);
    }

    #[test]
    fn test_invalid_selector_is_fatal_before_loading() {
        let dir = project(&[("test/models/a_test.rt", "test_a")]);
        let mut harness = Harness::new();
        let (result, reporter) = harness.run(RunRequest::new(dir.path()).with_selectors(["nope"]), None);
        assert!(matches!(result, Err(TestError::InvalidSelector { .. })));
        assert_eq!(reporter.finished, 0);
        assert!(harness.engine.cases.is_empty());
    }

    #[test]
    fn test_second_run_reports_environment_reloaded() {
        let dir = project(&[("test/unit/test_test.rt", "test_truth")]);
        let mut engine = FakeEngine::default();
        let fixtures = FakeFixtures { calls: RefCell::new(0) };
        let config = RunnerConfig::default();
        let env = |_: &str| -> Option<String> { None };
        let fs = OsFileSystem;
        let mut driver = ExecutionDriver::new(&fs, &mut engine, &fixtures, &env, &config);

        let mut reporter = RecordingReporter::default();
        driver.run(RunRequest::new(dir.path()), &mut reporter).unwrap();
        assert_eq!(driver.state(), DriverState::Finished);

        let err = driver.run(RunRequest::new(dir.path()), &mut reporter).unwrap_err();
        assert!(matches!(err, TestError::EnvironmentReloaded(_)));
    }
}
