//! The bundled execution engine for `*_test.rt` scripts.
//!
//! ## Modules
//!
//! - `collector` - registry of loaded classes and cases
//! - `interpreter` - runs one case (`setup`, test, `teardown`)
//! - `filter` - `-n` name filters

pub mod collector;
pub mod filter;
pub mod interpreter;

use std::path::Path;

pub use collector::TestCollector;
pub use filter::NameFilter;
pub use interpreter::{Interpreter, Value};

use crate::runner::interfaces::RunContext;
use crate::runner::{EngineReport, ExecutionEngine, FaultKind, TestError, TestFault, TestOutcome, TestReporter};

/// Parses scripts into a [`TestCollector`] and interprets the collected cases.
#[derive(Debug, Default)]
pub struct ScriptEngine {
    collector: TestCollector,
}

impl ScriptEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ExecutionEngine for ScriptEngine {
    #[tracing::instrument(skip(self, source), fields(path = %path.display()))]
    fn load_file(&mut self, path: &Path, source: &str) -> Result<usize, TestError> {
        let script = apptest_syntax::parse_script(source)
            .map_err(|e| TestError::Syntax(e.render(&path.display().to_string(), source)))?;
        let cases = self.collector.register(path, script);
        tracing::debug!(cases, "registered cases");
        Ok(cases)
    }

    #[tracing::instrument(skip_all, fields(registered = self.collector.len()))]
    fn run(&mut self, ctx: RunContext<'_>, filter: Option<&NameFilter>, reporter: &mut dyn TestReporter) -> EngineReport {
        match filter {
            Some(filter) => reporter.on_banner(&format!("Run options: --name={filter}")),
            None => reporter.on_banner("Run options:"),
        }
        reporter.on_banner("");
        reporter.on_banner("# Running tests:");
        reporter.on_banner("");

        let mut report = EngineReport::default();
        for (case, class) in self.collector.iter() {
            if filter.is_some_and(|f| !f.matches(&case.class_name, &case.method)) {
                continue;
            }

            reporter.on_test_start(&case);
            let (outcome, assertions) = Interpreter::new(ctx, &case, &mut *reporter).run_case(class);
            report.summary.record(&outcome, assertions);

            let fault = match &outcome {
                TestOutcome::Failed(message) => Some((FaultKind::Failure, message)),
                TestOutcome::Errored(message) => Some((FaultKind::Error, message)),
                TestOutcome::Passed | TestOutcome::Skipped(_) => None,
            };
            if let Some((kind, message)) = fault {
                report.faults.push(TestFault {
                    kind,
                    case: case.clone(),
                    message: message.clone(),
                });
            }
            reporter.on_test_complete(&case, &outcome, assertions);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{Environment, FixtureSet, RunResult, TestCaseInfo};

    #[derive(Default)]
    struct Recorder {
        banners: Vec<String>,
        events: Vec<String>,
    }

    impl TestReporter for Recorder {
        fn on_banner(&mut self, line: &str) {
            self.banners.push(line.to_string());
        }

        fn on_load_error(&mut self, _path: &Path, _message: &str) {}

        fn on_test_output(&mut self, _case: &TestCaseInfo, text: &str) {
            self.events.push(format!("out {}", text.trim_end()));
        }

        fn on_test_complete(&mut self, case: &TestCaseInfo, outcome: &TestOutcome, _assertions: usize) {
            self.events.push(format!("{} {}", case.full_name(), outcome.mark()));
        }

        fn on_run_complete(&mut self, _result: &RunResult) {}
    }

    const MODEL: &str = "\
require \"test_helper\"

class AnimeTest < ActiveSupport::TestCase
  def test_rikka
    puts \"AnimeTest\"
    assert true
  end

  def test_yuta
    assert_equal 1, 2
  end
end
";

    fn run(engine: &mut ScriptEngine, filter: Option<&NameFilter>) -> (EngineReport, Recorder) {
        let environment = Environment::new("test");
        let fixtures = FixtureSet::default();
        let ctx = RunContext {
            environment: &environment,
            fixtures: &fixtures,
        };
        let mut recorder = Recorder::default();
        let report = engine.run(ctx, filter, &mut recorder);
        (report, recorder)
    }

    #[test]
    fn test_runs_cases_in_load_order() {
        let mut engine = ScriptEngine::new();
        assert_eq!(engine.load_file(Path::new("test/models/anime_test.rt"), MODEL).unwrap(), 2);

        let (report, recorder) = run(&mut engine, None);
        assert_eq!(
            report.summary.summary_line(),
            "2 tests, 2 assertions, 1 failures, 0 errors, 0 skips"
        );
        assert_eq!(
            recorder.events,
            vec!["out AnimeTest", "AnimeTest#test_rikka .", "AnimeTest#test_yuta F"]
        );
        assert_eq!(report.faults.len(), 1);
        assert_eq!(report.faults[0].case.full_name(), "AnimeTest#test_yuta");
        assert_eq!(recorder.banners, vec!["Run options:", "", "# Running tests:", ""]);
    }

    #[test]
    fn test_filter_limits_the_run() {
        let mut engine = ScriptEngine::new();
        engine.load_file(Path::new("test/models/anime_test.rt"), MODEL).unwrap();

        let filter = NameFilter::parse("test_rikka").unwrap();
        let (report, recorder) = run(&mut engine, Some(&filter));
        assert_eq!(report.summary.summary_line(), "1 tests, 1 assertions, 0 failures, 0 errors, 0 skips");
        assert_eq!(recorder.banners[0], "Run options: --name=test_rikka");
    }

    #[test]
    fn test_syntax_error_registers_nothing() {
        let mut engine = ScriptEngine::new();
        let err = engine
            .load_file(
                Path::new("test/models/error_test.rt"),
                "class ErrorTest\n  def test_x\n    assert true\n  end\nend\ndef oops\n",
            )
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "SyntaxError: test/models/error_test.rt:6:1: unexpected 'def', expecting 'class' or 'require'"
        );
        let (report, recorder) = run(&mut engine, None);
        assert_eq!(report.summary.summary_line(), "0 tests, 0 assertions, 0 failures, 0 errors, 0 skips");
        assert!(recorder.events.is_empty());
    }
}
