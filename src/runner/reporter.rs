//! Run output.
//!
//! The engine and driver report through [`TestReporter`] as things happen. Two implementations ship:
//! [`ConsoleReporter`] (progress marks, failure details, summary line) and [`JsonReporter`] (one document at the
//! end). Both send load errors to the error stream only.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::{RunResult, TestCaseInfo, TestOutcome};

/// Sink for everything a run produces.
pub trait TestReporter {
    /// An engine banner line (`Run options: …`, `# Running tests:`).
    fn on_banner(&mut self, _line: &str) {}

    fn on_file_loaded(&mut self, _path: &Path, _cases: usize) {}

    /// A file failed to load; `message` is already rendered.
    fn on_load_error(&mut self, path: &Path, message: &str);

    fn on_test_start(&mut self, _case: &TestCaseInfo) {}

    /// Text the test wrote, unmodified.
    fn on_test_output(&mut self, case: &TestCaseInfo, text: &str);

    fn on_test_complete(&mut self, case: &TestCaseInfo, outcome: &TestOutcome, assertions: usize);

    fn on_run_complete(&mut self, result: &RunResult);
}

// ============================================================================
// Console
// ============================================================================

/// Human-readable output in the usual minitest layout, without the engine banners.
pub struct ConsoleReporter<O: Write, E: Write> {
    out: O,
    err: E,
    verbose: bool,
    show_banner: bool,
}

impl<O: Write, E: Write> ConsoleReporter<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self {
            out,
            err,
            verbose: false,
            show_banner: false,
        }
    }

    /// One `Class#method = <mark>` line per test instead of progress dots.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Pass engine banner lines through instead of dropping them.
    pub fn show_banner(mut self, show: bool) -> Self {
        self.show_banner = show;
        self
    }

    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }
}

// Reporting is best effort: a closed stdout must not abort the run.
impl<O: Write, E: Write> TestReporter for ConsoleReporter<O, E> {
    fn on_banner(&mut self, line: &str) {
        if self.show_banner {
            let _ = writeln!(self.out, "{line}");
        } else {
            tracing::trace!(line, "suppressed banner");
        }
    }

    fn on_load_error(&mut self, _path: &Path, message: &str) {
        let _ = writeln!(self.err, "{message}");
    }

    fn on_test_output(&mut self, _case: &TestCaseInfo, text: &str) {
        let _ = self.out.write_all(text.as_bytes());
    }

    fn on_test_complete(&mut self, case: &TestCaseInfo, outcome: &TestOutcome, _assertions: usize) {
        if self.verbose {
            let _ = writeln!(self.out, "{} = {}", case.full_name(), outcome.mark());
        } else {
            let _ = write!(self.out, "{}", outcome.mark());
        }
        let _ = self.out.flush();
    }

    fn on_run_complete(&mut self, result: &RunResult) {
        let _ = writeln!(self.out);
        let _ = writeln!(self.out);
        let _ = writeln!(self.out, "Finished in {:.6}s.", result.duration.as_secs_f64());

        for (i, fault) in result.faults.iter().enumerate() {
            let _ = writeln!(self.out);
            let _ = writeln!(self.out, "  {}) {}:", i + 1, fault.kind);
            let _ = writeln!(self.out, "{} [{}]:", fault.case.full_name(), fault.case.path.display());
            let _ = writeln!(self.out, "{}", fault.message);
        }

        let _ = writeln!(self.out);
        let _ = writeln!(self.out, "{}", result.summary.summary_line());
        let _ = self.out.flush();
    }
}

// ============================================================================
// JSON
// ============================================================================

#[derive(Debug, Clone, Serialize)]
struct CaseRecord {
    name: String,
    file: PathBuf,
    #[serde(flatten)]
    outcome: TestOutcome,
    assertions: usize,
    output: String,
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    #[serde(flatten)]
    result: &'a RunResult,
    tests: &'a [CaseRecord],
}

/// Collects every case and writes one JSON document when the run completes.
pub struct JsonReporter<O: Write, E: Write> {
    out: O,
    err: E,
    cases: Vec<CaseRecord>,
    pending_output: String,
}

impl<O: Write, E: Write> JsonReporter<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self {
            out,
            err,
            cases: Vec::new(),
            pending_output: String::new(),
        }
    }

    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }
}

impl<O: Write, E: Write> TestReporter for JsonReporter<O, E> {
    fn on_load_error(&mut self, _path: &Path, message: &str) {
        let _ = writeln!(self.err, "{message}");
    }

    fn on_test_output(&mut self, _case: &TestCaseInfo, text: &str) {
        self.pending_output.push_str(text);
    }

    fn on_test_complete(&mut self, case: &TestCaseInfo, outcome: &TestOutcome, assertions: usize) {
        self.cases.push(CaseRecord {
            name: case.full_name(),
            file: case.path.clone(),
            outcome: outcome.clone(),
            assertions,
            output: std::mem::take(&mut self.pending_output),
        });
    }

    fn on_run_complete(&mut self, result: &RunResult) {
        let document = JsonDocument {
            result,
            tests: &self.cases,
        };
        if let Err(e) = serde_json::to_writer_pretty(&mut self.out, &document) {
            let _ = writeln!(self.err, "failed to write JSON report: {e}");
            return;
        }
        let _ = writeln!(self.out);
    }
}
