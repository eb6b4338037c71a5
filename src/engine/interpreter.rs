//! Executes one test case: `setup`, the test method, then `teardown`.
//!
//! Locals are shared by the three methods of one case and discarded afterwards. `teardown` runs even when setup or
//! the test stopped early; the first interruption decides the outcome.

use std::collections::HashMap;
use std::fmt;

use apptest_core::builtins::{self, BuiltinId};
use apptest_core::commands::{self, CommandId};
use apptest_core::conventions::{SETUP_METHOD, TEARDOWN_METHOD};
use apptest_syntax::ast::{BinaryOp, Expr, InterpPart, Spanned, Statement};

use super::collector::RegisteredClass;
use crate::runner::interfaces::RunContext;
use crate::runner::{TestCaseInfo, TestOutcome, TestReporter};

/// Runtime values of the script language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Int(i64),
    Bool(bool),
    Nil,
}

impl Value {
    /// Only `false` and `nil` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Bool(false) | Value::Nil)
    }

    /// Literal form, as shown in failure messages (`"abc"`, `nil`).
    pub fn inspect(&self) -> String {
        match self {
            Value::Str(s) => format!("{s:?}"),
            Value::Nil => "nil".to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Int(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Nil => Ok(()),
        }
    }
}

/// Why a method stopped before its last statement.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Interrupt {
    Failure(String),
    Error(String),
    Skip(String),
}

impl From<Interrupt> for TestOutcome {
    fn from(interrupt: Interrupt) -> Self {
        match interrupt {
            Interrupt::Failure(message) => TestOutcome::Failed(message),
            Interrupt::Error(message) => TestOutcome::Errored(message),
            Interrupt::Skip(message) => TestOutcome::Skipped(message),
        }
    }
}

type Flow<T> = Result<T, Interrupt>;

/// State of one running case.
pub struct Interpreter<'r> {
    ctx: RunContext<'r>,
    case: &'r TestCaseInfo,
    reporter: &'r mut dyn TestReporter,
    locals: HashMap<String, Value>,
    assertions: usize,
}

impl<'r> Interpreter<'r> {
    pub fn new(ctx: RunContext<'r>, case: &'r TestCaseInfo, reporter: &'r mut dyn TestReporter) -> Self {
        Self {
            ctx,
            case,
            reporter,
            locals: HashMap::new(),
            assertions: 0,
        }
    }

    /// Run the case; returns its outcome and assertion count.
    pub fn run_case(mut self, class: &RegisteredClass) -> (TestOutcome, usize) {
        let case = self.case;
        let main = match self.run_method(class, SETUP_METHOD) {
            Ok(()) => self.run_method(class, &case.method),
            Err(interrupt) => Err(interrupt),
        };
        let teardown = self.run_method(class, TEARDOWN_METHOD);

        let outcome = match main.and(teardown) {
            Ok(()) => TestOutcome::Passed,
            Err(interrupt) => interrupt.into(),
        };
        (outcome, self.assertions)
    }

    fn run_method(&mut self, class: &RegisteredClass, name: &str) -> Flow<()> {
        let Some(method) = class.method(name) else {
            return Ok(());
        };
        for stmt in &method.body {
            self.exec(stmt)?;
        }
        Ok(())
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn exec(&mut self, stmt: &Spanned<Statement>) -> Flow<()> {
        match &stmt.node {
            Statement::Assign(name, value) => {
                let value = self.eval(value)?;
                self.locals.insert(name.clone(), value);
                Ok(())
            }
            Statement::Command(name, args) => match commands::from_str(name) {
                Some(id) => self.command(id, args),
                // A bare name is an expression statement (`x`, `env`); a name with arguments must be a builtin call.
                None if args.is_empty() => self.variable(name).map(drop),
                None => self.call(name, args).map(drop),
            },
        }
    }

    fn command(&mut self, id: CommandId, args: &[Spanned<Expr>]) -> Flow<()> {
        let info = commands::info_for(id);
        check_arity(args.len(), info.arity)?;
        let values = args.iter().map(|a| self.eval(a)).collect::<Flow<Vec<_>>>()?;
        if info.counts_assertion {
            self.assertions += 1;
        }

        let message = |index: usize| values.get(index).map(Value::to_string);
        match id {
            CommandId::Puts => {
                let mut text = String::new();
                if values.is_empty() {
                    text.push('\n');
                }
                for value in &values {
                    let line = value.to_string();
                    text.push_str(&line);
                    if !line.ends_with('\n') {
                        text.push('\n');
                    }
                }
                self.reporter.on_test_output(self.case, &text);
                Ok(())
            }
            CommandId::Assert => {
                if values[0].is_truthy() {
                    return Ok(());
                }
                let default = format!("Expected {} to be truthy.", values[0].inspect());
                Err(Interrupt::Failure(message(1).unwrap_or(default)))
            }
            CommandId::Refute => {
                if !values[0].is_truthy() {
                    return Ok(());
                }
                let default = format!("Expected {} to not be truthy.", values[0].inspect());
                Err(Interrupt::Failure(message(1).unwrap_or(default)))
            }
            CommandId::AssertEqual => {
                let (expected, actual) = (&values[0], &values[1]);
                if expected == actual {
                    return Ok(());
                }
                let diff = format!("Expected: {}\n  Actual: {}", expected.inspect(), actual.inspect());
                Err(Interrupt::Failure(match message(2) {
                    Some(prefix) => format!("{prefix}.\n{diff}"),
                    None => diff,
                }))
            }
            CommandId::AssertMatch => {
                let (needle, haystack) = (&values[0], &values[1]);
                if haystack.to_string().contains(&needle.to_string()) {
                    return Ok(());
                }
                let default = format!("Expected {} to match {}.", needle.inspect(), haystack.inspect());
                Err(Interrupt::Failure(message(2).unwrap_or(default)))
            }
            CommandId::Flunk => Err(Interrupt::Failure(message(0).unwrap_or_else(|| "Epic Fail!".to_string()))),
            CommandId::Skip => Err(Interrupt::Skip(
                message(0).unwrap_or_else(|| "Skipped, no message given".to_string()),
            )),
            CommandId::Raise => Err(Interrupt::Error(format!(
                "RuntimeError: {}",
                message(0).unwrap_or_else(|| "unhandled exception".to_string())
            ))),
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn eval(&mut self, expr: &Spanned<Expr>) -> Flow<Value> {
        match &expr.node {
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Int(n) => Ok(Value::Int(*n)),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Nil => Ok(Value::Nil),
            Expr::Interpolated(parts) => {
                let mut text = String::new();
                for part in parts {
                    match part {
                        InterpPart::Literal(s) => text.push_str(s),
                        InterpPart::Expr(e) => text.push_str(&self.eval(e)?.to_string()),
                    }
                }
                Ok(Value::Str(text))
            }
            Expr::Var(name) => self.variable(name),
            Expr::Call(name, args) => self.call(name, args),
            Expr::Binary(lhs, op, rhs) => {
                let equal = self.eval(lhs)? == self.eval(rhs)?;
                Ok(Value::Bool(match op {
                    BinaryOp::Eq => equal,
                    BinaryOp::NotEq => !equal,
                }))
            }
        }
    }

    fn variable(&mut self, name: &str) -> Flow<Value> {
        if let Some(value) = self.locals.get(name) {
            return Ok(value.clone());
        }
        if builtins::from_str(name).is_some() {
            return self.call(name, &[]);
        }
        Err(Interrupt::Error(format!(
            "NameError: undefined local variable or method `{name}' for {}",
            self.case.class_name
        )))
    }

    fn call(&mut self, name: &str, args: &[Spanned<Expr>]) -> Flow<Value> {
        let Some(id) = builtins::from_str(name) else {
            return Err(Interrupt::Error(format!(
                "NoMethodError: undefined method `{name}' for {}",
                self.case.class_name
            )));
        };
        let arity = builtins::info_for(id).arity;
        check_arity(args.len(), (arity, arity))?;
        let values = args.iter().map(|a| self.eval(a)).collect::<Flow<Vec<_>>>()?;

        Ok(match id {
            BuiltinId::Env => Value::Str(self.ctx.environment.to_string()),
            BuiltinId::File => Value::Str(self.case.path.display().to_string()),
            BuiltinId::FixtureCount => {
                let count = self.ctx.fixtures.count(&values[0].to_string());
                Value::Int(i64::try_from(count).unwrap_or(i64::MAX))
            }
            BuiltinId::Fixture => self
                .ctx
                .fixtures
                .field(&values[0].to_string(), &values[1].to_string(), &values[2].to_string())
                .map_or(Value::Nil, Value::Str),
        })
    }
}

fn check_arity(given: usize, (min, max): (usize, usize)) -> Flow<()> {
    if (min..=max).contains(&given) {
        return Ok(());
    }
    let expected = if min == max {
        min.to_string()
    } else if max == usize::MAX {
        format!("{min}+")
    } else {
        format!("{min}..{max}")
    };
    Err(Interrupt::Error(format!(
        "ArgumentError: wrong number of arguments (given {given}, expected {expected})"
    )))
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::*;
    use crate::engine::collector::TestCollector;
    use crate::runner::{Environment, FixtureSet, RunResult};

    #[derive(Default)]
    struct Captured {
        output: String,
    }

    impl TestReporter for Captured {
        fn on_load_error(&mut self, _path: &Path, _message: &str) {}

        fn on_test_output(&mut self, _case: &TestCaseInfo, text: &str) {
            self.output.push_str(text);
        }

        fn on_test_complete(&mut self, _case: &TestCaseInfo, _outcome: &TestOutcome, _assertions: usize) {}

        fn on_run_complete(&mut self, _result: &RunResult) {}
    }

    /// Run `method` of the single class in `source`.
    fn run(source: &str, method: &str, fixtures: &FixtureSet) -> (TestOutcome, usize, String) {
        let mut collector = TestCollector::new();
        let path = Path::new("test/unit/sample_test.rt");
        collector.register(path, apptest_syntax::parse_script(source).unwrap());
        let (_, class) = collector.iter().next().unwrap();

        let case = TestCaseInfo {
            path: PathBuf::from(path),
            class_name: class.decl.name.clone(),
            method: method.to_string(),
        };
        let environment = Environment::new("development");
        let ctx = RunContext {
            environment: &environment,
            fixtures,
        };
        let mut reporter = Captured::default();
        let (outcome, assertions) = Interpreter::new(ctx, &case, &mut reporter).run_case(class);
        (outcome, assertions, reporter.output)
    }

    fn body(stmts: &str) -> String {
        format!("class SampleTest\n  def test_it\n{stmts}\n  end\nend\n")
    }

    #[test]
    fn test_puts_and_interpolation() {
        let src = body("    name = \"rikka\"\n    puts \"hi #{name}\", 3\n    puts");
        let (outcome, assertions, output) = run(&src, "test_it", &FixtureSet::default());
        assert_eq!(outcome, TestOutcome::Passed);
        assert_eq!(assertions, 0);
        assert_eq!(output, "hi rikka\n3\n\n");
    }

    #[test]
    fn test_failed_assertion_stops_the_method() {
        let src = body("    assert true\n    assert nil\n    puts \"unreachable\"");
        let (outcome, assertions, output) = run(&src, "test_it", &FixtureSet::default());
        assert_eq!(outcome, TestOutcome::Failed("Expected nil to be truthy.".into()));
        assert_eq!(assertions, 2);
        assert!(output.is_empty());
    }

    #[test]
    fn test_assert_equal_message() {
        let src = body("    assert_equal \"a\", 1");
        let (outcome, _, _) = run(&src, "test_it", &FixtureSet::default());
        assert_eq!(outcome, TestOutcome::Failed("Expected: \"a\"\n  Actual: 1".into()));
    }

    #[test]
    fn test_setup_locals_and_teardown_always_runs() {
        let src = "\
class SampleTest
  def setup
    greeting = \"hello\"
  end

  def teardown
    puts \"teardown #{greeting}\"
  end

  def test_it
    assert_match \"ell\", greeting
    skip \"later\"
  end
end
";
        let (outcome, assertions, output) = run(src, "test_it", &FixtureSet::default());
        assert_eq!(outcome, TestOutcome::Skipped("later".into()));
        assert_eq!(assertions, 1);
        assert_eq!(output, "teardown hello\n");
    }

    #[test]
    fn test_runtime_errors() {
        let (outcome, _, _) = run(&body("    raise \"boom\""), "test_it", &FixtureSet::default());
        assert_eq!(outcome, TestOutcome::Errored("RuntimeError: boom".into()));

        let (outcome, _, _) = run(&body("    puts missing"), "test_it", &FixtureSet::default());
        assert_eq!(
            outcome,
            TestOutcome::Errored("NameError: undefined local variable or method `missing' for SampleTest".into())
        );

        let (outcome, _, _) = run(&body("    assert_equal 1"), "test_it", &FixtureSet::default());
        assert_eq!(
            outcome,
            TestOutcome::Errored("ArgumentError: wrong number of arguments (given 1, expected 2..3)".into())
        );
    }

    #[test]
    fn test_builtins() {
        let mut fixtures = FixtureSet::default();
        fixtures.insert("users", serde_yaml::from_str("crab:\n  name: Hitagi\ncat:\n  name: Tsubasa\n").unwrap());

        let src = body(
            "    assert_equal \"development\", env\n    assert_equal 2, fixture_count(\"users\")\n    assert_equal \"Hitagi\", fixture(\"users\", \"crab\", \"name\")\n    assert fixture(\"users\", \"dog\", \"name\") == nil\n    puts file",
        );
        let (outcome, assertions, output) = run(&src, "test_it", &fixtures);
        assert_eq!(outcome, TestOutcome::Passed);
        assert_eq!(assertions, 4);
        assert_eq!(output, "test/unit/sample_test.rt\n");
    }

    #[test]
    fn test_truthiness() {
        assert!(Value::Int(0).is_truthy());
        assert!(Value::Str(String::new()).is_truthy());
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
    }
}
