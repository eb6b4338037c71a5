//! Parser unit tests.

use super::*;
use crate::parse_script;

fn parse_str(source: &str) -> Result<Script, SyntaxError> {
    parse_script(source)
}

#[test]
fn test_parse_class_with_methods() {
    let source = r#"
require "test_helper"

class FooTest < Support::TestCase
  def setup
    greeting = "hi"
  end

  def test_truth
    puts "FooTest"
    assert true
  end
end
"#;
    let script = parse_str(source).unwrap();
    assert_eq!(script.requires.len(), 1);
    assert_eq!(script.requires[0].node, "test_helper");
    assert_eq!(script.classes.len(), 1);

    let class = &script.classes[0].node;
    assert_eq!(class.name, "FooTest");
    assert_eq!(class.superclass.as_deref(), Some("Support::TestCase"));
    assert_eq!(class.methods.len(), 2);

    let test = class.method("test_truth").unwrap();
    assert_eq!(test.body.len(), 2);
    match &test.body[1].node {
        Statement::Command(name, args) => {
            assert_eq!(name, "assert");
            assert_eq!(args[0].node, Expr::Bool(true));
        }
        other => panic!("expected command, got {:?}", other),
    }
}

#[test]
fn test_parse_assignment_and_comparison() {
    let source = "class A\n  def test_x\n    n = fixture_count(\"users\")\n    assert n == 3, \"three\"\n  end\nend\n";
    let script = parse_str(source).unwrap();
    let body = &script.classes[0].node.methods[0].node.body;

    match &body[0].node {
        Statement::Assign(name, value) => {
            assert_eq!(name, "n");
            assert!(matches!(&value.node, Expr::Call(f, args) if f == "fixture_count" && args.len() == 1));
        }
        other => panic!("expected assignment, got {:?}", other),
    }
    match &body[1].node {
        Statement::Command(name, args) => {
            assert_eq!(name, "assert");
            assert_eq!(args.len(), 2);
            assert!(matches!(args[0].node, Expr::Binary(_, BinaryOp::Eq, _)));
        }
        other => panic!("expected command, got {:?}", other),
    }
}

#[test]
fn test_parenthesized_command_arguments() {
    let script = parse_str("class A; def test_x; assert_equal(1, 1); end; end").unwrap();
    match &script.classes[0].node.methods[0].node.body[0].node {
        Statement::Command(name, args) => {
            assert_eq!(name, "assert_equal");
            assert_eq!(args.len(), 2);
        }
        other => panic!("expected command, got {:?}", other),
    }
}

#[test]
fn test_interpolation_is_parsed() {
    let script = parse_str("class A\n def test_x\n  puts \"#{env} (#{file})\"\n end\nend").unwrap();
    match &script.classes[0].node.methods[0].node.body[0].node {
        Statement::Command(_, args) => match &args[0].node {
            Expr::Interpolated(parts) => {
                assert_eq!(parts.len(), 4);
                assert!(matches!(&parts[0], InterpPart::Expr(e) if e.node == Expr::Var("env".into())));
                assert_eq!(parts[3], InterpPart::Literal(")".into()));
            }
            other => panic!("expected interpolation, got {:?}", other),
        },
        other => panic!("expected command, got {:?}", other),
    }
}

#[test]
fn test_bare_def_is_a_syntax_error() {
    let source = "require 'test_helper'\ndef; end\n";
    let err = parse_str(source).unwrap_err();
    insta::assert_snapshot!(
        err.render("test/models/error_test.rt", source),
        @"SyntaxError: test/models/error_test.rt:2:1: unexpected 'def', expecting 'class' or 'require'"
    );
}

#[test]
fn test_def_without_name_inside_class() {
    let err = parse_str("class A\n  def; end\nend\n").unwrap_err();
    assert_eq!(err.message, "unexpected ';', expecting method name");
}

#[test]
fn test_missing_end_reports_eof() {
    let err = parse_str("class A\n  def test_x\n    assert true\n").unwrap_err();
    assert!(err.message.starts_with("unexpected end of file"), "got: {}", err.message);
}

#[test]
fn test_bad_interpolation_points_into_string() {
    let source = "class A\n def test_x\n  puts \"#{==}\"\n end\nend";
    let err = parse_str(source).unwrap_err();
    let (line, _) = err.location(source);
    assert_eq!(line, 3);
    assert!(err.message.contains("expecting an expression"));
}

#[test]
fn test_garbage_after_statement() {
    let err = parse_str("class A\n def test_x\n  assert true true\n end\nend").unwrap_err();
    assert_eq!(err.message, "unexpected 'true', expecting end of statement");
}

fn in_test_method(expr: &str) -> String {
    format!("class A\n def test_x\n  assert {expr}\n end\nend\n")
}

#[test]
fn test_moderate_nesting_parses() {
    let expr = format!("{}1{} == 1", "(".repeat(10), ")".repeat(10));
    assert!(parse_str(&in_test_method(&expr)).is_ok());
}

#[test]
fn test_deep_parentheses_are_rejected() {
    let expr = format!("{}1{}", "(".repeat(20_000), ")".repeat(20_000));
    let err = parse_str(&in_test_method(&expr)).unwrap_err();
    assert_eq!(err.message, "expression nested too deeply");
}

#[test]
fn test_deep_call_arguments_are_rejected() {
    let expr = format!("{}1{}", "f(".repeat(MAX_NESTING + 1), ")".repeat(MAX_NESTING + 1));
    let err = parse_str(&in_test_method(&expr)).unwrap_err();
    assert_eq!(err.message, "expression nested too deeply");
}

#[test]
fn test_deep_interpolation_is_rejected() {
    let mut expr = "1".to_string();
    for _ in 0..=MAX_NESTING {
        expr = format!("\"#{{{expr}}}\"");
    }
    let err = parse_str(&in_test_method(&expr)).unwrap_err();
    assert_eq!(err.message, "expression nested too deeply");
}
