//! Registry of loaded test classes and their cases.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use apptest_core::conventions::TEST_METHOD_PREFIX;
use apptest_syntax::ast::{ClassDecl, MethodDecl, Script};

use crate::runner::TestCaseInfo;

/// A class as loaded from one file.
#[derive(Debug, Clone)]
pub struct RegisteredClass {
    pub path: PathBuf,
    pub decl: ClassDecl,
}

impl RegisteredClass {
    /// The effective definition of `name`: a later `def` of the same name replaces an earlier one.
    pub fn method(&self, name: &str) -> Option<&MethodDecl> {
        self.decl.methods.iter().rev().map(|m| &m.node).find(|m| m.name == name)
    }
}

#[derive(Debug, Clone)]
struct RegisteredCase {
    class: usize,
    method: String,
}

/// Every case registered so far, in load order.
#[derive(Debug, Default)]
pub struct TestCollector {
    classes: Vec<RegisteredClass>,
    cases: Vec<RegisteredCase>,
}

impl TestCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every class of a parsed script; returns the number of cases added.
    pub fn register(&mut self, path: &Path, script: Script) -> usize {
        let before = self.cases.len();
        for class in script.classes {
            let index = self.classes.len();
            let mut seen = HashSet::new();
            for method in &class.node.methods {
                let name = &method.node.name;
                if name.starts_with(TEST_METHOD_PREFIX) && seen.insert(name.clone()) {
                    self.cases.push(RegisteredCase {
                        class: index,
                        method: name.clone(),
                    });
                }
            }
            self.classes.push(RegisteredClass {
                path: path.to_path_buf(),
                decl: class.node,
            });
        }
        self.cases.len() - before
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Cases with their class, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (TestCaseInfo, &RegisteredClass)> {
        self.cases.iter().map(|case| {
            let class = &self.classes[case.class];
            let info = TestCaseInfo {
                path: class.path.clone(),
                class_name: class.decl.name.clone(),
                method: case.method.clone(),
            };
            (info, class)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "\
class UserTest
  def setup
    x = 1
  end

  def test_name
    assert true
  end

  def helper
    puts \"not a test\"
  end

  def test_name
    assert false
  end

  def test_email
    assert true
  end
end
";

    #[test]
    fn test_registers_only_test_methods_once() {
        let mut collector = TestCollector::new();
        let script = apptest_syntax::parse_script(SOURCE).unwrap();
        assert_eq!(collector.register(Path::new("test/models/user_test.rt"), script), 2);

        let names: Vec<String> = collector.iter().map(|(info, _)| info.full_name()).collect();
        assert_eq!(names, vec!["UserTest#test_name", "UserTest#test_email"]);
    }

    #[test]
    fn test_redefinition_wins() {
        let mut collector = TestCollector::new();
        let script = apptest_syntax::parse_script(SOURCE).unwrap();
        collector.register(Path::new("test/models/user_test.rt"), script);

        let (_, class) = collector.iter().next().unwrap();
        let body = &class.method("test_name").unwrap().body;
        assert_eq!(body.len(), 1);
        assert!(matches!(
            &body[0].node,
            apptest_syntax::ast::Statement::Command(_, args)
                if matches!(args[0].node, apptest_syntax::ast::Expr::Bool(false))
        ));
    }
}
