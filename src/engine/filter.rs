//! `-n` test name filters.

use std::fmt;

use regex::Regex;

use crate::runner::TestError;

/// Restricts a run to matching test cases.
///
/// Plain text must equal the method name or `Class#method`. Text wrapped in slashes (`/rikka/`) is a regular
/// expression searched in both.
#[derive(Debug, Clone)]
pub enum NameFilter {
    Exact(String),
    Pattern(Regex),
}

impl NameFilter {
    /// ## Errors
    /// - [`TestError::InvalidFilter`] when a `/pattern/` is not a valid regular expression.
    pub fn parse(raw: &str) -> Result<Self, TestError> {
        match raw.strip_prefix('/').and_then(|rest| rest.strip_suffix('/')) {
            Some(pattern) => Regex::new(pattern).map(NameFilter::Pattern).map_err(|e| TestError::InvalidFilter {
                pattern: raw.to_string(),
                message: e.to_string(),
            }),
            None => Ok(NameFilter::Exact(raw.to_string())),
        }
    }

    pub fn matches(&self, class_name: &str, method: &str) -> bool {
        let full_name = format!("{class_name}#{method}");
        match self {
            NameFilter::Exact(name) => name == method || *name == full_name,
            NameFilter::Pattern(re) => re.is_match(method) || re.is_match(&full_name),
        }
    }
}

impl fmt::Display for NameFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameFilter::Exact(name) => f.write_str(name),
            NameFilter::Pattern(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}
