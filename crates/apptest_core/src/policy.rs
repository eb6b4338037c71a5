//! Pure selection policy shared by the runner: environment precedence and fixture preloading.

use crate::conventions::DEFAULT_ENVIRONMENT;

/// Pick the environment name for a run.
///
/// ## Parameters
/// - `explicit`: value of the `-e` flag, if given.
/// - `from_env_var`: value of the environment variable, if set.
///
/// ## Returns
/// - The first non-empty value of `explicit`, `from_env_var`, or [`DEFAULT_ENVIRONMENT`].
///
/// ## Examples
/// ```rust
/// use apptest_core::select_environment;
///
/// assert_eq!(select_environment(Some("development"), Some("production")), "development");
/// assert_eq!(select_environment(None, Some("production")), "production");
/// assert_eq!(select_environment(None, None), "test");
/// ```
pub fn select_environment<'a>(explicit: Option<&'a str>, from_env_var: Option<&'a str>) -> &'a str {
    explicit
        .filter(|s| !s.is_empty())
        .or(from_env_var.filter(|s| !s.is_empty()))
        .unwrap_or(DEFAULT_ENVIRONMENT)
}

/// Decide whether all fixture data is loaded before any test file.
///
/// A run that names exactly one file skips the fixture load so that re-running a single test stays fast. Every
/// other run (several files, suite or directory expansion) preloads, and `force` always preloads.
///
/// ## Notes
/// - Only meaningful for runs made of explicit file selectors. Suite and directory expansion always preloads, even
///   when the expansion yields a single file; the runner checks that before consulting this policy.
pub fn should_preload_fixtures(resolved_file_count: usize, force: bool) -> bool {
    force || resolved_file_count != 1
}
