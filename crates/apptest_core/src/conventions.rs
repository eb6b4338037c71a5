//! Shared project layout conventions (well-known names).

/// Directory under the project root that holds all tests.
pub const TEST_ROOT: &str = "test";

/// Stem suffix every test file carries (`foo_test.rt`).
pub const TEST_FILE_SUFFIX: &str = "_test";

/// Extension of test scripts understood by the bundled engine.
pub const SCRIPT_EXTENSION: &str = "rt";

/// Directory under the test root holding YAML fixture tables.
pub const FIXTURES_DIR: &str = "fixtures";

/// Extension of fixture tables.
pub const FIXTURE_EXTENSION: &str = "yml";

/// Environment used when neither a flag nor the environment variable names one.
pub const DEFAULT_ENVIRONMENT: &str = "test";

/// Environment variable consulted for the environment name.
pub const ENVIRONMENT_VAR: &str = "APP_ENV";

/// Project configuration file name, looked up in the project root.
pub const CONFIG_FILE: &str = "apptest.toml";

/// Prefix of methods collected as test cases.
pub const TEST_METHOD_PREFIX: &str = "test_";

/// Method run before each test case of a class.
pub const SETUP_METHOD: &str = "setup";

/// Method run after each test case of a class.
pub const TEARDOWN_METHOD: &str = "teardown";

/// Check whether a file name follows the test naming convention for `extension`.
///
/// ## Examples
/// ```rust
/// use apptest_core::conventions::is_test_file_name;
///
/// assert!(is_test_file_name("foo_test.rt", "rt"));
/// assert!(!is_test_file_name("foo.rt", "rt"));
/// assert!(!is_test_file_name("foo_test.yml", "rt"));
/// ```
pub fn is_test_file_name(name: &str, extension: &str) -> bool {
    name.strip_suffix(extension)
        .and_then(|rest| rest.strip_suffix('.'))
        .is_some_and(|stem| stem.len() > TEST_FILE_SUFFIX.len() && stem.ends_with(TEST_FILE_SUFFIX))
}
