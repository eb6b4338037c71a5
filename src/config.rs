//! Project configuration (`apptest.toml`).
//!
//! Every field is optional; a missing file means the defaults below. Command-line flags override file values.
//!
//! ```toml
//! test_root = "checks"
//! env_var = "RAILS_ENV"
//! show_banner = false
//!
//! [suites]
//! system = ["system"]
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use apptest_core::conventions::{CONFIG_FILE, ENVIRONMENT_VAR, FIXTURES_DIR, SCRIPT_EXTENSION, TEST_ROOT};
use serde::Deserialize;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration in {}: {message}", path.display())]
    Invalid { path: PathBuf, message: String },
}

/// Runner settings for one project.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunnerConfig {
    /// Directory holding the tests, relative to the project root
    pub test_root: String,
    /// Script extension, without the dot
    pub extension: String,
    /// Environment variable consulted when `-e` is not given
    pub env_var: String,
    /// Fixture directory, relative to the test root
    pub fixtures_dir: String,
    /// Print the engine's `Run options:` / `# Running tests:` lines
    pub show_banner: bool,
    /// Extra suite keywords, each mapping to directories under the test root
    pub suites: BTreeMap<String, Vec<String>>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            test_root: TEST_ROOT.to_string(),
            extension: SCRIPT_EXTENSION.to_string(),
            env_var: ENVIRONMENT_VAR.to_string(),
            fixtures_dir: FIXTURES_DIR.to_string(),
            show_banner: false,
            suites: BTreeMap::new(),
        }
    }
}

impl RunnerConfig {
    /// Load `apptest.toml` from `root`, or the defaults when there is none.
    ///
    /// ## Errors
    /// - [`ConfigError::Read`] / [`ConfigError::Parse`] for an unreadable or malformed file.
    /// - [`ConfigError::Invalid`] for empty names or a suite without directories.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(CONFIG_FILE);
        if !path.is_file() {
            tracing::debug!(path = %path.display(), "no configuration file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        config.validate(&path)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::Invalid {
            path: path.to_path_buf(),
            message,
        };
        for (field, value) in [
            ("test_root", &self.test_root),
            ("extension", &self.extension),
            ("env_var", &self.env_var),
            ("fixtures_dir", &self.fixtures_dir),
        ] {
            if value.trim().is_empty() {
                return Err(invalid(format!("'{field}' must not be empty")));
            }
        }
        if let Some((keyword, _)) = self.suites.iter().find(|(_, dirs)| dirs.is_empty()) {
            return Err(invalid(format!("suite '{keyword}' has no directories")));
        }
        Ok(())
    }

    /// Fixture directory of the project at `root`.
    pub fn fixtures_path(&self, root: &Path) -> PathBuf {
        root.join(&self.test_root).join(&self.fixtures_dir)
    }
}
