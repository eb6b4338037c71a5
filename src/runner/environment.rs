//! Environment selection.
//!
//! The environment name is picked once per run: `-e` wins over the environment variable, which wins over `"test"`.
//! The first resolution is cached, and the runtime environment may be initialized only once.

use std::fmt;

use apptest_core::select_environment;
use serde::Serialize;

use super::interfaces::TestError;

/// The environment a run executes in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Environment(String);

impl Environment {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolves the environment once and guards against loading it twice.
#[derive(Debug, Default)]
pub struct EnvironmentLoader {
    resolved: Option<Environment>,
    initialized: bool,
}

impl EnvironmentLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick the environment; later calls return the first result unchanged.
    pub fn resolve(&mut self, explicit: Option<&str>, from_env_var: Option<&str>) -> Environment {
        if let Some(env) = &self.resolved {
            tracing::trace!(environment = %env, "environment already resolved");
            return env.clone();
        }
        let env = Environment::new(select_environment(explicit, from_env_var));
        tracing::debug!(environment = %env, "resolved environment");
        self.resolved = Some(env.clone());
        env
    }

    /// Mark the resolved environment as loaded into the runtime.
    ///
    /// ## Errors
    /// - [`TestError::EnvironmentReloaded`] on a second call.
    pub fn initialize(&mut self, env: &Environment) -> Result<(), TestError> {
        if self.initialized {
            return Err(TestError::EnvironmentReloaded(env.to_string()));
        }
        self.initialized = true;
        Ok(())
    }
}
