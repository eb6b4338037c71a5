//! Define the builtin values and functions test scripts can read (`env`, `fixture_count(...)`, ...).
//!
//! ## Examples
//! ```rust
//! use apptest_core::builtins::{self, BuiltinId};
//!
//! assert_eq!(builtins::from_str("fixture_count"), Some(BuiltinId::FixtureCount));
//! assert_eq!(builtins::info_for(BuiltinId::Env).arity, 0);
//! ```

/// Stable identifier for every builtin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinId {
    /// Name of the environment the run was started in.
    Env,
    /// Path of the script the running test was loaded from.
    File,
    /// Number of records in a preloaded fixture table (0 when fixtures were not loaded).
    FixtureCount,
    /// One field of one preloaded fixture record, or `nil`.
    Fixture,
}

/// Metadata for a builtin.
///
/// ## Notes
/// - Arity-0 builtins are read as bare identifiers (`env`); others are called (`fixture_count("users")`).
#[derive(Debug, Clone, Copy)]
pub struct BuiltinInfo {
    pub id: BuiltinId,
    pub canonical: &'static str,
    pub arity: usize,
    pub description: &'static str,
}

/// Registry of all builtins.
pub const BUILTINS: &[BuiltinInfo] = &[
    BuiltinInfo {
        id: BuiltinId::Env,
        canonical: "env",
        arity: 0,
        description: "Current environment name.",
    },
    BuiltinInfo {
        id: BuiltinId::File,
        canonical: "file",
        arity: 0,
        description: "Path of the current test file.",
    },
    BuiltinInfo {
        id: BuiltinId::FixtureCount,
        canonical: "fixture_count",
        arity: 1,
        description: "Record count of a fixture table.",
    },
    BuiltinInfo {
        id: BuiltinId::Fixture,
        canonical: "fixture",
        arity: 3,
        description: "Field of a fixture record: fixture(table, record, field).",
    },
];

/// Full metadata.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: BuiltinId) -> &'static BuiltinInfo {
    BUILTINS
        .iter()
        .find(|b| b.id == id)
        .expect("INVARIANT: every BuiltinId has a registry entry")
}

/// Lookup by spelling.
pub fn from_str(s: &str) -> Option<BuiltinId> {
    BUILTINS.iter().find(|b| b.canonical == s).map(|b| b.id)
}
