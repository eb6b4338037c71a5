//! Define the suite keyword vocabulary for the apptest runner.
//!
//! This module is the single source of truth for suite keywords: a stable identifier ([`SuiteId`]) plus a const
//! metadata table ([`SUITES`]) that records each keyword's canonical spelling, aliases, and the test directories it
//! expands to.
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-sensitive**.
//! - A keyword may expand to several directories; `units` and `functionals` are unions whose plural does not match a
//!   single directory name.
//! - [`SuiteId::All`] is the union of every other suite's directories, in registry order, without duplicates.
//!
//! ## Examples
//! ```rust
//! use apptest_core::suites::{self, SuiteId};
//!
//! assert_eq!(suites::from_str("units"), Some(SuiteId::Units));
//! assert_eq!(suites::directories(SuiteId::Units), &["models", "helpers", "unit"]);
//! ```

/// Stable identifier for every suite keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuiteId {
    Models,
    Helpers,
    Units,
    Controllers,
    Mailers,
    Functionals,
    Integration,
    All,
}

/// Metadata for a suite keyword.
///
/// ## Notes
/// - `directories` are relative to the project test root and enumerated non-recursively.
/// - `aliases` are additional spellings accepted on the command line. An alias never names a suite directory, since
///   that spelling belongs to the directory shortcut.
#[derive(Debug, Clone, Copy)]
pub struct SuiteInfo {
    pub id: SuiteId,
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
    pub directories: &'static [&'static str],
    pub description: &'static str,
}

/// Registry of all suite keywords.
pub const SUITES: &[SuiteInfo] = &[
    info(SuiteId::Models, "models", &[], &["models"], "Model tests."),
    info(SuiteId::Helpers, "helpers", &[], &["helpers"], "View helper tests."),
    info(
        SuiteId::Units,
        "units",
        &[],
        &["models", "helpers", "unit"],
        "Unit tests: models, helpers, and the legacy `unit` directory.",
    ),
    info(
        SuiteId::Controllers,
        "controllers",
        &[],
        &["controllers"],
        "Controller tests.",
    ),
    info(SuiteId::Mailers, "mailers", &[], &["mailers"], "Mailer tests."),
    info(
        SuiteId::Functionals,
        "functionals",
        &[],
        &["mailers", "controllers", "functional"],
        "Functional tests: mailers, controllers, and the legacy `functional` directory.",
    ),
    info(
        SuiteId::Integration,
        "integration",
        &["integrations"],
        &["integration"],
        "Integration tests.",
    ),
    info(
        SuiteId::All,
        "all",
        &[],
        &["models", "helpers", "unit", "controllers", "mailers", "functional", "integration"],
        "Every known suite directory.",
    ),
];

/// Canonical spelling.
pub fn as_str(id: SuiteId) -> &'static str {
    info_for(id).canonical
}

/// Directories a suite expands to, relative to the test root.
pub fn directories(id: SuiteId) -> &'static [&'static str] {
    info_for(id).directories
}

/// Full metadata.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: SuiteId) -> &'static SuiteInfo {
    SUITES
        .iter()
        .find(|s| s.id == id)
        .expect("INVARIANT: every SuiteId has a registry entry")
}

/// Lookup by spelling (canonical or alias).
///
/// ## Returns
/// - `Some(SuiteId)` if the spelling matches this registry.
/// - `None` otherwise.
pub fn from_str(s: &str) -> Option<SuiteId> {
    if let Some(suite) = SUITES.iter().find(|suite| suite.canonical == s) {
        return Some(suite.id);
    }
    SUITES
        .iter()
        .find(|suite| {
            let aliases: &[&str] = suite.aliases;
            aliases.contains(&s)
        })
        .map(|suite| suite.id)
}

// --- helpers -----------------------------------------------------------------

const fn info(
    id: SuiteId,
    canonical: &'static str,
    aliases: &'static [&'static str],
    directories: &'static [&'static str],
    description: &'static str,
) -> SuiteInfo {
    SuiteInfo {
        id,
        canonical,
        aliases,
        directories,
        description,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_functionals_include_mailers_and_controllers() {
        let dirs = directories(SuiteId::Functionals);
        assert!(dirs.contains(&"mailers"));
        assert!(dirs.contains(&"controllers"));
        assert!(dirs.contains(&"functional"));
    }

    #[test]
    fn test_units_map_to_singular_directory() {
        assert!(directories(SuiteId::Units).contains(&"unit"));
        assert_eq!(from_str("unit"), None);
    }

    #[test]
    fn test_unknown_keyword() {
        assert_eq!(from_str("widgets"), None);
        assert_eq!(from_str("Models"), None);
    }
}
