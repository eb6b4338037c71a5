//! Define the statement vocabulary of test scripts (`puts`, `assert`, `skip`, ...).
//!
//! Scripts parse every statement of the form `name args...` as a generic command; this registry is what gives the
//! names meaning. The interpreter dispatches on [`CommandId`] and enforces [`CommandInfo::arity`].
//!
//! ## Examples
//! ```rust
//! use apptest_core::commands::{self, CommandId};
//!
//! assert_eq!(commands::from_str("assert_equal"), Some(CommandId::AssertEqual));
//! assert!(commands::info_for(CommandId::AssertEqual).counts_assertion);
//! ```

/// Stable identifier for every script command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandId {
    Puts,
    Assert,
    Refute,
    AssertEqual,
    AssertMatch,
    Flunk,
    Skip,
    Raise,
}

/// Metadata for a script command.
///
/// ## Notes
/// - `arity` is `(min, max)` positional arguments.
/// - `counts_assertion` commands add one to the run's assertion count each time they execute.
#[derive(Debug, Clone, Copy)]
pub struct CommandInfo {
    pub id: CommandId,
    pub canonical: &'static str,
    pub arity: (usize, usize),
    pub counts_assertion: bool,
    pub description: &'static str,
}

/// Registry of all commands.
pub const COMMANDS: &[CommandInfo] = &[
    info(CommandId::Puts, "puts", (0, usize::MAX), false, "Print each argument on its own line."),
    info(CommandId::Assert, "assert", (1, 2), true, "Fail unless the value is truthy."),
    info(CommandId::Refute, "refute", (1, 2), true, "Fail if the value is truthy."),
    info(CommandId::AssertEqual, "assert_equal", (2, 3), true, "Fail unless expected equals actual."),
    info(
        CommandId::AssertMatch,
        "assert_match",
        (2, 3),
        true,
        "Fail unless the second value contains the first.",
    ),
    info(CommandId::Flunk, "flunk", (0, 1), true, "Fail unconditionally."),
    info(CommandId::Skip, "skip", (0, 1), false, "Stop the test and record it as skipped."),
    info(CommandId::Raise, "raise", (0, 1), false, "Stop the test with an error."),
];

/// Full metadata.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: CommandId) -> &'static CommandInfo {
    COMMANDS
        .iter()
        .find(|c| c.id == id)
        .expect("INVARIANT: every CommandId has a registry entry")
}

/// Lookup by spelling.
pub fn from_str(s: &str) -> Option<CommandId> {
    COMMANDS.iter().find(|c| c.canonical == s).map(|c| c.id)
}

const fn info(
    id: CommandId,
    canonical: &'static str,
    arity: (usize, usize),
    counts_assertion: bool,
    description: &'static str,
) -> CommandInfo {
    CommandInfo {
        id,
        canonical,
        arity,
        counts_assertion,
        description,
    }
}
