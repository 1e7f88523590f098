//! The Clarification Engine (spec §4.9): attaches a proposed clarification
//! to a session, templates its prompt, and resolves the user's next answer
//! against its options.

mod prompt;
mod resolve;
mod rule;

pub use prompt::prompt_for;
pub use resolve::{raise, resolve, ResolveOutcome};
pub use rule::select_rule;
