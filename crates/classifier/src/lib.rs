//! The Intent Classifier (spec §4.3): pattern-based category matching,
//! compound-query splitting, follow-up resolution, and ambiguity signaling
//! against the admin-configured disambiguation rule sets.

mod classifier;
mod followup;
mod patterns;
mod splitter;

pub use classifier::IntentClassifier;
pub use followup::{looks_like_followup, resolve_followup};
pub use patterns::{extract_timeframe, match_category, CATEGORY_ORDER};
pub use splitter::split_compound;
