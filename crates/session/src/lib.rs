//! The Session/Context Manager (spec §4.8): bounded history, TTL expiry,
//! and a background reaper over an in-process mirror backed by the shared
//! external key/value store.

mod error;
mod reaper;
mod store;

pub use error::SessionError;
pub use reaper::spawn as spawn_reaper;
pub use store::{SessionStore, SessionSummary};
