//! Shared domain types for the voice-assistant orchestration core.
//!
//! This crate holds no business logic — only the types and contracts every
//! other crate in the workspace builds against: sessions and messages,
//! intents and classification, the admin-DB-backed configuration entities,
//! the cache/analytics/latency data model, the error taxonomy, and the
//! handler contract shared by every cascade path.

pub mod analytics;
pub mod cache;
pub mod config_model;
pub mod error;
pub mod handler;
pub mod intent;
pub mod latency;
pub mod session;

pub use analytics::{AnalyticsEvent, EventKind};
pub use cache::{CacheCategory, CacheEntry};
pub use config_model::{
    BackendType, ClarificationRule, ClarificationSettings, ConfigKind, ConversationSettings,
    DeviceDisambiguationRule, DisambiguationEntry, DisambiguationOption, FeatureFlag, LlmBackend,
    OptionSource, RollingMetrics,
};
pub use error::{CoreError, CoreResult};
pub use handler::{FacadeHandler, HandlerInput, HandlerOutcome, HandlerResult};
pub use intent::{ClassificationMode, ClassifiedPart, Classification, Intent, IntentKind, ProposedClarification};
pub use latency::{LatencyBreakdown, Stage, DEFAULT_REQUEST_DEADLINE};
pub use session::{
    export_session, import_session, ClarificationOption, ExportFormat, Message, PendingClarification,
    Role, Session, SessionContext, SessionContextUpdate,
};

/// Generate a stable opaque session identifier from zone + client
/// fingerprint (spec §3: "never user identity").
pub fn derive_session_id(zone: &str, client_fingerprint: &str) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    zone.hash(&mut hasher);
    client_fingerprint.hash(&mut hasher);
    format!("sess_{:016x}", hasher.finish())
}
