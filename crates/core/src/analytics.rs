//! Append-only analytics events (spec §3 `AnalyticsEvent`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The minimum set of event kinds required by the spec. Left non-exhaustive
/// (Open Question 4, `SPEC_FULL.md` §C) so additional kinds can be added
/// without a breaking schema change; callers should always have a wildcard
/// arm when matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum EventKind {
    SessionCreated,
    FollowupDetected,
    ClarificationTriggered,
    ClarificationResolved,
    ClarificationTimeout,
    CacheHit,
    CacheMiss,
    HandlerSelected,
    FallbackInvoked,
    HallucinationDetected,
    RequestCompleted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub event_kind: EventKind,
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Value,
}

impl AnalyticsEvent {
    pub fn new(event_kind: EventKind, session_id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            event_kind,
            session_id: session_id.into(),
            timestamp,
            metadata: Value::Null,
        }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }
}
