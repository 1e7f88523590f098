//! Cache entry and category types (spec §3 `CacheEntry`, §4.2).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-category TTLs, in seconds (spec §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheCategory {
    Weather,
    Events,
    Streaming,
    News,
    Stock,
    WebSearch,
    Static,
    /// Not named in the spec's TTL table (which is "e.g.", not exhaustive);
    /// ground-truth categories not otherwise listed use a TTL appropriate to
    /// how fast the underlying fact changes.
    Sports,
    Finance,
    Flights,
    Location,
}

impl CacheCategory {
    pub fn default_ttl_seconds(&self) -> i64 {
        match self {
            CacheCategory::Weather => 600,
            CacheCategory::Events => 3600,
            CacheCategory::Streaming => 86_400,
            CacheCategory::News => 1800,
            CacheCategory::Stock => 300,
            CacheCategory::WebSearch => 3600,
            CacheCategory::Static => 86_400,
            CacheCategory::Sports => 300,
            CacheCategory::Finance => 300,
            CacheCategory::Flights => 120,
            CacheCategory::Location => 86_400,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CacheCategory::Weather => "weather",
            CacheCategory::Events => "events",
            CacheCategory::Streaming => "streaming",
            CacheCategory::News => "news",
            CacheCategory::Stock => "stock",
            CacheCategory::WebSearch => "web_search",
            CacheCategory::Static => "static",
            CacheCategory::Sports => "sports",
            CacheCategory::Finance => "finance",
            CacheCategory::Flights => "flights",
            CacheCategory::Location => "location",
        }
    }
}

/// A single cached value (spec §3 `CacheEntry`).
///
/// Invariant: `key` is uniquely determined by `(intent_kind, normalized_query)`
/// — see `normalize_key` in `assistant-cache`. A `get` at time `t` returns the
/// value only if `t - inserted_at <= ttl`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub value: String,
    pub inserted_at: DateTime<Utc>,
    pub ttl_seconds: i64,
    pub category: CacheCategory,
}

impl CacheEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>, category: CacheCategory, now: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            inserted_at: now,
            ttl_seconds: category.default_ttl_seconds(),
            category,
        }
    }

    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        (now - self.inserted_at).num_seconds() <= self.ttl_seconds
    }
}
