//! Admin-DB-backed configuration entities (spec §3, §6).
//!
//! These are plain value types. The Config Loader (`assistant-config`) is
//! responsible for fetching, caching and invalidating them; everything here
//! is an immutable snapshot value — callers never mutate in place.

use serde::{Deserialize, Serialize};

/// Kinds of configuration snapshot the Config Loader serves (spec §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigKind {
    ConversationSettings,
    ClarificationSettings,
    ClarificationRules,
    SportsDisambiguation,
    DeviceRules,
    Features,
    LlmBackends,
}

impl ConfigKind {
    pub fn cache_key(&self) -> String {
        let name = match self {
            ConfigKind::ConversationSettings => "conversation_settings",
            ConfigKind::ClarificationSettings => "clarification_settings",
            ConfigKind::ClarificationRules => "clarification_rules",
            ConfigKind::SportsDisambiguation => "sports_disambiguation",
            ConfigKind::DeviceRules => "device_rules",
            ConfigKind::Features => "features",
            ConfigKind::LlmBackends => "llm_backends",
        };
        format!("config:{name}")
    }
}

/// `GET/PUT /api/conversation/settings` (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSettings {
    pub enabled: bool,
    pub use_context: bool,
    pub max_messages: usize,
    pub timeout_seconds: i64,
    pub cleanup_interval_seconds: u64,
    pub session_ttl_seconds: i64,
    pub max_llm_history_messages: usize,
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            use_context: true,
            max_messages: 20,
            timeout_seconds: 1800,
            cleanup_interval_seconds: 60,
            session_ttl_seconds: 3600,
            max_llm_history_messages: 10,
        }
    }
}

/// `GET/PUT /api/conversation/clarification` (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClarificationSettings {
    pub enabled: bool,
    pub timeout_seconds: u64,
}

impl Default for ClarificationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_seconds: 300,
        }
    }
}

/// A named feature flag (spec §3 `FeatureFlag`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureFlag {
    pub name: String,
    pub enabled: bool,
    pub category: String,
    pub required: bool,
    pub avg_latency_ms: Option<f64>,
    pub hit_rate: Option<f64>,
    pub priority: i32,
}

impl FeatureFlag {
    /// Attempt to toggle the flag. Required flags cannot be disabled
    /// (spec §3 invariant, §8 testable property).
    pub fn try_set_enabled(&mut self, enabled: bool) -> Result<(), String> {
        if self.required && !enabled {
            return Err(format!("feature '{}' is required and cannot be disabled", self.name));
        }
        self.enabled = enabled;
        Ok(())
    }
}

/// Well-known feature names consulted by the orchestrator (spec §4.10).
pub mod feature_names {
    pub const REDIS_CACHING: &str = "redis_caching";
    pub const FUNCTION_CALLING: &str = "function_calling";
    pub const ENABLE_FACADE: &str = "enable_facade";
    pub const CONVERSATION_CONTEXT: &str = "conversation_context";
    pub const ENABLE_VALIDATION: &str = "enable_validation";
}

/// Backend routing strategy for a named model (spec §3 `LLMBackend`, §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendType {
    Primary,
    Alternate,
    Auto,
}

/// Rolling performance metrics for an `LLMBackend` row, updated under a
/// per-backend exclusive guard (spec §5).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RollingMetrics {
    pub avg_tokens_per_sec: f64,
    pub avg_latency_ms: f64,
    pub total_requests: u64,
    pub total_errors: u64,
}

impl RollingMetrics {
    /// Exponential moving average update on a successful call.
    pub fn record_success(&mut self, tokens_per_sec: f64, latency_ms: f64) {
        const ALPHA: f64 = 0.2;
        if self.total_requests == 0 {
            self.avg_tokens_per_sec = tokens_per_sec;
            self.avg_latency_ms = latency_ms;
        } else {
            self.avg_tokens_per_sec = ALPHA * tokens_per_sec + (1.0 - ALPHA) * self.avg_tokens_per_sec;
            self.avg_latency_ms = ALPHA * latency_ms + (1.0 - ALPHA) * self.avg_latency_ms;
        }
        self.total_requests += 1;
    }

    pub fn record_error(&mut self) {
        self.total_errors += 1;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmBackend {
    pub model_name: String,
    pub backend_type: BackendType,
    pub endpoint: String,
    pub enabled: bool,
    pub priority: i32,
    pub max_tokens: usize,
    pub default_temperature: f32,
    pub timeout_seconds: u64,
    #[serde(default)]
    pub rolling: RollingMetrics,
}

impl LlmBackend {
    /// Documented defaults used when no row exists for a requested model
    /// (spec §4.7, §6 Defaults table).
    pub fn documented_default(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            backend_type: BackendType::Primary,
            endpoint: "http://localhost:11434".to_string(),
            enabled: true,
            priority: 0,
            max_tokens: 2048,
            default_temperature: 0.7,
            timeout_seconds: 10,
            rolling: RollingMetrics::default(),
        }
    }
}

/// A rule governing when a clarification of `kind` is raised (spec §3
/// `ClarificationRule`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClarificationRule {
    pub kind: String,
    pub enabled: bool,
    pub timeout_seconds: Option<u64>,
    pub priority: i32,
    pub option_source: OptionSource,
}

/// Where a clarification rule's options come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum OptionSource {
    Static(Vec<crate::session::ClarificationOption>),
    Dynamic(String),
}

/// A disambiguation entry mapping an ambiguous trigger token (e.g. a sports
/// team reference) to fixed choices (spec §3 `DisambiguationEntry`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisambiguationEntry {
    pub trigger_token: String,
    pub options: Vec<DisambiguationOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisambiguationOption {
    pub id: String,
    pub label: String,
    pub sport: Option<String>,
}

/// Device-command clarification policy (spec §3 `DeviceDisambiguationRule`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceDisambiguationRule {
    pub device_kind: String,
    pub min_entities_to_ask: usize,
    pub include_all_option: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_feature_cannot_be_disabled() {
        let mut flag = FeatureFlag {
            name: "enable_facade".into(),
            enabled: true,
            category: "core".into(),
            required: true,
            avg_latency_ms: None,
            hit_rate: None,
            priority: 0,
        };
        assert!(flag.try_set_enabled(false).is_err());
        assert!(flag.enabled);
    }

    #[test]
    fn rolling_metrics_average_converges() {
        let mut metrics = RollingMetrics::default();
        for _ in 0..50 {
            metrics.record_success(10.0, 100.0);
        }
        assert!((metrics.avg_tokens_per_sec - 10.0).abs() < 0.01);
        assert_eq!(metrics.total_requests, 50);
    }
}
