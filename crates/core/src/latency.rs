//! Per-request latency breakdown (spec §3 `LatencyBreakdown`, §4.10).

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One pipeline stage's observed duration, in milliseconds. `None` means the
/// stage was never entered for this request (e.g. `rag_lookup` when the
/// facade path was skipped entirely).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LatencyBreakdown {
    pub gateway_ms: Option<u64>,
    pub intent_classification_ms: Option<u64>,
    pub rag_lookup_ms: Option<u64>,
    pub llm_inference_ms: Option<u64>,
    pub response_assembly_ms: Option<u64>,
    pub cache_lookup_ms: Option<u64>,
    pub tts_ms: Option<u64>,
    /// Enabled feature names at the time this request started.
    #[serde(default)]
    pub enabled_features: Vec<String>,
}

impl LatencyBreakdown {
    pub fn record(&mut self, stage: Stage, duration: Duration) {
        let ms = duration.as_millis() as u64;
        match stage {
            Stage::Gateway => self.gateway_ms = Some(ms),
            Stage::IntentClassification => self.intent_classification_ms = Some(ms),
            Stage::RagLookup => self.rag_lookup_ms = Some(ms),
            Stage::LlmInference => self.llm_inference_ms = Some(ms),
            Stage::ResponseAssembly => self.response_assembly_ms = Some(ms),
            Stage::CacheLookup => self.cache_lookup_ms = Some(ms),
            Stage::Tts => self.tts_ms = Some(ms),
        }
    }

    pub fn total_ms(&self) -> u64 {
        [
            self.gateway_ms,
            self.intent_classification_ms,
            self.rag_lookup_ms,
            self.llm_inference_ms,
            self.response_assembly_ms,
            self.cache_lookup_ms,
            self.tts_ms,
        ]
        .into_iter()
        .flatten()
        .sum()
    }
}

/// Named pipeline stages, each with a spec-mandated timeout (§4.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Gateway,
    IntentClassification,
    RagLookup,
    LlmInference,
    ResponseAssembly,
    CacheLookup,
    Tts,
}

impl Stage {
    /// Default per-stage timeout. `RagLookup` here stands in for a
    /// generic per-handler call (≤5s, cache sub-lookup ≤0.5s handled
    /// separately by `CacheLookup`).
    pub fn default_timeout(&self) -> Duration {
        match self {
            Stage::Gateway => Duration::from_secs(5),
            Stage::IntentClassification => Duration::from_secs(3),
            Stage::RagLookup => Duration::from_secs(5),
            Stage::LlmInference => Duration::from_secs(10),
            Stage::ResponseAssembly => Duration::from_secs(1),
            Stage::CacheLookup => Duration::from_millis(500),
            Stage::Tts => Duration::from_secs(5),
        }
    }
}

/// The request-overall deadline default (spec §6 Defaults table).
pub const DEFAULT_REQUEST_DEADLINE: Duration = Duration::from_secs(30);
