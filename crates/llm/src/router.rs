//! The LLM Router (spec §4.7): resolves the configured `LlmBackend` row for
//! a model, dispatches by `backend_type`, and tracks rolling performance
//! metrics per model.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;

use assistant_config::ConfigLoader;
use assistant_core::{BackendType, CoreError, LlmBackend, RollingMetrics};

use crate::ollama::{FinishReason, GenerationParams, GenerationResult, OllamaTransport};
use crate::prompt::ChatMessage;

pub struct LlmRouter {
    config: Arc<ConfigLoader>,
    transport: OllamaTransport,
    /// Locally materialized rolling metrics per model. The admin-owned rows
    /// fetched through `ConfigLoader` are immutable snapshots; this is the
    /// router's own live view, exposed for the metrics surface.
    metrics: DashMap<String, RollingMetrics>,
}

impl LlmRouter {
    pub fn new(config: Arc<ConfigLoader>) -> Result<Self, CoreError> {
        let transport = OllamaTransport::new().map_err(CoreError::from)?;
        Ok(Self { config, transport, metrics: DashMap::new() })
    }

    pub fn metrics_for(&self, model: &str) -> RollingMetrics {
        self.metrics.get(model).map(|m| m.clone()).unwrap_or_default()
    }

    pub async fn generate(
        &self,
        model: &str,
        messages: &[ChatMessage],
        temperature_override: Option<f32>,
    ) -> Result<GenerationResult, CoreError> {
        let row = self.config.llm_backend(model).await;
        if !row.enabled {
            return Err(CoreError::NotApplicable);
        }

        let params = GenerationParams {
            temperature: temperature_override.unwrap_or(row.default_temperature),
            max_tokens: row.max_tokens,
            timeout: Duration::from_secs(row.timeout_seconds),
        };

        match row.backend_type {
            BackendType::Primary | BackendType::Alternate => self.call(&row, messages, &params).await,
            BackendType::Auto => match self.call(&row, messages, &params).await {
                Ok(result) => Ok(result),
                Err(_) => {
                    tracing::warn!(model, "auto backend failed, falling back to primary");
                    let fallback = self.find_primary(model).await;
                    self.call(&fallback, messages, &params).await
                }
            },
        }
    }

    async fn find_primary(&self, model: &str) -> LlmBackend {
        self.config
            .llm_backends()
            .await
            .into_iter()
            .find(|b| b.model_name == model && b.backend_type == BackendType::Primary)
            .unwrap_or_else(|| LlmBackend::documented_default(model))
    }

    async fn call(
        &self,
        row: &LlmBackend,
        messages: &[ChatMessage],
        params: &GenerationParams,
    ) -> Result<GenerationResult, CoreError> {
        match self.transport.generate(&row.endpoint, &row.model_name, messages, params).await {
            Ok(result) => {
                self.metrics
                    .entry(row.model_name.clone())
                    .or_default()
                    .record_success(result.tokens_per_second, result.total_time_ms as f64);
                Ok(result)
            }
            Err(err) => {
                self.metrics.entry(row.model_name.clone()).or_default().record_error();
                Err(err.into())
            }
        }
    }
}

pub use FinishReason as LlmFinishReason;
pub use GenerationResult as LlmGenerationResult;

#[cfg(test)]
mod tests {
    use super::*;
    use assistant_cache::InMemoryExternalStore;
    use assistant_config::admin_client::AdminApi;
    use assistant_config::ConfigError;
    use assistant_core::{
        ClarificationRule, ClarificationSettings, ConversationSettings, DeviceDisambiguationRule,
        DisambiguationEntry, FeatureFlag,
    };
    use async_trait::async_trait;

    struct StubAdmin {
        backends: Vec<LlmBackend>,
    }

    #[async_trait]
    impl AdminApi for StubAdmin {
        async fn conversation_settings(&self) -> Result<ConversationSettings, ConfigError> {
            Ok(ConversationSettings::default())
        }
        async fn clarification_settings(&self) -> Result<ClarificationSettings, ConfigError> {
            Ok(ClarificationSettings::default())
        }
        async fn clarification_rules(&self) -> Result<Vec<ClarificationRule>, ConfigError> {
            Ok(Vec::new())
        }
        async fn sports_disambiguation(&self) -> Result<Vec<DisambiguationEntry>, ConfigError> {
            Ok(Vec::new())
        }
        async fn device_rules(&self) -> Result<Vec<DeviceDisambiguationRule>, ConfigError> {
            Ok(Vec::new())
        }
        async fn features(&self) -> Result<Vec<FeatureFlag>, ConfigError> {
            Ok(Vec::new())
        }
        async fn llm_backends(&self) -> Result<Vec<LlmBackend>, ConfigError> {
            Ok(self.backends.clone())
        }
    }

    fn router_with(backends: Vec<LlmBackend>) -> LlmRouter {
        let loader = ConfigLoader::new(
            Arc::new(StubAdmin { backends }),
            Arc::new(InMemoryExternalStore::new()),
            300,
        );
        LlmRouter::new(Arc::new(loader)).unwrap()
    }

    #[tokio::test]
    async fn disabled_backend_is_not_applicable() {
        let mut row = LlmBackend::documented_default("qwen2.5");
        row.enabled = false;
        let router = router_with(vec![row]);
        let err = router.generate("qwen2.5", &[], None).await.unwrap_err();
        assert!(matches!(err, CoreError::NotApplicable));
    }

    #[tokio::test]
    async fn find_primary_falls_back_to_documented_default_when_absent() {
        let router = router_with(Vec::new());
        let fallback = router.find_primary("ghost-model").await;
        assert_eq!(fallback.endpoint, LlmBackend::documented_default("ghost-model").endpoint);
    }

    #[tokio::test]
    async fn find_primary_prefers_matching_primary_row() {
        let mut primary = LlmBackend::documented_default("qwen2.5");
        primary.endpoint = "http://primary.internal:11434".to_string();
        let router = router_with(vec![primary]);
        let found = router.find_primary("qwen2.5").await;
        assert_eq!(found.endpoint, "http://primary.internal:11434");
    }
}
