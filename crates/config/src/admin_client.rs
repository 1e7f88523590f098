//! HTTP client for the admin configuration surface (spec §6 Admin HTTP
//! surface). The admin DB + HTTP API themselves are out of scope (spec §1);
//! this is the client contract the Config Loader uses to fetch snapshots.

use async_trait::async_trait;
use serde::Serialize;

use assistant_core::{
    ClarificationRule, ClarificationSettings, ConversationSettings, DeviceDisambiguationRule,
    DisambiguationEntry, FeatureFlag, LlmBackend,
};

use crate::error::ConfigError;
use crate::settings::AdminApiConfig;

/// Everything the Config Loader needs from the admin surface. Split out as
/// a trait so tests can substitute a fixed in-memory implementation.
#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn conversation_settings(&self) -> Result<ConversationSettings, ConfigError>;
    async fn clarification_settings(&self) -> Result<ClarificationSettings, ConfigError>;
    async fn clarification_rules(&self) -> Result<Vec<ClarificationRule>, ConfigError>;
    async fn sports_disambiguation(&self) -> Result<Vec<DisambiguationEntry>, ConfigError>;
    async fn device_rules(&self) -> Result<Vec<DeviceDisambiguationRule>, ConfigError>;
    async fn features(&self) -> Result<Vec<FeatureFlag>, ConfigError>;
    async fn llm_backends(&self) -> Result<Vec<LlmBackend>, ConfigError>;
}

/// The write half of the admin surface (spec §4.11): every mutation the
/// orchestrator's own admin HTTP surface forwards on to the admin-DB-backed
/// service. Split from `AdminApi` so read-only test doubles don't need to
/// grow write methods they never exercise.
#[async_trait]
pub trait AdminWriter: Send + Sync {
    async fn update_conversation_settings(&self, settings: &ConversationSettings) -> Result<(), ConfigError>;
    async fn update_clarification_settings(&self, settings: &ClarificationSettings) -> Result<(), ConfigError>;
    async fn upsert_clarification_rule(&self, rule: &ClarificationRule) -> Result<(), ConfigError>;
    async fn upsert_sports_team(&self, entry: &DisambiguationEntry) -> Result<(), ConfigError>;
    async fn delete_sports_team(&self, trigger_token: &str) -> Result<(), ConfigError>;
    async fn update_device_rule(&self, rule: &DeviceDisambiguationRule) -> Result<(), ConfigError>;
    async fn toggle_feature(&self, name: &str, enabled: bool) -> Result<(), ConfigError>;
    async fn upsert_llm_backend(&self, backend: &LlmBackend) -> Result<(), ConfigError>;
    async fn delete_llm_backend(&self, model_name: &str) -> Result<(), ConfigError>;
}

pub struct HttpAdminClient {
    client: reqwest::Client,
    config: AdminApiConfig,
}

impl HttpAdminClient {
    pub fn new(config: AdminApiConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .build()
            .map_err(|e| ConfigError::AdminUnavailable(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn request(&self, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.config.base_url, path);
        let builder = self.client.get(url);
        match &self.config.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ConfigError> {
        let response = self
            .request(path)
            .send()
            .await
            .map_err(|e| ConfigError::AdminUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ConfigError::AdminUnavailable(format!(
                "admin API returned {}",
                response.status()
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send_json<T: Serialize + Sync>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&T>,
    ) -> Result<(), ConfigError> {
        let url = format!("{}{}", self.config.base_url, path);
        let mut builder = self.authed(self.client.request(method, url));
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| ConfigError::AdminUnavailable(e.to_string()))?;
        if !response.status().is_success() {
            return Err(ConfigError::AdminUnavailable(format!(
                "admin API returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl AdminWriter for HttpAdminClient {
    async fn update_conversation_settings(&self, settings: &ConversationSettings) -> Result<(), ConfigError> {
        self.send_json(reqwest::Method::PUT, "/api/conversation/settings", Some(settings)).await
    }

    async fn update_clarification_settings(&self, settings: &ClarificationSettings) -> Result<(), ConfigError> {
        self.send_json(reqwest::Method::PUT, "/api/conversation/clarification", Some(settings)).await
    }

    async fn upsert_clarification_rule(&self, rule: &ClarificationRule) -> Result<(), ConfigError> {
        let path = format!("/api/conversation/clarification/types/{}", rule.kind);
        self.send_json(reqwest::Method::PUT, &path, Some(rule)).await
    }

    async fn upsert_sports_team(&self, entry: &DisambiguationEntry) -> Result<(), ConfigError> {
        self.send_json(reqwest::Method::POST, "/api/conversation/sports-teams", Some(entry)).await
    }

    async fn delete_sports_team(&self, trigger_token: &str) -> Result<(), ConfigError> {
        let path = format!("/api/conversation/sports-teams/{trigger_token}");
        self.send_json::<()>(reqwest::Method::DELETE, &path, None).await
    }

    async fn update_device_rule(&self, rule: &DeviceDisambiguationRule) -> Result<(), ConfigError> {
        let path = format!("/api/conversation/device-rules/{}", rule.device_kind);
        self.send_json(reqwest::Method::PUT, &path, Some(rule)).await
    }

    async fn toggle_feature(&self, name: &str, enabled: bool) -> Result<(), ConfigError> {
        #[derive(Serialize)]
        struct TogglePayload {
            enabled: bool,
        }
        let path = format!("/api/features/{name}/toggle");
        self.send_json(reqwest::Method::PUT, &path, Some(&TogglePayload { enabled })).await
    }

    async fn upsert_llm_backend(&self, backend: &LlmBackend) -> Result<(), ConfigError> {
        self.send_json(reqwest::Method::POST, "/api/llm-backends", Some(backend)).await
    }

    async fn delete_llm_backend(&self, model_name: &str) -> Result<(), ConfigError> {
        let path = format!("/api/llm-backends/model/{model_name}");
        self.send_json::<()>(reqwest::Method::DELETE, &path, None).await
    }
}

#[async_trait]
impl AdminApi for HttpAdminClient {
    async fn conversation_settings(&self) -> Result<ConversationSettings, ConfigError> {
        self.get_json("/api/conversation/settings").await
    }

    async fn clarification_settings(&self) -> Result<ClarificationSettings, ConfigError> {
        self.get_json("/api/conversation/clarification").await
    }

    async fn clarification_rules(&self) -> Result<Vec<ClarificationRule>, ConfigError> {
        self.get_json("/api/conversation/clarification/types").await
    }

    async fn sports_disambiguation(&self) -> Result<Vec<DisambiguationEntry>, ConfigError> {
        self.get_json("/api/conversation/sports-teams").await
    }

    async fn device_rules(&self) -> Result<Vec<DeviceDisambiguationRule>, ConfigError> {
        self.get_json("/api/conversation/device-rules").await
    }

    async fn features(&self) -> Result<Vec<FeatureFlag>, ConfigError> {
        self.get_json("/api/features").await
    }

    async fn llm_backends(&self) -> Result<Vec<LlmBackend>, ConfigError> {
        self.get_json("/api/llm-backends").await
    }
}
