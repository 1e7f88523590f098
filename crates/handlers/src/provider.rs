//! The generic fact-provider HTTP contract (spec §4.4; SPEC_FULL open
//! question 3): one configurable base URL + API key behind every
//! ground-truth handler, the concrete vendor chosen by configuration.

use std::time::Duration;

use assistant_config::FactProviderConfig;
use assistant_core::CoreError;
use reqwest::Client;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct FactResponse {
    answer: String,
}

#[derive(Clone)]
pub struct FactProviderClient {
    client: Client,
    config: FactProviderConfig,
}

impl FactProviderClient {
    pub fn new(config: FactProviderConfig) -> Self {
        Self { client: Client::new(), config }
    }

    /// Calls `{base_url}/v1/{category}` with the query text and extracted
    /// entities, retrying transient failures with exponential backoff.
    pub async fn fetch(&self, category: &str, query: &str, entities: &[(String, String)]) -> Result<String, CoreError> {
        const MAX_RETRIES: u32 = 2;
        let mut backoff = Duration::from_millis(100);
        let timeout = Duration::from_secs(self.config.timeout_seconds);

        let mut last_err = None;
        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                tracing::warn!(category, attempt, "fact provider call failed, retrying");
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }

            match self.try_once(category, query, entities, timeout).await {
                Ok(answer) => return Ok(answer),
                Err(err @ CoreError::UpstreamUnavailable(_)) => last_err = Some(err),
                Err(err) => return Err(err),
            }
        }

        Err(last_err.unwrap_or(CoreError::UpstreamUnavailable("retries exhausted".to_string())))
    }

    async fn try_once(
        &self,
        category: &str,
        query: &str,
        entities: &[(String, String)],
        timeout: Duration,
    ) -> Result<String, CoreError> {
        let mut request = self
            .client
            .get(format!("{}/v1/{category}", self.config.base_url))
            .query(&[("q", query)])
            .timeout(timeout);

        for (key, value) in entities {
            request = request.query(&[(key.as_str(), value.as_str())]);
        }
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CoreError::UpstreamUnavailable(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(CoreError::RateLimited(category.to_string()));
        }
        if response.status().is_server_error() {
            return Err(CoreError::UpstreamUnavailable(format!("server error {}", response.status())));
        }
        if !response.status().is_success() {
            return Err(CoreError::NotApplicable);
        }

        let parsed: FactResponse = response
            .json()
            .await
            .map_err(|e| CoreError::ParseFailed(e.to_string()))?;
        Ok(parsed.answer)
    }
}
