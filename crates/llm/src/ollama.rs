//! Ollama-compatible chat transport, grounded on the same retry/backoff
//! shape used elsewhere in this codebase for transient upstream failures.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::prompt::ChatMessage;

#[derive(Debug, Clone)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: usize,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub text: String,
    pub tokens: usize,
    pub total_time_ms: u64,
    pub tokens_per_second: f64,
    pub finish_reason: FinishReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
}

#[derive(Clone)]
pub struct OllamaTransport {
    client: Client,
}

impl OllamaTransport {
    pub fn new() -> Result<Self, LlmError> {
        let client = Client::builder()
            .build()
            .map_err(|e| LlmError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Single attempt with up to two retries on a retryable (network/timeout)
    /// failure, exponential backoff starting at 100ms.
    pub async fn generate(
        &self,
        endpoint: &str,
        model: &str,
        messages: &[ChatMessage],
        params: &GenerationParams,
    ) -> Result<GenerationResult, LlmError> {
        const MAX_RETRIES: u32 = 2;
        let mut backoff = Duration::from_millis(100);
        let mut last_error = None;

        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                tracing::warn!(attempt, ?backoff, "LLM request failed, retrying");
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }

            match self.execute(endpoint, model, messages, params).await {
                Ok(result) => return Ok(result),
                Err(e @ (LlmError::Network(_) | LlmError::Timeout)) => last_error = Some(e),
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or(LlmError::Timeout))
    }

    async fn execute(
        &self,
        endpoint: &str,
        model: &str,
        messages: &[ChatMessage],
        params: &GenerationParams,
    ) -> Result<GenerationResult, LlmError> {
        let start = Instant::now();
        let request = OllamaChatRequest {
            model: model.to_string(),
            messages: messages.iter().map(OllamaMessage::from).collect(),
            stream: false,
            options: OllamaOptions {
                temperature: params.temperature,
                num_predict: params.max_tokens as i32,
            },
        };

        let response = tokio::time::timeout(
            params.timeout,
            self.client.post(format!("{endpoint}/api/chat")).json(&request).send(),
        )
        .await
        .map_err(|_| LlmError::Timeout)??;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            if status.is_server_error() {
                return Err(LlmError::Network(format!("server error {status}: {body}")));
            }
            return Err(LlmError::Api(body));
        }

        let parsed: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let total_time_ms = start.elapsed().as_millis() as u64;
        let tokens = parsed.eval_count.unwrap_or(0) as usize;
        let tokens_per_second = if total_time_ms > 0 {
            tokens as f64 / (total_time_ms as f64 / 1000.0)
        } else {
            0.0
        };

        Ok(GenerationResult {
            text: parsed.message.content,
            tokens,
            total_time_ms,
            tokens_per_second,
            finish_reason: if parsed.done { FinishReason::Stop } else { FinishReason::Length },
        })
    }
}

#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

impl From<&ChatMessage> for OllamaMessage {
    fn from(msg: &ChatMessage) -> Self {
        let role = match msg.role {
            crate::prompt::ChatRole::System => "system",
            crate::prompt::ChatRole::User => "user",
            crate::prompt::ChatRole::Assistant => "assistant",
        };
        Self { role: role.to_string(), content: msg.content.clone() }
    }
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: i32,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
    done: bool,
    #[serde(default)]
    eval_count: Option<u64>,
}
