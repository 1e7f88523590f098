//! The Speech-to-Text egress client (spec §6: `POST /transcribe`).

use serde::Deserialize;

use assistant_core::Stage;

use crate::error::IngressError;

#[derive(Debug, Deserialize)]
pub struct TranscriptionResult {
    pub transcription: String,
    #[allow(dead_code)]
    pub latency_ms: u64,
    #[allow(dead_code)]
    pub model: String,
}

pub struct SttClient {
    client: reqwest::Client,
    base_url: String,
}

impl SttClient {
    pub fn new(base_url: String) -> Self {
        Self { client: reqwest::Client::new(), base_url }
    }

    pub async fn transcribe(&self, audio: Vec<u8>) -> Result<TranscriptionResult, IngressError> {
        let request = self.client.post(format!("{}/transcribe", self.base_url)).body(audio);
        let response = tokio::time::timeout(Stage::Gateway.default_timeout(), request.send())
            .await
            .map_err(|_| IngressError::Stt("transcription timed out".to_string()))?
            .map_err(|err| IngressError::Stt(err.to_string()))?;

        if !response.status().is_success() {
            return Err(IngressError::Stt(format!("status {}", response.status())));
        }

        response.json().await.map_err(|err| IngressError::Stt(format!("malformed response: {err}")))
    }
}
