//! The Text-to-Speech egress client (spec §6: `POST /synthesize`).

use serde::Serialize;

use assistant_core::Stage;

use crate::error::IngressError;

#[derive(Serialize)]
struct SynthesizeRequest<'a> {
    text: &'a str,
    voice_profile: &'a str,
    wake_word: &'a str,
}

pub struct TtsClient {
    client: reqwest::Client,
    base_url: String,
}

impl TtsClient {
    pub fn new(base_url: String) -> Self {
        Self { client: reqwest::Client::new(), base_url }
    }

    pub async fn synthesize(&self, text: &str, voice_profile: &str, wake_word: &str) -> Result<Vec<u8>, IngressError> {
        let request = self
            .client
            .post(format!("{}/synthesize", self.base_url))
            .json(&SynthesizeRequest { text, voice_profile, wake_word });

        let response = tokio::time::timeout(Stage::Tts.default_timeout(), request.send())
            .await
            .map_err(|_| IngressError::Tts("synthesis timed out".to_string()))?
            .map_err(|err| IngressError::Tts(err.to_string()))?;

        if !response.status().is_success() {
            return Err(IngressError::Tts(format!("status {}", response.status())));
        }

        response.bytes().await.map(|b| b.to_vec()).map_err(|err| IngressError::Tts(err.to_string()))
    }
}
