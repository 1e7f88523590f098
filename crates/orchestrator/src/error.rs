use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngressError {
    #[error("speech-to-text service unavailable: {0}")]
    Stt(String),
    #[error("text-to-speech service unavailable: {0}")]
    Tts(String),
}

impl From<IngressError> for assistant_core::CoreError {
    fn from(err: IngressError) -> Self {
        assistant_core::CoreError::UpstreamUnavailable(err.to_string())
    }
}
