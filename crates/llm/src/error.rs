use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("network error: {0}")]
    Network(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("request timed out")]
    Timeout,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for assistant_core::CoreError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Network(msg) | LlmError::Api(msg) => assistant_core::CoreError::UpstreamUnavailable(msg),
            LlmError::Timeout => assistant_core::CoreError::UpstreamUnavailable("timeout".to_string()),
            LlmError::InvalidResponse(msg) => assistant_core::CoreError::ParseFailed(msg),
            LlmError::Configuration(msg) => assistant_core::CoreError::InternalInvariantViolated(msg),
        }
    }
}
