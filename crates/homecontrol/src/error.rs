use thiserror::Error;

#[derive(Debug, Error)]
pub enum HomeControlError {
    #[error("control plane unavailable: {0}")]
    Unavailable(String),
    #[error("control plane rejected the command: {0}")]
    Rejected(String),
}

impl From<HomeControlError> for assistant_core::CoreError {
    fn from(err: HomeControlError) -> Self {
        assistant_core::CoreError::UpstreamUnavailable(err.to_string())
    }
}
