use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session not found")]
    NotFound,
}

impl From<SessionError> for assistant_core::CoreError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound => assistant_core::CoreError::SessionExpired,
        }
    }
}
