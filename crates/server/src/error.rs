//! Server-level error taxonomy — the thin layer between `CoreError`/
//! `ConfigError`/`SessionError` and an HTTP response, mirroring the
//! teacher's own `ServerError` → `StatusCode` mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("session not found")]
    SessionNotFound,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("request failed: {0}")]
    Pipeline(#[from] assistant_core::CoreError),

    #[error("admin backend error: {0}")]
    Admin(#[from] assistant_config::ConfigError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::SessionNotFound => StatusCode::NOT_FOUND,
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServerError::Pipeline(err) => match err {
                assistant_core::CoreError::DeadlineExceeded(_) => StatusCode::GATEWAY_TIMEOUT,
                assistant_core::CoreError::SessionExpired => StatusCode::NOT_FOUND,
                assistant_core::CoreError::ConfigUnavailable(_)
                | assistant_core::CoreError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ServerError::Admin(_) => StatusCode::BAD_GATEWAY,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }

        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
