//! Error taxonomy shared by every crate in the workspace (spec §7).

use thiserror::Error;

/// The canonical error taxonomy for the orchestration core.
///
/// Each stage of the pipeline produces one of these. Most variants are
/// recovered locally by escalating to the next path in a cascade; only
/// `DeadlineExceeded` (with no partial answer) and `InternalInvariantViolated`
/// are fatal for a request.
#[derive(Error, Debug, Clone)]
pub enum CoreError {
    #[error("configuration unavailable: {0}")]
    ConfigUnavailable(String),

    #[error("upstream service unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("failed to parse response from {0}")]
    ParseFailed(String),

    #[error("handler declines: not applicable")]
    NotApplicable,

    #[error("hallucination detected in LLM answer for category {0}")]
    HallucinationDetected(String),

    #[error("clarification required")]
    ClarificationRequired,

    #[error("session expired")]
    SessionExpired,

    #[error("deadline exceeded after {0:?}")]
    DeadlineExceeded(std::time::Duration),

    #[error("internal invariant violated: {0}")]
    InternalInvariantViolated(String),
}

impl CoreError {
    /// Whether this error should trigger escalation to the next path in a
    /// handler cascade (cache -> function-call -> facade -> LLM -> fallback).
    pub fn is_cascade_recoverable(&self) -> bool {
        matches!(
            self,
            CoreError::NotApplicable
                | CoreError::UpstreamUnavailable(_)
                | CoreError::RateLimited(_)
                | CoreError::ParseFailed(_)
        )
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
