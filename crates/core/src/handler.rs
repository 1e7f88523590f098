//! The shared contract every cascade path (facade handler, function-call
//! client, LLM fallback) implements (spec §4.4).

use async_trait::async_trait;

use crate::error::CoreError;
use crate::intent::Intent;
use crate::session::SessionContext;

/// A handler's successful outcome: either a speakable answer, or a typed
/// absence meaning "I don't know — escalate to the next path".
#[derive(Debug, Clone)]
pub enum HandlerOutcome {
    Answered(String),
    Declined,
}

impl HandlerOutcome {
    pub fn into_option(self) -> Option<String> {
        match self {
            HandlerOutcome::Answered(text) => Some(text),
            HandlerOutcome::Declined => None,
        }
    }
}

pub type HandlerResult = Result<HandlerOutcome, CoreError>;

/// Input common to every handler invocation.
#[derive(Debug, Clone)]
pub struct HandlerInput<'a> {
    pub intent: &'a Intent,
    pub zone: &'a str,
    pub context: &'a SessionContext,
}

/// The uniform contract every facade/function-call handler implements
/// (spec §4.4): cache lookup, bounded external call with retries, typed
/// absence on failure, cache write on success, no session mutation.
#[async_trait]
pub trait FacadeHandler: Send + Sync {
    /// The category this handler answers for.
    fn category(&self) -> &'static str;

    async fn handle(&self, input: HandlerInput<'_>) -> HandlerResult;
}
