//! LLM Router (spec §4.7): backend-type dispatch (primary/alternate/auto),
//! prompt assembly from session history, and rolling performance metrics.

mod error;
mod ollama;
mod prompt;
mod router;

pub use error::LlmError;
pub use ollama::{FinishReason, GenerationParams, GenerationResult};
pub use prompt::{build_prompt, ChatMessage, ChatRole};
pub use router::LlmRouter;
