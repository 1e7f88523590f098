//! The Orchestrator (spec §4.10): the state machine that drives a single
//! voice request from transcription through routing, clarification,
//! LLM fallback with validation, response merging and synthesis.

mod analytics;
mod error;
mod merge;
mod pipeline;
mod stt;
mod tts;

pub use analytics::{AnalyticsSink, AnalyticsSummary, InMemoryAnalyticsStore, TracingAnalyticsSink};
pub use error::IngressError;
pub use merge::merge_responses;
pub use pipeline::{Orchestrator, RequestInput, RequestOutput};
pub use stt::{SttClient, TranscriptionResult};
pub use tts::TtsClient;
