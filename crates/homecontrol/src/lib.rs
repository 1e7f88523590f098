//! Home-Control Function-Call Extraction and dispatch (spec §4.6).
//!
//! `home_control` intents skip the LLM entirely: the extractor turns the
//! classified text into a concrete device call, the client sends it to the
//! control plane, and failure or ambiguity escalates to clarification
//! instead of falling through to a language model.

mod client;
mod error;
mod extractor;

pub use client::HomeControlClient;
pub use error::HomeControlError;
pub use extractor::{extract, DeviceCall, ExtractionOutcome};

use assistant_core::{DeviceDisambiguationRule, ProposedClarification};

/// The result of attempting to service a home-control request end to end.
pub enum HomeControlResult {
    Answered(String),
    NeedsClarification(ProposedClarification),
}

/// Extract a device call from `text` and send it to the control plane.
/// This is the single entry point the orchestrator calls for
/// `home_control`-tagged intents.
pub async fn dispatch(
    client: &HomeControlClient,
    text: &str,
    zone: &str,
    device_rules: &[DeviceDisambiguationRule],
) -> Result<HomeControlResult, HomeControlError> {
    match extract(text, zone, device_rules) {
        ExtractionOutcome::NeedsClarification(proposed) => Ok(HomeControlResult::NeedsClarification(proposed)),
        ExtractionOutcome::Call(call) => {
            let acknowledgement = client.send(&call).await?;
            Ok(HomeControlResult::Answered(acknowledgement))
        }
    }
}
