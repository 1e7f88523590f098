//! The static-data handler (spec §4.4): deterministic strings for
//! address/neighborhood/parking/transit/airport-static queries. No cache,
//! no external call — the answer is a function of the entities alone.

use async_trait::async_trait;

use assistant_core::{FacadeHandler, HandlerInput, HandlerOutcome, HandlerResult, IntentKind};

pub struct StaticHandler;

impl StaticHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StaticHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FacadeHandler for StaticHandler {
    fn category(&self) -> &'static str {
        IntentKind::Static.category()
    }

    async fn handle(&self, input: HandlerInput<'_>) -> HandlerResult {
        if input.intent.kind != IntentKind::Static {
            return Ok(HandlerOutcome::Declined);
        }

        let topic = input.intent.entity("topic");
        let location = input.intent.entity("location");

        let answer = match (topic, location) {
            (Some(topic), Some(location)) => {
                format!("Here's the {topic} information for {location}: please check the posted signage on site.")
            }
            (Some(topic), None) => format!("I don't have a specific location for the {topic} lookup you asked about."),
            _ => "I don't have that static information on file.".to_string(),
        };

        Ok(HandlerOutcome::Answered(answer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assistant_core::{Intent, SessionContext};

    #[tokio::test]
    async fn answers_deterministically_from_entities() {
        let handler = StaticHandler::new();
        let intent = Intent::new(IntentKind::Static)
            .with_entity("topic", "parking")
            .with_entity("location", "the stadium");
        let context = SessionContext::default();
        let input = HandlerInput { intent: &intent, zone: "living_room", context: &context };

        let outcome = handler.handle(input).await.unwrap();
        match outcome {
            HandlerOutcome::Answered(text) => assert!(text.contains("parking")),
            HandlerOutcome::Declined => panic!("expected an answer"),
        }
    }

    #[tokio::test]
    async fn declines_non_static_intents() {
        let handler = StaticHandler::new();
        let intent = Intent::new(IntentKind::Weather);
        let context = SessionContext::default();
        let input = HandlerInput { intent: &intent, zone: "living_room", context: &context };

        let outcome = handler.handle(input).await.unwrap();
        assert!(matches!(outcome, HandlerOutcome::Declined));
    }
}
