//! The Intent Classifier (spec §4.3): wires pattern matching, compound-query
//! splitting, follow-up resolution and ambiguity signaling into one entry
//! point that produces a `Classification`.

use std::sync::Arc;

use assistant_config::ConfigLoader;
use assistant_core::{
    Classification, ClassificationMode, ClassifiedPart, Intent, IntentKind, ProposedClarification,
    SessionContext,
};

use crate::followup;
use crate::patterns;
use crate::splitter;

pub struct IntentClassifier {
    config: Arc<ConfigLoader>,
}

impl IntentClassifier {
    pub fn new(config: Arc<ConfigLoader>) -> Self {
        Self { config }
    }

    /// Classify a transcription in light of the session's prior turn.
    /// Follow-up resolution, if it applies, reclassifies the *expanded*
    /// form while the original text is kept for logging via `expanded_query`.
    pub async fn classify(&self, text: &str, context: &SessionContext) -> Classification {
        if let Some(intent) = followup::resolve_followup(text, context) {
            let part = self.signal_ambiguity(intent.clone(), text).await.unwrap_or(
                ClassifiedPart::Resolved {
                    text: text.to_string(),
                    intent,
                },
            );
            return Classification::single(text, part);
        }

        let segments = splitter::split_compound(text);
        if segments.len() <= 1 {
            let part = self.classify_segment(text).await;
            return Classification::single(text, part);
        }

        let mut parts = Vec::with_capacity(segments.len());
        for segment in &segments {
            parts.push(self.classify_segment(segment).await);
        }

        // If only one part yields a non-unknown intent, the split was noise
        // (e.g. a misdetected marker); collapse back to a single classification
        // over the original text.
        let resolved_count = parts.iter().filter(|p| !p.is_unknown()).count();
        if resolved_count <= 1 {
            let part = self.classify_segment(text).await;
            return Classification::single(text, part);
        }

        Classification {
            mode: ClassificationMode::Multi,
            parts,
            expanded_query: text.to_string(),
        }
    }

    async fn classify_segment(&self, segment: &str) -> ClassifiedPart {
        let intent = match patterns::match_category(segment) {
            Some((kind, _term)) => {
                let mut intent = Intent::new(kind);
                if let Some(timeframe) = patterns::extract_timeframe(segment) {
                    intent = intent.with_entity("timeframe", timeframe);
                }
                intent
            }
            None => Intent::new(IntentKind::Unknown),
        };

        if let Some(part) = self.signal_ambiguity(intent.clone(), segment).await {
            return part;
        }

        ClassifiedPart::Resolved {
            text: segment.to_string(),
            intent,
        }
    }

    /// Checks configured disambiguation rules against the resolved intent.
    /// Returns `Some(NeedsClarification(..))` when the match is ambiguous;
    /// `None` means the intent is executable as-is.
    async fn signal_ambiguity(&self, intent: Intent, original_query: &str) -> Option<ClassifiedPart> {
        if intent.kind == IntentKind::Sports {
            let entries = self.config.sports_disambiguation().await;
            let lowered = original_query.to_lowercase();
            for entry in entries {
                if lowered.contains(&entry.trigger_token.to_lowercase()) {
                    let options = entry
                        .options
                        .into_iter()
                        .map(|o| assistant_core::ClarificationOption { id: o.id, label: o.label })
                        .collect();
                    return Some(ClassifiedPart::NeedsClarification(ProposedClarification {
                        kind: "sports_team".to_string(),
                        original_query: original_query.to_string(),
                        original_intent: intent.kind,
                        options,
                    }));
                }
            }
        }

        if intent.kind == IntentKind::HomeControl {
            let rules = self.config.device_rules().await;
            let device_entity_count = intent.entities.iter().filter(|(k, _)| k == "device").count();
            for rule in rules {
                if device_entity_count == 0 || device_entity_count > rule.min_entities_to_ask {
                    let mut options = Vec::new();
                    if rule.include_all_option {
                        options.push(assistant_core::ClarificationOption {
                            id: "all".to_string(),
                            label: "All devices".to_string(),
                        });
                    }
                    return Some(ClassifiedPart::NeedsClarification(ProposedClarification {
                        kind: format!("device:{}", rule.device_kind),
                        original_query: original_query.to_string(),
                        original_intent: intent.kind,
                        options,
                    }));
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assistant_cache::InMemoryExternalStore;
    use assistant_config::admin_client::AdminApi;
    use assistant_core::{
        ClarificationRule, ClarificationSettings, ConversationSettings, DeviceDisambiguationRule,
        DisambiguationEntry, DisambiguationOption, FeatureFlag, LlmBackend,
    };
    use async_trait::async_trait;

    struct StubAdmin;

    #[async_trait]
    impl AdminApi for StubAdmin {
        async fn conversation_settings(&self) -> Result<ConversationSettings, assistant_config::ConfigError> {
            Ok(ConversationSettings::default())
        }
        async fn clarification_settings(&self) -> Result<ClarificationSettings, assistant_config::ConfigError> {
            Ok(ClarificationSettings::default())
        }
        async fn clarification_rules(&self) -> Result<Vec<ClarificationRule>, assistant_config::ConfigError> {
            Ok(Vec::new())
        }
        async fn sports_disambiguation(&self) -> Result<Vec<DisambiguationEntry>, assistant_config::ConfigError> {
            Ok(vec![DisambiguationEntry {
                trigger_token: "giants".to_string(),
                options: vec![
                    DisambiguationOption {
                        id: "sfg".to_string(),
                        label: "San Francisco Giants".to_string(),
                        sport: Some("baseball".to_string()),
                    },
                    DisambiguationOption {
                        id: "nyg".to_string(),
                        label: "New York Giants".to_string(),
                        sport: Some("football".to_string()),
                    },
                ],
            }])
        }
        async fn device_rules(&self) -> Result<Vec<DeviceDisambiguationRule>, assistant_config::ConfigError> {
            Ok(vec![DeviceDisambiguationRule {
                device_kind: "light".to_string(),
                min_entities_to_ask: 1,
                include_all_option: true,
            }])
        }
        async fn features(&self) -> Result<Vec<FeatureFlag>, assistant_config::ConfigError> {
            Ok(Vec::new())
        }
        async fn llm_backends(&self) -> Result<Vec<LlmBackend>, assistant_config::ConfigError> {
            Ok(Vec::new())
        }
    }

    fn classifier() -> IntentClassifier {
        let loader = ConfigLoader::new(Arc::new(StubAdmin), Arc::new(InMemoryExternalStore::new()), 300);
        IntentClassifier::new(Arc::new(loader))
    }

    #[tokio::test]
    async fn single_query_classifies_directly() {
        let c = classifier();
        let ctx = SessionContext::default();
        let result = c.classify("what time is it right now", &ctx).await;
        assert_eq!(result.mode, ClassificationMode::Single);
        match &result.parts[0] {
            ClassifiedPart::Resolved { intent, .. } => assert_eq!(intent.kind, IntentKind::TimeDate),
            _ => panic!("expected resolved part"),
        }
    }

    #[tokio::test]
    async fn compound_query_splits_into_multiple_parts() {
        let c = classifier();
        let ctx = SessionContext::default();
        let result = c
            .classify("what's the weather and what time is it right now", &ctx)
            .await;
        assert_eq!(result.mode, ClassificationMode::Multi);
        assert_eq!(result.parts.len(), 2);
    }

    #[tokio::test]
    async fn sports_trigger_token_requests_clarification() {
        let c = classifier();
        let ctx = SessionContext::default();
        let result = c.classify("what's the score for the giants game tonight", &ctx).await;
        match &result.parts[0] {
            ClassifiedPart::NeedsClarification(p) => assert_eq!(p.kind, "sports_team"),
            other => panic!("expected clarification, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn followup_reclassifies_against_session_context() {
        let c = classifier();
        let mut ctx = SessionContext::default();
        ctx.last_intent = Some(IntentKind::Weather);
        ctx.last_entities = vec![("location".to_string(), "seattle".to_string())];

        let result = c.classify("what about tomorrow", &ctx).await;
        match &result.parts[0] {
            ClassifiedPart::Resolved { intent, .. } => {
                assert_eq!(intent.kind, IntentKind::Weather);
                assert_eq!(intent.entity("timeframe"), Some("tomorrow"));
            }
            other => panic!("expected resolved part, got {other:?}"),
        }
    }
}
