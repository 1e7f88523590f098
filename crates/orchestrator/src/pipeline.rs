//! The request state machine (spec §4.10):
//!
//! ```text
//! Start → ResolveSession → TranscribeAudio → ClassifyIntent
//!       → (NeedsClarification? → EmitClarificationPrompt → Done)
//!       → ForEachIntentPart: RouteAndExecute
//!       → MergeResponses → UpdateContext → Synthesize → Done
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;

use assistant_cache::CacheTier;
use assistant_config::ConfigLoader;
use assistant_core::config_model::feature_names;
use assistant_core::{
    ClassifiedPart, CoreError, FacadeHandler, HandlerInput, HandlerOutcome, Intent, IntentKind, LatencyBreakdown,
    ProposedClarification, Role, SessionContext, SessionContextUpdate, Stage, DEFAULT_REQUEST_DEADLINE,
};
use assistant_handlers::ResponseValidator;
use assistant_homecontrol::{HomeControlClient, HomeControlResult};
use assistant_llm::{build_prompt, LlmRouter};
use assistant_session::SessionStore;

use crate::analytics::AnalyticsSink;
use crate::merge::merge_responses;
use crate::stt::SttClient;
use crate::tts::TtsClient;

/// The model name requested when the caller has no per-request override.
/// `ConfigLoader::llm_backend` falls back to `LlmBackend::documented_default`
/// when no admin row names it (spec §4.7).
const DEFAULT_LLM_MODEL: &str = "default";
const LOW_TEMPERATURE_REGENERATE: f32 = 0.1;
const SYSTEM_PROMPT: &str = "You are a helpful voice assistant. Answer concisely and factually.";

pub struct RequestInput {
    pub session_id: Option<String>,
    pub audio: Option<Vec<u8>>,
    pub text: Option<String>,
    pub zone: String,
    pub voice_profile: String,
    pub wake_word: String,
    pub want_audio: bool,
}

pub struct RequestOutput {
    pub session_id: String,
    pub text: String,
    pub audio: Option<Vec<u8>>,
    pub latency: LatencyBreakdown,
    /// The primary (first-part) intent this request resolved to, for the
    /// ingress response's `intent`/`confidence` fields (spec §6). `None`
    /// when the response is a clarification prompt with no resolved intent.
    pub intent: Option<IntentKind>,
    pub confidence: Option<f32>,
}

enum PartOutcome {
    Text(String),
    Clarification(ProposedClarification),
}

pub struct Orchestrator {
    config: Arc<ConfigLoader>,
    sessions: Arc<SessionStore>,
    classifier: assistant_classifier::IntentClassifier,
    handlers: HashMap<&'static str, Arc<dyn FacadeHandler>>,
    llm: Arc<LlmRouter>,
    validator: ResponseValidator,
    homecontrol_client: Arc<HomeControlClient>,
    stt: SttClient,
    tts: TtsClient,
    analytics: Arc<dyn AnalyticsSink>,
    cache: Arc<CacheTier>,
}

impl Orchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Arc<ConfigLoader>,
        sessions: Arc<SessionStore>,
        handlers: HashMap<&'static str, Arc<dyn FacadeHandler>>,
        llm: Arc<LlmRouter>,
        homecontrol_client: Arc<HomeControlClient>,
        stt: SttClient,
        tts: TtsClient,
        analytics: Arc<dyn AnalyticsSink>,
        cache: Arc<CacheTier>,
    ) -> Self {
        Self {
            classifier: assistant_classifier::IntentClassifier::new(config.clone()),
            config,
            sessions,
            handlers,
            llm,
            validator: ResponseValidator::new(),
            homecontrol_client,
            stt,
            tts,
            analytics,
            cache,
        }
    }

    pub async fn handle_request(&self, input: RequestInput) -> Result<RequestOutput, CoreError> {
        match tokio::time::timeout(DEFAULT_REQUEST_DEADLINE, self.run(input)).await {
            Ok(result) => result,
            Err(_) => Err(CoreError::DeadlineExceeded(DEFAULT_REQUEST_DEADLINE)),
        }
    }

    async fn run(&self, input: RequestInput) -> Result<RequestOutput, CoreError> {
        let mut latency = LatencyBreakdown::default();
        let (session_id, is_new) = self.sessions.get_or_create(input.session_id.as_deref()).await;
        if is_new {
            self.analytics.emit(assistant_core::AnalyticsEvent::new(
                assistant_core::EventKind::SessionCreated,
                session_id.clone(),
                Utc::now(),
            ));
        }

        let raw_text = self.transcribe_if_needed(&input, &mut latency).await?;
        let context = self.sessions.context(&session_id).unwrap_or_default();

        if let Some(mut pending) = context.pending_clarification.clone() {
            match assistant_clarify::resolve(&mut pending, &raw_text, Utc::now()) {
                assistant_clarify::ResolveOutcome::Resolved(intent) => {
                    self.sessions.clear_pending_clarification(&session_id).await.ok();
                    self.analytics.emit(assistant_core::AnalyticsEvent::new(
                        assistant_core::EventKind::ClarificationResolved,
                        session_id.clone(),
                        Utc::now(),
                    ));
                    let outcome = self.route_and_execute(&raw_text, &intent, &input.zone, &context, &session_id).await?;
                    return self.finish(session_id, vec![outcome], &input, latency, Some(intent)).await;
                }
                assistant_clarify::ResolveOutcome::Retry => {
                    let prompt = assistant_clarify::prompt_for(&pending);
                    self.sessions.set_pending_clarification(&session_id, pending).await.ok();
                    return self.finish(session_id, vec![PartOutcome::Text(prompt)], &input, latency, None).await;
                }
                assistant_clarify::ResolveOutcome::GivenUp | assistant_clarify::ResolveOutcome::Expired => {
                    self.sessions.clear_pending_clarification(&session_id).await.ok();
                    self.analytics.emit(assistant_core::AnalyticsEvent::new(
                        assistant_core::EventKind::ClarificationTimeout,
                        session_id.clone(),
                        Utc::now(),
                    ));
                }
            }
        }

        let classify_start = Instant::now();
        let classification = self.classifier.classify(&raw_text, &context).await;
        latency.record(Stage::IntentClassification, classify_start.elapsed());

        for part in &classification.parts {
            if let ClassifiedPart::NeedsClarification(proposed) = part {
                return self.raise_clarification(session_id, proposed.clone(), &input, latency, None).await;
            }
        }

        let resolved: Vec<(String, Intent)> = classification
            .parts
            .into_iter()
            .filter_map(|p| match p {
                ClassifiedPart::Resolved { text, intent } => Some((text, intent)),
                ClassifiedPart::NeedsClarification(_) => None,
            })
            .collect();

        let handler_start = Instant::now();
        let outcomes = futures::future::join_all(
            resolved
                .iter()
                .map(|(text, intent)| self.route_and_execute(text, intent, &input.zone, &context, &session_id)),
        )
        .await;
        latency.record(Stage::RagLookup, handler_start.elapsed());

        let mut parts = Vec::with_capacity(outcomes.len());
        for (outcome, (_, intent)) in outcomes.into_iter().zip(resolved.iter()) {
            match outcome {
                Ok(part) => parts.push(part),
                Err(err) => {
                    tracing::warn!(category = intent.kind.category(), %err, "part execution failed outright");
                    parts.push(PartOutcome::Text(
                        "I wasn't able to find an answer for part of that.".to_string(),
                    ));
                }
            }
        }

        if let Some(last) = resolved.last() {
            let update = SessionContextUpdate {
                last_intent: Some(last.1.kind),
                last_entities: Some(last.1.entities.clone()),
            };
            self.sessions.set_context(&session_id, update).await.ok();
        }

        let primary = resolved.into_iter().next().map(|(_, intent)| intent);
        self.finish(session_id, parts, &input, latency, primary).await
    }

    async fn transcribe_if_needed(
        &self,
        input: &RequestInput,
        latency: &mut LatencyBreakdown,
    ) -> Result<String, CoreError> {
        if let Some(audio) = input.audio.clone() {
            let t0 = Instant::now();
            let result = self.stt.transcribe(audio).await.map_err(CoreError::from)?;
            latency.record(Stage::Gateway, t0.elapsed());
            Ok(result.transcription)
        } else {
            Ok(input.text.clone().unwrap_or_default())
        }
    }

    async fn raise_clarification(
        &self,
        session_id: String,
        proposed: ProposedClarification,
        input: &RequestInput,
        latency: LatencyBreakdown,
        fallback_primary: Option<Intent>,
    ) -> Result<RequestOutput, CoreError> {
        let original_intent = proposed.original_intent;
        let rules = self.config.clarification_rules().await;
        let settings = self.config.clarification_settings().await;
        let rule = assistant_clarify::select_rule(&rules, &proposed.kind).cloned();
        let pending = assistant_clarify::raise(proposed, rule.as_ref(), &settings, Utc::now());
        let prompt = assistant_clarify::prompt_for(&pending);
        self.sessions.set_pending_clarification(&session_id, pending).await.ok();
        self.analytics.emit(assistant_core::AnalyticsEvent::new(
            assistant_core::EventKind::ClarificationTriggered,
            session_id.clone(),
            Utc::now(),
        ));
        let primary = fallback_primary.or_else(|| Some(Intent::new(original_intent)));
        self.finish(session_id, vec![PartOutcome::Text(prompt)], input, latency, primary).await
    }

    async fn route_and_execute(
        &self,
        text: &str,
        intent: &Intent,
        zone: &str,
        context: &SessionContext,
        session_id: &str,
    ) -> Result<PartOutcome, CoreError> {
        // RouteAndExecute step 1: cache lookup, gated on `redis_caching`, ahead
        // of function-calling and facade dispatch (spec §4.10).
        let cache_slot = if self.config.is_feature_enabled(feature_names::REDIS_CACHING).await {
            assistant_handlers::cache_category_for(intent.kind).map(|category| {
                (category, assistant_cache::normalize_key(intent.kind, text, &intent.entities))
            })
        } else {
            None
        };

        if let Some((category, key)) = &cache_slot {
            if let Some(cached) = self.cache.get(*category, key).await {
                self.emit_cache_outcome(session_id, true);
                return Ok(PartOutcome::Text(cached));
            }
            self.emit_cache_outcome(session_id, false);
        }

        let outcome = self.route_and_execute_uncached(text, intent, zone, context, session_id).await?;

        if let (Some((category, key)), PartOutcome::Text(answer)) = (&cache_slot, &outcome) {
            self.cache.set(*category, key, answer).await;
        }

        Ok(outcome)
    }

    async fn route_and_execute_uncached(
        &self,
        text: &str,
        intent: &Intent,
        zone: &str,
        context: &SessionContext,
        session_id: &str,
    ) -> Result<PartOutcome, CoreError> {
        if intent.kind == IntentKind::HomeControl && self.config.is_feature_enabled(feature_names::FUNCTION_CALLING).await {
            let device_rules = self.config.device_rules().await;
            match assistant_homecontrol::dispatch(&self.homecontrol_client, text, zone, &device_rules).await {
                Ok(HomeControlResult::Answered(ack)) => {
                    self.emit_handler_selected(session_id, "home_control");
                    return Ok(PartOutcome::Text(ack));
                }
                Ok(HomeControlResult::NeedsClarification(proposed)) => {
                    return Ok(PartOutcome::Clarification(proposed));
                }
                Err(err) => {
                    tracing::warn!(%err, "home control dispatch failed, falling back to LLM");
                    self.emit_fallback_invoked(session_id, "home_control");
                }
            }
        } else if let Some(handler) = self.handlers.get(intent.kind.category()) {
            if self.config.is_feature_enabled(feature_names::ENABLE_FACADE).await {
                let handler_input = HandlerInput { intent, zone, context };
                match handler.handle(handler_input).await {
                    Ok(HandlerOutcome::Answered(text)) => {
                        self.emit_handler_selected(session_id, intent.kind.category());
                        return Ok(PartOutcome::Text(text));
                    }
                    Ok(HandlerOutcome::Declined) => {
                        self.emit_fallback_invoked(session_id, intent.kind.category());
                    }
                    Err(err) if err.is_cascade_recoverable() => {
                        tracing::warn!(category = intent.kind.category(), %err, "handler failed, falling back to LLM");
                        self.emit_fallback_invoked(session_id, intent.kind.category());
                    }
                    Err(err) => return Err(err),
                }
            }
        }

        self.llm_answer(text, intent, zone, context, session_id).await
    }

    async fn llm_answer(
        &self,
        text: &str,
        intent: &Intent,
        zone: &str,
        context: &SessionContext,
        session_id: &str,
    ) -> Result<PartOutcome, CoreError> {
        let history = if self.config.is_feature_enabled(feature_names::CONVERSATION_CONTEXT).await {
            let settings = self.config.conversation_settings().await;
            self.sessions.history(session_id, settings.max_llm_history_messages).unwrap_or_default()
        } else {
            Vec::new()
        };

        let history_len = history.len();
        let messages = build_prompt(SYSTEM_PROMPT, &history, history_len, text);
        let result = self.llm.generate(DEFAULT_LLM_MODEL, &messages, None).await?;
        let mut answer = result.text;

        if self.config.is_feature_enabled(feature_names::ENABLE_VALIDATION).await && intent.kind.has_ground_truth() {
            if let Some(handler) = self.handlers.get(intent.kind.category()) {
                let handler_input = HandlerInput { intent, zone, context };
                let outcome = self.validator.validate(handler.as_ref(), handler_input, &answer).await;
                if let assistant_handlers::ValidationOutcome::Inconsistent { ground_truth } = outcome {
                    self.analytics.emit(
                        assistant_core::AnalyticsEvent::new(
                            assistant_core::EventKind::HallucinationDetected,
                            session_id.to_string(),
                            Utc::now(),
                        )
                        .with_metadata(serde_json::json!({
                            "category": intent.kind.category(),
                            "ground_truth": ground_truth.clone(),
                        })),
                    );
                    let regen_messages = build_prompt(SYSTEM_PROMPT, &history, history_len, text);
                    if let Ok(regenerated) =
                        self.llm.generate(DEFAULT_LLM_MODEL, &regen_messages, Some(LOW_TEMPERATURE_REGENERATE)).await
                    {
                        let handler_input = HandlerInput { intent, zone, context };
                        let recheck = self.validator.validate(handler.as_ref(), handler_input, &regenerated.text).await;
                        answer = match recheck {
                            assistant_handlers::ValidationOutcome::Inconsistent { .. } => ground_truth,
                            assistant_handlers::ValidationOutcome::Consistent
                            | assistant_handlers::ValidationOutcome::GroundTruthUnavailable => regenerated.text,
                        };
                    } else {
                        answer = ground_truth;
                    }
                }
            }
        }

        Ok(PartOutcome::Text(answer))
    }

    async fn finish(
        &self,
        session_id: String,
        parts: Vec<PartOutcome>,
        input: &RequestInput,
        mut latency: LatencyBreakdown,
        primary: Option<Intent>,
    ) -> Result<RequestOutput, CoreError> {
        if let Some(clarification) = parts.iter().find_map(|p| match p {
            PartOutcome::Clarification(proposed) => Some(proposed.clone()),
            PartOutcome::Text(_) => None,
        }) {
            return Box::pin(self.raise_clarification(session_id, clarification, input, latency, primary)).await;
        }

        let texts: Vec<String> = parts
            .into_iter()
            .map(|p| match p {
                PartOutcome::Text(text) => text,
                PartOutcome::Clarification(_) => unreachable!("filtered above"),
            })
            .collect();
        let merged = merge_responses(&texts);

        self.sessions.append(&session_id, Role::Assistant, merged.clone(), None, vec![]).await.ok();

        let audio = if input.want_audio {
            let t0 = Instant::now();
            let bytes = self.tts.synthesize(&merged, &input.voice_profile, &input.wake_word).await.map_err(CoreError::from)?;
            latency.record(Stage::Tts, t0.elapsed());
            Some(bytes)
        } else {
            None
        };

        self.analytics.emit(assistant_core::AnalyticsEvent::new(
            assistant_core::EventKind::RequestCompleted,
            session_id.clone(),
            Utc::now(),
        ));

        let (intent, confidence) = match primary {
            Some(intent) => (Some(intent.kind), Some(intent.confidence)),
            None => (None, None),
        };

        Ok(RequestOutput { session_id, text: merged, audio, latency, intent, confidence })
    }

    fn emit_handler_selected(&self, session_id: &str, category: &str) {
        self.analytics.emit(
            assistant_core::AnalyticsEvent::new(assistant_core::EventKind::HandlerSelected, session_id.to_string(), Utc::now())
                .with_metadata(serde_json::json!({ "category": category })),
        );
    }

    fn emit_fallback_invoked(&self, session_id: &str, category: &str) {
        self.analytics.emit(
            assistant_core::AnalyticsEvent::new(assistant_core::EventKind::FallbackInvoked, session_id.to_string(), Utc::now())
                .with_metadata(serde_json::json!({ "category": category })),
        );
    }

    fn emit_cache_outcome(&self, session_id: &str, hit: bool) {
        let kind = if hit { assistant_core::EventKind::CacheHit } else { assistant_core::EventKind::CacheMiss };
        self.analytics.emit(assistant_core::AnalyticsEvent::new(kind, session_id.to_string(), Utc::now()));
    }
}
