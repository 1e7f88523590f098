//! The shared cascade every data-backed facade handler runs (spec §4.4):
//! cache lookup, then a bounded-retry external call, then the typed
//! absence. One generic type serves every ground-truth/fact-lookup
//! category; the category label and cache bucket are the only per-handler
//! configuration (SPEC_FULL open question 3).

use std::sync::Arc;

use async_trait::async_trait;

use assistant_cache::{normalize_key, CacheTier};
use assistant_core::{CacheCategory, CoreError, FacadeHandler, HandlerInput, HandlerOutcome, HandlerResult, IntentKind};

use crate::provider::FactProviderClient;
use crate::rate_limit::DailyBudgetTracker;

/// Maps a fact-lookup `IntentKind` to its cache bucket. Categories with no
/// ground-truth handler (time/date, transportation, entertainment,
/// home-control) return `None` and are never registered as a `FactHandler`.
pub fn cache_category_for(kind: IntentKind) -> Option<CacheCategory> {
    match kind {
        IntentKind::Weather => Some(CacheCategory::Weather),
        IntentKind::Events => Some(CacheCategory::Events),
        IntentKind::Streaming => Some(CacheCategory::Streaming),
        IntentKind::News => Some(CacheCategory::News),
        IntentKind::Stocks => Some(CacheCategory::Stock),
        IntentKind::WebSearch => Some(CacheCategory::WebSearch),
        IntentKind::Sports => Some(CacheCategory::Sports),
        IntentKind::Finance => Some(CacheCategory::Finance),
        IntentKind::Flights => Some(CacheCategory::Flights),
        IntentKind::Location => Some(CacheCategory::Location),
        _ => None,
    }
}

pub struct FactHandler {
    kind: IntentKind,
    cache_category: CacheCategory,
    cache: Arc<CacheTier>,
    provider: Arc<FactProviderClient>,
    budget: Arc<DailyBudgetTracker>,
    daily_budget: u32,
    fallback_message: String,
}

impl FactHandler {
    pub fn new(
        kind: IntentKind,
        cache: Arc<CacheTier>,
        provider: Arc<FactProviderClient>,
        budget: Arc<DailyBudgetTracker>,
        daily_budget: u32,
    ) -> Option<Self> {
        let cache_category = cache_category_for(kind)?;
        Some(Self {
            kind,
            cache_category,
            cache,
            provider,
            budget,
            daily_budget,
            fallback_message: format!(
                "I've reached my lookup limit for {} right now — try again later.",
                kind.category().replace('_', " ")
            ),
        })
    }
}

#[async_trait]
impl FacadeHandler for FactHandler {
    fn category(&self) -> &'static str {
        self.kind.category()
    }

    async fn handle(&self, input: HandlerInput<'_>) -> HandlerResult {
        if input.intent.kind != self.kind {
            return Ok(HandlerOutcome::Declined);
        }

        let query = input
            .intent
            .entities
            .iter()
            .map(|(k, v)| format!("{k}:{v}"))
            .collect::<Vec<_>>()
            .join(" ");
        let key = normalize_key(self.kind, &query, &input.intent.entities);

        if let Some(cached) = self.cache.get(self.cache_category, &key).await {
            return Ok(HandlerOutcome::Answered(cached));
        }

        if self.budget.record_and_check(self.kind.category(), self.daily_budget) {
            tracing::warn!(category = self.kind.category(), "daily fact-provider budget exceeded");
            return Ok(HandlerOutcome::Answered(self.fallback_message.clone()));
        }

        match self
            .provider
            .fetch(self.kind.category(), &query, &input.intent.entities)
            .await
        {
            Ok(answer) => {
                self.cache.set(self.cache_category, &key, &answer).await;
                Ok(HandlerOutcome::Answered(answer))
            }
            Err(CoreError::NotApplicable) => Ok(HandlerOutcome::Declined),
            Err(other) => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assistant_cache::{InMemoryExternalStore, NullDiskStore};
    use assistant_config::FactProviderConfig;
    use assistant_core::{Intent, SessionContext};

    fn handler(kind: IntentKind) -> FactHandler {
        let cache = Arc::new(CacheTier::new(64, Arc::new(InMemoryExternalStore::new()), Arc::new(NullDiskStore)));
        let provider = Arc::new(FactProviderClient::new(FactProviderConfig::default()));
        let budget = Arc::new(DailyBudgetTracker::new());
        FactHandler::new(kind, cache, provider, budget, 10_000).expect("weather has ground truth")
    }

    #[tokio::test]
    async fn declines_when_intent_kind_does_not_match() {
        let h = handler(IntentKind::Weather);
        let intent = Intent::new(IntentKind::Sports);
        let context = SessionContext::default();
        let input = HandlerInput { intent: &intent, zone: "kitchen", context: &context };
        let outcome = h.handle(input).await.unwrap();
        assert!(matches!(outcome, HandlerOutcome::Declined));
    }

    #[tokio::test]
    async fn cache_hit_short_circuits_without_calling_provider() {
        let h = handler(IntentKind::Weather);
        let intent = Intent::new(IntentKind::Weather).with_entity("location", "seattle");
        let key = normalize_key(IntentKind::Weather, "location:seattle", &intent.entities);
        h.cache.set(CacheCategory::Weather, &key, "72 and sunny").await;

        let context = SessionContext::default();
        let input = HandlerInput { intent: &intent, zone: "kitchen", context: &context };
        let outcome = h.handle(input).await.unwrap();
        match outcome {
            HandlerOutcome::Answered(text) => assert_eq!(text, "72 and sunny"),
            HandlerOutcome::Declined => panic!("expected cached answer"),
        }
    }

    #[test]
    fn non_ground_truth_categories_have_no_cache_bucket() {
        assert!(cache_category_for(IntentKind::TimeDate).is_none());
        assert!(cache_category_for(IntentKind::Transportation).is_none());
        assert!(cache_category_for(IntentKind::HomeControl).is_none());
    }
}
