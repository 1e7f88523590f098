//! Builds the full set of registered facade handlers (spec §4.4) from
//! process configuration, keyed by category for the orchestrator's cascade
//! dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use assistant_cache::CacheTier;
use assistant_config::FactProviderConfig;
use assistant_core::{FacadeHandler, IntentKind};

use crate::fact_handler::FactHandler;
use crate::provider::FactProviderClient;
use crate::rate_limit::DailyBudgetTracker;
use crate::static_handler::StaticHandler;

/// Every category a fact-backed `FactHandler` serves (spec §4.4's named
/// handlers, plus `finance` alongside `stocks` — both are listed as having
/// ground-truth backing in §4.5 though only `stocks` is named explicitly
/// in §4.4's handler list; see `DESIGN.md`).
const FACT_CATEGORIES: &[IntentKind] = &[
    IntentKind::Weather,
    IntentKind::Sports,
    IntentKind::Events,
    IntentKind::Streaming,
    IntentKind::News,
    IntentKind::Stocks,
    IntentKind::Finance,
    IntentKind::Flights,
    IntentKind::Location,
    IntentKind::WebSearch,
];

pub fn build_registry(
    cache: Arc<CacheTier>,
    fact_provider_config: FactProviderConfig,
) -> HashMap<&'static str, Arc<dyn FacadeHandler>> {
    let provider = Arc::new(FactProviderClient::new(fact_provider_config.clone()));
    let budget = Arc::new(DailyBudgetTracker::new());

    let mut registry: HashMap<&'static str, Arc<dyn FacadeHandler>> = HashMap::new();

    for &kind in FACT_CATEGORIES {
        if let Some(handler) = FactHandler::new(
            kind,
            cache.clone(),
            provider.clone(),
            budget.clone(),
            fact_provider_config.daily_budget,
        ) {
            registry.insert(kind.category(), Arc::new(handler));
        }
    }

    registry.insert(IntentKind::Static.category(), Arc::new(StaticHandler::new()));

    registry
}
