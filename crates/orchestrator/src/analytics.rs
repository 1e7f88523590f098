//! Analytics event emission (spec §3 `AnalyticsEvent`, §4.10 Observability).
//!
//! The orchestrator is the only component that holds both the LLM router
//! and a session id for every stage transition, so it is the one that
//! emits events — the Response Validator and Session Store only report
//! outcomes back to it (see their own doc comments).

use std::collections::VecDeque;

use assistant_core::{AnalyticsEvent, EventKind};
use parking_lot::RwLock;

pub trait AnalyticsSink: Send + Sync {
    fn emit(&self, event: AnalyticsEvent);
}

/// Default sink: structured log lines, consistent with the rest of the
/// pipeline's observability. The admin analytics endpoints (spec §6) are
/// served by whatever durable sink the binary wires in its place.
pub struct TracingAnalyticsSink;

impl AnalyticsSink for TracingAnalyticsSink {
    fn emit(&self, event: AnalyticsEvent) {
        tracing::info!(
            event_kind = ?event.event_kind,
            session_id = %event.session_id,
            metadata = %event.metadata,
            "analytics event"
        );
    }
}

/// Summary counts over whatever's currently in an `InMemoryAnalyticsStore`'s
/// ring buffer, as served by the admin analytics summary endpoint (spec §6).
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct AnalyticsSummary {
    pub total_events: usize,
    pub clarifications_triggered: usize,
    pub clarifications_resolved: usize,
    pub hallucinations_detected: usize,
    pub fallbacks_invoked: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
}

/// A bounded, queryable sink backing the admin analytics endpoints. Oldest
/// events are dropped once `capacity` is reached, so a long-running process
/// can't grow this unboundedly; it is a recent-activity window, not an
/// audit log.
pub struct InMemoryAnalyticsStore {
    capacity: usize,
    events: RwLock<VecDeque<AnalyticsEvent>>,
}

impl InMemoryAnalyticsStore {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, events: RwLock::new(VecDeque::with_capacity(capacity)) }
    }

    pub fn recent(&self, limit: usize) -> Vec<AnalyticsEvent> {
        let events = self.events.read();
        events.iter().rev().take(limit).cloned().collect()
    }

    pub fn summary(&self) -> AnalyticsSummary {
        let events = self.events.read();
        let mut summary = AnalyticsSummary { total_events: events.len(), ..Default::default() };
        for event in events.iter() {
            match event.event_kind {
                EventKind::ClarificationTriggered => summary.clarifications_triggered += 1,
                EventKind::ClarificationResolved => summary.clarifications_resolved += 1,
                EventKind::HallucinationDetected => summary.hallucinations_detected += 1,
                EventKind::FallbackInvoked => summary.fallbacks_invoked += 1,
                EventKind::CacheHit => summary.cache_hits += 1,
                EventKind::CacheMiss => summary.cache_misses += 1,
                _ => {}
            }
        }
        summary
    }
}

impl AnalyticsSink for InMemoryAnalyticsStore {
    fn emit(&self, event: AnalyticsEvent) {
        let mut events = self.events.write();
        if events.len() == self.capacity {
            events.pop_front();
        }
        events.push_back(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn evicts_oldest_past_capacity() {
        let store = InMemoryAnalyticsStore::new(2);
        for i in 0..3 {
            store.emit(AnalyticsEvent::new(EventKind::CacheHit, format!("s{i}"), Utc::now()));
        }
        let recent = store.recent(10);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].session_id, "s2");
        assert_eq!(recent[1].session_id, "s1");
    }

    #[test]
    fn summarizes_event_kinds() {
        let store = InMemoryAnalyticsStore::new(10);
        store.emit(AnalyticsEvent::new(EventKind::ClarificationTriggered, "a", Utc::now()));
        store.emit(AnalyticsEvent::new(EventKind::HallucinationDetected, "b", Utc::now()));
        store.emit(AnalyticsEvent::new(EventKind::CacheHit, "c", Utc::now()));

        let summary = store.summary();
        assert_eq!(summary.total_events, 3);
        assert_eq!(summary.clarifications_triggered, 1);
        assert_eq!(summary.hallucinations_detected, 1);
        assert_eq!(summary.cache_hits, 1);
    }
}
