//! Follow-up resolution (spec §4.3, §4.8): pronoun, relative-time, and
//! elliptical queries that only make sense in light of the previous turn
//! are resolved against `SessionContext` rather than classified fresh.

use assistant_core::{Intent, SessionContext};

use crate::patterns;

/// Markers that introduce a follow-up referring back to the prior turn.
/// Deliberately narrow — generic question openers like "what's " or a bare
/// "and " over-trigger on fresh queries that merely share a conjunction or
/// contraction with a follow-up (spec §4.3 scopes follow-ups to pronouns,
/// relative-time refs, and elliptical forms, not question phrasing).
const FOLLOWUP_PREFIXES: &[&str] = &[
    "what about ",
    "how about ",
    "and what about ",
    "and how about ",
    "and in ",
    "and for ",
];

/// Bare pronoun/deictic follow-ups ("what about it", "and there?").
const REFERENCE_WORDS: &[&str] = &["it", "that", "there", "them", "those"];

/// Whether `text` is shaped like a follow-up rather than a fresh query —
/// i.e. it leans on context instead of naming its own subject.
pub fn looks_like_followup(text: &str) -> bool {
    let lowered = text.trim().trim_end_matches('?').to_lowercase();
    if FOLLOWUP_PREFIXES.iter().any(|p| lowered.starts_with(p)) {
        return true;
    }
    REFERENCE_WORDS.iter().any(|w| {
        lowered
            .split_whitespace()
            .last()
            .map(|last| last == *w)
            .unwrap_or(false)
    })
}

fn strip_marker(lowered: &str) -> &str {
    FOLLOWUP_PREFIXES
        .iter()
        .find_map(|p| lowered.strip_prefix(p))
        .unwrap_or(lowered)
        .trim()
}

/// Resolve a follow-up query against the previous turn's intent and
/// entities. Returns `None` when there is no prior intent to follow up on,
/// or when `text` is not follow-up shaped.
pub fn resolve_followup(text: &str, context: &SessionContext) -> Option<Intent> {
    if !looks_like_followup(text) {
        return None;
    }
    let last_kind = context.last_intent?;

    let lowered = text.trim().trim_end_matches('?').to_lowercase();
    let remainder = strip_marker(&lowered);

    // A follow-up is a weaker signal than an exact pattern trigger.
    let mut intent = Intent::new(last_kind);
    intent.confidence = 0.6;
    for (key, value) in &context.last_entities {
        intent = intent.with_entity(key.clone(), value.clone());
    }

    if remainder.is_empty() || REFERENCE_WORDS.contains(&remainder) {
        // Pure reference ("what about it?") — keep the prior entities as-is.
        return Some(intent);
    }

    if let Some(timeframe) = patterns::extract_timeframe(remainder) {
        intent = intent.with_entity("timeframe", timeframe);
        return Some(intent);
    }

    // Otherwise treat the remainder as a replacement location/topic,
    // overriding whatever the prior turn had under that key.
    let key = if intent.entity("location").is_some() { "location" } else { "topic" };
    intent = intent.with_entity(key, remainder.to_string());
    Some(intent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assistant_core::IntentKind;

    fn weather_context() -> SessionContext {
        let mut ctx = SessionContext::default();
        ctx.last_intent = Some(IntentKind::Weather);
        ctx.last_entities = vec![("location".to_string(), "seattle".to_string())];
        ctx
    }

    #[test]
    fn resolves_timeframe_followup() {
        let ctx = weather_context();
        let intent = resolve_followup("what about tomorrow", &ctx).unwrap();
        assert_eq!(intent.kind, IntentKind::Weather);
        assert_eq!(intent.entity("timeframe"), Some("tomorrow"));
    }

    #[test]
    fn resolves_location_followup() {
        let ctx = weather_context();
        let intent = resolve_followup("what about boston", &ctx).unwrap();
        assert_eq!(intent.entity("location"), Some("boston"));
    }

    #[test]
    fn bare_reference_keeps_prior_entities() {
        let ctx = weather_context();
        let intent = resolve_followup("what about it", &ctx).unwrap();
        assert_eq!(intent.entity("location"), Some("seattle"));
    }

    #[test]
    fn no_prior_intent_yields_none() {
        let ctx = SessionContext::default();
        assert!(resolve_followup("what about tomorrow", &ctx).is_none());
    }

    #[test]
    fn fresh_query_is_not_followup_shaped() {
        let ctx = weather_context();
        assert!(resolve_followup("what is the weather in chicago", &ctx).is_none());
    }

    #[test]
    fn fresh_query_starting_with_whats_is_not_hijacked() {
        let ctx = weather_context();
        assert!(resolve_followup("what's the score for the giants game tonight", &ctx).is_none());
    }
}
