//! Matching the user's follow-up answer against a pending clarification's
//! options, and raising a fresh `PendingClarification` (spec §4.9 steps 1, 3).

use chrono::{DateTime, Duration, Utc};

use assistant_core::{
    ClarificationOption, ClarificationRule, ClarificationSettings, Intent, PendingClarification,
    ProposedClarification,
};

/// Two unmatched answers end the clarification (spec §4.9: "on timeout or
/// unmatched answer after two tries").
const MAX_ATTEMPTS: u32 = 2;

pub fn raise(
    proposed: ProposedClarification,
    rule: Option<&ClarificationRule>,
    settings: &ClarificationSettings,
    now: DateTime<Utc>,
) -> PendingClarification {
    let timeout_seconds = rule.and_then(|r| r.timeout_seconds).unwrap_or(settings.timeout_seconds);
    PendingClarification {
        kind: proposed.kind,
        original_query: proposed.original_query,
        original_intent: proposed.original_intent,
        options: proposed.options,
        created_at: now,
        expires_at: now + Duration::seconds(timeout_seconds as i64),
        attempts: 0,
    }
}

#[derive(Debug, Clone)]
pub enum ResolveOutcome {
    /// The answer matched an option; the original intent is resolved and
    /// ready to execute.
    Resolved(Intent),
    /// No match yet, but tries remain.
    Retry,
    /// Two unmatched tries: give up and clear.
    GivenUp,
    /// The window elapsed before an answer arrived.
    Expired,
}

/// Attempt to resolve `answer` against `pending`'s options: exact match
/// preferred, then prefix, then substring (spec §4.9 step 3). Mutates
/// `pending.attempts` on an unmatched try.
pub fn resolve(pending: &mut PendingClarification, answer: &str, now: DateTime<Utc>) -> ResolveOutcome {
    if pending.is_expired(now) {
        return ResolveOutcome::Expired;
    }

    if let Some(option) = match_option(&pending.options, answer) {
        let intent = Intent::new(pending.original_intent).with_entity(entity_key_for(&pending.kind), option.id.clone());
        return ResolveOutcome::Resolved(intent);
    }

    pending.attempts += 1;
    if pending.attempts >= MAX_ATTEMPTS {
        ResolveOutcome::GivenUp
    } else {
        ResolveOutcome::Retry
    }
}

fn match_option<'a>(options: &'a [ClarificationOption], answer: &str) -> Option<&'a ClarificationOption> {
    let normalized = answer.trim().to_lowercase();
    options
        .iter()
        .find(|o| o.label.to_lowercase() == normalized || o.id.to_lowercase() == normalized)
        .or_else(|| options.iter().find(|o| o.label.to_lowercase().starts_with(&normalized)))
        .or_else(|| options.iter().find(|o| o.label.to_lowercase().contains(&normalized)))
}

/// Which entity key the resolved option gets substituted into, by
/// clarification kind prefix.
fn entity_key_for(kind: &str) -> &'static str {
    if kind.starts_with("device") {
        "area"
    } else if kind.starts_with("sports") {
        "team"
    } else {
        "choice"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assistant_core::IntentKind;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-07-29T10:00:00Z").unwrap().with_timezone(&Utc)
    }

    fn pending(options: Vec<ClarificationOption>) -> PendingClarification {
        PendingClarification {
            kind: "device:light".to_string(),
            original_query: "turn on the lights".to_string(),
            original_intent: IntentKind::HomeControl,
            options,
            created_at: now(),
            expires_at: now() + Duration::seconds(300),
            attempts: 0,
        }
    }

    fn options() -> Vec<ClarificationOption> {
        vec![
            ClarificationOption { id: "kitchen".to_string(), label: "Kitchen".to_string() },
            ClarificationOption { id: "office".to_string(), label: "Office".to_string() },
        ]
    }

    #[test]
    fn exact_match_resolves() {
        let mut p = pending(options());
        let outcome = resolve(&mut p, "kitchen", now());
        match outcome {
            ResolveOutcome::Resolved(intent) => assert_eq!(intent.entity("area"), Some("kitchen")),
            other => panic!("expected resolved, got {other:?}"),
        }
    }

    #[test]
    fn prefix_match_resolves() {
        let mut p = pending(options());
        let outcome = resolve(&mut p, "kit", now());
        assert!(matches!(outcome, ResolveOutcome::Resolved(_)));
    }

    #[test]
    fn unmatched_answer_retries_then_gives_up() {
        let mut p = pending(options());
        assert!(matches!(resolve(&mut p, "garage", now()), ResolveOutcome::Retry));
        assert!(matches!(resolve(&mut p, "garage", now()), ResolveOutcome::GivenUp));
    }

    #[test]
    fn expired_window_reports_expired() {
        let mut p = pending(options());
        let later = now() + Duration::seconds(301);
        assert!(matches!(resolve(&mut p, "kitchen", later), ResolveOutcome::Expired));
    }
}
