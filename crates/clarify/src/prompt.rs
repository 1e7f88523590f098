//! Templated clarification prompts (spec §4.9 step 2: "produce a
//! clarification prompt, templated per kind, as the turn's response").

use assistant_core::PendingClarification;

pub fn prompt_for(pending: &PendingClarification) -> String {
    let labels: Vec<&str> = pending.options.iter().map(|o| o.label.as_str()).collect();
    let choices = match labels.as_slice() {
        [] => return "Which one did you mean?".to_string(),
        [only] => only.to_string(),
        [first, second] => format!("{first} or {second}"),
        many => {
            let (last, rest) = many.split_last().expect("non-empty");
            format!("{}, or {}", rest.join(", "), last)
        }
    };

    if pending.kind.starts_with("device") {
        format!("Which one did you mean: {choices}?")
    } else if pending.kind.starts_with("sports") {
        format!("Did you mean {choices}?")
    } else {
        format!("Could you clarify — {choices}?")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assistant_core::{ClarificationOption, IntentKind};
    use chrono::{DateTime, Utc};

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-07-29T10:00:00Z").unwrap().with_timezone(&Utc)
    }

    fn pending(kind: &str, labels: &[&str]) -> PendingClarification {
        PendingClarification {
            kind: kind.to_string(),
            original_query: "turn on the lights".to_string(),
            original_intent: IntentKind::HomeControl,
            options: labels
                .iter()
                .map(|l| ClarificationOption { id: l.to_lowercase(), label: l.to_string() })
                .collect(),
            created_at: now(),
            expires_at: now() + chrono::Duration::seconds(300),
            attempts: 0,
        }
    }

    #[test]
    fn two_options_join_with_or() {
        let p = pending("device:light", &["Kitchen", "Office"]);
        assert_eq!(prompt_for(&p), "Which one did you mean: Kitchen or Office?");
    }

    #[test]
    fn three_or_more_options_use_oxford_comma_list() {
        let p = pending("device:light", &["Kitchen", "Office", "Bedroom"]);
        assert_eq!(prompt_for(&p), "Which one did you mean: Kitchen, Office, or Bedroom?");
    }

    #[test]
    fn sports_kind_uses_its_own_template() {
        let p = pending("sports", &["Lakers", "Clippers"]);
        assert_eq!(prompt_for(&p), "Did you mean Lakers or Clippers?");
    }
}
