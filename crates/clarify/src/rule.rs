//! Rule selection (spec §4.9: "rule priority is honored — when multiple
//! kinds match, the rule with the smallest `priority` number wins").

use assistant_core::ClarificationRule;

/// Pick the enabled rule whose `kind` matches `kind` with the smallest
/// `priority`. A rule matches either by exact kind or by being a prefix of
/// `kind` (device rules are registered per device kind, e.g. `"device:light"`
/// matching a generic `"device"` rule).
pub fn select_rule<'a>(rules: &'a [ClarificationRule], kind: &str) -> Option<&'a ClarificationRule> {
    rules
        .iter()
        .filter(|r| r.enabled && (r.kind == kind || kind.starts_with(&r.kind)))
        .min_by_key(|r| r.priority)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(kind: &str, priority: i32) -> ClarificationRule {
        ClarificationRule {
            kind: kind.to_string(),
            enabled: true,
            timeout_seconds: None,
            priority,
            option_source: assistant_core::OptionSource::Dynamic("n/a".to_string()),
        }
    }

    #[test]
    fn smallest_priority_wins_among_matches() {
        let rules = vec![rule("device", 5), rule("device", 1)];
        let selected = select_rule(&rules, "device:light").unwrap();
        assert_eq!(selected.priority, 1);
    }

    #[test]
    fn disabled_rules_are_excluded() {
        let mut disabled = rule("sports", 1);
        disabled.enabled = false;
        let rules = vec![disabled, rule("sports", 9)];
        let selected = select_rule(&rules, "sports").unwrap();
        assert_eq!(selected.priority, 9);
    }

    #[test]
    fn non_matching_kind_returns_none() {
        let rules = vec![rule("sports", 1)];
        assert!(select_rule(&rules, "device:light").is_none());
    }
}
