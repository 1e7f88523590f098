//! Cache key normalization (Open Question 2, `SPEC_FULL.md` §C).
//!
//! `normalize(query, entities) -> key` is fixed here so every facade handler
//! produces identical keys for identical requests: lowercase the query, trim
//! and collapse internal whitespace, then append a sorted `key=value` entity
//! list joined by `;`, prefixed by the intent category.

use assistant_core::IntentKind;

pub fn normalize_key(kind: IntentKind, query: &str, entities: &[(String, String)]) -> String {
    let normalized_query = query
        .trim()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    let mut sorted_entities: Vec<String> = entities
        .iter()
        .map(|(k, v)| format!("{}={}", k.to_lowercase(), v.to_lowercase()))
        .collect();
    sorted_entities.sort();

    if sorted_entities.is_empty() {
        format!("{}:{}", kind.category(), normalized_query)
    } else {
        format!(
            "{}:{}:{}",
            kind.category(),
            normalized_query,
            sorted_entities.join(";")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_is_order_independent_for_entities() {
        let a = normalize_key(
            IntentKind::Weather,
            "  What's   the Weather ",
            &[("city".into(), "Austin".into()), ("day".into(), "Tomorrow".into())],
        );
        let b = normalize_key(
            IntentKind::Weather,
            "what's the weather",
            &[("day".into(), "tomorrow".into()), ("city".into(), "austin".into())],
        );
        assert_eq!(a, b);
    }

    #[test]
    fn different_categories_never_collide() {
        let a = normalize_key(IntentKind::Weather, "boston", &[]);
        let b = normalize_key(IntentKind::Sports, "boston", &[]);
        assert_ne!(a, b);
    }
}
