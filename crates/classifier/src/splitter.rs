//! Compound-query splitter (spec §4.3, §8 boundary behavior).
//!
//! Splits on conjunction markers, but a finite list of non-splitting
//! contexts — fixed compound nouns and multi-entity device references —
//! must not be split even though they contain the marker word "and".

use once_cell::sync::Lazy;
use regex::Regex;

/// Fixed compound nouns that happen to contain "and" but are never two
/// separate requests.
const NON_SPLITTING_PHRASES: &[&str] = &[
    "rock and roll",
    "mac and cheese",
    "salt and pepper",
    "bed and breakfast",
    "fish and chips",
    "bread and butter",
];

/// A multi-entity device reference: "<room> and <room> lights/thermostat/..."
/// is one command targeting two rooms, not two commands.
static DEVICE_MULTI_ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b[a-z]+ and [a-z]+ (lights?|lamps?|switches?|blinds?|fans?|thermostats?|plugs?|outlets?)\b")
        .expect("valid regex")
});

const MASK: &str = "\u{0}AND\u{0}";

fn mask_non_splitting_spans(text: &str) -> String {
    let mut masked = DEVICE_MULTI_ENTITY_RE
        .replace_all(text, |caps: &regex::Captures| caps[0].replace(" and ", MASK))
        .into_owned();

    for phrase in NON_SPLITTING_PHRASES {
        if let Ok(re) = Regex::new(&format!("(?i){}", regex::escape(phrase))) {
            masked = re
                .replace_all(&masked, |caps: &regex::Captures| caps[0].replace(" and ", MASK))
                .into_owned();
        }
    }

    masked
}

/// The conjunction markers that introduce a new part of a compound query.
const MARKERS: &[&str] = &[" and also ", " and ", " also ", " as well as "];

/// Split a query into independently-classifiable parts. Returns a single
/// element (the original text, trimmed) when no splittable boundary exists.
pub fn split_compound(text: &str) -> Vec<String> {
    let masked = mask_non_splitting_spans(text);

    let mut parts: Vec<String> = vec![masked];
    for marker in MARKERS {
        parts = parts
            .into_iter()
            .flat_map(|p| {
                p.split(marker)
                    .map(|s| s.to_string())
                    .collect::<Vec<_>>()
            })
            .collect();
    }

    parts
        .into_iter()
        .map(|p| p.replace(MASK, "and").trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_conjunction() {
        let parts = split_compound("what's the weather and what time is it");
        assert_eq!(parts, vec!["what's the weather", "what time is it"]);
    }

    #[test]
    fn does_not_split_device_multi_entity_reference() {
        let parts = split_compound("turn on kitchen and dining lights");
        assert_eq!(parts, vec!["turn on kitchen and dining lights"]);
    }

    #[test]
    fn does_not_split_fixed_compound_noun() {
        let parts = split_compound("play some rock and roll music");
        assert_eq!(parts, vec!["play some rock and roll music"]);
    }

    #[test]
    fn mixed_query_splits_only_the_real_conjunction() {
        let parts = split_compound("turn on kitchen and dining lights and play some music");
        assert_eq!(
            parts,
            vec!["turn on kitchen and dining lights", "play some music"]
        );
    }
}
