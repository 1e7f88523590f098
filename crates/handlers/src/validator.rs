//! The Response Validator (spec §4.5): compares an LLM-generated answer for
//! a ground-truth category against the category's facade handler output,
//! applying textual consistency and bounded numeric-distance checks.
//!
//! This module only judges consistency; the regenerate-once-then-substitute
//! policy and the `hallucination_detected` event are the orchestrator's
//! responsibility, since only it holds the LLM router and analytics sink.

use once_cell::sync::Lazy;
use regex::Regex;

use assistant_core::{FacadeHandler, HandlerInput, HandlerOutcome, HandlerResult};

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"-?\d+(\.\d+)?").expect("valid regex"));

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "that", "this", "from", "your", "have", "will", "today", "tonight",
];

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    Consistent,
    Inconsistent { ground_truth: String },
    /// The ground-truth handler itself declined or failed; nothing to
    /// validate against.
    GroundTruthUnavailable,
}

pub struct ResponseValidator;

impl ResponseValidator {
    pub fn new() -> Self {
        Self
    }

    /// Calls `handler` for ground truth and judges `llm_answer` against it.
    pub async fn validate(
        &self,
        handler: &dyn FacadeHandler,
        input: HandlerInput<'_>,
        llm_answer: &str,
    ) -> ValidationOutcome {
        let ground_truth = match handler.handle(input).await {
            Ok(HandlerOutcome::Answered(text)) => text,
            Ok(HandlerOutcome::Declined) | Err(_) => return ValidationOutcome::GroundTruthUnavailable,
        };

        if is_consistent(llm_answer, &ground_truth) {
            ValidationOutcome::Consistent
        } else {
            ValidationOutcome::Inconsistent { ground_truth }
        }
    }
}

impl Default for ResponseValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn extract_numbers(text: &str) -> Vec<f64> {
    NUMBER_RE.find_iter(text).filter_map(|m| m.as_str().parse().ok()).collect()
}

/// Bounded numeric distance: if the ground truth makes a numeric claim, the
/// LLM answer must contain a number within 10% (or 2 absolute units,
/// whichever is larger) of the ground truth's first number.
fn numeric_consistent(llm_answer: &str, ground_truth: &str) -> bool {
    let truth_numbers = extract_numbers(ground_truth);
    let Some(&truth_value) = truth_numbers.first() else {
        return true;
    };
    let llm_numbers = extract_numbers(llm_answer);
    let tolerance = (truth_value.abs() * 0.1).max(2.0);
    llm_numbers.iter().any(|&v| (v - truth_value).abs() <= tolerance)
}

/// Key-literal-fact presence: most of the ground truth's significant words
/// (4+ letters, not a stopword) must appear somewhere in the LLM answer.
fn key_fact_overlap(llm_answer: &str, ground_truth: &str) -> bool {
    let lowered_llm = llm_answer.to_lowercase();
    let significant: Vec<&str> = ground_truth
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() >= 4 && !STOPWORDS.contains(&w.to_lowercase().as_str()))
        .collect();

    if significant.is_empty() {
        return true;
    }

    let present = significant
        .iter()
        .filter(|w| lowered_llm.contains(&w.to_lowercase()))
        .count();
    present as f64 / significant.len() as f64 >= 0.5
}

fn is_consistent(llm_answer: &str, ground_truth: &str) -> bool {
    numeric_consistent(llm_answer, ground_truth) && key_fact_overlap(llm_answer, ground_truth)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_temperature_is_consistent() {
        assert!(is_consistent("It's 72 degrees and sunny in Seattle", "72°F and sunny"));
    }

    #[test]
    fn wildly_different_temperature_is_inconsistent() {
        assert!(!is_consistent("It's 45 degrees and rainy", "72°F and sunny"));
    }

    #[test]
    fn close_enough_temperature_is_consistent() {
        assert!(is_consistent("about 73 degrees, clear skies", "72°F and sunny, clear skies"));
    }

    #[test]
    fn non_numeric_claims_use_word_overlap() {
        assert!(is_consistent(
            "The game is postponed due to rain delay",
            "postponed due to rain delay"
        ));
        assert!(!is_consistent("Everything is fine and on schedule", "postponed due to rain delay"));
    }
}
