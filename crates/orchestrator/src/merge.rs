//! Merging per-part answers back into one response (spec §4.10: "1-of-1 →
//! the string; 2-of-N → `A. B.`; 3+ → numbered list. Merged text respects
//! part order from the classifier.").

pub fn merge_responses(parts: &[String]) -> String {
    match parts {
        [] => String::new(),
        [only] => only.clone(),
        [a, b] => format!("{a}. {b}."),
        many => many
            .iter()
            .enumerate()
            .map(|(i, text)| format!("{}. {text}", i + 1))
            .collect::<Vec<_>>()
            .join(" "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_part_is_returned_verbatim() {
        assert_eq!(merge_responses(&["It's 72 and sunny.".to_string()]), "It's 72 and sunny.");
    }

    #[test]
    fn two_parts_join_as_two_sentences() {
        let merged = merge_responses(&["A".to_string(), "B".to_string()]);
        assert_eq!(merged, "A. B.");
    }

    #[test]
    fn three_or_more_parts_become_a_numbered_list() {
        let merged = merge_responses(&["A".to_string(), "B".to_string(), "C".to_string()]);
        assert_eq!(merged, "1. A 2. B 3. C");
    }
}
