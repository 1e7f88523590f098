//! The Function-Call Extractor (spec §4.6): turns a `home_control` intent's
//! raw text + zone into a concrete {area, device_kind, action, parameters}
//! call, or escalates to clarification when extraction is ambiguous or
//! fails outright.

use std::collections::HashMap;

use assistant_core::{DeviceDisambiguationRule, IntentKind, ProposedClarification};

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceCall {
    pub area: String,
    pub device_kind: String,
    pub action: String,
    pub parameters: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    Call(DeviceCall),
    NeedsClarification(ProposedClarification),
}

const ACTION_TERMS: &[(&str, &str)] = &[
    ("turn on", "turn_on"),
    ("switch on", "turn_on"),
    ("turn off", "turn_off"),
    ("switch off", "turn_off"),
    ("dim", "set_level"),
    ("lock the", "lock"),
    ("unlock the", "unlock"),
    ("set the thermostat", "set_temperature"),
    ("open the", "open"),
    ("close the", "close"),
];

const DEVICE_KINDS: &[&str] = &["light", "thermostat", "lock", "blind", "fan", "plug", "outlet"];

const KNOWN_AREAS: &[&str] = &[
    "kitchen",
    "living room",
    "bedroom",
    "bathroom",
    "garage",
    "office",
    "dining room",
    "hallway",
    "basement",
    "attic",
    "backyard",
    "front door",
    "nursery",
];

fn extract_action(lowered: &str) -> Option<&'static str> {
    ACTION_TERMS.iter().find(|(term, _)| lowered.contains(term)).map(|(_, action)| *action)
}

fn extract_device_kind(lowered: &str) -> Option<&'static str> {
    DEVICE_KINDS.iter().find(|kind| lowered.contains(*kind)).copied()
}

fn extract_areas(lowered: &str) -> Vec<String> {
    KNOWN_AREAS
        .iter()
        .filter(|area| lowered.contains(*area))
        .map(|area| area.to_string())
        .collect()
}

fn failed_extraction(text: &str) -> ProposedClarification {
    ProposedClarification {
        kind: "device_extraction_failed".to_string(),
        original_query: text.to_string(),
        original_intent: IntentKind::HomeControl,
        options: Vec::new(),
    }
}

/// Extract a device call from `text` in the context of `zone` (the
/// requesting zone, used as the area when none is named explicitly).
/// `device_rules` governs when multiple matching areas require asking the
/// user instead of guessing (spec §4.6, §3 `DeviceDisambiguationRule`).
pub fn extract(text: &str, zone: &str, device_rules: &[DeviceDisambiguationRule]) -> ExtractionOutcome {
    let lowered = text.to_lowercase();

    let (Some(action), Some(device_kind)) = (extract_action(&lowered), extract_device_kind(&lowered)) else {
        return ExtractionOutcome::NeedsClarification(failed_extraction(text));
    };

    let areas = extract_areas(&lowered);
    let rule = device_rules.iter().find(|r| r.device_kind == device_kind);

    if areas.len() > 1 {
        let min_to_ask = rule.map(|r| r.min_entities_to_ask).unwrap_or(1);
        if areas.len() > min_to_ask {
            let mut options: Vec<assistant_core::ClarificationOption> = areas
                .iter()
                .map(|area| assistant_core::ClarificationOption { id: area.clone(), label: area.clone() })
                .collect();
            if rule.map(|r| r.include_all_option).unwrap_or(false) {
                options.push(assistant_core::ClarificationOption {
                    id: "all".to_string(),
                    label: format!("All {device_kind}s"),
                });
            }
            return ExtractionOutcome::NeedsClarification(ProposedClarification {
                kind: format!("device:{device_kind}"),
                original_query: text.to_string(),
                original_intent: IntentKind::HomeControl,
                options,
            });
        }
    }

    let area = areas.first().cloned().unwrap_or_else(|| zone.to_string());
    let mut parameters = HashMap::new();
    if action == "set_level" || action == "set_temperature" {
        if let Some(value) = extract_numeric_parameter(&lowered) {
            parameters.insert("value".to_string(), value);
        }
    }

    ExtractionOutcome::Call(DeviceCall { area, device_kind: device_kind.to_string(), action: action.to_string(), parameters })
}

fn extract_numeric_parameter(lowered: &str) -> Option<String> {
    lowered
        .split_whitespace()
        .find(|token| token.chars().all(|c| c.is_ascii_digit()))
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_simple_single_area_command() {
        let outcome = extract("turn on the kitchen lights", "living_room", &[]);
        match outcome {
            ExtractionOutcome::Call(call) => {
                assert_eq!(call.area, "kitchen");
                assert_eq!(call.device_kind, "light");
                assert_eq!(call.action, "turn_on");
            }
            other => panic!("expected a call, got {other:?}"),
        }
    }

    #[test]
    fn falls_back_to_zone_when_no_area_named() {
        let outcome = extract("turn off the lights", "bedroom", &[]);
        match outcome {
            ExtractionOutcome::Call(call) => assert_eq!(call.area, "bedroom"),
            other => panic!("expected a call, got {other:?}"),
        }
    }

    #[test]
    fn multiple_areas_above_threshold_needs_clarification() {
        let rules = vec![DeviceDisambiguationRule {
            device_kind: "light".to_string(),
            min_entities_to_ask: 1,
            include_all_option: true,
        }];
        let outcome = extract("turn on kitchen and dining room lights", "hallway", &rules);
        match outcome {
            ExtractionOutcome::NeedsClarification(p) => {
                assert_eq!(p.kind, "device:light");
                assert!(p.options.iter().any(|o| o.id == "all"));
            }
            other => panic!("expected clarification, got {other:?}"),
        }
    }

    #[test]
    fn unrecognized_device_or_action_needs_clarification() {
        let outcome = extract("please do the thing", "kitchen", &[]);
        assert!(matches!(outcome, ExtractionOutcome::NeedsClarification(_)));
    }

    #[test]
    fn thermostat_extracts_numeric_setpoint() {
        let outcome = extract("set the thermostat to 68", "office", &[]);
        match outcome {
            ExtractionOutcome::Call(call) => {
                assert_eq!(call.action, "set_temperature");
                assert_eq!(call.parameters.get("value"), Some(&"68".to_string()));
            }
            other => panic!("expected a call, got {other:?}"),
        }
    }
}
