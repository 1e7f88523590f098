//! Pattern-based category matching (spec §4.3).
//!
//! Classification is substring matching against curated term lists,
//! evaluated in a fixed priority order. The first category to match wins —
//! ties favor the earlier category in `CATEGORY_ORDER`.

use assistant_core::IntentKind;

/// Fixed evaluation order (spec §4.3): time/date, weather, location,
/// transportation, entertainment, news/finance/sports, web-search fallback.
/// `IntentKind::Unknown` falls through to the LLM and is never matched here.
pub const CATEGORY_ORDER: &[IntentKind] = &[
    IntentKind::HomeControl,
    IntentKind::TimeDate,
    IntentKind::Weather,
    IntentKind::Location,
    IntentKind::Transportation,
    IntentKind::Entertainment,
    IntentKind::Streaming,
    IntentKind::Events,
    IntentKind::Flights,
    IntentKind::Stocks,
    IntentKind::Finance,
    IntentKind::News,
    IntentKind::Sports,
    IntentKind::Static,
    IntentKind::WebSearch,
];

fn terms(kind: IntentKind) -> &'static [&'static str] {
    match kind {
        IntentKind::HomeControl => &[
            "turn on", "turn off", "switch on", "switch off", "dim", "lock the", "unlock the",
            "set the thermostat", "open the", "close the",
        ],
        IntentKind::TimeDate => &["what time is it", "what's the time", "what day is it", "what's the date", "current time"],
        IntentKind::Weather => &["weather", "forecast", "temperature outside", "is it raining", "is it sunny"],
        IntentKind::Location => &["how far is", "distance to", "directions to", "nearest", "where is the"],
        IntentKind::Transportation => &["traffic", "bus schedule", "train schedule", "how long to drive", "commute"],
        IntentKind::Entertainment => &["movie showtimes", "what's playing", "concert", "theater near"],
        IntentKind::Streaming => &["where can i watch", "which service has", "stream", "netflix", "hulu"],
        IntentKind::Events => &["events near", "what's happening", "things to do", "festival"],
        IntentKind::Flights => &["flight status", "is my flight", "flight delay", "gate for flight"],
        IntentKind::Stocks => &["stock price", "stock quote", "shares of", "how is the market"],
        IntentKind::Finance => &["exchange rate", "interest rate today", "mortgage rate"],
        IntentKind::News => &["news", "headlines", "what's going on with"],
        IntentKind::Sports => &["score", "schedule for", "standings", "who won", "game tonight"],
        IntentKind::Static => &["address of", "parking at", "nearest airport", "what neighborhood"],
        IntentKind::WebSearch => &["search for", "look up", "tell me about"],
        IntentKind::Unknown => &[],
    }
}

/// Match text against curated term lists in priority order, returning the
/// first matching category and the literal substring that triggered it.
pub fn match_category(text: &str) -> Option<(IntentKind, &'static str)> {
    let lowered = text.to_lowercase();
    for &kind in CATEGORY_ORDER {
        for &term in terms(kind) {
            if lowered.contains(term) {
                return Some((kind, term));
            }
        }
    }
    None
}

/// Timeframe qualifiers shared by weather/events/sports entity extraction.
pub fn extract_timeframe(text: &str) -> Option<&'static str> {
    let lowered = text.to_lowercase();
    const TIMEFRAMES: &[(&str, &str)] = &[
        ("tonight", "tonight"),
        ("tomorrow", "tomorrow"),
        ("this weekend", "weekend"),
        ("next week", "week"),
        ("this week", "week"),
        ("today", "current"),
    ];
    TIMEFRAMES
        .iter()
        .find(|(needle, _)| lowered.contains(needle))
        .map(|(_, value)| *value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_date_beats_weather_on_earlier_priority() {
        // "what time is it" doesn't contain any weather term, so this just
        // exercises priority ordering directly.
        let (kind, _) = match_category("what time is it right now").unwrap();
        assert_eq!(kind, IntentKind::TimeDate);
    }

    #[test]
    fn unmatched_text_returns_none() {
        assert!(match_category("asdkjhaslkdjh").is_none());
    }

    #[test]
    fn timeframe_defaults_to_current_for_today() {
        assert_eq!(extract_timeframe("what's the weather today"), Some("current"));
        assert_eq!(extract_timeframe("weather tomorrow"), Some("tomorrow"));
    }
}
