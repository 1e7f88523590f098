//! Intent, entity and classification types (spec §4.3).

use serde::{Deserialize, Serialize};

use crate::session::ClarificationOption;

/// The closed set of categories the pattern-based classifier routes to.
///
/// Order here is insignificant; the classifier's own priority list (spec
/// §4.3: time/date, weather, location, transportation, entertainment,
/// news/finance/sports, web-search, LLM) is encoded separately so that
/// re-ordering categories never silently changes this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    TimeDate,
    Weather,
    Location,
    Transportation,
    Entertainment,
    News,
    Finance,
    Sports,
    Streaming,
    Events,
    Flights,
    Stocks,
    WebSearch,
    HomeControl,
    Static,
    /// No pattern matched; falls through to the LLM with no ground-truth
    /// handler backing it.
    Unknown,
}

impl IntentKind {
    /// The handler category string used for cache keys, rate-limit buckets
    /// and analytics metadata (spec §4.1's `cache:{category}` convention).
    pub fn category(&self) -> &'static str {
        match self {
            IntentKind::TimeDate => "time_date",
            IntentKind::Weather => "weather",
            IntentKind::Location => "location",
            IntentKind::Transportation => "transportation",
            IntentKind::Entertainment => "entertainment",
            IntentKind::News => "news",
            IntentKind::Finance => "finance",
            IntentKind::Sports => "sports",
            IntentKind::Streaming => "streaming",
            IntentKind::Events => "events",
            IntentKind::Flights => "flights",
            IntentKind::Stocks => "stocks",
            IntentKind::WebSearch => "web_search",
            IntentKind::HomeControl => "home_control",
            IntentKind::Static => "static",
            IntentKind::Unknown => "unknown",
        }
    }

    /// Whether this category has a ground-truth facade handler the Response
    /// Validator can consult (spec §4.5).
    pub fn has_ground_truth(&self) -> bool {
        matches!(
            self,
            IntentKind::Weather
                | IntentKind::Sports
                | IntentKind::News
                | IntentKind::Finance
                | IntentKind::Flights
                | IntentKind::Events
        )
    }
}

/// A resolved intent with its extracted entities. `confidence` reflects the
/// classifier's certainty; pattern-based classification typically reports
/// 1.0 for an exact trigger match and a lower value for a follow-up-expanded
/// match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intent {
    pub kind: IntentKind,
    pub entities: Vec<(String, String)>,
    pub confidence: f32,
}

impl Intent {
    pub fn new(kind: IntentKind) -> Self {
        Self {
            kind,
            entities: Vec::new(),
            confidence: 1.0,
        }
    }

    pub fn with_entity(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entities.push((key.into(), value.into()));
        self
    }

    pub fn entity(&self, key: &str) -> Option<&str> {
        self.entities
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A proposed disambiguation raised by the classifier or a handler, before it
/// is attached to a session as a `PendingClarification` (spec §4.9 step 1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposedClarification {
    pub kind: String,
    pub original_query: String,
    pub original_intent: IntentKind,
    pub options: Vec<ClarificationOption>,
}

/// The outcome of classifying one part of a (possibly compound) query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClassifiedPart {
    Resolved { text: String, intent: Intent },
    NeedsClarification(ProposedClarification),
}

impl ClassifiedPart {
    pub fn is_unknown(&self) -> bool {
        matches!(
            self,
            ClassifiedPart::Resolved {
                intent: Intent {
                    kind: IntentKind::Unknown,
                    ..
                },
                ..
            }
        )
    }

    pub fn text(&self) -> &str {
        match self {
            ClassifiedPart::Resolved { text, .. } => text,
            ClassifiedPart::NeedsClarification(p) => &p.original_query,
        }
    }
}

/// Whether the query was split into independent conjuncts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationMode {
    Single,
    Multi,
}

/// The full output of the Intent Classifier for one transcription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub mode: ClassificationMode,
    pub parts: Vec<ClassifiedPart>,
    /// The text actually classified — may differ from the raw transcription
    /// if follow-up resolution expanded it (spec §4.3).
    pub expanded_query: String,
}

impl Classification {
    pub fn single(text: impl Into<String>, part: ClassifiedPart) -> Self {
        let text = text.into();
        Self {
            mode: ClassificationMode::Single,
            parts: vec![part],
            expanded_query: text,
        }
    }
}
