//! Session, Message and conversational context types (spec §3).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::intent::IntentKind;

/// Role of a message participant. The wire format only ever carries user and
/// assistant turns; system framing lives in the LLM prompt builder, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// An immutable, once-appended conversation message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
    /// Monotonic within a session: strictly greater than the previous
    /// message's timestamp.
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<IntentKind>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entities: Vec<(String, String)>,
}

impl Message {
    pub fn user(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            timestamp,
            intent: None,
            entities: Vec::new(),
        }
    }

    pub fn assistant(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            timestamp,
            intent: None,
            entities: Vec::new(),
        }
    }

    pub fn with_intent(mut self, intent: IntentKind) -> Self {
        self.intent = Some(intent);
        self
    }

    pub fn with_entities(mut self, entities: Vec<(String, String)>) -> Self {
        self.entities = entities;
        self
    }
}

/// A clarification option presented to the user (spec §3 `PendingClarification`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClarificationOption {
    pub id: String,
    pub label: String,
}

/// A disambiguation request waiting on the user's next turn.
///
/// Invariant: `expires_at > created_at`. At most one of these is attached to
/// a `SessionContext` at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingClarification {
    pub kind: String,
    pub original_query: String,
    pub original_intent: IntentKind,
    pub options: Vec<ClarificationOption>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Number of unmatched answers seen so far (spec §4.9: two tries before
    /// timing out).
    #[serde(default)]
    pub attempts: u32,
}

impl PendingClarification {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// The mutable, per-session conversational context handed to handlers as an
/// immutable snapshot (spec §3 Ownership).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionContext {
    pub last_intent: Option<IntentKind>,
    #[serde(default)]
    pub last_entities: Vec<(String, String)>,
    pub pending_clarification: Option<PendingClarification>,
}

impl SessionContext {
    pub fn merge(&mut self, updates: SessionContextUpdate) {
        if let Some(intent) = updates.last_intent {
            self.last_intent = Some(intent);
        }
        if let Some(entities) = updates.last_entities {
            self.last_entities = entities;
        }
    }
}

/// A partial update applied to `SessionContext::merge`.
#[derive(Debug, Clone, Default)]
pub struct SessionContextUpdate {
    pub last_intent: Option<IntentKind>,
    pub last_entities: Option<Vec<(String, String)>>,
}

/// A conversational session, identified by an opaque id derived from the
/// caller (zone + client fingerprint) — never a user identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub messages: Vec<Message>,
    pub context: SessionContext,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl Session {
    pub fn new(id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            messages: Vec::new(),
            context: SessionContext::default(),
            created_at: now,
            last_activity: now,
        }
    }

    /// True once `now - last_activity > timeout_seconds` (spec §3: exactly at
    /// the boundary is still alive).
    pub fn is_expired(&self, now: DateTime<Utc>, timeout_seconds: i64) -> bool {
        (now - self.last_activity).num_seconds() > timeout_seconds
    }

    /// Append a message, evicting the oldest if `max_messages` would be
    /// exceeded, and bump `last_activity`. Enforces the monotonic-timestamp
    /// invariant by clamping to `last_activity` if `now` would not advance.
    pub fn append(&mut self, mut message: Message, max_messages: usize, now: DateTime<Utc>) {
        if message.timestamp <= self.last_activity {
            message.timestamp = self.last_activity + chrono::Duration::milliseconds(1);
        }
        self.messages.push(message);
        while self.messages.len() > max_messages {
            self.messages.remove(0);
        }
        self.last_activity = now;
    }

    pub fn history(&self, n: usize) -> Vec<Message> {
        let len = self.messages.len();
        let start = len.saturating_sub(n);
        self.messages[start..].to_vec()
    }
}

/// Export formats for admin/debug session dumps (spec §4.8, §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Structured,
    Plaintext,
    MarkedUp,
}

/// Serialize a session for admin export. `structured` is the canonical JSON
/// round-trip form; `plaintext`/`marked_up` are human-facing renderings.
pub fn export_session(session: &Session, format: ExportFormat) -> String {
    match format {
        ExportFormat::Structured => serde_json::to_string_pretty(session)
            .unwrap_or_else(|_| "{}".to_string()),
        ExportFormat::Plaintext => session
            .messages
            .iter()
            .map(|m| format!("{}: {}", role_label(m.role), m.text))
            .collect::<Vec<_>>()
            .join("\n"),
        ExportFormat::MarkedUp => session
            .messages
            .iter()
            .map(|m| format!("**{}**: {}", role_label(m.role), m.text))
            .collect::<Vec<_>>()
            .join("\n\n"),
    }
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::User => "User",
        Role::Assistant => "Assistant",
    }
}

/// Parse a session back from its structured export — used to check the
/// round-trip law in spec §8 (`export(session).import == session` modulo
/// volatile timestamps).
pub fn import_session(structured: &str) -> Result<Session, serde_json::Error> {
    serde_json::from_str(structured)
}

/// Entities carried alongside an intent, as a simple ordered key/value list
/// (mirrors `HashMap<String, String>` semantics without requiring a
/// particular iteration order for tests).
pub fn entities_map(entities: &[(String, String)]) -> HashMap<String, String> {
    entities.iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-07-28T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn append_evicts_oldest_beyond_max_messages() {
        let mut session = Session::new("s1", now());
        for i in 0..25 {
            session.append(
                Message::user(format!("msg {i}"), now() + chrono::Duration::seconds(i)),
                20,
                now() + chrono::Duration::seconds(i),
            );
        }
        assert_eq!(session.messages.len(), 20);
        assert_eq!(session.messages.last().unwrap().text, "msg 24");
        assert_eq!(session.messages.first().unwrap().text, "msg 5");
    }

    #[test]
    fn expiry_boundary_is_inclusive_of_timeout() {
        let mut session = Session::new("s1", now());
        session.last_activity = now();
        assert!(!session.is_expired(now() + chrono::Duration::seconds(1800), 1800));
        assert!(session.is_expired(now() + chrono::Duration::seconds(1801), 1800));
    }

    #[test]
    fn export_import_round_trips() {
        let mut session = Session::new("s1", now());
        session.append(Message::user("hi", now()), 20, now());
        let dumped = export_session(&session, ExportFormat::Structured);
        let restored = import_session(&dumped).unwrap();
        assert_eq!(restored.id, session.id);
        assert_eq!(restored.messages.len(), session.messages.len());
    }
}
