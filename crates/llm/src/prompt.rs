//! Chat message construction for an LLM call, built from session history
//! plus a per-request system prompt (spec §4.7, §4.8's "max_llm_history").

use serde::{Deserialize, Serialize};

use assistant_core::{Message as SessionMessage, Role as SessionRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }
}

/// Build the chat transcript sent to the LLM: a system prompt, up to
/// `max_history` prior turns, then the current query.
pub fn build_prompt(system_prompt: &str, history: &[SessionMessage], max_history: usize, query: &str) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(system_prompt)];

    let start = history.len().saturating_sub(max_history);
    for turn in &history[start..] {
        let role = match turn.role {
            SessionRole::User => ChatRole::User,
            SessionRole::Assistant => ChatRole::Assistant,
        };
        messages.push(ChatMessage { role, content: turn.text.clone() });
    }

    messages.push(ChatMessage::user(query));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use assistant_core::Message;
    use chrono::Utc;

    #[test]
    fn truncates_to_max_history() {
        let now = Utc::now();
        let history = vec![
            Message::user("one", now),
            Message::assistant("two", now + chrono::Duration::milliseconds(1)),
            Message::user("three", now + chrono::Duration::milliseconds(2)),
        ];
        let prompt = build_prompt("system", &history, 1, "four");
        // system + last 1 turn + current query
        assert_eq!(prompt.len(), 3);
        assert_eq!(prompt.last().unwrap().content, "four");
    }
}
