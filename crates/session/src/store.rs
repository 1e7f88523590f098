//! The Session/Context Manager (spec §4.8).
//!
//! The external key/value store is primary, with per-session TTL; the
//! in-process mirror (grounded on the teacher's `SessionManager`, itself a
//! `RwLock<HashMap<String, Arc<Session>>>`) holds active sessions for
//! low-latency access and is what keeps the store correct through a
//! key/value-store outage. Each session is its own `parking_lot::RwLock`, so
//! operations on different sessions never contend and a session's own
//! append calls are serialized while reads proceed in parallel.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use parking_lot::RwLock;

use assistant_cache::ExternalStore;
use assistant_config::ConfigLoader;
use assistant_core::{
    export_session, import_session, ExportFormat, Message, PendingClarification, Role, Session,
    SessionContextUpdate,
};

use crate::error::SessionError;

fn external_key(id: &str) -> String {
    format!("session:{id}")
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct SessionSummary {
    pub id: String,
    pub created_at: chrono::DateTime<Utc>,
    pub last_activity: chrono::DateTime<Utc>,
    pub turn_count: usize,
    pub pending_clarification: bool,
}

pub struct SessionStore {
    external: Arc<dyn ExternalStore>,
    config: Arc<ConfigLoader>,
    mirror: DashMap<String, Arc<RwLock<Session>>>,
}

impl SessionStore {
    pub fn new(external: Arc<dyn ExternalStore>, config: Arc<ConfigLoader>) -> Self {
        Self { external, config, mirror: DashMap::new() }
    }

    /// `get_or_create(session_id) -> Session` (spec §4.8). Returns the
    /// resolved id (which may differ from the input if it was absent or
    /// expired) and whether a new session was created.
    pub async fn get_or_create(&self, session_id: Option<&str>) -> (String, bool) {
        let settings = self.config.conversation_settings().await;
        let now = Utc::now();

        if let Some(id) = session_id {
            if let Some(entry) = self.mirror.get(id) {
                if !entry.read().is_expired(now, settings.timeout_seconds) {
                    return (id.to_string(), false);
                }
            } else if let Ok(Some(raw)) = self.external.get(&external_key(id)).await {
                if let Ok(session) = import_session(&raw) {
                    if !session.is_expired(now, settings.timeout_seconds) {
                        self.mirror.insert(id.to_string(), Arc::new(RwLock::new(session)));
                        return (id.to_string(), false);
                    }
                }
            }
        }

        let new_id = uuid::Uuid::new_v4().to_string();
        let session = Session::new(new_id.clone(), now);
        self.mirror.insert(new_id.clone(), Arc::new(RwLock::new(session)));
        (new_id, true)
    }

    /// `append(session_id, role, text, intent?, entities?)` (spec §4.8):
    /// atomic, enforces `max_messages`, bumps `last_activity`.
    pub async fn append(
        &self,
        session_id: &str,
        role: Role,
        text: impl Into<String>,
        intent: Option<assistant_core::IntentKind>,
        entities: Vec<(String, String)>,
    ) -> Result<(), SessionError> {
        let settings = self.config.conversation_settings().await;
        let entry = self.mirror.get(session_id).ok_or(SessionError::NotFound)?;
        let now = Utc::now();

        let mut message = Message::user(text, now).with_entities(entities);
        message.role = role;
        if let Some(kind) = intent {
            message = message.with_intent(kind);
        }

        {
            let mut session = entry.write();
            session.append(message, settings.max_messages, now);
        }

        self.write_through(session_id, &entry).await;
        Ok(())
    }

    /// `history(session_id, n) -> [Message]` (spec §4.8).
    pub fn history(&self, session_id: &str, n: usize) -> Result<Vec<Message>, SessionError> {
        let entry = self.mirror.get(session_id).ok_or(SessionError::NotFound)?;
        Ok(entry.read().history(n))
    }

    /// A snapshot of the session's conversational context, for callers
    /// (the orchestrator's classify/clarify stages) that need it without
    /// mutating anything.
    pub fn context(&self, session_id: &str) -> Result<assistant_core::SessionContext, SessionError> {
        let entry = self.mirror.get(session_id).ok_or(SessionError::NotFound)?;
        Ok(entry.read().context.clone())
    }

    /// `set_context(session_id, updates)` (spec §4.8).
    pub async fn set_context(&self, session_id: &str, updates: SessionContextUpdate) -> Result<(), SessionError> {
        let entry = self.mirror.get(session_id).ok_or(SessionError::NotFound)?;
        {
            entry.write().context.merge(updates);
        }
        self.write_through(session_id, &entry).await;
        Ok(())
    }

    pub async fn set_pending_clarification(
        &self,
        session_id: &str,
        pending: PendingClarification,
    ) -> Result<(), SessionError> {
        let entry = self.mirror.get(session_id).ok_or(SessionError::NotFound)?;
        {
            entry.write().context.pending_clarification = Some(pending);
        }
        self.write_through(session_id, &entry).await;
        Ok(())
    }

    pub async fn clear_pending_clarification(&self, session_id: &str) -> Result<(), SessionError> {
        let entry = self.mirror.get(session_id).ok_or(SessionError::NotFound)?;
        {
            entry.write().context.pending_clarification = None;
        }
        self.write_through(session_id, &entry).await;
        Ok(())
    }

    /// `export(session_id, format)` (spec §4.8).
    pub fn export(&self, session_id: &str, format: ExportFormat) -> Result<String, SessionError> {
        let entry = self.mirror.get(session_id).ok_or(SessionError::NotFound)?;
        Ok(export_session(&entry.read(), format))
    }

    /// `delete(session_id)` (spec §4.8).
    pub async fn delete(&self, session_id: &str) {
        self.mirror.remove(session_id);
        if let Err(err) = self.external.set(&external_key(session_id), "", std::time::Duration::from_secs(1)).await {
            tracing::warn!(session_id, %err, "failed to tombstone session in external store");
        }
    }

    pub fn active_session_count(&self) -> usize {
        self.mirror.len()
    }

    /// Every session id currently held in the in-process mirror, for the
    /// admin session-listing endpoint (spec §6 `GET /sessions`).
    pub fn list_ids(&self) -> Vec<String> {
        self.mirror.iter().map(|entry| entry.key().clone()).collect()
    }

    /// A read-only summary for the admin session-fetch endpoint (spec §6
    /// `GET /sessions/{id}`).
    pub fn summary(&self, session_id: &str) -> Result<SessionSummary, SessionError> {
        let entry = self.mirror.get(session_id).ok_or(SessionError::NotFound)?;
        let session = entry.read();
        Ok(SessionSummary {
            id: session.id.clone(),
            created_at: session.created_at,
            last_activity: session.last_activity,
            turn_count: session.messages.len(),
            pending_clarification: session.context.pending_clarification.is_some(),
        })
    }

    async fn write_through(&self, session_id: &str, entry: &Arc<RwLock<Session>>) {
        let settings = self.config.conversation_settings().await;
        let serialized = export_session(&entry.read(), ExportFormat::Structured);
        let ttl = std::time::Duration::from_secs(settings.session_ttl_seconds.max(0) as u64);
        if let Err(err) = self.external.set(&external_key(session_id), &serialized, ttl).await {
            tracing::warn!(session_id, %err, "external session store write failed, mirror remains authoritative");
        }
    }

    /// Scan the in-process mirror for sessions past `timeout_seconds` and
    /// drop them (spec §4.8: "background reaper... destroying any with
    /// `now - last_activity > timeout_seconds`").
    pub fn reap_expired(&self, timeout_seconds: i64) -> usize {
        let now = Utc::now();
        let expired: Vec<String> = self
            .mirror
            .iter()
            .filter(|entry| entry.value().read().is_expired(now, timeout_seconds))
            .map(|entry| entry.key().clone())
            .collect();
        for id in &expired {
            self.mirror.remove(id);
        }
        expired.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assistant_cache::InMemoryExternalStore;
    use assistant_config::admin_client::AdminApi;
    use assistant_core::IntentKind;
    use async_trait::async_trait;

    struct StubAdmin;

    #[async_trait]
    impl AdminApi for StubAdmin {
        async fn conversation_settings(&self) -> Result<assistant_core::ConversationSettings, assistant_config::ConfigError> {
            Ok(assistant_core::ConversationSettings::default())
        }
        async fn clarification_settings(&self) -> Result<assistant_core::ClarificationSettings, assistant_config::ConfigError> {
            Ok(assistant_core::ClarificationSettings::default())
        }
        async fn clarification_rules(&self) -> Result<Vec<assistant_core::ClarificationRule>, assistant_config::ConfigError> {
            Ok(Vec::new())
        }
        async fn sports_disambiguation(&self) -> Result<Vec<assistant_core::DisambiguationEntry>, assistant_config::ConfigError> {
            Ok(Vec::new())
        }
        async fn device_rules(&self) -> Result<Vec<assistant_core::DeviceDisambiguationRule>, assistant_config::ConfigError> {
            Ok(Vec::new())
        }
        async fn features(&self) -> Result<Vec<assistant_core::FeatureFlag>, assistant_config::ConfigError> {
            Ok(Vec::new())
        }
        async fn llm_backends(&self) -> Result<Vec<assistant_core::LlmBackend>, assistant_config::ConfigError> {
            Ok(Vec::new())
        }
    }

    fn store() -> SessionStore {
        let config = Arc::new(ConfigLoader::new(Arc::new(StubAdmin), Arc::new(InMemoryExternalStore::new()), 300));
        SessionStore::new(Arc::new(InMemoryExternalStore::new()), config)
    }

    #[tokio::test]
    async fn get_or_create_with_no_id_makes_a_new_session() {
        let store = store();
        let (id, created) = store.get_or_create(None).await;
        assert!(created);
        assert!(!id.is_empty());
    }

    #[tokio::test]
    async fn get_or_create_returns_existing_live_session() {
        let store = store();
        let (id, _) = store.get_or_create(None).await;
        let (same_id, created) = store.get_or_create(Some(&id)).await;
        assert_eq!(same_id, id);
        assert!(!created);
    }

    #[tokio::test]
    async fn append_enforces_serialization_and_updates_history() {
        let store = store();
        let (id, _) = store.get_or_create(None).await;
        store.append(&id, Role::User, "hello", Some(IntentKind::Weather), vec![]).await.unwrap();
        let history = store.history(&id, 10).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].text, "hello");
    }

    #[tokio::test]
    async fn delete_removes_from_mirror() {
        let store = store();
        let (id, _) = store.get_or_create(None).await;
        store.delete(&id).await;
        assert!(store.history(&id, 10).is_err());
    }

    #[test]
    fn reap_expired_drops_stale_sessions() {
        let store = store();
        let stale = Session::new("stale", Utc::now() - chrono::Duration::seconds(7200));
        store.mirror.insert("stale".to_string(), Arc::new(RwLock::new(stale)));
        let removed = store.reap_expired(3600);
        assert_eq!(removed, 1);
        assert!(store.mirror.get("stale").is_none());
    }
}
