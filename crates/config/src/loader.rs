//! The Config Loader (spec §4.1): fetch-once-cache-with-TTL snapshots of the
//! admin-DB-backed configuration entities, degrading to last-known-good then
//! documented defaults on fetch failure.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;

use assistant_cache::ExternalStore;
use assistant_core::{
    BackendType, ClarificationRule, ClarificationSettings, ConfigKind, ConversationSettings,
    DeviceDisambiguationRule, DisambiguationEntry, FeatureFlag, LlmBackend,
};

use crate::admin_client::AdminApi;

struct Cached<T> {
    value: T,
    fetched_at: Instant,
}

#[derive(Default)]
struct Slot<T>(RwLock<Option<Cached<T>>>);

impl<T: Clone> Slot<T> {
    fn snapshot(&self, ttl: Duration) -> Option<T> {
        let guard = self.0.read();
        guard.as_ref().and_then(|c| {
            if c.fetched_at.elapsed() <= ttl {
                Some(c.value.clone())
            } else {
                None
            }
        })
    }

    fn stale(&self) -> Option<T> {
        self.0.read().as_ref().map(|c| c.value.clone())
    }

    fn store(&self, value: T) {
        *self.0.write() = Some(Cached {
            value,
            fetched_at: Instant::now(),
        });
    }

    fn invalidate(&self) {
        *self.0.write() = None;
    }
}

pub struct ConfigLoader {
    admin: Arc<dyn AdminApi>,
    external: Arc<dyn ExternalStore>,
    ttl: Duration,
    conversation_settings: Slot<ConversationSettings>,
    clarification_settings: Slot<ClarificationSettings>,
    clarification_rules: Slot<Vec<ClarificationRule>>,
    sports_disambiguation: Slot<Vec<DisambiguationEntry>>,
    device_rules: Slot<Vec<DeviceDisambiguationRule>>,
    features: Slot<Vec<FeatureFlag>>,
    llm_backends: Slot<Vec<LlmBackend>>,
}

impl ConfigLoader {
    pub fn new(admin: Arc<dyn AdminApi>, external: Arc<dyn ExternalStore>, ttl_seconds: u64) -> Self {
        Self {
            admin,
            external,
            ttl: Duration::from_secs(ttl_seconds),
            conversation_settings: Slot::default(),
            clarification_settings: Slot::default(),
            clarification_rules: Slot::default(),
            sports_disambiguation: Slot::default(),
            device_rules: Slot::default(),
            features: Slot::default(),
            llm_backends: Slot::default(),
        }
    }

    /// Generic fetch-with-TTL-cache-then-last-known-good-then-default. `T`
    /// is mirrored to the external key/value cache at `config:{kind}` so
    /// other processes can reuse the same snapshot (spec §4.1, §6).
    async fn resolve<T, F>(
        &self,
        slot: &Slot<T>,
        kind: ConfigKind,
        fetch: F,
        default: impl FnOnce() -> T,
    ) -> T
    where
        T: Clone + Serialize + DeserializeOwned,
        F: Future<Output = Result<T, crate::error::ConfigError>>,
    {
        if let Some(value) = slot.snapshot(self.ttl) {
            return value;
        }

        match fetch.await {
            Ok(value) => {
                slot.store(value.clone());
                if let Ok(serialized) = serde_json::to_string(&value) {
                    let _ = self.external.set(&kind.cache_key(), &serialized, self.ttl).await;
                }
                value
            }
            Err(err) => {
                tracing::warn!(kind = ?kind, error = %err, "admin API fetch failed, falling back");
                if let Some(stale) = slot.stale() {
                    return stale;
                }
                if let Ok(Some(serialized)) = self.external.get(&kind.cache_key()).await {
                    if let Ok(value) = serde_json::from_str::<T>(&serialized) {
                        slot.store(value.clone());
                        return value;
                    }
                }
                default()
            }
        }
    }

    pub async fn conversation_settings(&self) -> ConversationSettings {
        self.resolve(
            &self.conversation_settings,
            ConfigKind::ConversationSettings,
            self.admin.conversation_settings(),
            ConversationSettings::default,
        )
        .await
    }

    pub async fn clarification_settings(&self) -> ClarificationSettings {
        self.resolve(
            &self.clarification_settings,
            ConfigKind::ClarificationSettings,
            self.admin.clarification_settings(),
            ClarificationSettings::default,
        )
        .await
    }

    pub async fn clarification_rules(&self) -> Vec<ClarificationRule> {
        self.resolve(
            &self.clarification_rules,
            ConfigKind::ClarificationRules,
            self.admin.clarification_rules(),
            Vec::new,
        )
        .await
    }

    pub async fn sports_disambiguation(&self) -> Vec<DisambiguationEntry> {
        self.resolve(
            &self.sports_disambiguation,
            ConfigKind::SportsDisambiguation,
            self.admin.sports_disambiguation(),
            Vec::new,
        )
        .await
    }

    pub async fn device_rules(&self) -> Vec<DeviceDisambiguationRule> {
        self.resolve(
            &self.device_rules,
            ConfigKind::DeviceRules,
            self.admin.device_rules(),
            Vec::new,
        )
        .await
    }

    pub async fn features(&self) -> Vec<FeatureFlag> {
        self.resolve(&self.features, ConfigKind::Features, self.admin.features(), Vec::new)
            .await
    }

    pub async fn is_feature_enabled(&self, name: &str) -> bool {
        self.features().await.iter().any(|f| f.name == name && f.enabled)
    }

    pub async fn llm_backends(&self) -> Vec<LlmBackend> {
        self.resolve(
            &self.llm_backends,
            ConfigKind::LlmBackends,
            self.admin.llm_backends(),
            Vec::new,
        )
        .await
    }

    pub async fn llm_backend(&self, model_name: &str) -> LlmBackend {
        self.llm_backends()
            .await
            .into_iter()
            .find(|b| b.model_name == model_name)
            .unwrap_or_else(|| {
                tracing::warn!(model = %model_name, "no LLM backend row found, using documented defaults");
                LlmBackend::documented_default(model_name)
            })
    }

    /// Event-driven invalidation: an admin mutation calls this for the kind
    /// it just changed (spec §4.11: "invalidates the relevant config cache
    /// entry").
    pub fn invalidate(&self, kind: ConfigKind) {
        match kind {
            ConfigKind::ConversationSettings => self.conversation_settings.invalidate(),
            ConfigKind::ClarificationSettings => self.clarification_settings.invalidate(),
            ConfigKind::ClarificationRules => self.clarification_rules.invalidate(),
            ConfigKind::SportsDisambiguation => self.sports_disambiguation.invalidate(),
            ConfigKind::DeviceRules => self.device_rules.invalidate(),
            ConfigKind::Features => self.features.invalidate(),
            ConfigKind::LlmBackends => self.llm_backends.invalidate(),
        }
    }
}

/// Just enough of `BackendType` re-exported so callers matching on backend
/// routing don't need a second import from `assistant-core`.
pub use BackendType as LlmBackendType;

#[cfg(test)]
mod tests {
    use super::*;
    use assistant_cache::InMemoryExternalStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FlakyAdmin {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AdminApi for FlakyAdmin {
        async fn conversation_settings(&self) -> Result<ConversationSettings, crate::error::ConfigError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n == 0 {
                Ok(ConversationSettings {
                    max_messages: 42,
                    ..ConversationSettings::default()
                })
            } else {
                Err(crate::error::ConfigError::AdminUnavailable("down".into()))
            }
        }
        async fn clarification_settings(&self) -> Result<ClarificationSettings, crate::error::ConfigError> {
            Ok(ClarificationSettings::default())
        }
        async fn clarification_rules(&self) -> Result<Vec<ClarificationRule>, crate::error::ConfigError> {
            Ok(Vec::new())
        }
        async fn sports_disambiguation(&self) -> Result<Vec<DisambiguationEntry>, crate::error::ConfigError> {
            Ok(Vec::new())
        }
        async fn device_rules(&self) -> Result<Vec<DeviceDisambiguationRule>, crate::error::ConfigError> {
            Ok(Vec::new())
        }
        async fn features(&self) -> Result<Vec<FeatureFlag>, crate::error::ConfigError> {
            Ok(Vec::new())
        }
        async fn llm_backends(&self) -> Result<Vec<LlmBackend>, crate::error::ConfigError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn falls_back_to_last_known_good_on_fetch_failure() {
        let admin = Arc::new(FlakyAdmin {
            calls: AtomicUsize::new(0),
        });
        let loader = ConfigLoader::new(admin, Arc::new(InMemoryExternalStore::new()), 0);

        let first = loader.conversation_settings().await;
        assert_eq!(first.max_messages, 42);

        // TTL is zero, so the next call re-fetches and fails; it must fall
        // back to the last-known-good value rather than the documented
        // default.
        let second = loader.conversation_settings().await;
        assert_eq!(second.max_messages, 42);
    }

    #[tokio::test]
    async fn snapshot_is_idempotent_within_ttl() {
        let admin = Arc::new(FlakyAdmin {
            calls: AtomicUsize::new(0),
        });
        let loader = ConfigLoader::new(admin, Arc::new(InMemoryExternalStore::new()), 300);

        let a = loader.conversation_settings().await;
        let b = loader.conversation_settings().await;
        assert_eq!(a.max_messages, b.max_messages);
    }
}
