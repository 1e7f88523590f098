//! The external, shared key/value layer of the cache tier (spec §4.2).
//!
//! Mirrors the teacher's `SessionStore` trait pattern (in-memory default,
//! pluggable real backend) one layer down: `ExternalStore` lets the cache
//! tier degrade to memory-only on outage without the caller noticing.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::CacheError;

#[async_trait]
pub trait ExternalStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;
    async fn is_healthy(&self) -> bool;
}

/// In-process stand-in for the shared external store, used in tests and as
/// a fallback when no real backend is configured.
#[derive(Default)]
pub struct InMemoryExternalStore {
    data: RwLock<HashMap<String, (String, std::time::Instant, Duration)>>,
}

impl InMemoryExternalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExternalStore for InMemoryExternalStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let data = self.data.read();
        match data.get(key) {
            Some((value, inserted, ttl)) if inserted.elapsed() <= *ttl => Ok(Some(value.clone())),
            _ => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        self.data
            .write()
            .insert(key.to_string(), (value.to_string(), std::time::Instant::now(), ttl));
        Ok(())
    }

    async fn is_healthy(&self) -> bool {
        true
    }
}

/// Redis-backed external store for production deployments.
pub struct RedisExternalStore {
    manager: redis::aio::ConnectionManager,
}

impl RedisExternalStore {
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url)
            .map_err(|e| CacheError::ExternalUnavailable(e.to_string()))?;
        let manager = client
            .get_connection_manager()
            .await
            .map_err(|e| CacheError::ExternalUnavailable(e.to_string()))?;
        Ok(Self { manager })
    }
}

#[async_trait]
impl ExternalStore for RedisExternalStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        use redis::AsyncCommands;
        let mut conn = self.manager.clone();
        conn.get(key)
            .await
            .map_err(|e| CacheError::ExternalUnavailable(e.to_string()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        use redis::AsyncCommands;
        let mut conn = self.manager.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl.as_secs().max(1))
            .await
            .map_err(|e| CacheError::ExternalUnavailable(e.to_string()))
    }

    async fn is_healthy(&self) -> bool {
        use redis::AsyncCommands;
        let mut conn = self.manager.clone();
        conn.get::<_, Option<String>>("__health__").await.is_ok()
    }
}
