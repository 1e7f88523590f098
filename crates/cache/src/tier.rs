//! The three-layer cache tier (spec §4.2): in-process memory, external
//! key/value store, on-disk spill, probed in that order. A hit in a lower
//! layer promotes the value upward so the next lookup is fast.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;

use assistant_core::CacheCategory;

use crate::disk::DiskStore;
use crate::external::ExternalStore;
use crate::memory::LruMemoryCache;

#[derive(Debug, Clone, Default)]
pub struct CategoryCounters {
    pub hits: u64,
    pub misses: u64,
}

impl CategoryCounters {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

pub struct CacheTier {
    memory: LruMemoryCache,
    external: Arc<dyn ExternalStore>,
    disk: Arc<dyn DiskStore>,
    counters: DashMap<&'static str, CategoryCounters>,
}

impl CacheTier {
    pub fn new(memory_capacity: usize, external: Arc<dyn ExternalStore>, disk: Arc<dyn DiskStore>) -> Self {
        Self {
            memory: LruMemoryCache::new(memory_capacity),
            external,
            disk,
            counters: DashMap::new(),
        }
    }

    /// Probe memory, then external, then disk; promote upward on a lower-tier
    /// hit. Degrades gracefully to memory-only when the external store is
    /// unavailable (spec §4.2: "correctness unaffected, hit rate drops").
    pub async fn get(&self, category: CacheCategory, key: &str) -> Option<String> {
        if let Some(value) = self.memory.get(key) {
            self.record(category, true);
            return Some(value);
        }

        let ttl = Duration::from_secs(category.default_ttl_seconds().max(0) as u64);

        match self.external.get(key).await {
            Ok(Some(value)) => {
                self.memory.set(key, &value, ttl);
                self.record(category, true);
                return Some(value);
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(error = %err, "external cache store unavailable, degrading to memory-only");
            }
        }

        if let Ok(Some(value)) = self.disk.get(key) {
            self.memory.set(key, &value, ttl);
            self.record(category, true);
            return Some(value);
        }

        self.record(category, false);
        None
    }

    /// Write through memory and external layers with the category's TTL.
    /// The disk layer is spill-only and populated lazily on promotion, not
    /// on every write, matching "last resort" semantics.
    pub async fn set(&self, category: CacheCategory, key: &str, value: &str) {
        let ttl = Duration::from_secs(category.default_ttl_seconds().max(0) as u64);
        self.memory.set(key, value, ttl);
        if let Err(err) = self.external.set(key, value, ttl).await {
            tracing::warn!(error = %err, "failed to write through to external cache store");
        }
    }

    fn record(&self, category: CacheCategory, hit: bool) {
        let mut entry = self.counters.entry(category.as_str()).or_default();
        if hit {
            entry.hits += 1;
        } else {
            entry.misses += 1;
        }
    }

    pub fn hits_total(&self) -> u64 {
        self.counters.iter().map(|e| e.hits).sum()
    }

    pub fn misses_total(&self) -> u64 {
        self.counters.iter().map(|e| e.misses).sum()
    }

    pub fn hit_rate(&self, category: CacheCategory) -> f64 {
        self.counters
            .get(category.as_str())
            .map(|e| e.hit_rate())
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk::NullDiskStore;
    use crate::external::InMemoryExternalStore;

    fn tier() -> CacheTier {
        CacheTier::new(
            100,
            Arc::new(InMemoryExternalStore::new()),
            Arc::new(NullDiskStore),
        )
    }

    #[tokio::test]
    async fn set_then_get_hits_memory() {
        let tier = tier();
        tier.set(CacheCategory::Weather, "weather:austin", "72F sunny").await;
        assert_eq!(
            tier.get(CacheCategory::Weather, "weather:austin").await,
            Some("72F sunny".to_string())
        );
        assert_eq!(tier.hits_total(), 1);
    }

    #[tokio::test]
    async fn miss_is_recorded_when_absent() {
        let tier = tier();
        assert_eq!(tier.get(CacheCategory::Weather, "weather:nowhere").await, None);
        assert_eq!(tier.misses_total(), 1);
    }

    #[tokio::test]
    async fn external_hit_promotes_to_memory() {
        let external = Arc::new(InMemoryExternalStore::new());
        external
            .set("events:today", "concert at 8pm", Duration::from_secs(3600))
            .await
            .unwrap();
        let tier = CacheTier::new(100, external, Arc::new(NullDiskStore));

        assert_eq!(
            tier.get(CacheCategory::Events, "events:today").await,
            Some("concert at 8pm".to_string())
        );
        // Second read should now be served purely from memory; we can't
        // observe that directly, but the value must still be correct.
        assert_eq!(
            tier.get(CacheCategory::Events, "events:today").await,
            Some("concert at 8pm".to_string())
        );
    }
}
