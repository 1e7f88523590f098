//! The fastest, smallest layer of the cache tier: a size-bounded in-process
//! LRU map (spec §4.2: "in-process map (fastest, small)").

use std::time::{Duration, Instant};

use indexmap::IndexMap;
use parking_lot::Mutex;

struct Entry {
    value: String,
    inserted: Instant,
    ttl: Duration,
}

/// A simple LRU map: `IndexMap` preserves insertion order, and a `get`/`set`
/// moves the touched key to the back so the front is always the
/// least-recently-used eviction candidate.
pub struct LruMemoryCache {
    capacity: usize,
    entries: Mutex<IndexMap<String, Entry>>,
}

impl LruMemoryCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(IndexMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock();
        let fresh = entries
            .get(key)
            .map(|e| e.inserted.elapsed() <= e.ttl)
            .unwrap_or(false);

        if !fresh {
            entries.shift_remove(key);
            return None;
        }

        // Promote to most-recently-used.
        let (_, entry) = entries.shift_remove_entry(key)?;
        let value = entry.value.clone();
        entries.insert(key.to_string(), entry);
        Some(value)
    }

    pub fn set(&self, key: &str, value: &str, ttl: Duration) {
        let mut entries = self.entries.lock();
        entries.shift_remove(key);
        if entries.len() >= self.capacity {
            entries.shift_remove_index(0);
        }
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                inserted: Instant::now(),
                ttl,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_least_recently_used_beyond_capacity() {
        let cache = LruMemoryCache::new(2);
        cache.set("a", "1", Duration::from_secs(60));
        cache.set("b", "2", Duration::from_secs(60));
        cache.get("a"); // touch a, making b the LRU candidate
        cache.set("c", "3", Duration::from_secs(60));

        assert!(cache.get("a").is_some());
        assert!(cache.get("b").is_none());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn expired_entry_is_absent() {
        let cache = LruMemoryCache::new(10);
        cache.set("a", "1", Duration::from_millis(0));
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get("a").is_none());
    }
}
