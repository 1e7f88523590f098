//! The on-disk spill layer — last resort of the three-tier cache (spec §4.2).

use std::time::Duration;

use crate::error::CacheError;

pub trait DiskStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;
}

/// `sled`-backed disk spill. Entries carry an explicit expiry timestamp
/// alongside the value since sled has no native TTL.
pub struct SledDiskStore {
    tree: sled::Db,
}

impl SledDiskStore {
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, CacheError> {
        let tree = sled::open(path).map_err(|e| CacheError::DiskUnavailable(e.to_string()))?;
        Ok(Self { tree })
    }
}

impl DiskStore for SledDiskStore {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match self.tree.get(key).map_err(|e| CacheError::DiskUnavailable(e.to_string()))? {
            Some(bytes) => {
                let record: DiskRecord = serde_json::from_slice(&bytes)
                    .map_err(|e| CacheError::Serialization(e.to_string()))?;
                if record.inserted_at_ms + record.ttl_ms
                    >= chrono::Utc::now().timestamp_millis() as u64
                {
                    Ok(Some(record.value))
                } else {
                    let _ = self.tree.remove(key);
                    Ok(None)
                }
            }
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let record = DiskRecord {
            value: value.to_string(),
            inserted_at_ms: chrono::Utc::now().timestamp_millis() as u64,
            ttl_ms: ttl.as_millis() as u64,
        };
        let bytes = serde_json::to_vec(&record).map_err(|e| CacheError::Serialization(e.to_string()))?;
        self.tree
            .insert(key, bytes)
            .map_err(|e| CacheError::DiskUnavailable(e.to_string()))?;
        Ok(())
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
struct DiskRecord {
    value: String,
    inserted_at_ms: u64,
    ttl_ms: u64,
}

/// No-op disk layer for deployments that don't want file-system state.
#[derive(Default)]
pub struct NullDiskStore;

impl DiskStore for NullDiskStore {
    fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }
}
