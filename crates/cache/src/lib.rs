//! The three-tier Cache Tier (spec §4.2): in-process memory, external
//! key/value store, on-disk spill, with per-category TTL and hit metrics.

pub mod disk;
pub mod error;
pub mod external;
pub mod memory;
pub mod normalize;
pub mod tier;

pub use disk::{DiskStore, NullDiskStore, SledDiskStore};
pub use error::CacheError;
pub use external::{ExternalStore, InMemoryExternalStore, RedisExternalStore};
pub use memory::LruMemoryCache;
pub use normalize::normalize_key;
pub use tier::{CacheTier, CategoryCounters};
