//! Transformed Image Cache
//!
//! Read-through cache in front of the transform pipeline:
//! - `CacheStore` trait: byte-oriented get/set, TTL applied by the store
//! - `RedisCacheStore`: shared Redis backend (production)
//! - `MemoryCacheStore`: moka-backed process-local backend
//! - `CacheFingerprint`: deterministic key of a transformation request

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod memory;
pub mod redis;
pub mod traits;

pub use config::{CacheBackend, CacheConfig, MemoryCacheConfig, RedisConfig};
pub use error::CacheError;
pub use fingerprint::CacheFingerprint;
pub use memory::MemoryCacheStore;
pub use self::redis::RedisCacheStore;
pub use traits::CacheStore;

use std::sync::Arc;
use std::time::Duration;

/// Build the configured cache backend
pub fn build_cache_store(config: &CacheConfig) -> Result<Arc<dyn CacheStore>, CacheError> {
    let store: Arc<dyn CacheStore> = match config.backend {
        CacheBackend::Redis => Arc::new(RedisCacheStore::new(&config.redis, config.ttl_seconds)?),
        CacheBackend::Memory => Arc::new(MemoryCacheStore::new(
            &config.memory,
            Duration::from_secs(config.ttl_seconds),
        )),
    };

    tracing::info!(backend = store.backend_name(), "Cache store initialized");
    Ok(store)
}
