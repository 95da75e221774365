//! Memory cache implementation
//!
//! `MemoryCacheStore` keeps transformed images in a moka cache bounded by
//! total byte size, with the service-wide TTL applied to every entry.

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

use super::config::MemoryCacheConfig;
use super::error::CacheError;
use super::fingerprint::CacheFingerprint;
use super::traits::CacheStore;

/// MemoryCacheStore wraps moka for the CacheStore trait
pub struct MemoryCacheStore {
    cache: moka::future::Cache<CacheFingerprint, Bytes>,
    max_size_bytes: u64,
}

impl MemoryCacheStore {
    /// Create a new MemoryCacheStore from configuration
    pub fn new(config: &MemoryCacheConfig, ttl: Duration) -> Self {
        let cache = moka::future::Cache::builder()
            .max_capacity(config.max_size_bytes())
            .time_to_live(ttl)
            .weigher(|_key, value: &Bytes| u32::try_from(value.len()).unwrap_or(u32::MAX))
            .build();

        Self {
            cache,
            max_size_bytes: config.max_size_bytes(),
        }
    }

    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    /// Number of live entries (after pending maintenance has run)
    pub async fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, fingerprint: &CacheFingerprint) -> Result<Option<Bytes>, CacheError> {
        Ok(self.cache.get(fingerprint).await)
    }

    async fn set(&self, fingerprint: &CacheFingerprint, data: Bytes) -> Result<(), CacheError> {
        self.cache.insert(fingerprint.clone(), data).await;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
