//! Cache trait definition
//!
//! Transformed images are cached as opaque byte blobs keyed by their
//! fingerprint. The TTL is a property of the store, not of each entry.

use async_trait::async_trait;
use bytes::Bytes;

use super::error::CacheError;
use super::fingerprint::CacheFingerprint;

/// Byte-oriented cache for transformed images
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get the bytes stored under a fingerprint
    /// Returns None if the key is not found or the entry has expired
    async fn get(&self, fingerprint: &CacheFingerprint) -> Result<Option<Bytes>, CacheError>;

    /// Store bytes under a fingerprint with the store's TTL
    /// Overwrites existing entry if key already exists
    async fn set(&self, fingerprint: &CacheFingerprint, data: Bytes) -> Result<(), CacheError>;

    /// Backend name for logs
    fn backend_name(&self) -> &'static str;
}
