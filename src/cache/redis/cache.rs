// Redis cache implementation
//
// Stores transformed images as raw byte strings with `SET key value EX ttl`.
// Every command is bounded by the operation timeout so a slow Redis can only
// ever turn into a cache miss.

use crate::cache::{CacheError, CacheFingerprint, CacheStore};
use async_trait::async_trait;
use bytes::Bytes;
use redis::aio::ConnectionManager;
use redis::Client;
use std::future::Future;
use std::time::Duration;
use tokio::sync::OnceCell;

use super::key::format_key;
use crate::cache::config::RedisConfig;

/// Redis-backed distributed cache
///
/// The ConnectionManager multiplexes commands over one connection and
/// reconnects on failure; clones share that connection. It is established on
/// first use so its driver task lives on the runtime that serves requests.
pub struct RedisCacheStore {
    client: Client,

    /// Redis connection manager (async, multiplexed), set on first use
    connection: OnceCell<ConnectionManager>,

    /// Key prefix for all cache entries
    key_prefix: String,

    ttl_seconds: u64,

    connection_timeout: Duration,

    operation_timeout: Duration,
}

impl RedisCacheStore {
    /// Create a store for the configured Redis server
    ///
    /// No connection is made here; see [`RedisCacheStore::connect`].
    ///
    /// # Errors
    ///
    /// Returns CacheError::ConfigurationError if no URL is configured and
    /// CacheError::RedisConnectionFailed if the Redis URL is invalid.
    pub fn new(config: &RedisConfig, ttl_seconds: u64) -> Result<Self, CacheError> {
        let redis_url = config.redis_url.as_ref().ok_or_else(|| {
            CacheError::ConfigurationError("redis_url is required".to_string())
        })?;

        let client = Client::open(redis_url.as_str()).map_err(|e| {
            CacheError::RedisConnectionFailed(format!("Invalid Redis URL: {}", e))
        })?;

        Ok(Self {
            client,
            connection: OnceCell::new(),
            key_prefix: config.redis_key_prefix.clone(),
            ttl_seconds,
            connection_timeout: Duration::from_millis(config.connection_timeout_ms),
            operation_timeout: Duration::from_millis(config.operation_timeout_ms),
        })
    }

    /// Connection to Redis, establishing it if needed
    ///
    /// # Errors
    ///
    /// Returns CacheError::RedisConnectionFailed if the server cannot be
    /// reached within `connection_timeout_ms`. A failed attempt is retried on
    /// the next call.
    pub async fn connect(&self) -> Result<ConnectionManager, CacheError> {
        let connection = self
            .connection
            .get_or_try_init(|| async {
                let connection = tokio::time::timeout(
                    self.connection_timeout,
                    ConnectionManager::new(self.client.clone()),
                )
                .await
                .map_err(|_| {
                    CacheError::RedisConnectionFailed(format!(
                        "Timed out connecting after {}ms",
                        self.connection_timeout.as_millis()
                    ))
                })?
                .map_err(|e| {
                    CacheError::RedisConnectionFailed(format!("Failed to connect to Redis: {}", e))
                })?;

                tracing::info!(
                    key_prefix = %self.key_prefix,
                    ttl_seconds = self.ttl_seconds,
                    "Connected to Redis cache"
                );
                Ok::<_, CacheError>(connection)
            })
            .await?;

        Ok(connection.clone())
    }

    /// Full Redis key for a fingerprint
    pub fn key_for(&self, fingerprint: &CacheFingerprint) -> String {
        format_key(&self.key_prefix, fingerprint.as_str())
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> Result<T, CacheError>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match tokio::time::timeout(self.operation_timeout, fut).await {
            Ok(result) => result.map_err(CacheError::from),
            Err(_) => Err(CacheError::Timeout {
                operation,
                after_ms: self.operation_timeout.as_millis() as u64,
            }),
        }
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, fingerprint: &CacheFingerprint) -> Result<Option<Bytes>, CacheError> {
        let key = self.key_for(fingerprint);
        let mut conn = self.connect().await?;

        let value: Option<Vec<u8>> = self
            .bounded("get", async move {
                let reply: redis::RedisResult<Option<Vec<u8>>> =
                    redis::cmd("GET").arg(&key).query_async(&mut conn).await;
                reply
            })
            .await?;

        Ok(value.map(Bytes::from))
    }

    async fn set(&self, fingerprint: &CacheFingerprint, data: Bytes) -> Result<(), CacheError> {
        let key = self.key_for(fingerprint);
        let ttl = self.ttl_seconds;
        let mut conn = self.connect().await?;

        self.bounded("set", async move {
            let reply: redis::RedisResult<()> = redis::cmd("SET")
                .arg(&key)
                .arg(data.as_ref())
                .arg("EX")
                .arg(ttl)
                .query_async(&mut conn)
                .await;
            reply
        })
        .await
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

// Verify Send + Sync bounds (required for async trait)
fn _assert_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    assert_send::<RedisCacheStore>();
    assert_sync::<RedisCacheStore>();
}
