//! Cache configuration types
//!
//! One backend serves all transformed images:
//! - `redis` - shared across gateway instances (production)
//! - `memory` - process-local moka cache (single instance, development)

use serde::{Deserialize, Serialize};

use crate::constants::{
    BYTES_PER_MB, DEFAULT_MEMORY_CACHE_SIZE_MB, DEFAULT_REDIS_CONNECTION_TIMEOUT_MS,
    DEFAULT_REDIS_KEY_PREFIX, DEFAULT_REDIS_OPERATION_TIMEOUT_MS, DEFAULT_TTL_SECONDS,
};

/// Which store holds transformed images
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Redis,
    Memory,
}

/// Main cache configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub backend: CacheBackend,
    /// TTL applied to every entry, in seconds
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub memory: MemoryCacheConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            ttl_seconds: default_ttl_seconds(),
            redis: RedisConfig::default(),
            memory: MemoryCacheConfig::default(),
        }
    }
}

fn default_ttl_seconds() -> u64 {
    DEFAULT_TTL_SECONDS
}

impl CacheConfig {
    /// Validate cache configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.ttl_seconds == 0 {
            return Err("cache.ttl_seconds must be greater than 0".to_string());
        }

        match self.backend {
            CacheBackend::Redis => self.redis.validate(),
            CacheBackend::Memory => self.memory.validate(),
        }
    }
}

/// Redis connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL (e.g., "redis://localhost:6379")
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Key prefix for cache entries (default: "kitsune")
    #[serde(default = "default_redis_key_prefix")]
    pub redis_key_prefix: String,

    /// Connection timeout in milliseconds (default: 5000 = 5 seconds)
    #[serde(default = "default_connection_timeout_ms")]
    pub connection_timeout_ms: u64,

    /// Operation timeout in milliseconds (default: 2000 = 2 seconds)
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            redis_key_prefix: default_redis_key_prefix(),
            connection_timeout_ms: default_connection_timeout_ms(),
            operation_timeout_ms: default_operation_timeout_ms(),
        }
    }
}

fn default_redis_key_prefix() -> String {
    DEFAULT_REDIS_KEY_PREFIX.to_string()
}

fn default_connection_timeout_ms() -> u64 {
    DEFAULT_REDIS_CONNECTION_TIMEOUT_MS
}

fn default_operation_timeout_ms() -> u64 {
    DEFAULT_REDIS_OPERATION_TIMEOUT_MS
}

impl RedisConfig {
    pub fn validate(&self) -> Result<(), String> {
        match &self.redis_url {
            None => return Err("cache.redis.redis_url is required for the redis backend".to_string()),
            Some(url) if !url.starts_with("redis://") && !url.starts_with("rediss://") => {
                return Err(format!(
                    "cache.redis.redis_url must start with redis:// or rediss://, got '{}'",
                    url
                ));
            }
            Some(_) => {}
        }

        if self.redis_key_prefix.is_empty() {
            return Err("cache.redis.redis_key_prefix cannot be empty".to_string());
        }
        if self.operation_timeout_ms == 0 {
            return Err("cache.redis.operation_timeout_ms must be greater than 0".to_string());
        }

        Ok(())
    }
}

/// Memory cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryCacheConfig {
    #[serde(default = "default_max_size_mb")]
    pub max_size_mb: u64,
}

impl Default for MemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_size_mb: default_max_size_mb(),
        }
    }
}

fn default_max_size_mb() -> u64 {
    DEFAULT_MEMORY_CACHE_SIZE_MB
}

impl MemoryCacheConfig {
    /// Convert max_size_mb to bytes
    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_mb * BYTES_PER_MB
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_size_mb == 0 {
            return Err("cache.memory.max_size_mb must be greater than 0".to_string());
        }
        Ok(())
    }
}
