//! Cache backend failures
//!
//! A missing entry is `Ok(None)`, not an error. The orchestrator treats every
//! variant here as a miss.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    #[error("cache {operation} gave up after {after_ms}ms")]
    Timeout { operation: &'static str, after_ms: u64 },

    #[error("cannot reach redis: {0}")]
    RedisConnectionFailed(String),

    #[error("redis command failed: {0}")]
    RedisError(String),

    #[error("cache misconfigured: {0}")]
    ConfigurationError(String),
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::RedisError(err.to_string())
    }
}
