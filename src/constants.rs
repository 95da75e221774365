// Constants module - centralized default values for configuration
//
// Defaults used by the config layer and the components it builds.

// =============================================================================
// Server defaults
// =============================================================================

/// Default request timeout in seconds (bounds the whole transform pipeline)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default number of worker threads
pub const DEFAULT_THREADS: usize = 4;

/// Default listen address
pub const DEFAULT_ADDRESS: &str = "0.0.0.0";

/// Default listen port
pub const DEFAULT_PORT: u16 = 8080;

// =============================================================================
// Logging defaults
// =============================================================================

/// Default log level when RUST_LOG is not set
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Remote origin defaults
// =============================================================================

/// Default overall timeout for a remote origin fetch, in seconds
pub const DEFAULT_REMOTE_FETCH_TIMEOUT_SECS: u64 = 30;

/// Default maximum remote download size in megabytes
pub const DEFAULT_MAX_DOWNLOAD_SIZE_MB: u64 = 10;

/// Bytes per megabyte for size limits
pub const BYTES_PER_MB: u64 = 1024 * 1024;

// =============================================================================
// Object store defaults
// =============================================================================

/// Default object store region
pub const DEFAULT_OBJECT_STORE_REGION: &str = "us-east-1";

// =============================================================================
// Cache defaults
// =============================================================================

/// Default TTL for cached transformations in seconds (1 hour)
pub const DEFAULT_TTL_SECONDS: u64 = 3600;

/// Default Redis key prefix
pub const DEFAULT_REDIS_KEY_PREFIX: &str = "kitsune";

/// Default Redis connection timeout in milliseconds
pub const DEFAULT_REDIS_CONNECTION_TIMEOUT_MS: u64 = 5000;

/// Default Redis operation timeout in milliseconds
pub const DEFAULT_REDIS_OPERATION_TIMEOUT_MS: u64 = 2000;

/// Default in-memory cache capacity in megabytes
pub const DEFAULT_MEMORY_CACHE_SIZE_MB: u64 = 256;

// =============================================================================
// Image defaults
// =============================================================================

/// Default output quality when the request does not specify one
pub const DEFAULT_QUALITY: u8 = 80;

/// Default watermark opacity
pub const DEFAULT_WATERMARK_OPACITY: f32 = 0.5;

/// Largest output width a request may ask for
pub const DEFAULT_MAX_OUTPUT_WIDTH: u32 = 4096;

/// Largest output height a request may ask for
pub const DEFAULT_MAX_OUTPUT_HEIGHT: u32 = 4096;

/// Maximum decoded source size in pixels (image bomb protection)
pub const DEFAULT_MAX_SOURCE_PIXELS: u64 = 100_000_000;

/// AVIF encoder speed (1 = slowest/best, 10 = fastest)
pub const DEFAULT_AVIF_SPEED: u8 = 6;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ttl_is_one_hour() {
        assert_eq!(DEFAULT_TTL_SECONDS, 60 * 60);
    }

    #[test]
    fn test_megabyte_is_binary() {
        assert_eq!(DEFAULT_MAX_DOWNLOAD_SIZE_MB * BYTES_PER_MB, 10_485_760);
    }
}
