//! Origin configuration: the object-store bucket and remote HTTP fetch limits.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{
    BYTES_PER_MB, DEFAULT_MAX_DOWNLOAD_SIZE_MB, DEFAULT_OBJECT_STORE_REGION,
    DEFAULT_REMOTE_FETCH_TIMEOUT_SECS,
};

fn default_region() -> String {
    DEFAULT_OBJECT_STORE_REGION.to_string()
}

/// S3-compatible bucket holding source images and watermark assets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectStoreConfig {
    pub bucket: String,
    #[serde(default = "default_region")]
    pub region: String,
    /// Custom endpoint for S3-compatible stores (MinIO, LocalStack, R2)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Static credentials; the default AWS chain is used when either is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    #[serde(default)]
    pub force_path_style: bool,
}

impl ObjectStoreConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.bucket.trim().is_empty() {
            return Err("object_store.bucket cannot be empty".to_string());
        }
        if self.region.trim().is_empty() {
            return Err("object_store.region cannot be empty".to_string());
        }
        if self.access_key.is_some() != self.secret_key.is_some() {
            return Err(
                "object_store.access_key and object_store.secret_key must be set together"
                    .to_string(),
            );
        }
        Ok(())
    }
}

fn default_max_download_size_mb() -> u64 {
    DEFAULT_MAX_DOWNLOAD_SIZE_MB
}

fn default_timeout_secs() -> u64 {
    DEFAULT_REMOTE_FETCH_TIMEOUT_SECS
}

/// Limits for fetching source images from arbitrary URLs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteFetchConfig {
    /// Largest accepted download in megabytes (default: 10)
    #[serde(default = "default_max_download_size_mb")]
    pub max_download_size_mb: u64,
    /// Overall fetch timeout in seconds (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Ranges blocked in addition to the built-in private ranges (IP or CIDR)
    #[serde(default)]
    pub blocked_ranges: Vec<String>,
}

impl Default for RemoteFetchConfig {
    fn default() -> Self {
        Self {
            max_download_size_mb: default_max_download_size_mb(),
            timeout_secs: default_timeout_secs(),
            blocked_ranges: Vec::new(),
        }
    }
}

impl RemoteFetchConfig {
    pub fn max_download_bytes(&self) -> u64 {
        self.max_download_size_mb.saturating_mul(BYTES_PER_MB)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_download_size_mb == 0 {
            return Err("remote_fetch.max_download_size_mb must be greater than 0".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("remote_fetch.timeout_secs must be greater than 0".to_string());
        }
        for range in &self.blocked_ranges {
            crate::security::IpRange::parse(range)
                .map_err(|e| format!("remote_fetch.blocked_ranges: {}", e))?;
        }
        Ok(())
    }
}
