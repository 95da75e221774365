// Configuration module

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

mod origin;
mod server;

pub use origin::{ObjectStoreConfig, RemoteFetchConfig};
pub use server::ServerConfig;

pub use crate::cache::CacheConfig;
pub use crate::image_optimizer::ImageConfig;

use crate::constants::DEFAULT_LOG_LEVEL;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    pub object_store: ObjectStoreConfig,
    #[serde(default)]
    pub remote_fetch: RemoteFetchConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub image: ImageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Request signing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Require an HMAC-SHA256 signature (`s` parameter) on transform requests
    #[serde(default)]
    pub hmac_enabled: bool,
    #[serde(default, skip_serializing)]
    pub hmac_secret: Option<String>,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when RUST_LOG is unset (e.g. "info", "kitsune=debug")
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Configuration loading and validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable '{0}' is referenced but not set")]
    MissingEnvVar(String),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl Config {
    /// Parse YAML, replacing `${VAR_NAME}` with environment variable values
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, ConfigError> {
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        // Every referenced variable must exist
        for caps in re.captures_iter(yaml) {
            let var_name = &caps[1];
            if std::env::var(var_name).is_err() {
                return Err(ConfigError::MissingEnvVar(var_name.to_string()));
            }
        }

        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        });

        Ok(serde_yaml::from_str(&substituted)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_with_env(&yaml)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate().map_err(ConfigError::Invalid)?;
        self.object_store.validate().map_err(ConfigError::Invalid)?;
        self.remote_fetch.validate().map_err(ConfigError::Invalid)?;
        self.cache.validate().map_err(ConfigError::Invalid)?;
        self.image.validate().map_err(ConfigError::Invalid)?;

        if self.security.hmac_enabled {
            match self.security.hmac_secret.as_deref() {
                Some(secret) if !secret.is_empty() => {}
                _ => {
                    return Err(ConfigError::Invalid(
                        "security.hmac_secret is required when hmac_enabled is true".to_string(),
                    ))
                }
            }
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "logging.level cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
