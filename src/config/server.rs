//! Server configuration types.
//!
//! Listen address, worker threads and the per-request timeout that bounds
//! the whole transform pipeline. Defaults come from `crate::constants`.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{DEFAULT_ADDRESS, DEFAULT_PORT, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_THREADS};

fn default_address() -> String {
    DEFAULT_ADDRESS.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

// Default worker thread count
fn default_threads() -> usize {
    DEFAULT_THREADS
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Number of worker threads (default: 4)
    #[serde(default = "default_threads")]
    pub threads: usize,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            threads: default_threads(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl ServerConfig {
    /// "address:port" for the TCP listener
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.address.trim().is_empty() {
            return Err("server.address cannot be empty".to_string());
        }
        if self.threads == 0 {
            return Err("server.threads must be greater than 0".to_string());
        }
        if self.request_timeout == 0 {
            return Err("server.request_timeout must be greater than 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_deserialize_defaults() {
        let config: ServerConfig = serde_yaml::from_str("{}").unwrap();

        assert_eq!(config.address, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.threads, DEFAULT_THREADS);
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT_SECS);
    }

    #[test]
    fn test_server_config_deserialize_custom() {
        let yaml = r#"
address: "127.0.0.1"
port: 9090
threads: 8
request_timeout: 60
"#;
        let config: ServerConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.listen_addr(), "127.0.0.1:9090");
        assert_eq!(config.threads, 8);
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_zero_timeout_is_invalid() {
        let config = ServerConfig {
            request_timeout: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
