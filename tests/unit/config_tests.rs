// Configuration loading tests

use kitsune::cache::CacheBackend;
use kitsune::config::{Config, ConfigError, LogFormat};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

#[test]
fn test_sample_config_parses_with_env() {
    std::env::set_var("KITSUNE_HMAC_SECRET", "sample-secret");
    std::env::set_var("KITSUNE_REDIS_URL", "redis://localhost:6379");

    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config.yaml");
    let config = Config::from_file(path).unwrap();

    assert!(config.security.hmac_enabled);
    assert_eq!(config.security.hmac_secret.as_deref(), Some("sample-secret"));
    assert_eq!(config.cache.backend, CacheBackend::Redis);
    assert_eq!(
        config.cache.redis.redis_url.as_deref(),
        Some("redis://localhost:6379")
    );
    assert_eq!(config.remote_fetch.blocked_ranges, vec!["100.64.0.0/10"]);
    assert_eq!(config.logging.format, LogFormat::Json);
    assert!(config.validate().is_ok());
}

#[test]
fn test_memory_backend_config_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    let yaml = r#"
server:
  port: 9000
  request_timeout: 5
object_store:
  bucket: "assets"
  endpoint: "http://localhost:9000"
  access_key: "minio"
  secret_key: "minio123"
  force_path_style: true
cache:
  backend: memory
  ttl_seconds: 120
  memory:
    max_size_mb: 64
logging:
  format: pretty
"#;
    temp_file.write_all(yaml.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = Config::from_file(temp_file.path()).unwrap();

    assert_eq!(config.server.listen_addr(), "0.0.0.0:9000");
    assert_eq!(config.server.request_timeout().as_secs(), 5);
    assert_eq!(config.cache.backend, CacheBackend::Memory);
    assert_eq!(config.cache.memory.max_size_bytes(), 64 * 1024 * 1024);
    assert_eq!(config.logging.format, LogFormat::Pretty);
    assert!(config.validate().is_ok());
}

#[test]
fn test_invalid_yaml_is_parse_error() {
    let err = Config::from_yaml_with_env("object_store: [not, a, map]").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_zero_download_limit_is_rejected() {
    let yaml = r#"
object_store:
  bucket: "images"
remote_fetch:
  max_download_size_mb: 0
cache:
  backend: memory
"#;
    let config = Config::from_yaml_with_env(yaml).unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("max_download_size_mb"));
}
