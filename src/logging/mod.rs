// Logging module for structured logging using the tracing crate

use std::error::Error;
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

/// Initialize the tracing subscriber for structured logging
///
/// The filter comes from `RUST_LOG` when set, otherwise from the configured
/// level. Output goes to stdout as JSON lines (for log aggregation) or in
/// the multi-line pretty format for local development.
///
/// # Errors
///
/// Returns an error if the level directive cannot be parsed or a global
/// subscriber is already installed.
///
/// # Examples
///
/// ```
/// use kitsune::config::LoggingConfig;
/// use kitsune::logging::init_subscriber;
///
/// init_subscriber(&LoggingConfig::default()).expect("Failed to initialize logging");
///
/// tracing::info!("Application started");
/// ```
pub fn init_subscriber(config: &LoggingConfig) -> Result<(), Box<dyn Error + Send + Sync>> {
    let filter = build_filter(config)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    }
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, Box<dyn Error + Send + Sync>> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => Ok(EnvFilter::try_new(&config.level)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_accepts_directives() {
        let config = LoggingConfig {
            level: "kitsune=debug,pingora=warn".to_string(),
            format: LogFormat::Pretty,
        };
        assert!(build_filter(&config).is_ok());
    }

    #[test]
    fn test_init_twice_fails() {
        let config = LoggingConfig::default();
        let _ = init_subscriber(&config);
        assert!(init_subscriber(&config).is_err());
    }
}
