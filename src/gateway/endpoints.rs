//! Response builders for the gateway routes.
//!
//! Handlers return `GatewayResponse` instead of writing to the Pingora
//! session, so response generation stays testable. The caller writes the
//! response to the session.

use bytes::Bytes;

use crate::error::GatewayError;
use crate::metrics::Metrics;
use crate::pipeline::{CacheStatus, ProcessedImage};

/// Response produced by a gateway route
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Bytes,
    /// Set for transform responses, written as `X-Cache`
    pub cache_status: Option<CacheStatus>,
}

impl GatewayResponse {
    pub fn text(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: body.into(),
            cache_status: None,
        }
    }

    pub fn error(err: &GatewayError) -> Self {
        Self {
            status: err.status().as_u16(),
            content_type: "application/json",
            body: Bytes::from(err.to_json()),
            cache_status: None,
        }
    }

    pub fn image(image: ProcessedImage) -> Self {
        Self {
            status: 200,
            content_type: image.content_type,
            body: image.data,
            cache_status: Some(image.cache_status),
        }
    }
}

/// Generate response for /health
pub fn handle_health() -> GatewayResponse {
    GatewayResponse::text(200, "OK")
}

/// Generate response for /metrics (Prometheus text format)
pub fn handle_metrics(metrics: &Metrics) -> GatewayResponse {
    match metrics.export_prometheus() {
        Ok(body) => GatewayResponse {
            status: 200,
            content_type: "text/plain; version=0.0.4",
            body: Bytes::from(body),
            cache_status: None,
        },
        Err(e) => {
            tracing::error!(error = %e, "Failed to export metrics");
            GatewayResponse::error(&GatewayError::Processing(
                "failed to export metrics".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_is_plain_ok() {
        let response = handle_health();
        assert_eq!(response.status, 200);
        assert_eq!(response.content_type, "text/plain");
        assert_eq!(response.body, Bytes::from_static(b"OK"));
    }

    #[test]
    fn test_metrics_exports_registry() {
        let metrics = Metrics::new().unwrap();
        metrics.increment_cache_miss();

        let response = handle_metrics(&metrics);

        assert_eq!(response.status, 200);
        assert!(response.content_type.starts_with("text/plain"));
        let body = String::from_utf8(response.body.to_vec()).unwrap();
        assert!(body.contains("kitsune_cache_misses_total 1"));
    }

    #[test]
    fn test_error_response_is_json() {
        let response = GatewayResponse::error(&GatewayError::NotFound("/nope".to_string()));
        assert_eq!(response.status, 404);
        assert_eq!(response.content_type, "application/json");
        let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(body["error"], "Not Found");
    }

    #[test]
    fn test_image_response_carries_cache_status() {
        let response = GatewayResponse::image(ProcessedImage {
            data: Bytes::from_static(b"img"),
            content_type: "image/webp",
            cache_status: CacheStatus::Hit,
        });
        assert_eq!(response.status, 200);
        assert_eq!(response.content_type, "image/webp");
        assert_eq!(response.cache_status, Some(CacheStatus::Hit));
    }
}
