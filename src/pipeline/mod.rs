// Request pipeline module - per-request context and the transform orchestrator

pub mod error;
pub mod options;
pub mod orchestrator;

pub use error::PipelineError;
pub use options::{TransformationOptions, WatermarkOptions};
pub use orchestrator::{CacheStatus, ProcessedImage, TransformationOrchestrator};

use std::time::Instant;
use uuid::Uuid;

/// Request context that follows an HTTP request through the gateway
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: String,
    started: Instant,
    method: String,
    route: &'static str,
}

impl RequestContext {
    /// Create a new RequestContext
    /// Automatically generates a unique request ID (UUID v4) and starts the clock
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            started: Instant::now(),
            method: String::new(),
            route: "other",
        }
    }

    /// Get the unique request ID
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Get the HTTP method
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Route label for metrics: a known path or "other"
    pub fn route(&self) -> &'static str {
        self.route
    }

    pub fn set_request(&mut self, method: &str, route: &'static str) {
        self.method = method.to_string();
        self.route = route;
    }

    /// Time since the request arrived
    pub fn elapsed(&self) -> std::time::Duration {
        self.started.elapsed()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_context_new() {
        let ctx = RequestContext::new();
        assert_eq!(ctx.route(), "other");
        assert!(Uuid::parse_str(ctx.request_id()).is_ok());
    }

    #[test]
    fn test_request_ids_are_unique() {
        assert_ne!(
            RequestContext::new().request_id(),
            RequestContext::new().request_id()
        );
    }

    #[test]
    fn test_set_request() {
        let mut ctx = RequestContext::new();
        ctx.set_request("GET", "/transform");
        assert_eq!(ctx.method(), "GET");
        assert_eq!(ctx.route(), "/transform");
    }
}
