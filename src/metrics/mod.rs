// Metrics module - Prometheus metrics for the gateway
//
// One `Metrics` instance is created at startup and shared as `Arc<Metrics>`.
// Collectors live in an instance-owned registry, so independent instances
// (tests, embedded gateways) never collide on metric names.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;

/// Prefix shared by every exported metric
const NAMESPACE: &str = "kitsune";

/// Request duration buckets in seconds (5ms to 30s)
const DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
];

/// Gateway metrics backed by an instance-owned Prometheus registry
pub struct Metrics {
    registry: Registry,

    /// Transform requests served from cache
    cache_hits: IntCounter,

    /// Transform requests that had to go to an origin
    cache_misses: IntCounter,

    /// Cache backend failures by operation (get, set)
    cache_errors: IntCounterVec,

    /// Requests by status, method and route
    http_requests: IntCounterVec,

    /// Request latency by status, method and route
    http_request_duration: HistogramVec,

    /// Rejected request signatures by reason (missing, malformed, invalid)
    signature_rejections: IntCounterVec,
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("cache_hits", &self.cache_hits.get())
            .field("cache_misses", &self.cache_misses.get())
            .finish()
    }
}

impl Metrics {
    /// Create a new Metrics instance with its own registry
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let cache_hits = IntCounter::with_opts(
            Opts::new("cache_hits_total", "Transform requests served from cache")
                .namespace(NAMESPACE),
        )?;
        let cache_misses = IntCounter::with_opts(
            Opts::new(
                "cache_misses_total",
                "Transform requests that required an origin fetch",
            )
            .namespace(NAMESPACE),
        )?;
        let cache_errors = IntCounterVec::new(
            Opts::new("cache_errors_total", "Cache backend failures by operation")
                .namespace(NAMESPACE),
            &["operation"],
        )?;
        let http_requests = IntCounterVec::new(
            Opts::new("http_requests_total", "HTTP requests by status, method and path")
                .namespace(NAMESPACE),
            &["status", "method", "path"],
        )?;
        let http_request_duration = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request latency in seconds",
            )
            .namespace(NAMESPACE)
            .buckets(DURATION_BUCKETS.to_vec()),
            &["status", "method", "path"],
        )?;
        let signature_rejections = IntCounterVec::new(
            Opts::new(
                "signature_rejections_total",
                "Requests rejected by signature verification",
            )
            .namespace(NAMESPACE),
            &["reason"],
        )?;

        registry.register(Box::new(cache_hits.clone()))?;
        registry.register(Box::new(cache_misses.clone()))?;
        registry.register(Box::new(cache_errors.clone()))?;
        registry.register(Box::new(http_requests.clone()))?;
        registry.register(Box::new(http_request_duration.clone()))?;
        registry.register(Box::new(signature_rejections.clone()))?;

        Ok(Self {
            registry,
            cache_hits,
            cache_misses,
            cache_errors,
            http_requests,
            http_request_duration,
            signature_rejections,
        })
    }

    pub fn increment_cache_hit(&self) {
        self.cache_hits.inc();
    }

    pub fn increment_cache_miss(&self) {
        self.cache_misses.inc();
    }

    pub fn increment_cache_error(&self, operation: &str) {
        self.cache_errors.with_label_values(&[operation]).inc();
    }

    pub fn increment_signature_rejection(&self, reason: &str) {
        self.signature_rejections.with_label_values(&[reason]).inc();
    }

    /// Record one finished HTTP request
    pub fn record_request(&self, status: u16, method: &str, path: &str, duration: Duration) {
        let status = status.to_string();
        let labels = [status.as_str(), method, path];
        self.http_requests.with_label_values(&labels).inc();
        self.http_request_duration
            .with_label_values(&labels)
            .observe(duration.as_secs_f64());
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.get()
    }

    pub fn cache_misses(&self) -> u64 {
        self.cache_misses.get()
    }

    pub fn cache_errors(&self, operation: &str) -> u64 {
        self.cache_errors.with_label_values(&[operation]).get()
    }

    pub fn signature_rejections(&self, reason: &str) -> u64 {
        self.signature_rejections.with_label_values(&[reason]).get()
    }

    pub fn requests(&self, status: u16, method: &str, path: &str) -> u64 {
        self.http_requests
            .with_label_values(&[status.to_string().as_str(), method, path])
            .get()
    }

    /// Export metrics in Prometheus text format
    pub fn export_prometheus(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
