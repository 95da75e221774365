// Gateway module - Pingora ProxyHttp implementation
// Answers every route from request_filter; nothing is proxied upstream.

pub mod endpoints;
pub mod query;

pub use endpoints::{handle_health, handle_metrics, GatewayResponse};
pub use query::{parse_transform_query, TransformRequest};

use async_trait::async_trait;
use pingora_core::upstreams::peer::HttpPeer;
use pingora_core::Result;
use pingora_http::ResponseHeader;
use pingora_proxy::{ProxyHttp, Session};
use std::sync::Arc;
use std::time::Duration;

use crate::error::GatewayError;
use crate::image_optimizer::OutputLimits;
use crate::metrics::Metrics;
use crate::pipeline::{RequestContext, TransformationOrchestrator};
use crate::security::SignatureVerifier;

pub const HEALTH_PATH: &str = "/health";
pub const METRICS_PATH: &str = "/metrics";
pub const TRANSFORM_PATH: &str = "/transform";

/// Metrics label for a request path: the route, or "other"
pub fn route_label(path: &str) -> &'static str {
    match path {
        HEALTH_PATH => HEALTH_PATH,
        METRICS_PATH => METRICS_PATH,
        TRANSFORM_PATH => TRANSFORM_PATH,
        _ => "other",
    }
}

/// Metrics label for a request method: a standard method, or "OTHER"
pub fn method_label(method: &str) -> &'static str {
    match method {
        "GET" => "GET",
        "HEAD" => "HEAD",
        "POST" => "POST",
        "PUT" => "PUT",
        "DELETE" => "DELETE",
        "PATCH" => "PATCH",
        "OPTIONS" => "OPTIONS",
        "CONNECT" => "CONNECT",
        "TRACE" => "TRACE",
        _ => "OTHER",
    }
}

/// KitsuneGateway implements the Pingora ProxyHttp trait
pub struct KitsuneGateway {
    orchestrator: TransformationOrchestrator,
    /// Present only when request signing is enabled
    verifier: Option<SignatureVerifier>,
    metrics: Arc<Metrics>,
    request_timeout: Duration,
    limits: OutputLimits,
}

impl KitsuneGateway {
    pub fn new(
        orchestrator: TransformationOrchestrator,
        verifier: Option<SignatureVerifier>,
        metrics: Arc<Metrics>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            orchestrator,
            verifier,
            metrics,
            request_timeout,
            limits: OutputLimits::default(),
        }
    }

    /// Largest width and height a transform request may ask for
    pub fn with_output_limits(mut self, limits: OutputLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn signing_enabled(&self) -> bool {
        self.verifier.is_some()
    }

    /// Route a request and build its response
    pub async fn handle(&self, method: &str, path: &str, query: Option<&str>) -> GatewayResponse {
        let route = route_label(path);
        if route == "other" {
            return GatewayResponse::error(&GatewayError::NotFound(path.to_string()));
        }
        if method != "GET" {
            return GatewayResponse::error(&GatewayError::MethodNotAllowed(method.to_string()));
        }

        match route {
            HEALTH_PATH => handle_health(),
            METRICS_PATH => handle_metrics(&self.metrics),
            _ => match self.transform(query.unwrap_or("")).await {
                Ok(response) => response,
                Err(e) => {
                    if e.status().is_server_error() {
                        tracing::error!(status = e.status().as_u16(), error = %e, "Transform failed");
                    } else {
                        tracing::warn!(status = e.status().as_u16(), error = %e, "Transform rejected");
                    }
                    GatewayResponse::error(&e)
                }
            },
        }
    }

    async fn transform(&self, raw_query: &str) -> std::result::Result<GatewayResponse, GatewayError> {
        if let Some(verifier) = &self.verifier {
            if let Err(e) = verifier.verify(raw_query) {
                self.metrics.increment_signature_rejection(e.reason());
                tracing::warn!(reason = e.reason(), "Signature rejected");
                return Err(e.into());
            }
        }

        let request = parse_transform_query(raw_query, &self.limits)?;

        tracing::debug!(
            source = %request.source,
            width = request.options.width,
            height = request.options.height,
            format = request.options.format.as_str(),
            "Transform request"
        );

        let image = tokio::time::timeout(
            self.request_timeout,
            self.orchestrator.process(&request.options, &request.source),
        )
        .await
        .map_err(|_| GatewayError::Timeout(self.request_timeout))??;

        Ok(GatewayResponse::image(image))
    }
}

async fn write_response(
    session: &mut Session,
    response: GatewayResponse,
    request_id: &str,
) -> Result<()> {
    let mut header = ResponseHeader::build(response.status, None)?;
    header.insert_header("Content-Type", response.content_type)?;
    header.insert_header("Content-Length", response.body.len().to_string())?;
    header.insert_header("X-Request-Id", request_id)?;
    if let Some(cache_status) = response.cache_status {
        header.insert_header("X-Cache", cache_status.as_header_value())?;
    }

    session
        .write_response_header(Box::new(header), false)
        .await?;
    session.write_response_body(Some(response.body), true).await?;
    Ok(())
}

#[async_trait]
impl ProxyHttp for KitsuneGateway {
    type CTX = RequestContext;

    fn new_ctx(&self) -> Self::CTX {
        RequestContext::new()
    }

    /// Never reached: request_filter answers every request
    async fn upstream_peer(
        &self,
        _session: &mut Session,
        _ctx: &mut Self::CTX,
    ) -> Result<Box<HttpPeer>> {
        Err(pingora_core::Error::explain(
            pingora_core::ErrorType::InternalError,
            "kitsune has no upstream peer",
        ))
    }

    async fn request_filter(&self, session: &mut Session, ctx: &mut Self::CTX) -> Result<bool> {
        let req = session.req_header();
        let method = req.method.as_str().to_string();
        let path = req.uri.path().to_string();
        let query = req.uri.query().map(str::to_string);

        ctx.set_request(&method, route_label(&path));

        let response = self.handle(&method, &path, query.as_deref()).await;
        write_response(session, response, ctx.request_id()).await?;

        Ok(true)
    }

    async fn logging(
        &self,
        session: &mut Session,
        _e: Option<&pingora_core::Error>,
        ctx: &mut Self::CTX,
    ) {
        let status = session
            .response_written()
            .map(|resp| resp.status.as_u16())
            .unwrap_or(500);
        let duration = ctx.elapsed();

        self.metrics.record_request(
            status,
            method_label(ctx.method()),
            ctx.route(),
            duration,
        );

        tracing::info!(
            request_id = %ctx.request_id(),
            method = %ctx.method(),
            path = ctx.route(),
            status = status,
            duration_ms = duration.as_millis() as u64,
            "Request completed"
        );
    }
}
