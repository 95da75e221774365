// Error types module

use http::StatusCode;
use std::time::Duration;

use crate::image_optimizer::ImageError;
use crate::origin::OriginError;
use crate::pipeline::PipelineError;
use crate::security::SignatureError;

/// Client-facing error for a gateway request
///
/// Every component error is converted into one of these categories, which
/// fixes the HTTP status. Cache errors never reach this type.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GatewayError {
    /// Malformed or missing request parameters
    #[error("{0}")]
    Validation(String),

    /// Signature rejection or a source address the gateway may not reach
    #[error("{0}")]
    Forbidden(String),

    /// The origin could not supply the source image
    #[error("{0}")]
    Upstream(String),

    /// Image processing or watermark failure
    #[error("{0}")]
    Processing(String),

    #[error("request did not complete within {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("no route for {0}")]
    NotFound(String),

    #[error("method {0} is not allowed")]
    MethodNotAllowed(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::Forbidden(_) => StatusCode::FORBIDDEN,
            GatewayError::Upstream(_) => StatusCode::BAD_GATEWAY,
            GatewayError::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    /// JSON body: `{"error": <reason phrase>, "message": <text>, "status": <code>}`
    pub fn to_json(&self) -> String {
        let status = self.status();
        serde_json::json!({
            "error": status.canonical_reason().unwrap_or("Error"),
            "message": self.to_string(),
            "status": status.as_u16(),
        })
        .to_string()
    }
}

// Client-visible messages are fixed per category. Resolved addresses, DNS
// and transport details and object store responses stay in the logs.

impl From<SignatureError> for GatewayError {
    fn from(err: SignatureError) -> Self {
        GatewayError::Forbidden(err.to_string())
    }
}

impl From<OriginError> for GatewayError {
    fn from(err: OriginError) -> Self {
        match err {
            OriginError::SsrfRejected { .. } => {
                GatewayError::Forbidden("source address not allowed".to_string())
            }
            OriginError::InvalidUrl(_) => {
                GatewayError::Validation("source url is not a valid http(s) url".to_string())
            }
            OriginError::UpstreamStatus(code) => {
                GatewayError::Upstream(format!("origin responded with status {}", code))
            }
            OriginError::PayloadTooLarge { .. } => {
                GatewayError::Upstream("source image exceeds the download size limit".to_string())
            }
            OriginError::InvalidContentType(_) => {
                GatewayError::Upstream("source is not an image".to_string())
            }
            OriginError::DnsResolution { .. }
            | OriginError::Transport(_)
            | OriginError::ObjectStore { .. } => {
                GatewayError::Upstream("upstream fetch failed".to_string())
            }
        }
    }
}

impl From<ImageError> for GatewayError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::InvalidParameter { .. } => GatewayError::Validation(err.to_string()),
            _ => GatewayError::Processing("image processing failed".to_string()),
        }
    }
}

impl From<PipelineError> for GatewayError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::OriginUnavailable(origin) => origin.into(),
            PipelineError::Processing(_) => {
                GatewayError::Processing("image processing failed".to_string())
            }
            PipelineError::WatermarkUnavailable(_) => {
                GatewayError::Processing("watermark asset unavailable".to_string())
            }
        }
    }
}
