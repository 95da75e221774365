// Origin fetch errors

use std::net::IpAddr;

/// Why a source image could not be fetched
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OriginError {
    #[error("invalid source url: {0}")]
    InvalidUrl(String),

    #[error("failed to resolve {host}: {message}")]
    DnsResolution { host: String, message: String },

    #[error("host {host} resolves to non-public address {address}")]
    SsrfRejected { host: String, address: IpAddr },

    #[error("upstream responded with status {0}")]
    UpstreamStatus(u16),

    #[error("payload of at least {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: u64, limit: u64 },

    #[error("upstream content type {0:?} is not an image")]
    InvalidContentType(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("object store fetch of {key} failed: {message}")]
    ObjectStore { key: String, message: String },
}

impl OriginError {
    /// Short label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            OriginError::InvalidUrl(_) => "invalid_url",
            OriginError::DnsResolution { .. } => "dns",
            OriginError::SsrfRejected { .. } => "ssrf_rejected",
            OriginError::UpstreamStatus(_) => "upstream_status",
            OriginError::PayloadTooLarge { .. } => "payload_too_large",
            OriginError::InvalidContentType(_) => "invalid_content_type",
            OriginError::Transport(_) => "transport",
            OriginError::ObjectStore { .. } => "object_store",
        }
    }
}
