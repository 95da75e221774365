//! Source Image Origins
//!
//! A transform request names its source image with a single identifier.
//! Identifiers starting with `http` are fetched from the network by
//! [`RemoteHttpOrigin`]; everything else is an object key in the configured
//! bucket, fetched by [`ObjectStoreOrigin`].

pub mod error;
pub mod object_store;
pub mod remote;

pub use error::OriginError;
pub use object_store::ObjectStoreOrigin;
pub use remote::{HostResolver, RemoteHttpOrigin, SystemResolver};

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;

/// Which origin produced a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginKind {
    ObjectStore,
    RemoteHttp,
}

impl OriginKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OriginKind::ObjectStore => "object_store",
            OriginKind::RemoteHttp => "remote_http",
        }
    }
}

/// Raw source bytes and where they came from
#[derive(Debug, Clone)]
pub struct OriginFetchResult {
    pub bytes: Bytes,
    pub origin: OriginKind,
}

/// A place source images can be fetched from
#[async_trait]
pub trait OriginSource: Send + Sync {
    async fn get(&self, identifier: &str) -> Result<OriginFetchResult, OriginError>;
}

/// Source image identifier, routed by prefix only
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceIdentifier {
    ObjectStore(String),
    Remote(String),
}

impl SourceIdentifier {
    pub fn parse(identifier: &str) -> Self {
        if identifier.starts_with("http") {
            SourceIdentifier::Remote(identifier.to_string())
        } else {
            SourceIdentifier::ObjectStore(identifier.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SourceIdentifier::ObjectStore(key) => key,
            SourceIdentifier::Remote(url) => url,
        }
    }

    pub fn kind(&self) -> OriginKind {
        match self {
            SourceIdentifier::ObjectStore(_) => OriginKind::ObjectStore,
            SourceIdentifier::Remote(_) => OriginKind::RemoteHttp,
        }
    }
}

impl fmt::Display for SourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_prefix_routes_to_remote() {
        let id = SourceIdentifier::parse("https://example.com/a.jpg");
        assert_eq!(id.kind(), OriginKind::RemoteHttp);
        assert_eq!(id.as_str(), "https://example.com/a.jpg");
    }

    #[test]
    fn test_plain_key_routes_to_object_store() {
        let id = SourceIdentifier::parse("photos/a.jpg");
        assert_eq!(id, SourceIdentifier::ObjectStore("photos/a.jpg".to_string()));
    }

    #[test]
    fn test_prefix_check_is_purely_syntactic() {
        // An object key that happens to start with "http" is still treated as a URL
        let id = SourceIdentifier::parse("httpdocs/banner.png");
        assert_eq!(id.kind(), OriginKind::RemoteHttp);
    }

    #[test]
    fn test_origin_kind_labels() {
        assert_eq!(OriginKind::ObjectStore.as_str(), "object_store");
        assert_eq!(OriginKind::RemoteHttp.as_str(), "remote_http");
    }
}
