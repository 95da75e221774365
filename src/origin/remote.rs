// Remote HTTP origin with SSRF and payload-abuse defenses
//
// Fetch order:
//   1. parse the URL (http/https with a host only)
//   2. resolve the host and reject if ANY address is non-public
//   3. GET through a client pinned to the validated addresses, no redirects
//   4. check status, declared length and content type before the body
//   5. read the body in chunks through a hard cap

use super::{OriginError, OriginFetchResult, OriginKind, OriginSource};
use crate::config::RemoteFetchConfig;
use crate::security::{AddressPolicy, IpFilterError};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::header::CONTENT_TYPE;
use reqwest::{redirect, StatusCode, Url};
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Hostname resolution, injectable so tests can control the answer
#[async_trait]
pub trait HostResolver: Send + Sync {
    async fn resolve(&self, host: &str, port: u16) -> std::io::Result<Vec<SocketAddr>>;
}

/// Resolves through the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

#[async_trait]
impl HostResolver for SystemResolver {
    async fn resolve(&self, host: &str, port: u16) -> std::io::Result<Vec<SocketAddr>> {
        Ok(tokio::net::lookup_host((host, port)).await?.collect())
    }
}

/// Fetches source images from arbitrary http(s) URLs
#[derive(Clone)]
pub struct RemoteHttpOrigin {
    policy: AddressPolicy,
    resolver: Arc<dyn HostResolver>,
    max_bytes: u64,
    timeout: Duration,
}

impl std::fmt::Debug for RemoteHttpOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteHttpOrigin")
            .field("max_bytes", &self.max_bytes)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl RemoteHttpOrigin {
    pub fn new(policy: AddressPolicy, max_bytes: u64, timeout: Duration) -> Self {
        Self {
            policy,
            resolver: Arc::new(SystemResolver),
            max_bytes,
            timeout,
        }
    }

    pub fn from_config(config: &RemoteFetchConfig) -> Result<Self, IpFilterError> {
        let policy = AddressPolicy::with_extra_ranges(&config.blocked_ranges)?;
        Ok(Self::new(
            policy,
            config.max_download_bytes(),
            Duration::from_secs(config.timeout_secs),
        ))
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn HostResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    fn parse_url(identifier: &str) -> Result<Url, OriginError> {
        let url = Url::parse(identifier)
            .map_err(|e| OriginError::InvalidUrl(format!("{}: {}", identifier, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(OriginError::InvalidUrl(format!(
                "unsupported scheme {}",
                url.scheme()
            )));
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(OriginError::InvalidUrl(format!("{}: missing host", identifier)));
        }

        Ok(url)
    }

    /// Resolve the URL's host and return the addresses to connect to
    ///
    /// Fails unless every address is public.
    async fn resolve_public(&self, host: &str, port: u16) -> Result<Vec<SocketAddr>, OriginError> {
        // IPv6 literals come back from the URL in brackets
        let literal = host.trim_start_matches('[').trim_end_matches(']');
        let addresses = match IpAddr::from_str(literal) {
            Ok(ip) => vec![SocketAddr::new(ip, port)],
            Err(_) => self.resolver.resolve(host, port).await.map_err(|e| {
                OriginError::DnsResolution {
                    host: host.to_string(),
                    message: e.to_string(),
                }
            })?,
        };

        if addresses.is_empty() {
            return Err(OriginError::DnsResolution {
                host: host.to_string(),
                message: "no addresses returned".to_string(),
            });
        }

        let ips: Vec<IpAddr> = addresses.iter().map(SocketAddr::ip).collect();
        if let Some(blocked) = self.policy.first_blocked(&ips) {
            tracing::warn!(
                host = %host,
                address = %blocked,
                "Rejected remote fetch to non-public address"
            );
            return Err(OriginError::SsrfRejected {
                host: host.to_string(),
                address: *blocked,
            });
        }

        Ok(addresses)
    }

    /// Client that can only connect to the already validated addresses
    ///
    /// Built per fetch: the resolve override is fixed at build time, so a
    /// shared client could not be pinned to each request's addresses.
    /// Environment proxies are ignored, since a proxy would resolve the host
    /// again and bypass the pin.
    fn pinned_client(
        &self,
        host: &str,
        addresses: &[SocketAddr],
    ) -> Result<reqwest::Client, OriginError> {
        let mut builder = reqwest::Client::builder()
            .no_proxy()
            .redirect(redirect::Policy::none())
            .timeout(self.timeout);

        if IpAddr::from_str(host.trim_start_matches('[').trim_end_matches(']')).is_err() {
            builder = builder.resolve_to_addrs(host, addresses);
        }

        builder
            .build()
            .map_err(|e| OriginError::Transport(format!("failed to build HTTP client: {}", e)))
    }

    /// Perform the GET and enforce response checks and the size cap
    async fn download(&self, client: &reqwest::Client, url: Url) -> Result<Bytes, OriginError> {
        let mut response = client
            .get(url)
            .send()
            .await
            .map_err(|e| OriginError::Transport(e.to_string()))?;

        if response.status() != StatusCode::OK {
            return Err(OriginError::UpstreamStatus(response.status().as_u16()));
        }

        if let Some(declared) = response.content_length() {
            if declared > self.max_bytes {
                return Err(OriginError::PayloadTooLarge {
                    size: declared,
                    limit: self.max_bytes,
                });
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.starts_with("image/") {
            return Err(OriginError::InvalidContentType(content_type));
        }

        let mut body = BytesMut::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| OriginError::Transport(e.to_string()))?
        {
            let size = (body.len() + chunk.len()) as u64;
            if size > self.max_bytes {
                return Err(OriginError::PayloadTooLarge {
                    size,
                    limit: self.max_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body.freeze())
    }
}

#[async_trait]
impl OriginSource for RemoteHttpOrigin {
    async fn get(&self, identifier: &str) -> Result<OriginFetchResult, OriginError> {
        let url = Self::parse_url(identifier)?;
        let host = url.host_str().unwrap_or_default().to_string();
        let port = url
            .port_or_known_default()
            .ok_or_else(|| OriginError::InvalidUrl(format!("{}: unknown port", identifier)))?;

        let addresses = self.resolve_public(&host, port).await?;
        let client = self.pinned_client(&host, &addresses)?;
        let bytes = self.download(&client, url).await?;

        tracing::debug!(
            host = %host,
            size = bytes.len(),
            "Fetched source from remote origin"
        );

        Ok(OriginFetchResult {
            bytes,
            origin: OriginKind::RemoteHttp,
        })
    }
}
