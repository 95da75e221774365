//! Request Trust Boundary
//!
//! Everything the gateway checks before it spends work on a request:
//! - `signature` - HMAC-SHA256 signatures over the canonical query string
//! - `ip_filter` - address classification that keeps remote fetches off
//!   private, loopback and link-local networks (SSRF defense)
//!
//! Rejections from either module map to 403 Forbidden.

pub mod ip_filter;
pub mod signature;

pub use ip_filter::{AddressPolicy, IpFilterError, IpRange};
pub use signature::{SignatureError, SignatureVerifier};
