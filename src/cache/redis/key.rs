// Redis key formatting and hashing utilities

use sha2::{Digest, Sha256};

/// Keys longer than this are replaced by a hash
pub const MAX_KEY_LENGTH: usize = 250;

/// Formats a Redis cache key with prefix
///
/// # Format
/// - Short keys: "{prefix}:{fingerprint}"
/// - Long keys: "{prefix}:hash:{sha256}"
///
/// Remote-URL fingerprints can be arbitrarily long, so the length cap keeps
/// keys bounded without losing uniqueness.
pub fn format_key(prefix: &str, fingerprint: &str) -> String {
    let full_key = format!("{}:{}", prefix, fingerprint);

    if full_key.len() > MAX_KEY_LENGTH {
        hash_long_key(prefix, fingerprint)
    } else {
        full_key
    }
}

/// Hashes a long key using SHA256
///
/// Format: "{prefix}:hash:{sha256}"
fn hash_long_key(prefix: &str, fingerprint: &str) -> String {
    let hash = Sha256::digest(fingerprint.as_bytes());
    format!("{}:hash:{}", prefix, hex::encode(hash))
}
