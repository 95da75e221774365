// Cache fingerprint for transformed images
//
// Format: "{identifier}:w{width}:h{height}:q{quality}"
//
// Only the source and the size/quality parameters take part. Two requests
// that differ only in crop strategy, output format or watermark share a
// fingerprint and therefore a cache entry.

use std::fmt;

/// Deterministic cache key of a transformation request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheFingerprint(String);

impl CacheFingerprint {
    pub fn new(identifier: &str, width: u32, height: u32, quality: u8) -> Self {
        Self(format!(
            "{}:w{}:h{}:q{}",
            identifier, width, height, quality
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheFingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
