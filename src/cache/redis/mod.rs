// Redis cache implementation module
//
// Distributed cache shared by every gateway instance. Values are stored as
// raw image bytes under "{prefix}:{fingerprint}" keys.

pub mod cache;
pub mod key;

pub use cache::RedisCacheStore;
pub use key::{format_key, MAX_KEY_LENGTH};
