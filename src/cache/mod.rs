//! Cache Module
//!
//! Cache-aside reads with TTL expiry and glob-pattern invalidation, over
//! either Redis or the in-process store.

mod aside;
mod backend;
mod entry;
pub mod keys;
mod lru;
pub mod pattern;
mod redis;
mod stats;
mod store;


// Re-export public types
pub use aside::CacheLayer;
pub use backend::{CacheBackend, MemoryBackend};
pub use entry::CacheEntry;
pub use keys::CachePolicy;
pub use lru::LruTracker;
pub use self::redis::RedisBackend;
pub use stats::CacheStats;
pub use store::CacheStore;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed value size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB
