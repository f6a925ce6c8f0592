//! Cache Entry Module
//!
//! A single serialized result set with its expiry deadline.

use std::time::{SystemTime, UNIX_EPOCH};

// == Cache Entry ==
/// A JSON payload stored under one cache key.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Serialized result set
    pub payload: String,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry that expires `ttl_seconds` from now.
    pub fn new(payload: String, ttl_seconds: u64) -> Self {
        Self {
            payload,
            expires_at: current_timestamp_ms().saturating_add(ttl_seconds.saturating_mul(1000)),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time reaches `expires_at`, so a
    /// zero TTL produces an entry that is never readable.
    pub fn is_expired(&self) -> bool {
        current_timestamp_ms() >= self.expires_at
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
