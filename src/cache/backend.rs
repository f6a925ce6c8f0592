//! Cache Backends
//!
//! The key-value operations the cache-aside layer needs, and the in-process
//! implementation built on [`CacheStore`].

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::cache::CacheStore;
use crate::error::{CacheError, CacheResult};

// == Backend Trait ==
/// A key-value store with per-key expiry and glob key enumeration.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Short name reported by the health and stats endpoints.
    fn name(&self) -> &'static str;

    /// Returns the payload under `key`, None when absent or expired.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Stores `payload` under `key` for `ttl_secs` seconds.
    async fn set_ex(&self, key: &str, payload: String, ttl_secs: u64) -> CacheResult<()>;

    /// Lists the keys matching a glob pattern.
    async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>>;

    /// Deletes the given keys, returning how many existed.
    async fn del(&self, keys: &[String]) -> CacheResult<usize>;

    /// Number of keys currently held.
    async fn db_size(&self) -> CacheResult<usize>;

    /// Backend statistics in `INFO stats` text form.
    async fn info(&self) -> CacheResult<String>;

    /// Whether the backend currently has a usable connection.
    async fn is_connected(&self) -> bool;
}

// == Memory Backend ==
/// In-process backend sharing one [`CacheStore`] behind an async RwLock.
#[derive(Clone)]
pub struct MemoryBackend {
    store: Arc<RwLock<CacheStore>>,
}

impl MemoryBackend {
    pub fn new(max_entries: usize, default_ttl: u64) -> Self {
        Self {
            store: Arc::new(RwLock::new(CacheStore::new(max_entries, default_ttl))),
        }
    }

    /// Shared handle to the underlying store, for the expiry sweep task.
    pub fn store(&self) -> Arc<RwLock<CacheStore>> {
        self.store.clone()
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        // Write lock: reads update LRU order and counters
        let mut store = self.store.write().await;
        match store.get(key) {
            Ok(payload) => Ok(Some(payload)),
            Err(CacheError::NotFound(_)) | Err(CacheError::Expired(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn set_ex(&self, key: &str, payload: String, ttl_secs: u64) -> CacheResult<()> {
        let mut store = self.store.write().await;
        store.set(key.to_string(), payload, Some(ttl_secs))
    }

    async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>> {
        let store = self.store.read().await;
        Ok(store.keys_matching(pattern))
    }

    async fn del(&self, keys: &[String]) -> CacheResult<usize> {
        let mut store = self.store.write().await;
        Ok(store.delete_many(keys))
    }

    async fn db_size(&self) -> CacheResult<usize> {
        let store = self.store.read().await;
        Ok(store.len())
    }

    async fn info(&self) -> CacheResult<String> {
        let store = self.store.read().await;
        Ok(store.stats().to_info())
    }

    async fn is_connected(&self) -> bool {
        true
    }
}
