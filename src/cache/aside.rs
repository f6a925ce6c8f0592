//! Cache-Aside Layer
//!
//! Read-through caching for query results and best-effort invalidation.
//! The cache only ever makes reads faster: any backend failure is logged and
//! the request is served from the fallback instead.

use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use crate::cache::keys::{CATALOG_PATTERN, INVENTORY_PATTERNS};
use crate::cache::CacheBackend;
use crate::error::CacheResult;

// == Cache Layer ==
#[derive(Clone)]
pub struct CacheLayer {
    backend: Arc<dyn CacheBackend>,
}

impl CacheLayer {
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Arc<dyn CacheBackend> {
        &self.backend
    }

    // == Get Or Compute ==
    /// Returns the value cached under `key`, or runs `fallback`, caches its
    /// result for `ttl` seconds and returns it.
    ///
    /// `fallback` runs at most once and its error is returned as-is. Backend
    /// and (de)serialization failures never reach the caller.
    pub async fn get_or_compute<T, E, F, Fut>(&self, key: &str, ttl: u64, fallback: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match self.lookup::<T>(key).await {
            Ok(Some(value)) => {
                debug!(key, "Cache HIT");
                return Ok(value);
            }
            Ok(None) => debug!(key, "Cache MISS"),
            Err(e) => warn!(key, error = %e, "Cache read failed, querying store directly"),
        }

        let value = fallback().await?;

        if let Err(e) = self.store(key, &value, ttl).await {
            warn!(key, error = %e, "Cache write failed, returning uncached result");
        }

        Ok(value)
    }

    async fn lookup<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<T>> {
        match self.backend.get(key).await? {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    async fn store<T: Serialize>(&self, key: &str, value: &T, ttl: u64) -> CacheResult<()> {
        let payload = serde_json::to_string(value)?;
        self.backend.set_ex(key, payload, ttl).await
    }

    // == Invalidate ==
    /// Deletes every key matching the glob `pattern`. Failures are logged
    /// and reported as zero keys removed.
    pub async fn invalidate(&self, pattern: &str) -> usize {
        match self.delete_matching(pattern).await {
            Ok(0) => 0,
            Ok(removed) => {
                info!(pattern, removed, "Invalidated cache keys");
                removed
            }
            Err(e) => {
                warn!(pattern, error = %e, "Cache invalidation failed");
                0
            }
        }
    }

    async fn delete_matching(&self, pattern: &str) -> CacheResult<usize> {
        let keys = self.backend.keys(pattern).await?;
        if keys.is_empty() {
            return Ok(0);
        }
        self.backend.del(&keys).await
    }

    /// Clears every read-side cache an inventory change can affect.
    pub async fn invalidate_inventory(&self) -> usize {
        join_all(INVENTORY_PATTERNS.iter().map(|pattern| self.invalidate(pattern)))
            .await
            .into_iter()
            .sum()
    }

    /// Clears inventory caches and the product catalog after a product write.
    pub async fn invalidate_product_writes(&self) -> usize {
        let (inventory, catalog) =
            tokio::join!(self.invalidate_inventory(), self.invalidate(CATALOG_PATTERN));
        inventory + catalog
    }
}
