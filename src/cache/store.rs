//! Cache Store Module
//!
//! In-process cache engine: HashMap storage with LRU eviction, TTL expiry and
//! glob-based key enumeration for invalidation.

use std::collections::HashMap;

use crate::cache::pattern::glob_match;
use crate::cache::{CacheEntry, CacheStats, LruTracker, MAX_KEY_LENGTH, MAX_VALUE_SIZE};
use crate::error::{CacheError, CacheResult};

// == Cache Store ==
#[derive(Debug)]
pub struct CacheStore {
    entries: HashMap<String, CacheEntry>,
    lru: LruTracker,
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// TTL in seconds for entries stored without one
    default_ttl: u64,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore with specified capacity and default TTL.
    pub fn new(max_entries: usize, default_ttl: u64) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_entries,
            default_ttl,
        }
    }

    // == Set ==
    /// Stores a payload under `key`, replacing any existing entry and
    /// resetting its TTL.
    ///
    /// If the cache is at capacity, the least recently used entry is evicted.
    pub fn set(&mut self, key: String, payload: String, ttl: Option<u64>) -> CacheResult<()> {
        if key.len() > MAX_KEY_LENGTH {
            return Err(CacheError::InvalidEntry(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }

        if payload.len() > MAX_VALUE_SIZE {
            return Err(CacheError::InvalidEntry(format!(
                "Value exceeds maximum size of {} bytes",
                MAX_VALUE_SIZE
            )));
        }

        let is_overwrite = self.entries.contains_key(&key);

        if !is_overwrite && self.entries.len() >= self.max_entries {
            match self.lru.evict_oldest() {
                Some(evicted_key) => {
                    self.entries.remove(&evicted_key);
                    self.stats.record_eviction();
                }
                None => {
                    return Err(CacheError::CacheFull(
                        "Cache is full and eviction failed".to_string(),
                    ));
                }
            }
        }

        let entry = CacheEntry::new(payload, ttl.unwrap_or(self.default_ttl));
        self.entries.insert(key.clone(), entry);
        self.lru.touch(&key);
        self.stats.set_total_entries(self.entries.len());

        Ok(())
    }

    // == Get ==
    /// Returns the payload stored under `key` if it is still fresh.
    ///
    /// Expired entries are removed on access and reported as
    /// `CacheError::Expired`, so a caller never observes a stale payload.
    pub fn get(&mut self, key: &str) -> CacheResult<String> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => {
                self.stats.record_miss();
                return Err(CacheError::NotFound(key.to_string()));
            }
        };

        if expired {
            self.entries.remove(key);
            self.lru.remove(key);
            self.stats.set_total_entries(self.entries.len());
            self.stats.record_expirations(1);
            self.stats.record_miss();
            return Err(CacheError::Expired(key.to_string()));
        }

        self.stats.record_hit();
        self.lru.touch(key);
        self.entries
            .get(key)
            .map(|entry| entry.payload.clone())
            .ok_or_else(|| CacheError::NotFound(key.to_string()))
    }

    // == Delete ==
    /// Removes an entry by key.
    pub fn delete(&mut self, key: &str) -> CacheResult<()> {
        if self.entries.remove(key).is_some() {
            self.lru.remove(key);
            self.stats.set_total_entries(self.entries.len());
            Ok(())
        } else {
            Err(CacheError::NotFound(key.to_string()))
        }
    }

    // == Keys Matching ==
    /// Lists the fresh keys selected by a glob `pattern`, sorted.
    pub fn keys_matching(&self, pattern: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(key, entry)| !entry.is_expired() && glob_match(pattern, key))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    // == Delete Many ==
    /// Removes every listed key that is present. Returns how many were removed.
    pub fn delete_many(&mut self, keys: &[String]) -> usize {
        keys.iter().filter(|key| self.delete(key).is_ok()).count()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.entries.remove(key);
            self.lru.remove(key);
        }

        self.stats.record_expirations(expired_keys.len());
        self.stats.set_total_entries(self.entries.len());
        expired_keys.len()
    }

    /// Returns the number of entries, expired ones included until swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    fn store_with(keys: &[&str]) -> CacheStore {
        let mut store = CacheStore::new(100, 300);
        for key in keys {
            store.set(key.to_string(), "[]".to_string(), None).unwrap();
        }
        store
    }

    #[test]
    fn test_set_and_get() {
        let mut store = CacheStore::new(100, 300);

        store
            .set("products:list:all".to_string(), r#"[{"sku":"a"}]"#.to_string(), None)
            .unwrap();

        assert_eq!(store.get("products:list:all").unwrap(), r#"[{"sku":"a"}]"#);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_missing_key() {
        let mut store = CacheStore::new(100, 300);
        assert!(matches!(store.get("nope"), Err(CacheError::NotFound(_))));
    }

    #[test]
    fn test_overwrite_resets_value() {
        let mut store = CacheStore::new(100, 300);

        store.set("k".to_string(), "1".to_string(), None).unwrap();
        store.set("k".to_string(), "2".to_string(), Some(60)).unwrap();

        assert_eq!(store.get("k").unwrap(), "2");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_expired_entry_reads_as_absent() {
        let mut store = CacheStore::new(100, 300);

        store.set("rentals:current:x".to_string(), "[]".to_string(), Some(1)).unwrap();
        assert!(store.get("rentals:current:x").is_ok());

        sleep(Duration::from_millis(1100));

        assert!(matches!(
            store.get("rentals:current:x"),
            Err(CacheError::Expired(_))
        ));
        assert!(store.is_empty());
        assert_eq!(store.stats().expirations, 1);
    }

    #[test]
    fn test_lru_eviction() {
        let mut store = CacheStore::new(2, 300);

        store.set("a".to_string(), "1".to_string(), None).unwrap();
        store.set("b".to_string(), "2".to_string(), None).unwrap();
        store.get("a").unwrap();
        store.set("c".to_string(), "3".to_string(), None).unwrap();

        assert!(store.get("a").is_ok());
        assert!(matches!(store.get("b"), Err(CacheError::NotFound(_))));
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_keys_matching_prefix() {
        let store = store_with(&[
            "inventory:search::2024-01-01:2024-12-31",
            "inventory:search:tent:2024-01-01:2024-12-31",
            "low-stock:2024-01-01:2024-01-31:2",
            "products:list:all",
        ]);

        assert_eq!(
            store.keys_matching("inventory:*"),
            vec![
                "inventory:search::2024-01-01:2024-12-31".to_string(),
                "inventory:search:tent:2024-01-01:2024-12-31".to_string(),
            ]
        );
        assert_eq!(store.keys_matching("*").len(), 4);
        assert!(store.keys_matching("deliveries:*").is_empty());
    }

    #[test]
    fn test_keys_matching_skips_expired() {
        let mut store = CacheStore::new(100, 300);
        store.set("returns:upcoming:7".to_string(), "[]".to_string(), Some(1)).unwrap();
        store.set("returns:upcoming:14".to_string(), "[]".to_string(), Some(60)).unwrap();

        sleep(Duration::from_millis(1100));

        assert_eq!(
            store.keys_matching("returns:*"),
            vec!["returns:upcoming:14".to_string()]
        );
    }

    #[test]
    fn test_delete_many_counts_present_keys() {
        let mut store = store_with(&["a", "b"]);

        let removed = store.delete_many(&["a".to_string(), "missing".to_string()]);

        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_stats_track_hits_and_misses() {
        let mut store = store_with(&["k"]);
        store.get("k").unwrap();
        let _ = store.get("missing");

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[test]
    fn test_cleanup_expired() {
        let mut store = CacheStore::new(100, 300);

        store.set("short".to_string(), "[]".to_string(), Some(1)).unwrap();
        store.set("long".to_string(), "[]".to_string(), Some(10)).unwrap();

        sleep(Duration::from_millis(1100));

        assert_eq!(store.cleanup_expired(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.get("long").is_ok());
    }

    #[test]
    fn test_rejects_oversized_key_and_value() {
        let mut store = CacheStore::new(100, 300);

        let long_key = "x".repeat(MAX_KEY_LENGTH + 1);
        assert!(matches!(
            store.set(long_key, "[]".to_string(), None),
            Err(CacheError::InvalidEntry(_))
        ));

        let large_value = "x".repeat(MAX_VALUE_SIZE + 1);
        assert!(matches!(
            store.set("k".to_string(), large_value, None),
            Err(CacheError::InvalidEntry(_))
        ));
    }
}
