//! Cache Statistics Module
//!
//! Counters kept by the in-process store and rendered for `/api/cache/stats`.

// == Cache Stats ==
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Reads that found a fresh entry
    pub hits: u64,
    /// Reads that found nothing or an expired entry
    pub misses: u64,
    /// Entries dropped by the LRU policy
    pub evictions: u64,
    /// Entries dropped because their TTL elapsed
    pub expirations: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }

    // == Info Rendering ==
    /// Renders the counters in the `INFO stats` layout Redis uses, so the
    /// stats endpoint reports the same shape whichever backend is active.
    pub fn to_info(&self) -> String {
        format!(
            "# Stats\r\n\
             keyspace_hits:{}\r\n\
             keyspace_misses:{}\r\n\
             evicted_keys:{}\r\n\
             expired_keys:{}\r\n\
             hit_rate:{:.4}\r\n",
            self.hits,
            self.misses,
            self.evictions,
            self.expirations,
            self.hit_rate()
        )
    }
}
