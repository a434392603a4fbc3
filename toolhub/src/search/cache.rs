//! LRU cache of formatted search responses

use super::types::{CacheStats, DetailLevel, SearchResponse};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Normalized identity of a search request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Trimmed, lower-cased query
    pub query: String,
    /// Effective limit after defaulting
    pub limit: usize,
    /// Category filter
    pub category: Option<String>,
    /// Helper filter
    pub is_helper: Option<bool>,
    /// Requested verbosity
    pub detail_level: DetailLevel,
}

/// Thread-safe LRU cache mapping [`CacheKey`]s to shared responses
///
/// A hit hands out the same `Arc` that was inserted and refreshes its recency.
/// Inserting into a full cache evicts exactly the least recently used entry.
pub struct SearchCache {
    entries: Mutex<LruCache<CacheKey, Arc<SearchResponse>>>,
}

impl SearchCache {
    /// Create a cache holding at most `capacity` responses (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Lock the cache for a compound read-evict-insert sequence
    pub(crate) fn lock(&self) -> MutexGuard<'_, LruCache<CacheKey, Arc<SearchResponse>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up a response, refreshing its recency
    pub fn get(&self, key: &CacheKey) -> Option<Arc<SearchResponse>> {
        self.lock().get(key).cloned()
    }

    /// Whether a key is cached, without touching recency
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.lock().contains(key)
    }

    /// Insert a response, evicting the least recently used entry when full
    pub fn put(&self, key: CacheKey, response: Arc<SearchResponse>) {
        if let Some((evicted, _)) = self.lock().push(key, response) {
            tracing::debug!("Evicted cached search for '{}'", evicted.query);
        }
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Current occupancy and capacity
    pub fn stats(&self) -> CacheStats {
        let cache = self.lock();
        CacheStats {
            size: cache.len(),
            max_size: cache.cap().get(),
        }
    }
}
