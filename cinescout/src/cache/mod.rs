//! Bounded result cache sitting in front of the store.
//!
//! Entries are keyed on the normalized request only. Nothing ties them to the
//! snapshot that produced them, so after the source reloads an entry keeps
//! answering with the old rows until it is evicted or the cache is cleared.
//! [`crate::search::SearchOptions`] exposes both a bypass switch and opt-in
//! invalidation on reload for callers that cannot tolerate that.
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::trace;

use crate::errors::{SearchError, SearchResult};
use crate::metrics::CatalogMetrics;
use crate::query::{NormalizedArg, QueryKind};
use crate::record::Movie;

pub const DEFAULT_CACHE_CAPACITY: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: QueryKind,
    pub arg: NormalizedArg,
}

impl CacheKey {
    pub fn new(kind: QueryKind, arg: NormalizedArg) -> Self {
        Self { kind, arg }
    }
}

/// LRU map from query to result, safe to share between threads.
///
/// Each method takes the internal lock for its own duration only.
pub struct QueryCache {
    entries: Mutex<LruCache<CacheKey, Arc<[Movie]>>>,
    metrics: CatalogMetrics,
}

impl QueryCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self::with_metrics(capacity, CatalogMetrics::new())
    }

    pub fn with_metrics(capacity: NonZeroUsize, metrics: CatalogMetrics) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            metrics,
        }
    }

    /// Looks up `key`, promoting it to most recently used on a hit
    pub fn get(&self, key: &CacheKey) -> SearchResult<Option<Arc<[Movie]>>> {
        let mut entries = self.lock()?;
        let found = entries.get(key).cloned();
        self.metrics.record_cache_lookup(found.is_some());
        trace!("Cache {} for {:?}", if found.is_some() { "hit" } else { "miss" }, key);
        Ok(found)
    }

    /// Stores `value`, evicting the least recently used entry when full
    pub fn insert(&self, key: CacheKey, value: Arc<[Movie]>) -> SearchResult<()> {
        let mut entries = self.lock()?;
        if let Some((evicted, _)) = entries.push(key.clone(), value) {
            if evicted != key {
                trace!("Evicted {:?}", evicted);
                self.metrics.record_eviction();
            }
        }
        Ok(())
    }

    /// Drops `key`, returning whether it was present
    pub fn remove(&self, key: &CacheKey) -> SearchResult<bool> {
        Ok(self.lock()?.pop(key).is_some())
    }

    /// Checks membership without touching recency
    pub fn contains(&self, key: &CacheKey) -> SearchResult<bool> {
        Ok(self.lock()?.contains(key))
    }

    pub fn len(&self) -> SearchResult<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> SearchResult<bool> {
        Ok(self.lock()?.is_empty())
    }

    pub fn capacity(&self) -> SearchResult<NonZeroUsize> {
        Ok(self.lock()?.cap())
    }

    pub fn clear(&self) -> SearchResult<()> {
        self.lock()?.clear();
        Ok(())
    }

    pub fn metrics(&self) -> &CatalogMetrics {
        &self.metrics
    }

    fn lock(&self) -> SearchResult<MutexGuard<'_, LruCache<CacheKey, Arc<[Movie]>>>> {
        self.entries
            .lock()
            .map_err(|_| SearchError::LockPoisoned("query cache"))
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).expect("non-zero constant"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title_key(text: &str) -> CacheKey {
        CacheKey::new(QueryKind::Title, NormalizedArg::Text(text.to_string()))
    }

    fn rows(title: &str) -> Arc<[Movie]> {
        vec![Movie::new(title, 2000, "Someone")].into()
    }

    #[test]
    fn test_hit_and_miss_counters() {
        let cache = QueryCache::new(NonZeroUsize::new(4).unwrap());

        assert!(cache.get(&title_key("heat")).unwrap().is_none());
        cache.insert(title_key("heat"), rows("Heat")).unwrap();
        let hit = cache.get(&title_key("heat")).unwrap().unwrap();
        assert_eq!(hit[0].title(), "Heat");

        let stats = cache.metrics().get_stats();
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.cache_misses, 1);
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let cache = QueryCache::new(NonZeroUsize::new(2).unwrap());

        cache.insert(title_key("a"), rows("A")).unwrap();
        cache.insert(title_key("b"), rows("B")).unwrap();
        // Touch "a" so "b" becomes the eviction candidate
        cache.get(&title_key("a")).unwrap();
        cache.insert(title_key("c"), rows("C")).unwrap();

        assert!(cache.contains(&title_key("a")).unwrap());
        assert!(!cache.contains(&title_key("b")).unwrap());
        assert!(cache.contains(&title_key("c")).unwrap());
        assert_eq!(cache.metrics().get_stats().cache_evictions, 1);
    }

    #[test]
    fn test_replacing_a_key_is_not_an_eviction() {
        let cache = QueryCache::new(NonZeroUsize::new(2).unwrap());

        cache.insert(title_key("a"), rows("A")).unwrap();
        cache.insert(title_key("a"), rows("A2")).unwrap();
        assert_eq!(cache.len().unwrap(), 1);
        assert_eq!(cache.metrics().get_stats().cache_evictions, 0);
    }

    #[test]
    fn test_keys_distinguish_kind() {
        let cache = QueryCache::default();
        let title = title_key("nolan");
        let director = CacheKey::new(QueryKind::Director, NormalizedArg::Text("nolan".into()));

        cache.insert(title.clone(), rows("X")).unwrap();
        assert!(cache.contains(&title).unwrap());
        assert!(!cache.contains(&director).unwrap());
        assert_eq!(cache.capacity().unwrap().get(), DEFAULT_CACHE_CAPACITY);

        assert!(cache.remove(&title).unwrap());
        assert!(!cache.remove(&title).unwrap());

        cache.insert(title.clone(), rows("X")).unwrap();
        cache.clear().unwrap();
        assert!(cache.is_empty().unwrap());
    }
}
