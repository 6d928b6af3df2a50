use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use super::strategy::StrategyRegistry;
use crate::cache::{CacheKey, QueryCache, DEFAULT_CACHE_CAPACITY};
use crate::errors::SearchResult;
use crate::metrics::CatalogMetrics;
use crate::query::{Query, QueryKind, QueryValue};
use crate::record::Movie;
use crate::store::MovieStore;

/// Knobs for the cache in front of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub cache_capacity: NonZeroUsize,
    /// `false` sends every query straight to the store
    pub cache_enabled: bool,
    /// Check the store before the cache and drop every entry once the
    /// source has been reloaded. Costs a freshness probe per query.
    pub invalidate_on_reload: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            cache_capacity: NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).expect("non-zero constant"),
            cache_enabled: true,
            invalidate_on_reload: false,
        }
    }
}

/// Entry point for catalog queries.
///
/// Normalizes the argument, answers from the cache when it can, and otherwise
/// asks the store for its current records and runs the registered strategy.
pub struct SearchService {
    store: Arc<MovieStore>,
    strategies: StrategyRegistry,
    cache: QueryCache,
    options: SearchOptions,
    cached_generation: AtomicU64,
}

impl SearchService {
    pub fn new(store: Arc<MovieStore>) -> Self {
        Self::with_options(store, SearchOptions::default())
    }

    pub fn with_options(store: Arc<MovieStore>, options: SearchOptions) -> Self {
        Self::with_strategies(store, options, StrategyRegistry::standard())
    }

    pub fn with_strategies(
        store: Arc<MovieStore>,
        options: SearchOptions,
        strategies: StrategyRegistry,
    ) -> Self {
        let metrics = store.metrics().clone();
        Self {
            cache: QueryCache::with_metrics(options.cache_capacity, metrics),
            store,
            strategies,
            options,
            cached_generation: AtomicU64::new(0),
        }
    }

    /// Runs a query of `kind` with `value`.
    ///
    /// Title and director matching ignore case, and so does the cache key.
    /// A cached answer is returned without consulting the store, which means
    /// it can predate the latest reload unless `invalidate_on_reload` is set.
    pub fn search(&self, kind: QueryKind, value: impl Into<QueryValue>) -> SearchResult<Arc<[Movie]>> {
        let value = value.into();
        let arg = kind.normalize(&value)?;
        let key = CacheKey::new(kind, arg);

        if !self.options.cache_enabled {
            return self.compute(&key).map(|(result, _)| result);
        }

        if self.options.invalidate_on_reload {
            self.drop_stale_entries()?;
        }

        if let Some(hit) = self.cache.get(&key)? {
            debug!("Cache hit for {} {:?}", kind, key.arg);
            return Ok(hit);
        }

        let (result, generation) = self.compute(&key)?;
        self.remember(key, Arc::clone(&result), generation)?;
        Ok(result)
    }

    pub fn search_query(&self, query: &Query) -> SearchResult<Arc<[Movie]>> {
        self.search(query.kind, query.value.clone())
    }

    pub fn store(&self) -> &Arc<MovieStore> {
        &self.store
    }

    pub fn options(&self) -> SearchOptions {
        self.options
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn metrics(&self) -> &CatalogMetrics {
        self.store.metrics()
    }

    pub fn clear_cache(&self) -> SearchResult<()> {
        info!("Clearing query cache");
        self.cache.clear()
    }

    /// Runs the strategy for `key`, returning the matches and the generation
    /// of the snapshot they came from
    fn compute(&self, key: &CacheKey) -> SearchResult<(Arc<[Movie]>, u64)> {
        let strategy = self.strategies.resolve(key.kind)?;
        let snapshot = self.store.snapshot()?;
        let movies = snapshot.movies();
        let found = strategy.apply(&movies, &key.arg)?;
        debug!("{:?} matched {} of {} movies", strategy, found.len(), movies.len());
        Ok((found.into(), snapshot.generation()))
    }

    /// Caches `result` unless invalidation is on and a reload has been seen
    /// since it was computed.
    fn remember(&self, key: CacheKey, result: Arc<[Movie]>, generation: u64) -> SearchResult<()> {
        if !self.options.invalidate_on_reload {
            return self.cache.insert(key, result);
        }

        if self.cached_generation.load(Ordering::Acquire) != generation {
            debug!("Skipping cache insert for generation {}", generation);
            return Ok(());
        }
        self.cache.insert(key.clone(), result)?;
        // A reload clear may have run between the check and the insert
        if self.cached_generation.load(Ordering::Acquire) != generation {
            self.cache.remove(&key)?;
        }
        Ok(())
    }

    fn drop_stale_entries(&self) -> SearchResult<()> {
        let generation = self.store.snapshot()?.generation();
        let previous = self.cached_generation.swap(generation, Ordering::AcqRel);
        if previous != 0 && previous != generation {
            info!(
                "Source reloaded (generation {} -> {}), clearing query cache",
                previous, generation
            );
            self.cache.clear()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SearchError;
    use crate::query::NormalizedArg;
    use filetime::{set_file_mtime, FileTime};
    use std::fs;
    use tempfile::tempdir;

    fn service_for(contents: &str) -> (tempfile::TempDir, SearchService) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("movies.csv");
        fs::write(&path, contents).unwrap();
        let service = SearchService::new(Arc::new(MovieStore::new(&path)));
        (dir, service)
    }

    const CATALOG: &str = "title,release_year,director\n\
                           Inception,2010,Nolan\n\
                           Interstellar,2014,Nolan\n";

    #[test]
    fn test_search_by_each_kind() {
        let (_dir, service) = service_for(CATALOG);

        let by_director = service.search(QueryKind::Director, "nolan").unwrap();
        let titles: Vec<_> = by_director.iter().map(Movie::title).collect();
        assert_eq!(titles, vec!["Inception", "Interstellar"]);

        let by_year = service.search(QueryKind::Year, 2010).unwrap();
        assert_eq!(by_year.len(), 1);
        assert_eq!(by_year[0].title(), "Inception");

        assert!(service.search(QueryKind::Title, "xyz").unwrap().is_empty());
    }

    #[test]
    fn test_repeat_query_hits_cache() {
        let (_dir, service) = service_for(CATALOG);

        let first = service.search(QueryKind::Title, "Inter").unwrap();
        let second = service.search(QueryKind::Title, "INTER").unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let stats = service.metrics().get_stats();
        assert_eq!(stats.cache_misses, 1);
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.loads, 1);
    }

    #[test]
    fn test_invalid_year_fails_only_that_call() {
        let (_dir, service) = service_for(CATALOG);

        let err = service.search(QueryKind::Year, "twenty ten").unwrap_err();
        assert!(matches!(err, SearchError::InvalidQuery(_)));
        assert_eq!(service.search(QueryKind::Year, "2014").unwrap().len(), 1);
    }

    #[test]
    fn test_disabled_cache_always_computes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("movies.csv");
        fs::write(&path, CATALOG).unwrap();
        let options = SearchOptions {
            cache_enabled: false,
            ..SearchOptions::default()
        };
        let service = SearchService::with_options(Arc::new(MovieStore::new(&path)), options);

        service.search(QueryKind::Title, "inception").unwrap();
        service.search(QueryKind::Title, "inception").unwrap();
        assert!(service.cache().is_empty().unwrap());
        assert_eq!(service.metrics().get_stats().cache_hits, 0);
    }

    #[test]
    fn test_result_from_older_generation_is_not_cached() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("movies.csv");
        fs::write(&path, CATALOG).unwrap();
        let options = SearchOptions {
            invalidate_on_reload: true,
            ..SearchOptions::default()
        };
        let service = SearchService::with_options(Arc::new(MovieStore::new(&path)), options);

        let stale_key = CacheKey::new(QueryKind::Title, NormalizedArg::Text("inter".to_string()));
        let (stale, generation) = service.compute(&stale_key).unwrap();
        assert_eq!(generation, 1);

        fs::write(&path, "title,release_year,director\nHeat,1995,Mann\n").unwrap();
        let meta = fs::metadata(&path).unwrap();
        let mtime = FileTime::from_last_modification_time(&meta);
        set_file_mtime(&path, FileTime::from_unix_time(mtime.unix_seconds() + 10, 0)).unwrap();

        // Another caller observes the reload and clears the cache
        service.search(QueryKind::Title, "heat").unwrap();
        assert_eq!(service.store().snapshot().unwrap().generation(), 2);

        service.remember(stale_key.clone(), stale, generation).unwrap();
        assert!(!service.cache().contains(&stale_key).unwrap());
        assert!(service.search(QueryKind::Title, "inter").unwrap().is_empty());
    }

    #[test]
    fn test_current_generation_result_is_cached() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("movies.csv");
        fs::write(&path, CATALOG).unwrap();
        let options = SearchOptions {
            invalidate_on_reload: true,
            ..SearchOptions::default()
        };
        let service = SearchService::with_options(Arc::new(MovieStore::new(&path)), options);

        let first = service.search(QueryKind::Director, "nolan").unwrap();
        let second = service.search(QueryKind::Director, "nolan").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(service.metrics().get_stats().cache_hits, 1);
    }

    #[test]
    fn test_unregistered_kind_is_invalid_query() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("movies.csv");
        fs::write(&path, CATALOG).unwrap();
        let service = SearchService::with_strategies(
            Arc::new(MovieStore::new(&path)),
            SearchOptions::default(),
            StrategyRegistry::empty(),
        );

        let err = service.search_query(&Query::title("x")).unwrap_err();
        assert!(matches!(err, SearchError::InvalidQuery(_)));
        assert_eq!(service.metrics().loads(), 0);
    }
}
