use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Load and cache counters shared between a store and the service above it
#[derive(Debug, Clone)]
pub struct CatalogMetrics {
    // Source metrics
    loads: Arc<AtomicU64>,
    failed_loads: Arc<AtomicU64>,
    records_loaded: Arc<AtomicU64>,

    // Cache metrics
    cache_hits: Arc<AtomicU64>,
    cache_misses: Arc<AtomicU64>,
    cache_evictions: Arc<AtomicU64>,
}

impl CatalogMetrics {
    pub fn new() -> Self {
        Self {
            loads: Arc::new(AtomicU64::new(0)),
            failed_loads: Arc::new(AtomicU64::new(0)),
            records_loaded: Arc::new(AtomicU64::new(0)),
            cache_hits: Arc::new(AtomicU64::new(0)),
            cache_misses: Arc::new(AtomicU64::new(0)),
            cache_evictions: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Records a successful load of `records` rows
    pub fn record_load(&self, records: usize) {
        let loads = self.loads.fetch_add(1, Ordering::Relaxed) + 1;
        self.records_loaded
            .store(records as u64, Ordering::Relaxed);
        debug!("Load #{} installed {} records", loads, records);
    }

    pub fn record_failed_load(&self) {
        self.failed_loads.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a cache lookup
    pub fn record_cache_lookup(&self, hit: bool) {
        if hit {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.cache_misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_eviction(&self) {
        self.cache_evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn loads(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> u64 {
        self.cache_misses.load(Ordering::Relaxed)
    }

    pub fn get_stats(&self) -> CatalogStats {
        CatalogStats {
            loads: self.loads.load(Ordering::Relaxed),
            failed_loads: self.failed_loads.load(Ordering::Relaxed),
            records_loaded: self.records_loaded.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            cache_evictions: self.cache_evictions.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Catalog stats:\n\
             Loads (ok/failed): {}/{}\n\
             Records in snapshot: {}\n\
             Cache hits/misses/evictions: {}/{}/{}",
            stats.loads,
            stats.failed_loads,
            stats.records_loaded,
            stats.cache_hits,
            stats.cache_misses,
            stats.cache_evictions
        );
    }
}

impl Default for CatalogMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of [`CatalogMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogStats {
    pub loads: u64,
    pub failed_loads: u64,
    pub records_loaded: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_evictions: u64,
}

impl CatalogStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }
}
