//! The authoritative in-memory copy of the catalog.
//!
//! [`MovieStore`] loads the CSV lazily and reloads it whenever the file's
//! modification time moves past the one observed at the last good load. The
//! check and the reload run inside one critical section:
//!
//! ```text
//! lock ─► stat source ─► newer than observed? ─┬─ no ──► return current snapshot
//!                                              └─ yes ─► read + parse all rows
//!                                                        build indices
//!                                                        install snapshot, record mtime
//!                                                        return new snapshot
//! ```
//!
//! Two callers that both see a stale file therefore reload once, and no
//! caller can observe records from one load paired with indices from another.
//! A failed load leaves the previous snapshot and observed mtime in place.
mod snapshot;
mod source;

pub use snapshot::Snapshot;
pub use source::{
    read_movies, FileSignature, SourceHandle, DIRECTOR_COLUMN, TITLE_COLUMN, YEAR_COLUMN,
};

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::SystemTime;
use tracing::{debug, error, info};

use crate::errors::{SearchError, SearchResult};
use crate::metrics::CatalogMetrics;
use crate::record::Movie;

struct StoreState {
    source: SourceHandle,
    snapshot: Option<Arc<Snapshot>>,
}

/// Lazily loaded, self-refreshing catalog backed by a CSV file
pub struct MovieStore {
    path: PathBuf,
    state: Mutex<StoreState>,
    metrics: CatalogMetrics,
}

/// Summary of a store's state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStatus {
    pub path: PathBuf,
    pub generation: u64,
    pub records: usize,
    pub observed_mtime: Option<SystemTime>,
}

impl MovieStore {
    /// Creates a store for `path`. Nothing is read until the first query.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_metrics(path, CatalogMetrics::new())
    }

    pub fn with_metrics(path: impl Into<PathBuf>, metrics: CatalogMetrics) -> Self {
        let path = path.into();
        Self {
            state: Mutex::new(StoreState {
                source: SourceHandle::new(path.clone()),
                snapshot: None,
            }),
            path,
            metrics,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metrics(&self) -> &CatalogMetrics {
        &self.metrics
    }

    /// Returns the current records, reloading first if the source changed.
    ///
    /// Without a change on disk, repeated calls hand back the same `Arc`.
    pub fn current_records(&self) -> SearchResult<Arc<[Movie]>> {
        Ok(self.snapshot()?.movies())
    }

    /// Returns the current snapshot, reloading first if the source changed
    pub fn snapshot(&self) -> SearchResult<Arc<Snapshot>> {
        let mut state = self.lock()?;
        self.refresh_locked(&mut state)
    }

    /// Movies released in `year`, in source order
    pub fn lookup_by_year(&self, year: i32) -> SearchResult<Vec<Movie>> {
        Ok(self.snapshot()?.by_year(year).to_vec())
    }

    /// Movies whose director matches `director` exactly, ignoring case
    pub fn lookup_by_director(&self, director: &str) -> SearchResult<Vec<Movie>> {
        Ok(self.snapshot()?.by_director(director).to_vec())
    }

    /// Reports the installed snapshot without checking the source
    pub fn status(&self) -> SearchResult<StoreStatus> {
        let state = self.lock()?;
        Ok(StoreStatus {
            path: self.path.clone(),
            generation: state.snapshot.as_ref().map_or(0, |s| s.generation()),
            records: state.snapshot.as_ref().map_or(0, |s| s.len()),
            observed_mtime: state.source.last_observed().map(|s| s.mtime),
        })
    }

    fn lock(&self) -> SearchResult<MutexGuard<'_, StoreState>> {
        self.state
            .lock()
            .map_err(|_| SearchError::LockPoisoned("movie store"))
    }

    fn refresh_locked(&self, state: &mut StoreState) -> SearchResult<Arc<Snapshot>> {
        let (signature, stale) = state.source.probe().map_err(|e| self.fail(e.into()))?;
        if !stale {
            if let Some(snapshot) = &state.snapshot {
                debug!("Snapshot of {} is current", self.path.display());
                return Ok(Arc::clone(snapshot));
            }
        }

        info!("Loading movies from {}", self.path.display());
        let movies = read_movies(&self.path).map_err(|e| self.fail(e.into()))?;

        let generation = state.snapshot.as_ref().map_or(0, |s| s.generation()) + 1;
        let snapshot = Arc::new(Snapshot::build(movies, signature, generation));
        state.snapshot = Some(Arc::clone(&snapshot));
        state.source.mark_loaded(signature);

        self.metrics.record_load(snapshot.len());
        info!(
            "Loaded {} movies from {} (generation {})",
            snapshot.len(),
            self.path.display(),
            generation
        );
        Ok(snapshot)
    }

    fn fail(&self, err: SearchError) -> SearchError {
        self.metrics.record_failed_load();
        error!("Error loading movies: {}", err);
        err
    }
}

impl std::fmt::Debug for MovieStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MovieStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
