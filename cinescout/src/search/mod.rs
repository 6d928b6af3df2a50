//! Query dispatch over the catalog.
//!
//! A search goes through three steps:
//!
//! 1. **Normalize**: the argument is shaped for its kind. Text is trimmed and
//!    lower-cased, years are parsed ([`crate::query::QueryKind::normalize`]).
//! 2. **Cache**: the `(kind, normalized argument)` pair is looked up in a
//!    bounded LRU cache ([`crate::cache::QueryCache`]).
//! 3. **Strategy**: on a miss, the store's current records are filtered by the
//!    [`SearchStrategy`] registered for the kind, and the result is cached.
//!
//! The cache and the store are guarded by separate locks and never held
//! together: a miss releases the cache before asking the store for records.
//!
//! ```rust,ignore
//! let store = Arc::new(MovieStore::new("movies.csv"));
//! let service = SearchService::new(store);
//! let nolan = service.search(QueryKind::Director, "nolan")?;
//! ```
pub mod engine;
pub mod strategy;

pub use engine::{SearchOptions, SearchService};
pub use strategy::{SearchStrategy, StrategyRegistry};
