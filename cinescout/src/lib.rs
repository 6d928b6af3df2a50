pub mod cache;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod query;
pub mod record;
pub mod search;
pub mod store;

pub use config::CatalogConfig;
pub use errors::{DataSourceError, SearchError, SearchResult};
pub use query::{Query, QueryKind, QueryValue};
pub use record::Movie;
pub use search::{SearchOptions, SearchService};
pub use store::MovieStore;
