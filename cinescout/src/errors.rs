//! Error types for the catalog.
//!
//! Two families of failure reach callers:
//!
//! - [`DataSourceError`]: the CSV source is missing, unreadable, or holds a row
//!   that fails validation. A load that fails this way never replaces the
//!   snapshot that was in place before it.
//! - [`SearchError::InvalidQuery`]: the argument handed to a query kind cannot
//!   be interpreted (a year that is not a number, a kind with no strategy).
//!
//! Both are local to the call that triggered them:
//! ```rust,ignore
//! match service.search(QueryKind::Year, "abc") {
//!     Ok(movies) => render(&movies),
//!     Err(SearchError::InvalidQuery(msg)) => eprintln!("{msg}"),
//!     Err(SearchError::DataSource(e)) => eprintln!("source problem: {e}"),
//!     Err(e) => eprintln!("{e}"),
//! }
//! ```
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for catalog operations
pub type SearchResult<T> = Result<T, SearchError>;

/// Errors that can occur while querying the catalog
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Data source error: {0}")]
    DataSource(#[from] DataSourceError),
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Lock poisoned: {0}")]
    LockPoisoned(&'static str),
}

/// Failures reading or validating the CSV source
#[derive(Error, Debug)]
pub enum DataSourceError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed CSV in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
    #[error("Missing column '{column}' in header of {path}")]
    MissingColumn { path: PathBuf, column: &'static str },
    #[error("Missing field '{field}' on line {line} of {path}")]
    MissingField {
        path: PathBuf,
        line: u64,
        field: &'static str,
    },
    #[error("Invalid release year '{value}' on line {line} of {path}")]
    InvalidYear {
        path: PathBuf,
        line: u64,
        value: String,
    },
}

impl DataSourceError {
    /// Classifies an IO error raised while touching `path`.
    pub fn from_io(path: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::FileNotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    /// Classifies a csv error. Missing and unreadable files are reported as
    /// such; anything else keeps the csv error, and its IO cause, as source.
    pub fn from_csv(path: &Path, err: csv::Error) -> Self {
        if let csv::ErrorKind::Io(io) = err.kind() {
            match io.kind() {
                std::io::ErrorKind::NotFound => return Self::FileNotFound(path.to_path_buf()),
                std::io::ErrorKind::PermissionDenied => {
                    return Self::PermissionDenied(path.to_path_buf())
                }
                _ => {}
            }
        }
        Self::Csv {
            path: path.to_path_buf(),
            source: err,
        }
    }
}

impl SearchError {
    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Self::InvalidQuery(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// True when the failure came from the CSV source rather than the caller
    pub fn is_data_source(&self) -> bool {
        matches!(self, Self::DataSource(_))
    }
}
