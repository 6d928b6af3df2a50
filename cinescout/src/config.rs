use config::{Config as ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::cache::DEFAULT_CACHE_CAPACITY;
use crate::errors::{SearchError, SearchResult};
use crate::search::SearchOptions;

/// Settings for opening a catalog.
///
/// # Configuration Locations
///
/// Sources are layered, later ones overriding earlier ones:
/// 1. Global `$HOME/.config/cinescout/config.yaml`
/// 2. Local `.cinescout.yaml` in the current directory
/// 3. A file passed explicitly (the CLI's `--config` flag)
///
/// Command-line flags are applied last through [`CatalogConfig::merge_with_cli`].
///
/// # Configuration Format
///
/// ```yaml
/// # CSV with a title,release_year,director header
/// source_path: "movies.csv"
///
/// # Distinct queries remembered before the least recently used is dropped
/// cache_capacity: 128
///
/// # Set to false to send every query to the store
/// cache_enabled: true
///
/// # Drop cached results whenever the CSV is reloaded
/// invalidate_on_reload: false
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "warn"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// CSV file backing the catalog
    #[serde(default = "default_source_path")]
    pub source_path: PathBuf,

    /// Maximum number of cached query results; must be positive
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    #[serde(default = "default_true")]
    pub cache_enabled: bool,

    /// Off by default: cached results may outlive a reload of the source
    #[serde(default)]
    pub invalidate_on_reload: bool,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_source_path() -> PathBuf {
    PathBuf::from("movies.csv")
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            source_path: default_source_path(),
            cache_capacity: default_cache_capacity(),
            cache_enabled: true,
            invalidate_on_reload: false,
            log_level: default_log_level(),
        }
    }
}

/// Values supplied on the command line; `None` leaves the file value alone
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub source_path: Option<PathBuf>,
    pub cache_capacity: Option<usize>,
    pub disable_cache: bool,
    pub log_level: Option<String>,
}

impl CatalogConfig {
    /// Loads configuration from the default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Loads configuration, layering `config_path` over the default locations.
    ///
    /// An explicit path that does not exist is an error; missing default
    /// files are skipped.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        let defaults = [
            dirs::config_dir().map(|p| p.join("cinescout/config.yaml")),
            Some(PathBuf::from(".cinescout.yaml")),
        ];
        for path in defaults.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder.build()?.try_deserialize()
    }

    /// CLI values take precedence over configuration file values
    pub fn merge_with_cli(mut self, cli: CliOverrides) -> Self {
        if let Some(path) = cli.source_path {
            self.source_path = path;
        }
        if let Some(capacity) = cli.cache_capacity {
            self.cache_capacity = capacity;
        }
        if cli.disable_cache {
            self.cache_enabled = false;
        }
        if let Some(level) = cli.log_level {
            self.log_level = level;
        }
        self
    }

    /// Converts the cache settings into service options
    pub fn search_options(&self) -> SearchResult<SearchOptions> {
        let cache_capacity = NonZeroUsize::new(self.cache_capacity)
            .ok_or_else(|| SearchError::config_error("cache_capacity must be at least 1"))?;
        Ok(SearchOptions {
            cache_capacity,
            cache_enabled: self.cache_enabled,
            invalidate_on_reload: self.invalidate_on_reload,
        })
    }

    /// Renders the effective configuration as YAML
    pub fn to_yaml(&self) -> SearchResult<String> {
        serde_yaml::to_string(self).map_err(|e| SearchError::config_error(e.to_string()))
    }
}
