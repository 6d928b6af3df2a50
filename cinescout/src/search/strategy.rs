use std::collections::HashMap;

use crate::errors::{SearchError, SearchResult};
use crate::query::{NormalizedArg, QueryKind};
use crate::record::Movie;

/// Matching rule applied to a snapshot for one query kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStrategy {
    /// Case-insensitive substring match on the title
    TitleContains,
    /// Exact match on the release year
    YearEquals,
    /// Case-insensitive substring match on the director
    DirectorContains,
}

impl SearchStrategy {
    /// Filters `movies`, keeping source order.
    ///
    /// Text arguments are expected lower-cased already (see
    /// [`QueryKind::normalize`]). Handing a text argument to `YearEquals` or a
    /// year to a text rule is reported as an invalid query.
    pub fn apply(&self, movies: &[Movie], arg: &NormalizedArg) -> SearchResult<Vec<Movie>> {
        match (self, arg) {
            (SearchStrategy::TitleContains, NormalizedArg::Text(needle)) => {
                Ok(contains_ignore_case(movies, needle, Movie::title))
            }
            (SearchStrategy::DirectorContains, NormalizedArg::Text(needle)) => {
                Ok(contains_ignore_case(movies, needle, Movie::director))
            }
            (SearchStrategy::YearEquals, NormalizedArg::Year(year)) => Ok(movies
                .iter()
                .filter(|m| m.release_year() == *year)
                .cloned()
                .collect()),
            (strategy, arg) => Err(SearchError::invalid_query(format!(
                "{:?} cannot match argument {:?}",
                strategy, arg
            ))),
        }
    }
}

fn contains_ignore_case(movies: &[Movie], needle: &str, field: fn(&Movie) -> &str) -> Vec<Movie> {
    movies
        .iter()
        .filter(|&m| field(m).to_lowercase().contains(needle))
        .cloned()
        .collect()
}

/// Maps each query kind to the strategy that answers it.
///
/// Resolved once when a service is built; adding a kind is a matter of
/// registering another pair.
#[derive(Debug, Clone)]
pub struct StrategyRegistry {
    strategies: HashMap<QueryKind, SearchStrategy>,
}

impl StrategyRegistry {
    /// A registry with no strategies
    pub fn empty() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    /// Title, year and director strategies
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(QueryKind::Title, SearchStrategy::TitleContains);
        registry.register(QueryKind::Year, SearchStrategy::YearEquals);
        registry.register(QueryKind::Director, SearchStrategy::DirectorContains);
        registry
    }

    /// Registers `strategy` for `kind`, returning the one it replaced
    pub fn register(&mut self, kind: QueryKind, strategy: SearchStrategy) -> Option<SearchStrategy> {
        self.strategies.insert(kind, strategy)
    }

    pub fn resolve(&self, kind: QueryKind) -> SearchResult<SearchStrategy> {
        self.strategies
            .get(&kind)
            .copied()
            .ok_or_else(|| SearchError::invalid_query(format!("no strategy registered for {}", kind)))
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
