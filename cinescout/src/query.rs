use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{SearchError, SearchResult};

/// The field a query searches on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    Title,
    Year,
    Director,
}

impl QueryKind {
    pub const ALL: [QueryKind; 3] = [QueryKind::Title, QueryKind::Year, QueryKind::Director];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Title => "title",
            QueryKind::Year => "year",
            QueryKind::Director => "director",
        }
    }

    /// Turns a raw argument into the form this kind matches and caches on.
    ///
    /// Text kinds trim and lower-case their argument; an integer is searched
    /// as its decimal text. `Year` needs an integer, or text that parses as
    /// one once trimmed.
    pub fn normalize(&self, value: &QueryValue) -> SearchResult<NormalizedArg> {
        match (self, value) {
            (QueryKind::Year, QueryValue::Integer(year)) => Ok(NormalizedArg::Year(*year)),
            (QueryKind::Year, QueryValue::Text(text)) => text
                .trim()
                .parse::<i32>()
                .map(NormalizedArg::Year)
                .map_err(|_| {
                    SearchError::invalid_query(format!(
                        "expected an integer year, got '{}'",
                        text
                    ))
                }),
            (_, QueryValue::Text(text)) => Ok(NormalizedArg::Text(text.trim().to_lowercase())),
            (_, QueryValue::Integer(n)) => Ok(NormalizedArg::Text(n.to_string())),
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryKind {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "title" | "name" => Ok(QueryKind::Title),
            "year" | "release_year" => Ok(QueryKind::Year),
            "director" => Ok(QueryKind::Director),
            other => Err(SearchError::invalid_query(format!(
                "unknown query kind '{}'",
                other
            ))),
        }
    }
}

/// A query argument as the caller supplied it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryValue {
    Text(String),
    Integer(i32),
}

impl From<&str> for QueryValue {
    fn from(s: &str) -> Self {
        QueryValue::Text(s.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(s: String) -> Self {
        QueryValue::Text(s)
    }
}

impl From<i32> for QueryValue {
    fn from(n: i32) -> Self {
        QueryValue::Integer(n)
    }
}

/// An argument after [`QueryKind::normalize`]; the form strategies consume
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NormalizedArg {
    Text(String),
    Year(i32),
}

/// A search kind paired with its argument
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query {
    pub kind: QueryKind,
    pub value: QueryValue,
}

impl Query {
    pub fn new(kind: QueryKind, value: impl Into<QueryValue>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    pub fn title(value: impl Into<String>) -> Self {
        Self::new(QueryKind::Title, QueryValue::Text(value.into()))
    }

    pub fn year(year: i32) -> Self {
        Self::new(QueryKind::Year, year)
    }

    pub fn director(value: impl Into<String>) -> Self {
        Self::new(QueryKind::Director, QueryValue::Text(value.into()))
    }
}
