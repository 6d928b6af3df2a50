use serde::Serialize;
use std::fmt;

/// One movie entry loaded from the catalog source.
///
/// Fields are private so a `Movie` cannot change after a load builds it;
/// equality and hashing cover all three fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Movie {
    title: String,
    release_year: i32,
    director: String,
}

impl Movie {
    pub fn new(title: impl Into<String>, release_year: i32, director: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            release_year,
            director: director.into(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn release_year(&self) -> i32 {
        self.release_year
    }

    pub fn director(&self) -> &str {
        &self.director
    }
}

impl fmt::Display for Movie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) by {}", self.title, self.release_year, self.director)
    }
}
