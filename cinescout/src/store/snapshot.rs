use std::collections::HashMap;
use std::sync::Arc;

use super::source::FileSignature;
use crate::record::Movie;

/// Every movie from one successful load, with the indices built over them.
///
/// A snapshot never changes after construction. Reloading builds a fresh one
/// and swaps it in whole, so records and indices always agree.
#[derive(Debug)]
pub struct Snapshot {
    movies: Arc<[Movie]>,
    by_year: HashMap<i32, Vec<Movie>>,
    by_director: HashMap<String, Vec<Movie>>,
    signature: FileSignature,
    generation: u64,
}

impl Snapshot {
    pub(crate) fn build(movies: Vec<Movie>, signature: FileSignature, generation: u64) -> Self {
        let mut by_year: HashMap<i32, Vec<Movie>> = HashMap::new();
        let mut by_director: HashMap<String, Vec<Movie>> = HashMap::new();

        for movie in &movies {
            by_year
                .entry(movie.release_year())
                .or_default()
                .push(movie.clone());
            by_director
                .entry(movie.director().trim().to_lowercase())
                .or_default()
                .push(movie.clone());
        }

        Self {
            movies: movies.into(),
            by_year,
            by_director,
            signature,
            generation,
        }
    }

    /// Shared handle to the records, in source order
    pub fn movies(&self) -> Arc<[Movie]> {
        Arc::clone(&self.movies)
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn by_year(&self, year: i32) -> &[Movie] {
        self.by_year.get(&year).map(Vec::as_slice).unwrap_or_default()
    }

    /// Exact director lookup, ignoring case and surrounding whitespace
    pub fn by_director(&self, director: &str) -> &[Movie] {
        self.by_director
            .get(&director.trim().to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of records reachable through the year index
    pub fn year_index_len(&self) -> usize {
        self.by_year.values().map(Vec::len).sum()
    }

    /// Number of records reachable through the director index
    pub fn director_index_len(&self) -> usize {
        self.by_director.values().map(Vec::len).sum()
    }

    pub fn signature(&self) -> FileSignature {
        self.signature
    }

    /// 1 for the first load, incremented by every reload
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    fn signature() -> FileSignature {
        FileSignature {
            mtime: SystemTime::UNIX_EPOCH,
            size: 0,
        }
    }

    #[test]
    fn test_indices_cover_every_record() {
        let snapshot = Snapshot::build(
            vec![
                Movie::new("Inception", 2010, "Christopher Nolan"),
                Movie::new("Interstellar", 2014, "Christopher Nolan"),
                Movie::new("Black Swan", 2010, "Darren Aronofsky"),
            ],
            signature(),
            1,
        );

        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.year_index_len(), 3);
        assert_eq!(snapshot.director_index_len(), 3);
    }

    #[test]
    fn test_lookups_keep_source_order() {
        let snapshot = Snapshot::build(
            vec![
                Movie::new("Inception", 2010, "Christopher Nolan"),
                Movie::new("Interstellar", 2014, "Christopher Nolan"),
                Movie::new("Black Swan", 2010, "Darren Aronofsky"),
            ],
            signature(),
            1,
        );

        let titles: Vec<_> = snapshot.by_year(2010).iter().map(Movie::title).collect();
        assert_eq!(titles, vec!["Inception", "Black Swan"]);

        let titles: Vec<_> = snapshot
            .by_director("CHRISTOPHER nolan")
            .iter()
            .map(Movie::title)
            .collect();
        assert_eq!(titles, vec!["Inception", "Interstellar"]);

        assert!(snapshot.by_year(1999).is_empty());
        assert!(snapshot.by_director("nolan").is_empty()); // Index keys are exact
    }

    #[test]
    fn test_padded_director_is_indexed() {
        let snapshot = Snapshot::build(
            vec![Movie::new("Inception", 2010, " Christopher Nolan ")],
            signature(),
            1,
        );

        assert_eq!(snapshot.by_director("Christopher Nolan").len(), 1);
        assert_eq!(snapshot.by_director("  christopher nolan").len(), 1);
        assert_eq!(snapshot.by_director("Christopher Nolan")[0].director(), " Christopher Nolan ");
    }
}
