use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::errors::DataSourceError;
use crate::record::Movie;

pub const TITLE_COLUMN: &str = "title";
pub const YEAR_COLUMN: &str = "release_year";
pub const DIRECTOR_COLUMN: &str = "director";

/// Modification time and size of the source at the moment it was read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSignature {
    pub mtime: SystemTime,
    pub size: u64,
}

impl FileSignature {
    pub fn compute(path: &Path) -> Result<Self, DataSourceError> {
        let metadata = std::fs::metadata(path).map_err(|e| DataSourceError::from_io(path, e))?;

        Ok(Self {
            mtime: metadata
                .modified()
                .map_err(|e| DataSourceError::from_io(path, e))?,
            size: metadata.len(),
        })
    }

    /// Only a strictly later modification time counts as a change
    pub fn is_newer_than(&self, observed: &FileSignature) -> bool {
        self.mtime > observed.mtime
    }
}

/// The CSV file backing a store, plus the signature of its last good load
#[derive(Debug)]
pub struct SourceHandle {
    path: PathBuf,
    last_observed: Option<FileSignature>,
}

impl SourceHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_observed: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn last_observed(&self) -> Option<FileSignature> {
        self.last_observed
    }

    /// Reads the current signature and reports whether it differs from the
    /// last observed one. Nothing is recorded here; see [`Self::mark_loaded`].
    pub fn probe(&self) -> Result<(FileSignature, bool), DataSourceError> {
        let current = FileSignature::compute(&self.path)?;
        let stale = match &self.last_observed {
            None => true,
            Some(observed) => current.is_newer_than(observed),
        };
        Ok((current, stale))
    }

    pub fn mark_loaded(&mut self, signature: FileSignature) {
        self.last_observed = Some(signature);
    }
}

struct Columns {
    title: usize,
    year: usize,
    director: usize,
}

impl Columns {
    fn locate(path: &Path, headers: &csv::StringRecord) -> Result<Self, DataSourceError> {
        let find = |column: &'static str| {
            headers
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| DataSourceError::MissingColumn {
                    path: path.to_path_buf(),
                    column,
                })
        };

        Ok(Self {
            title: find(TITLE_COLUMN)?,
            year: find(YEAR_COLUMN)?,
            director: find(DIRECTOR_COLUMN)?,
        })
    }
}

/// Reads every row of the CSV at `path`.
///
/// Any row with a missing or empty required cell, or a year that is not an
/// integer, fails the whole read; callers never see a partial list.
pub fn read_movies(path: &Path) -> Result<Vec<Movie>, DataSourceError> {
    let file = File::open(path).map_err(|e| DataSourceError::from_io(path, e))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let headers = reader
        .headers()
        .map_err(|e| DataSourceError::from_csv(path, e))?
        .clone();
    let columns = Columns::locate(path, &headers)?;

    let mut movies = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| DataSourceError::from_csv(path, e))?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();

        let field = |index: usize, name: &'static str| {
            row.get(index)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| DataSourceError::MissingField {
                    path: path.to_path_buf(),
                    line,
                    field: name,
                })
        };

        let title = field(columns.title, TITLE_COLUMN)?;
        let year_text = field(columns.year, YEAR_COLUMN)?;
        let director = field(columns.director, DIRECTOR_COLUMN)?;
        let year = year_text
            .trim()
            .parse::<i32>()
            .map_err(|_| DataSourceError::InvalidYear {
                path: path.to_path_buf(),
                line,
                value: year_text.to_string(),
            })?;

        movies.push(Movie::new(title, year, director));
    }

    Ok(movies)
}
