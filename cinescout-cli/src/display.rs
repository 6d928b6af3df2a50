use cinescout::Movie;
use colored::Colorize;
use std::io::{self, Write};

const SEPARATOR_WIDTH: usize = 50;

/// Writes each movie as a Title/Year/Director block followed by a separator
pub fn render_movies<W: Write>(out: &mut W, movies: &[Movie]) -> io::Result<()> {
    if movies.is_empty() {
        writeln!(out, "\n{}", "No movies found.".yellow())?;
        return Ok(());
    }

    let separator = "-".repeat(SEPARATOR_WIDTH);
    writeln!(out, "\n{}", "Search Results:".bold())?;
    writeln!(out, "{}", separator)?;
    for movie in movies {
        writeln!(out, "Title: {}", movie.title())?;
        writeln!(out, "Year: {}", movie.release_year())?;
        writeln!(out, "Director: {}", movie.director())?;
        writeln!(out, "{}", separator)?;
    }
    Ok(())
}

/// Writes the movies as a pretty-printed JSON array
pub fn render_json<W: Write>(out: &mut W, movies: &[Movie]) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, movies)?;
    writeln!(out)
}
