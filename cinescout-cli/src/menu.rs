use cinescout::{QueryKind, SearchError, SearchService};
use colored::Colorize;
use std::io::{self, BufRead, Write};
use tracing::{debug, error};

use crate::display::render_movies;

/// Text menu over a [`SearchService`], reading choices from `input`.
///
/// Search failures are reported and the loop carries on; only IO errors on
/// the console itself end it early. End of input exits like option 4.
pub struct ConsoleUi<'a, R, W> {
    service: &'a SearchService,
    input: R,
    output: W,
}

enum Choice {
    Search(QueryKind),
    Exit,
    Invalid,
}

impl<'a, R: BufRead, W: Write> ConsoleUi<'a, R, W> {
    pub fn new(service: &'a SearchService, input: R, output: W) -> Self {
        Self {
            service,
            input,
            output,
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        loop {
            self.print_menu()?;
            let Some(choice) = self.prompt("\nEnter your choice (1-4): ")? else {
                break;
            };

            match parse_choice(&choice) {
                Choice::Exit => break,
                Choice::Invalid => {
                    writeln!(
                        self.output,
                        "Invalid choice. Please enter a number between 1 and 4."
                    )?;
                }
                Choice::Search(kind) => {
                    if !self.run_search(kind)? {
                        break;
                    }
                }
            }
        }

        writeln!(self.output, "Exiting Movie Management System. Goodbye!")?;
        self.output.flush()
    }

    /// Returns `false` when input ended mid-prompt
    fn run_search(&mut self, kind: QueryKind) -> io::Result<bool> {
        let label = match kind {
            QueryKind::Title => "Enter movie name: ",
            QueryKind::Year => "Enter release year: ",
            QueryKind::Director => "Enter director name: ",
        };
        let Some(answer) = self.prompt(label)? else {
            return Ok(false);
        };

        let result = if kind == QueryKind::Year {
            match answer.parse::<i32>() {
                Ok(year) => self.service.search(kind, year),
                Err(_) => {
                    writeln!(self.output, "Invalid year. Please enter a valid number.")?;
                    return Ok(true);
                }
            }
        } else {
            self.service.search(kind, answer.as_str())
        };

        match result {
            Ok(movies) => render_movies(&mut self.output, &movies)?,
            Err(SearchError::DataSource(e)) => {
                error!("Error loading movies: {}", e);
                writeln!(
                    self.output,
                    "{} {}",
                    "Could not read the movie catalog:".red(),
                    e
                )?;
            }
            Err(SearchError::InvalidQuery(msg)) => {
                writeln!(self.output, "Invalid input: {}", msg)?;
            }
            Err(e) => {
                error!("Unexpected error: {}", e);
                writeln!(
                    self.output,
                    "An unexpected error occurred. Please try again."
                )?;
            }
        }
        Ok(true)
    }

    fn print_menu(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n{}", "Movie Data Management".bold())?;
        writeln!(self.output, "1. Search Movie by Name")?;
        writeln!(self.output, "2. Search Movie by Release Year")?;
        writeln!(self.output, "3. Search Movie by Director")?;
        writeln!(self.output, "4. Exit")
    }

    /// Prints `label` and reads one trimmed line; `None` on end of input
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            debug!("Input closed");
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

fn parse_choice(choice: &str) -> Choice {
    match choice {
        "1" => Choice::Search(QueryKind::Title),
        "2" => Choice::Search(QueryKind::Year),
        "3" => Choice::Search(QueryKind::Director),
        "4" => Choice::Exit,
        _ => Choice::Invalid,
    }
}
