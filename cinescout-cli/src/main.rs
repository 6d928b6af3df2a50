mod display;
mod menu;

use anyhow::{Context, Result};
use cinescout::{
    config::CliOverrides, CatalogConfig, MovieStore, QueryKind, QueryValue, SearchService,
};
use clap::{ArgGroup, Args, Parser, Subcommand};
use colored::Colorize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::display::{render_json, render_movies};
use crate::menu::ConsoleUi;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// CSV catalog with a title,release_year,director header
    #[arg(short = 'f', long = "file", global = true)]
    file: Option<PathBuf>,

    /// Configuration file (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG wins if set
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Number of distinct queries to keep cached
    #[arg(long, global = true)]
    cache_capacity: Option<usize>,

    /// Answer every query from the store, skipping the cache
    #[arg(long, global = true)]
    no_cache: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
#[command(group(
    ArgGroup::new("query")
        .required(true)
        .args(["title", "year", "director"]),
))]
struct SearchArgs {
    /// Case-insensitive substring of the title
    #[arg(short = 't', long)]
    title: Option<String>,

    /// Exact release year
    #[arg(short = 'y', long)]
    year: Option<i32>,

    /// Case-insensitive substring of the director
    #[arg(short = 'd', long)]
    director: Option<String>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

impl SearchArgs {
    fn query(&self) -> (QueryKind, QueryValue) {
        if let Some(year) = self.year {
            (QueryKind::Year, year.into())
        } else if let Some(director) = &self.director {
            (QueryKind::Director, director.clone().into())
        } else {
            (
                QueryKind::Title,
                self.title.clone().unwrap_or_default().into(),
            )
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive search menu (the default)
    Menu,

    /// Run one search and print the results
    Search(SearchArgs),

    /// Print the effective configuration as YAML
    ShowConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error starting application. Check the logs for details.");
            eprintln!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.log_level);

    match run(cli.command.unwrap_or(Commands::Menu), &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Application error: {}", e);
            eprintln!("{} {}", "Error:".red(), e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<CatalogConfig> {
    let config = CatalogConfig::load_from(cli.config.as_deref())
        .context("failed to load configuration")?;
    Ok(config.merge_with_cli(CliOverrides {
        source_path: cli.file.clone(),
        cache_capacity: cli.cache_capacity,
        disable_cache: cli.no_cache,
        log_level: cli.log_level.clone(),
    }))
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // Logs go to stderr so stdout carries only results
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn run(command: Commands, config: &CatalogConfig) -> Result<()> {
    match command {
        Commands::ShowConfig => {
            print!("{}", config.to_yaml()?);
            Ok(())
        }
        Commands::Menu => {
            let service = build_service(config)?;
            let stdin = io::stdin();
            let stdout = io::stdout();
            ConsoleUi::new(&service, stdin.lock(), stdout.lock()).run()?;
            service.metrics().log_stats();
            Ok(())
        }
        Commands::Search(args) => {
            let service = build_service(config)?;
            let (kind, value) = args.query();
            let movies = service.search(kind, value)?;

            let stdout = io::stdout();
            let mut out = stdout.lock();
            if args.json {
                render_json(&mut out, &movies)?;
            } else {
                render_movies(&mut out, &movies)?;
            }
            out.flush()?;
            Ok(())
        }
    }
}

fn build_service(config: &CatalogConfig) -> Result<SearchService> {
    let options = config.search_options()?;
    info!(
        "Opening catalog {} (cache: {}, capacity {})",
        config.source_path.display(),
        if options.cache_enabled { "on" } else { "off" },
        options.cache_capacity
    );
    let store = Arc::new(MovieStore::new(&config.source_path));
    Ok(SearchService::with_options(store, options))
}
