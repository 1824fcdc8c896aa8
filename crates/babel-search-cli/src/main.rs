//! Babel Search CLI
//!
//! Command-line front-end over `babel-search-core`.
//!
//! # Commands
//!
//! - `search`: run the full pipeline for a query and print ranked results
//! - `generate`: materialize the page behind an address
//! - `enumerate`: show the candidate addresses a query maps to
//! - `decode`: generate a page locally and score it against a query
//!
//! Human-readable output by default; `--json` switches every command to
//! machine output. Exit code 1 on any error.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use babel_search_core::{Config, EngineResult, SearchMode, SearchPipeline};

mod commands;

/// Babel Search - coherence-driven retrieval over the Babel space
#[derive(Parser)]
#[command(name = "babel-search")]
#[command(version = "0.1.0")]
#[command(about = "Search the deterministic Babel page space for coherent text")]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit machine-readable JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Configuration file (TOML); defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the Babel space for pages coherent with a query
    Search {
        /// Free-form query text
        query: String,

        /// Maximum results to return
        #[arg(long, default_value_t = 10)]
        max_results: usize,

        /// Page retrieval mode: local, remote, or hybrid
        #[arg(long, default_value = "local")]
        mode: String,

        /// Minimum overall coherence score, 0-100
        #[arg(long, default_value_t = 0.0)]
        min_score: f64,
    },
    /// Print the deterministic page behind an address
    Generate {
        /// Page address (any string; lowercase hex by convention)
        address: String,

        /// Print the whole 3200-character page instead of a preview
        #[arg(long)]
        full: bool,
    },
    /// Show the candidate addresses enumerated for a query
    Enumerate {
        /// Free-form query text
        query: String,

        /// Maximum candidates to emit
        #[arg(long, default_value_t = 10)]
        max_results: usize,

        /// Deterministic variants per n-gram
        #[arg(long, default_value_t = 2)]
        depth: u32,
    },
    /// Generate a page locally and score it against an optional query
    Decode {
        /// Page address
        address: String,

        /// Query to score relevance against
        #[arg(long)]
        query: Option<String>,
    },
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(cli: Cli) -> EngineResult<()> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let pipeline = SearchPipeline::new(config)?;

    match cli.command {
        Commands::Search {
            query,
            max_results,
            mode,
            min_score,
        } => {
            let mode: SearchMode = mode.parse()?;
            let response = pipeline.search(&query, max_results, mode, min_score).await?;
            commands::print_search(&response, cli.json)
        }
        Commands::Generate { address, full } => {
            let page = pipeline.generate(&address);
            commands::print_page(&address, &page, full, cli.json)
        }
        Commands::Enumerate {
            query,
            max_results,
            depth,
        } => {
            let candidates = pipeline.enumerate(&query, max_results, depth)?;
            commands::print_candidates(&candidates, cli.json)
        }
        Commands::Decode { address, query } => {
            let page = pipeline.generate(&address);
            let decoded = pipeline.decode(&address, &page, query.as_deref());
            commands::print_decoded(&decoded, cli.json)
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
