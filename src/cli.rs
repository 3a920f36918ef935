use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::DEFAULT_DB_PATH;

#[derive(Parser, Debug)]
#[command(name = "pokewiki-db")]
#[command(version, about = "Build and query a Korean PokeAPI wiki store in SQLite")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Where the raw CSV tables are read from
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Read `<table>.csv` files from this directory instead of downloading
    #[arg(long)]
    pub csv_dir: Option<PathBuf>,

    /// Custom cache directory for downloaded tables
    #[arg(short, long)]
    pub cache_dir: Option<PathBuf>,

    /// Override the CSV base URL
    #[arg(long)]
    pub base_url: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the store, reusing it when it is already current
    Build {
        /// Output SQLite database path
        #[arg(default_value = DEFAULT_DB_PATH)]
        db: PathBuf,

        #[command(flatten)]
        source: SourceArgs,

        /// Rebuild even if the store is current, and re-download cached tables
        #[arg(short, long)]
        force: bool,

        /// Show the full-screen dashboard
        #[arg(long)]
        tui: bool,
    },

    /// Download every source table into the cache
    Fetch {
        /// Custom cache directory
        #[arg(short, long)]
        cache_dir: Option<PathBuf>,

        /// Override the CSV base URL
        #[arg(long)]
        base_url: Option<String>,

        /// Force re-download even if cached
        #[arg(short, long)]
        force: bool,
    },

    /// Search entities by name prefix
    Search {
        /// Name prefix
        query: String,

        #[arg(long, default_value = DEFAULT_DB_PATH)]
        db: PathBuf,
    },

    /// Print one entity's full detail as JSON
    Show {
        id: i64,

        #[arg(long, default_value = DEFAULT_DB_PATH)]
        db: PathBuf,
    },

    /// List all output table names
    ListTables,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
