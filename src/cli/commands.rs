//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Page-based pagination engine CLI
#[derive(Parser, Debug)]
#[command(name = "pagestream")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Paginator configuration file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Page through a synthetic in-memory dataset
    Demo {
        /// Number of items in the dataset
        #[arg(long, default_value = "45")]
        total: u32,

        /// Items per page (overrides the config file)
        #[arg(long)]
        page_size: Option<u32>,

        /// Fail the first request for this page with a retryable error
        #[arg(long)]
        fail_page: Option<u32>,

        /// Emit only the newest page instead of the accumulated list
        #[arg(long)]
        no_accumulate: bool,
    },

    /// Page through a JSON HTTP endpoint
    Fetch {
        /// Endpoint URL
        #[arg(long)]
        url: String,

        /// Dotted path to the records array (e.g. $.data.items)
        #[arg(long, default_value = "")]
        records_path: String,

        /// Query parameter carrying the page number
        #[arg(long, default_value = "page")]
        page_param: String,

        /// Query parameter carrying the page size
        #[arg(long, default_value = "page_size")]
        page_size_param: String,

        /// Items per page (overrides the config file)
        #[arg(long)]
        page_size: Option<u32>,

        /// Stop after this many successful pages
        #[arg(long)]
        max_pages: Option<u32>,

        /// Request header as NAME=VALUE (repeatable)
        #[arg(long = "header", value_name = "NAME=VALUE")]
        headers: Vec<String>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one state per line)
    Json,
    /// Human-readable output
    Pretty,
}
