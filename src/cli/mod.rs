//! CLI module
//!
//! Command-line interface for paging through data sources.
//!
//! # Commands
//!
//! - `demo` - Page through a synthetic in-memory dataset
//! - `fetch` - Page through a JSON HTTP endpoint

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::{state_message, Runner};
