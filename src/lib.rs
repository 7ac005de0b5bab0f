// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]

//! # pagestream
//!
//! A page-based pagination engine. Pages are fetched on demand from a
//! pluggable source, optionally transformed, accumulated, and published to
//! any number of subscribers as a stream of states.
//!
//! ## Features
//!
//! - **Latest-Wins Loading**: A new request cancels the fetch in flight
//! - **Accumulated or Per-Page Output**: Emit the whole list or just the newest page
//! - **Local Edits**: Update and remove loaded items without refetching
//! - **HTTP Sources**: Page through JSON endpoints with `reqwest`
//! - **Scroll Triggers**: Request the next page when a consumer nears the end
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pagestream::{PageBasedPaginator, PaginationState, PaginatorConfig, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let source = |page: u32, size: u32| async move {
//!         let start = (page - 1) * size;
//!         Ok((start..(start + size).min(45)).collect::<Vec<u32>>())
//!     };
//!     let paginator: PageBasedPaginator<u32> =
//!         PageBasedPaginator::new(PaginatorConfig::new(20), source)?;
//!
//!     let mut states = paginator.subscribe();
//!     paginator.load_next_page();
//!     while let Ok(state) = states.recv().await {
//!         match state {
//!             PaginationState::Success(items) => {
//!                 println!("{} items", items.len());
//!                 paginator.load_next_page();
//!             }
//!             PaginationState::End => break,
//!             _ => {}
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                      PageBasedPaginator                       │
//! │  refresh_page()   load_next_page()   update/remove items      │
//! └───────────────────────────────┬───────────────────────────────┘
//!                                 │ watch (latest trigger wins)
//! ┌───────────────────────────────┴───────────────────────────────┐
//! │                         Driver task                           │
//! │  PageSource::fetch_page → Transformer::apply → accumulate     │
//! └───────────────────────────────┬───────────────────────────────┘
//!                                 │ broadcast
//! ┌─────────────────┬─────────────┴─────────┬─────────────────────┐
//! │   Subscribers   │   EndOfListListener   │   RemovalBatcher    │
//! └─────────────────┴───────────────────────┴─────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Paginator configuration
pub mod config;

/// Pagination engine
pub mod pagination;

/// Consumer-side triggers (scroll listener, batched removal)
pub mod events;

/// HTTP page source
pub mod http;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::PaginatorConfig;
pub use error::{Error, Result};
pub use events::{EndOfListListener, PaginationEvents, RemovalBatcher};
pub use http::{HttpPageSource, HttpSourceConfig};
pub use pagination::{
    ItemTransformer, LoadTrigger, PageBasedPaginator, PageSource, PageState, PaginationState,
    StateKind, Transformer,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
