//! Pagination event helpers
//!
//! Glue between a list consumer and a paginator.
//!
//! # Overview
//!
//! The events module provides:
//! - `PaginationEvents` - The two fetch entry points a consumer drives
//! - `EndOfListListener` - Requests the next page when scrolling nears the end
//! - `RemovalBatcher` - Debounces item removals into one `Update`

mod batcher;
mod scroll;
mod types;

pub use batcher::{RemovalBatcher, DEFAULT_REMOVAL_WINDOW};
pub use scroll::EndOfListListener;
pub use types::{NoopPaginationEvents, PaginationEvents};
