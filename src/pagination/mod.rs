//! Pagination module
//!
//! Page-based pagination engine with a broadcast state stream.
//!
//! # Overview
//!
//! The pagination module provides:
//! - `PageBasedPaginator` - Fetches pages on demand and tracks loaded items
//! - `PaginationState` - What observers see (loading, success, update, error, end)
//! - `PageSource` / `ItemTransformer` - The fetch and mapping capabilities a
//!   paginator consumes, implemented for async closures

mod paginator;
mod source;
mod types;

pub use paginator::{PageBasedPaginator, PageState};
pub use source::{ItemTransformer, PageSource, Transformer};
pub use types::{LoadTrigger, PaginationState, StateKind};
