//! Pagination state and trigger types
//!
//! `PaginationState` is what consumers observe; `LoadTrigger` is the command
//! the paginator's driver task reacts to.

use crate::error::Error;
use std::sync::Arc;

/// A state emitted by the paginator
///
/// `T` is the payload type, a `Vec` of exposed items for
/// [`PageBasedPaginator`](super::PageBasedPaginator).
#[derive(Debug, Clone)]
pub enum PaginationState<T> {
    /// No items yet, the first page is in flight
    LoadingInitial,
    /// Items already loaded, the next page is in flight
    LoadingMore(T),
    /// A page load completed. Carries the accumulated list or only the new
    /// page, depending on configuration.
    Success(T),
    /// The list changed locally without a fetch
    Update(T),
    /// A fetch or transform failed
    Error {
        /// Number of accumulated items when the failure happened
        accumulated_size: usize,
        /// Underlying failure
        cause: Arc<Error>,
    },
    /// The last page was already reached, nothing was fetched
    End,
}

/// Discriminant of a [`PaginationState`], handy for matching and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    LoadingInitial,
    LoadingMore,
    Success,
    Update,
    Error,
    End,
}

impl StateKind {
    /// Stable lowercase name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LoadingInitial => "loading_initial",
            Self::LoadingMore => "loading_more",
            Self::Success => "success",
            Self::Update => "update",
            Self::Error => "error",
            Self::End => "end",
        }
    }
}

impl std::fmt::Display for StateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<T> PaginationState<T> {
    /// Create an error state
    pub fn error(accumulated_size: usize, cause: Error) -> Self {
        Self::Error {
            accumulated_size,
            cause: Arc::new(cause),
        }
    }

    /// The state's discriminant
    pub fn kind(&self) -> StateKind {
        match self {
            Self::LoadingInitial => StateKind::LoadingInitial,
            Self::LoadingMore(_) => StateKind::LoadingMore,
            Self::Success(_) => StateKind::Success,
            Self::Update(_) => StateKind::Update,
            Self::Error { .. } => StateKind::Error,
            Self::End => StateKind::End,
        }
    }

    /// Payload carried by `LoadingMore`, `Success` and `Update`
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::LoadingMore(data) | Self::Success(data) | Self::Update(data) => Some(data),
            _ => None,
        }
    }

    /// Consume the state and return its payload, if any
    pub fn into_data(self) -> Option<T> {
        match self {
            Self::LoadingMore(data) | Self::Success(data) | Self::Update(data) => Some(data),
            _ => None,
        }
    }

    /// Failure carried by an `Error` state
    pub fn cause(&self) -> Option<&Error> {
        match self {
            Self::Error { cause, .. } => Some(cause.as_ref()),
            _ => None,
        }
    }

    /// Check if a page is in flight
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::LoadingInitial | Self::LoadingMore(_))
    }

    /// Check if this is an error state
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Check if this is the end state
    pub fn is_end(&self) -> bool {
        matches!(self, Self::End)
    }

    /// Map the payload, keeping the variant
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> PaginationState<U> {
        match self {
            Self::LoadingInitial => PaginationState::LoadingInitial,
            Self::LoadingMore(data) => PaginationState::LoadingMore(f(data)),
            Self::Success(data) => PaginationState::Success(f(data)),
            Self::Update(data) => PaginationState::Update(f(data)),
            Self::Error {
                accumulated_size,
                cause,
            } => PaginationState::Error {
                accumulated_size,
                cause,
            },
            Self::End => PaginationState::End,
        }
    }
}

/// Command driving the paginator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadTrigger {
    /// Reset and reload from page 1
    Refresh,
    /// Load the given page
    NextPage(u32),
    /// Re-emit the current list after a local change of size
    Update(usize),
}

impl LoadTrigger {
    /// Check if this trigger fetches a page
    pub fn fetches(&self) -> bool {
        !matches!(self, Self::Update(_))
    }
}
