//! Pagination event trait

use crate::pagination::PageBasedPaginator;

/// Fetch entry points a list consumer can drive
pub trait PaginationEvents: Send + Sync {
    /// Request the next page
    fn load_next_page(&self);

    /// Request a reload from the first page
    fn refresh_page(&self);
}

/// Events sink that ignores every request
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPaginationEvents;

impl PaginationEvents for NoopPaginationEvents {
    fn load_next_page(&self) {}

    fn refresh_page(&self) {}
}

impl<D, E> PaginationEvents for PageBasedPaginator<D, E>
where
    D: Send + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn load_next_page(&self) {
        PageBasedPaginator::load_next_page(self);
    }

    fn refresh_page(&self) {
        PageBasedPaginator::refresh_page(self);
    }
}

impl<T: PaginationEvents + ?Sized> PaginationEvents for std::sync::Arc<T> {
    fn load_next_page(&self) {
        (**self).load_next_page();
    }

    fn refresh_page(&self) {
        (**self).refresh_page();
    }
}
