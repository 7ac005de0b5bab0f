//! End-of-list detection
//!
//! Requests the next page once the last visible row comes within `buffer`
//! rows of the end of the loaded list.

use super::types::PaginationEvents;

/// Watches the last visible row of a list and asks for more near the end
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndOfListListener {
    buffer: usize,
    last_visible: Option<usize>,
}

impl EndOfListListener {
    /// Create a listener firing within `buffer` rows of the end
    pub fn new(buffer: usize) -> Self {
        Self {
            buffer,
            last_visible: None,
        }
    }

    /// Rows before the end at which loading starts
    pub fn buffer(&self) -> usize {
        self.buffer
    }

    /// Check if `last_visible` is within the buffer of a list of `total` rows
    pub fn is_near_end(&self, last_visible: Option<usize>, total: usize) -> bool {
        match last_visible {
            Some(index) if total > 0 => (total - 1).saturating_sub(index) <= self.buffer,
            _ => false,
        }
    }

    /// Feed the current scroll position. Calls `load_next_page` when the
    /// last visible row changed and is near the end; returns whether it did.
    pub fn observe(
        &mut self,
        last_visible: Option<usize>,
        total: usize,
        events: &dyn PaginationEvents,
    ) -> bool {
        if last_visible == self.last_visible {
            return false;
        }
        self.last_visible = last_visible;

        if self.is_near_end(last_visible, total) {
            events.load_next_page();
            true
        } else {
            false
        }
    }
}
