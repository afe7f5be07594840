//! Cursor walk state.

use crate::config::INITIAL_CURSOR;

/// Position in a cursor walk over the index.
///
/// Starts at `*` on page 1. The walk is over when the index answers a cursor
/// with the same cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorState {
    /// Cursor sent with the next request
    pub current: String,
    /// Cursor sent with the previous request; empty on page 1
    pub previous: String,
    /// 1-based number of the page `current` fetches
    pub page_number: u32,
    /// Set once the index repeats a cursor
    pub done: bool,
}

impl Default for CursorState {
    fn default() -> Self {
        Self::new()
    }
}

impl CursorState {
    /// Walk positioned before the first page.
    pub fn new() -> Self {
        Self {
            current: INITIAL_CURSOR.to_string(),
            previous: String::new(),
            page_number: 1,
            done: false,
        }
    }

    /// Records the `nextCursorMark` of the response to `current`.
    ///
    /// Returns `true` when the walk is finished.
    pub fn advance(&mut self, next: &str) -> bool {
        if next == self.current {
            self.done = true;
        } else {
            self.previous = std::mem::replace(&mut self.current, next.to_string());
            self.page_number += 1;
        }
        self.done
    }
}
