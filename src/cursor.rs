//! Time cursor used to walk listen history page by page.

use crate::models::Page;

/// Outcome of feeding a page to the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorStep {
    /// The cursor moved forward; fetch the next page from here
    Advanced(i64),
    /// No further history is available
    Exhausted,
}

/// Lower bound (exclusive) on listen timestamps still to be fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    min_ts: i64,
    exhausted: bool,
}

impl PageCursor {
    pub fn starting_at(min_ts: i64) -> Self {
        Self {
            min_ts,
            exhausted: false,
        }
    }

    pub fn min_ts(&self) -> i64 {
        self.min_ts
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Move past the most recent listen on `page`.
    ///
    /// An empty page, a page with no timestamps, or one that does not move
    /// past the current position ends the walk. A timestamp of zero is a
    /// valid position and does not by itself end it.
    pub fn advance(&mut self, page: &Page) -> CursorStep {
        if self.exhausted {
            return CursorStep::Exhausted;
        }

        match page.latest_timestamp() {
            Some(ts) if ts > self.min_ts => {
                self.min_ts = ts;
                CursorStep::Advanced(ts)
            }
            _ => {
                self.exhausted = true;
                CursorStep::Exhausted
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ListenRecord;

    fn page_at(timestamps: &[i64]) -> Page {
        Page::new(
            timestamps
                .iter()
                .map(|ts| ListenRecord::new(*ts, "Artist", "Track"))
                .collect(),
        )
    }

    #[test]
    fn advances_to_last_listen_of_ascending_page() {
        let mut cursor = PageCursor::starting_at(100);
        assert_eq!(cursor.advance(&page_at(&[110, 120, 130])), CursorStep::Advanced(130));
        assert_eq!(cursor.min_ts(), 130);
        assert!(!cursor.is_exhausted());
    }

    #[test]
    fn advances_to_newest_listen_of_descending_page() {
        let mut cursor = PageCursor::starting_at(100);
        assert_eq!(cursor.advance(&page_at(&[130, 120, 110])), CursorStep::Advanced(130));
    }

    #[test]
    fn empty_page_exhausts() {
        let mut cursor = PageCursor::starting_at(100);
        assert_eq!(cursor.advance(&Page::default()), CursorStep::Exhausted);
        assert!(cursor.is_exhausted());
        assert_eq!(cursor.advance(&page_at(&[200])), CursorStep::Exhausted);
    }

    #[test]
    fn non_advancing_page_exhausts() {
        let mut cursor = PageCursor::starting_at(100);
        assert_eq!(cursor.advance(&page_at(&[90, 100])), CursorStep::Exhausted);
    }

    #[test]
    fn zero_timestamp_is_a_valid_position() {
        let mut cursor = PageCursor::starting_at(-10);
        assert_eq!(cursor.advance(&page_at(&[-5, 0])), CursorStep::Advanced(0));
        assert!(!cursor.is_exhausted());
    }
}
