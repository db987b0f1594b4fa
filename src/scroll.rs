//! Scroll position to feed signals.
//!
//! The terminal has no scroll offset in pixels, so position is the selected
//! row.  After every scroll movement the app asks the adapter what the new
//! position means for the feed.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollSignal {
    /// The selection is on the first row.
    ScrolledToTop,
    /// The selection is within the threshold of the last row.
    NearBottom,
}

#[derive(Debug, Clone, Copy)]
pub struct ScrollAdapter {
    near_bottom_threshold: usize,
}

impl ScrollAdapter {
    pub fn new(near_bottom_threshold: usize) -> Self {
        Self {
            near_bottom_threshold,
        }
    }

    /// Interpret a position after movement.  An empty list is "near the
    /// bottom" so the feed can fill it.
    pub fn observe(&self, selected: Option<usize>, total_rows: usize) -> Option<ScrollSignal> {
        if total_rows == 0 {
            return Some(ScrollSignal::NearBottom);
        }
        let row = selected.unwrap_or(0);

        // A list shorter than the threshold is at both ends; near-bottom wins.
        if total_rows.saturating_sub(row + 1) < self.near_bottom_threshold {
            Some(ScrollSignal::NearBottom)
        } else if row == 0 {
            Some(ScrollSignal::ScrolledToTop)
        } else {
            None
        }
    }
}
