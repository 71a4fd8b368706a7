//! Highlight navigation over rendered regions.

/// Index of the currently highlighted region.
///
/// Moves are bounded by the region count of the current view; there is no
/// wraparound. Every move reports whether the cursor changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HighlightCursor {
    index: usize,
}

impl HighlightCursor {
    /// Cursor on the first region.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current region index.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Step to the next region if one exists.
    pub fn next(&mut self, change_count: usize) -> bool {
        if self.index + 1 < change_count {
            self.index += 1;
            true
        } else {
            false
        }
    }

    /// Step to the previous region if one exists.
    pub fn previous(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
            true
        } else {
            false
        }
    }

    /// Pull the cursor back inside `0..change_count`.
    ///
    /// Returns whether it moved. With no regions the cursor rests on 0.
    pub fn clamp(&mut self, change_count: usize) -> bool {
        let bound = change_count.saturating_sub(1);
        if self.index > bound {
            self.index = bound;
            true
        } else {
            false
        }
    }

    /// Go back to the first region.
    pub fn reset(&mut self) {
        self.index = 0;
    }
}
