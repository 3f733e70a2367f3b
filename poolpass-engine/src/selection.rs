//! Highlighted location in the list/map view.
//!
//! Browsing is circular: stepping past either end lands on the other.

/// Index into the ordered catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionCursor {
    index: usize,
}

impl SelectionCursor {
    #[must_use]
    pub const fn new() -> Self {
        Self { index: 0 }
    }

    /// Clamped index for a catalog of `len` entries; `0` when empty.
    #[must_use]
    pub const fn current(&self, len: usize) -> usize {
        if len == 0 || self.index >= len {
            0
        } else {
            self.index
        }
    }

    /// Step forward with wraparound.
    pub const fn next(&mut self, len: usize) -> usize {
        if len == 0 {
            self.index = 0;
            return 0;
        }
        self.index = (self.current(len) + 1) % len;
        self.index
    }

    /// Step backward with wraparound.
    pub const fn previous(&mut self, len: usize) -> usize {
        if len == 0 {
            self.index = 0;
            return 0;
        }
        self.index = (self.current(len) + len - 1) % len;
        self.index
    }

    /// Jump to `index`; out-of-range values fall back to `0`.
    pub const fn select(&mut self, index: usize, len: usize) -> usize {
        self.index = index;
        self.index = self.current(len);
        self.index
    }

    /// Restore from a persisted slot. Missing, negative or out-of-range
    /// values become `0`.
    pub fn set_from_persisted(&mut self, raw: Option<i64>, len: usize) -> usize {
        let index = raw
            .and_then(|value| usize::try_from(value).ok())
            .filter(|&value| value < len)
            .unwrap_or(0);
        self.index = index;
        index
    }
}
