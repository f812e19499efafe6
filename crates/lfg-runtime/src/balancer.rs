//! Round-robin slot selection.
//!
//! Picks the next idle slot starting from a cursor that advances past every
//! pick (next-fit). Under sustained load each slot is offered in turn, so
//! no idle slot is skipped for more than `count - 1` consecutive picks.

/// A next-fit round-robin selector over slot indices.
///
/// Not synchronized: the pool calls it while holding its state lock.
#[derive(Debug, Default)]
pub struct RoundRobinBalancer {
    cursor: usize,
}

impl RoundRobinBalancer {
    pub fn new() -> Self {
        Self { cursor: 0 }
    }

    /// Select the first index at or after the cursor, wrapping around
    /// `count`, for which `is_free` holds.
    ///
    /// Returns `None` if count is zero or nothing is free.
    pub fn next_free(&mut self, count: usize, is_free: impl Fn(usize) -> bool) -> Option<usize> {
        if count == 0 {
            return None;
        }
        let start = self.cursor % count;
        let idx = (0..count)
            .map(|offset| (start + offset) % count)
            .find(|&idx| is_free(idx))?;
        self.cursor = (idx + 1) % count;
        Some(idx)
    }
}
