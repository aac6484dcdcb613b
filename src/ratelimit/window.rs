//! Per-key sliding window of accepted attempts.

use std::collections::VecDeque;

/// Timestamps (milliseconds since the Unix epoch) of the attempts accepted
/// for one key, oldest first.
#[derive(Debug, Clone, Default)]
pub struct RateWindow {
    hits: VecDeque<i64>,
}

impl RateWindow {
    /// Create an empty window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every timestamp at or before `horizon`.
    ///
    /// Timestamps are appended in clock order, so eviction only ever pops
    /// from the front.
    pub fn evict_through(&mut self, horizon: i64) {
        while matches!(self.hits.front(), Some(&t) if t <= horizon) {
            self.hits.pop_front();
        }
    }

    /// Record an accepted attempt at `now`.
    pub fn record(&mut self, now: i64) {
        self.hits.push_back(now);
    }

    /// Number of attempts currently inside the window.
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Oldest surviving timestamp, if any.
    pub fn oldest(&self) -> Option<i64> {
        self.hits.front().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_len() {
        let mut window = RateWindow::new();
        assert!(window.is_empty());

        window.record(10);
        window.record(20);
        assert_eq!(window.len(), 2);
        assert_eq!(window.oldest(), Some(10));
    }

    #[test]
    fn test_evict_is_inclusive_of_horizon() {
        let mut window = RateWindow::new();
        window.record(100);
        window.record(200);
        window.record(300);

        window.evict_through(200);
        assert_eq!(window.len(), 1);
        assert_eq!(window.oldest(), Some(300));
    }

    #[test]
    fn test_evict_everything() {
        let mut window = RateWindow::new();
        window.record(1);
        window.evict_through(1_000);
        assert!(window.is_empty());
        assert_eq!(window.oldest(), None);
    }
}
