//! Core sliding window rate limiter.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use super::window::RateWindow;
use crate::clock::{Clock, SystemClock};

/// Default rolling window length.
const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Counts accepted attempts per key within a rolling window.
///
/// Windows live in a sharded map, so concurrent callers only contend on the
/// same key. All state is in memory and is lost when the limiter is dropped.
pub struct RateLimiter<C: Clock = SystemClock> {
    /// Accepted attempt timestamps indexed by key
    windows: DashMap<String, RateWindow>,
    /// Length of the rolling window
    window: Duration,
    clock: C,
}

impl RateLimiter<SystemClock> {
    /// Create a rate limiter with a 60 second window on the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock::new(), DEFAULT_WINDOW)
    }
}

impl Default for RateLimiter<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> RateLimiter<C> {
    /// Create a rate limiter with an explicit clock and window length.
    pub fn with_clock(clock: C, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            window,
            clock,
        }
    }

    /// Check whether `key` may perform another attempt under `limit`.
    ///
    /// Stale timestamps for the key are evicted first. If fewer than `limit`
    /// attempts remain in the window the current time is recorded and `true`
    /// is returned; otherwise nothing is recorded and `false` is returned.
    pub fn is_allowed(&self, key: &str, limit: u32) -> bool {
        let now = self.clock.now_millis();
        let horizon = now - self.window_millis();

        let mut window = self.windows.entry(key.to_string()).or_default();
        window.evict_through(horizon);

        if window.len() >= limit as usize {
            debug!(
                key = %key,
                limit = limit,
                in_window = window.len(),
                "Rate limit exceeded"
            );
            return false;
        }

        window.record(now);
        trace!(key = %key, limit = limit, in_window = window.len(), "Attempt allowed");
        true
    }

    /// Evict stale timestamps across all keys and drop emptied windows.
    ///
    /// Returns the number of keys removed.
    pub fn cleanup(&self) -> usize {
        let horizon = self.clock.now_millis() - self.window_millis();
        let before = self.windows.len();

        self.windows.retain(|_, window| {
            window.evict_through(horizon);
            !window.is_empty()
        });

        let removed = before.saturating_sub(self.windows.len());
        if removed > 0 {
            debug!(removed = removed, remaining = self.windows.len(), "Cleaned up rate windows");
        }
        removed
    }

    /// Number of attempts currently counted for `key`, without evicting.
    ///
    /// Returns `None` if no window exists for the key.
    pub fn window_count(&self, key: &str) -> Option<usize> {
        self.windows.get(key).map(|w| w.len())
    }

    /// Number of keys with a live window.
    pub fn key_count(&self) -> usize {
        self.windows.len()
    }

    /// Clear all windows.
    pub fn clear(&self) {
        self.windows.clear();
    }

    /// Length of the rolling window.
    pub fn window(&self) -> Duration {
        self.window
    }

    fn window_millis(&self) -> i64 {
        i64::try_from(self.window.as_millis()).unwrap_or(i64::MAX)
    }
}

impl<C: Clock + 'static> RateLimiter<C> {
    /// Run [`cleanup`](Self::cleanup) every `every` on the tokio runtime.
    ///
    /// The task runs until the returned handle is aborted.
    pub fn spawn_cleanup(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let limiter = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                limiter.cleanup();
            }
        })
    }
}
