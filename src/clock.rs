//! Time source used by the rate limiter, the notification presenter and
//! record timestamps.
//!
//! Production code uses [`SystemClock`]. Tests drive time explicitly with
//! `MockClock`, available in test builds or with the `test-helpers` feature.

use chrono::{DateTime, Utc};

/// Source of wall-clock time.
pub trait Clock: Send + Sync {
    /// Current time in UTC.
    fn now(&self) -> DateTime<Utc>;

    /// Current time as milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// System clock backed by `Utc::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Create a new system clock.
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(any(test, feature = "test-helpers"))]
pub use mock::MockClock;

#[cfg(any(test, feature = "test-helpers"))]
mod mock {
    use super::Clock;
    use chrono::{DateTime, Utc};
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Duration;

    /// Controllable clock for deterministic tests.
    ///
    /// Clones share the same underlying time, so advancing one clone
    /// advances every component holding another.
    #[derive(Debug, Clone)]
    pub struct MockClock {
        current: Arc<Mutex<DateTime<Utc>>>,
    }

    impl MockClock {
        /// Create a mock clock starting at a specific time.
        pub fn new(start: DateTime<Utc>) -> Self {
            Self {
                current: Arc::new(Mutex::new(start)),
            }
        }

        /// Create a mock clock starting at the Unix epoch plus `millis`.
        pub fn at_millis(millis: i64) -> Self {
            Self::new(DateTime::from_timestamp_millis(millis).unwrap_or_default())
        }

        /// Advance the clock by a duration.
        pub fn advance(&self, duration: Duration) {
            let mut current = self.current.lock();
            *current += chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::zero());
        }

        /// Set the clock to a specific time.
        pub fn set(&self, time: DateTime<Utc>) {
            *self.current.lock() = time;
        }
    }

    impl Clock for MockClock {
        fn now(&self) -> DateTime<Utc> {
            *self.current.lock()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = SystemClock::new();
        let t1 = clock.now_millis();
        std::thread::sleep(Duration::from_millis(5));
        let t2 = clock.now_millis();

        assert!(t2 >= t1);
    }

    #[test]
    fn test_mock_clock_advance_and_set() {
        let clock = MockClock::at_millis(1_000);
        assert_eq!(clock.now_millis(), 1_000);

        clock.advance(Duration::from_secs(60));
        assert_eq!(clock.now_millis(), 61_000);

        let shared = clock.clone();
        shared.advance(Duration::from_millis(500));
        assert_eq!(clock.now_millis(), 61_500);

        clock.set(DateTime::from_timestamp_millis(5).unwrap());
        assert_eq!(shared.now_millis(), 5);
    }
}
