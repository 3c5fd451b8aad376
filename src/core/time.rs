//! Clock abstraction for testable time-dependent logic
//!
//! Scan records and decode events carry wall-clock timestamps in milliseconds
//! since the Unix epoch. Components take an `Arc<dyn Clock>` so tests and
//! replays can drive time explicitly.

use std::sync::atomic::{AtomicI64, Ordering};

/// Abstraction over wall-clock time
pub trait Clock: Send + Sync {
    /// Current time in milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;
}

/// Production clock backed by the system time
#[derive(Default, Clone, Debug)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Manually driven clock for deterministic tests and event replay
#[derive(Debug, Default)]
pub struct ManualClock {
    current: AtomicI64,
}

impl ManualClock {
    /// Create a clock frozen at `start_millis`
    pub fn new(start_millis: i64) -> Self {
        Self {
            current: AtomicI64::new(start_millis),
        }
    }

    /// Advance the clock by `millis`
    pub fn advance(&self, millis: i64) {
        self.current.fetch_add(millis, Ordering::AcqRel);
    }

    /// Set the clock to an absolute value
    pub fn set(&self, millis: i64) {
        self.current.store(millis, Ordering::Release);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.current.load(Ordering::Acquire)
    }
}

/// Format a millisecond timestamp as local date and time for display
pub fn format_millis(millis: i64) -> String {
    use chrono::{Local, TimeZone};

    match Local.timestamp_millis_opt(millis).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => millis.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_system_clock() {
        let clock = SystemClock;

        let first = clock.now_millis();
        std::thread::sleep(Duration::from_millis(2));
        let second = clock.now_millis();

        assert!(first > 1_600_000_000_000, "expected a post-2020 timestamp");
        assert!(second >= first);
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(1_000);
        assert_eq!(clock.now_millis(), 1_000);

        clock.advance(2_500);
        assert_eq!(clock.now_millis(), 3_500);

        clock.set(42);
        assert_eq!(clock.now_millis(), 42);
    }

    #[test]
    fn test_format_millis_produces_date() {
        let formatted = format_millis(1_700_000_000_000);
        assert_eq!(formatted.len(), "2023-11-14 22:13:20".len());
        assert!(formatted.starts_with("2023-11-1"));
    }
}
