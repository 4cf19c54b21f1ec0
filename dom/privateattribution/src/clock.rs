use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::{SystemTime, UNIX_EPOCH},
};

// all timestamps are in milliseconds, to correspond with
// JS's Date.now()

pub const DAY_IN_MILLI: u64 = 1000 * 60 * 60 * 24;

/// Source of the current time, in milliseconds since the Unix epoch.
pub trait Clock {
    fn now(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> u64 {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> u64 {
        (**self).now()
    }
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        timestamp_now()
    }
}

pub fn timestamp_now() -> u64 {
    // A clock set before 1970 reads as the epoch itself.
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Length of a lookback window of `days` days, in milliseconds.
pub fn days_to_millis(days: u32) -> u64 {
    u64::from(days) * DAY_IN_MILLI
}

/// Manually driven clock for deterministic tests. Starts at the wall clock
/// time and only moves when told to.
#[derive(Debug)]
pub struct MockClock {
    now: AtomicU64,
}

impl MockClock {
    pub fn new() -> Self {
        Self::starting_at(timestamp_now())
    }

    pub fn starting_at(now: u64) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    /// Fast-forwards the clock by `interval_ms`.
    pub fn add(&self, interval_ms: u64) {
        self.now.fetch_add(interval_ms, Ordering::SeqCst);
    }

    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_clock_only_moves_forward_on_add() {
        let clock = MockClock::starting_at(1_000);
        assert_eq!(clock.now(), 1_000);
        assert_eq!(clock.now(), 1_000);

        clock.add(DAY_IN_MILLI + 1);
        assert_eq!(clock.now(), 1_000 + DAY_IN_MILLI + 1);

        let shared = Arc::new(clock);
        shared.set(42);
        assert_eq!(Clock::now(&shared), 42);
    }

    #[test]
    fn test_days_to_millis() {
        assert_eq!(days_to_millis(0), 0);
        assert_eq!(days_to_millis(1), 86_400_000);
        assert_eq!(days_to_millis(30), 30 * 86_400_000);
    }

    #[test]
    fn test_system_clock_is_after_2020() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.now() > 1_577_836_800_000);
    }
}
