//! Wall-clock source for snapshot freshness and cache expiry

use std::fmt::Debug;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Source of the current time
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> SystemTime;

    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> u64 {
        to_epoch_millis(self.now())
    }
}

/// The operating system clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// A clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<SystemTime>,
}

impl ManualClock {
    pub fn new(start: SystemTime) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Start at the given epoch offset in milliseconds
    pub fn at_millis(millis: u64) -> Self {
        Self::new(from_epoch_millis(millis))
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }

    pub fn set(&self, to: SystemTime) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Convert a timestamp to epoch milliseconds, saturating at zero before the epoch
pub fn to_epoch_millis(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

pub fn from_epoch_millis(millis: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_millis(millis)
}

/// Time elapsed between two instants, zero if `later` is actually earlier
pub fn elapsed_between(earlier: SystemTime, later: SystemTime) -> Duration {
    later.duration_since(earlier).unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::at_millis(1_000);
        assert_eq!(clock.now_millis(), 1_000);

        clock.advance(Duration::from_secs(2));
        assert_eq!(clock.now_millis(), 3_000);
    }

    #[test]
    fn test_epoch_millis_round_trip() {
        let time = from_epoch_millis(1_700_000_000_123);
        assert_eq!(to_epoch_millis(time), 1_700_000_000_123);
    }

    #[test]
    fn test_elapsed_between_never_negative() {
        let a = from_epoch_millis(5_000);
        let b = from_epoch_millis(2_000);
        assert_eq!(elapsed_between(a, b), Duration::ZERO);
        assert_eq!(elapsed_between(b, a), Duration::from_secs(3));
    }
}
