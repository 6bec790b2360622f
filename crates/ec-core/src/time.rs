//! Sources of real "now".
//!
//! The core never reads the system clock on its own; callers pass instants
//! in explicitly. [`WallClock`] is where the driving loop gets them.

use std::sync::Mutex;

use chrono::{DateTime, FixedOffset, TimeDelta, Utc};

pub trait WallClock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;

    /// Current instant expressed in `offset`.
    fn now_in(&self, offset: FixedOffset) -> DateTime<FixedOffset> {
        self.now_utc().with_timezone(&offset)
    }
}

/// The operating system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        *self.lock() = instant;
    }

    pub fn advance(&self, by: TimeDelta) {
        *self.lock() += by;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        // A poisoned guard still holds a valid instant.
        self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl WallClock for ManualClock {
    fn now_utc(&self) -> DateTime<Utc> {
        *self.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_manual_clock_advances() {
        let start = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        clock.advance(TimeDelta::seconds(90));
        assert_eq!(clock.now_utc(), start + TimeDelta::seconds(90));
    }

    #[test]
    fn test_now_in_offset() {
        let start = Utc.with_ymd_and_hms(2024, 3, 20, 23, 30, 0).unwrap();
        let clock = ManualClock::new(start);
        let local = clock.now_in(FixedOffset::east_opt(3600).unwrap());
        assert_eq!(local.to_rfc3339(), "2024-03-21T00:30:00+01:00");
    }

    #[test]
    fn test_system_clock_is_recent() {
        let ts = SystemClock.now_utc().to_rfc3339();
        assert!(ts.starts_with("20"), "timestamp should be in 2000s: {ts}");
    }
}
