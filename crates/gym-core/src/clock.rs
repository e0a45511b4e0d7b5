// ABOUTME: Time source abstraction used to stamp created_at and updated_at on records.
// ABOUTME: SystemClock reads wall time at millisecond precision; ManualClock is settable for tests.

use std::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};

/// A source of "now" for record timestamps.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time, truncated to milliseconds so a timestamp survives a
/// round trip through its stored ISO form unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(3)
    }
}

/// A clock that only changes when told to. Clones share the same time, so a
/// test can keep one handle and give another to the store.
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Rc<Cell<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn at(start: DateTime<Utc>) -> Self {
        Self {
            current: Rc::new(Cell::new(start)),
        }
    }

    pub fn set(&self, ts: DateTime<Utc>) {
        self.current.set(ts);
    }

    /// Move time forward and return the new current time.
    pub fn advance(&self, by: TimeDelta) -> DateTime<Utc> {
        let next = self.current.get() + by;
        self.current.set(next);
        next
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.current.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn system_clock_has_millisecond_precision() {
        let now = SystemClock.now();
        assert_eq!(now.nanosecond() % 1_000_000, 0);
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let clock = ManualClock::at(start);
        let handle = clock.clone();

        assert_eq!(clock.now(), start);
        handle.advance(TimeDelta::minutes(5));
        assert_eq!(clock.now(), start + TimeDelta::minutes(5));

        clock.set(start);
        assert_eq!(handle.now(), start);
    }
}
