//! Time source for the engine.
//!
//! RULE: Nothing in the engine may call `Utc::now()` directly.
//! Every timestamp flows through a `Clock`, so tests and the headless
//! runner can drive SLA deadlines deterministically.

use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock: the system wall clock.
#[derive(Debug, Default)]
pub struct WallClock;

impl Clock for WallClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock for tests and the demo runner.
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward. Never moves backward: SLA processing assumes
    /// monotonic time, so a negative duration is a caller bug.
    pub fn advance(&self, by: Duration) {
        assert!(
            by >= Duration::zero(),
            "FixedClock must not move backwards"
        );
        let mut now = self.now.lock().expect("clock lock poisoned");
        *now += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        let mut now = self.now.lock().expect("clock lock poisoned");
        assert!(to >= *now, "FixedClock must not move backwards");
        *now = to;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock poisoned")
    }
}
