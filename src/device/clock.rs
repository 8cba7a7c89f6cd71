//! Time sources for validity windows.

use chrono::{DateTime, Duration, Utc};
use std::sync::{Mutex, PoisonError};

/// Source of "now" for stamping device payloads.
///
/// Shared between the communication thread and the owner, hence the
/// `Send + Sync` bound.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to. Useful for testing expiry.
///
/// # Example
///
/// ```rust
/// use statebridge::device::{Clock, ManualClock};
/// use chrono::{Duration, TimeZone, Utc};
///
/// let start = Utc.timestamp_opt(1_000, 0).unwrap();
/// let clock = ManualClock::new(start);
/// clock.advance(Duration::milliseconds(250));
/// assert_eq!(clock.now(), start + Duration::milliseconds(250));
/// ```
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

    /// Move the clock forward. Negative steps are ignored.
    pub fn advance(&self, step: Duration) {
        if step < Duration::zero() {
            return;
        }
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += step;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_ignores_backward_steps() {
        let clock = ManualClock::default();
        let before = clock.now();
        clock.advance(Duration::seconds(-5));
        assert_eq!(clock.now(), before);
    }

    #[test]
    fn system_clock_moves_forward() {
        let clock = SystemClock;
        let first = clock.now();
        assert!(clock.now() >= first);
    }
}
