//! Validity windows carried on device payloads.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Interval during which a payload is considered current.
///
/// Stale data is never hidden from consumers. It is flagged by the
/// window having passed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeStamp {
    start: DateTime<Utc>,
    expiration: DateTime<Utc>,
}

impl TimeStamp {
    /// Window opening at `start` and lasting `validity`.
    ///
    /// A negative `validity` yields a window that is valid only at `start`.
    /// A window reaching past the representable range ends at its limit.
    pub fn new(start: DateTime<Utc>, validity: Duration) -> Self {
        let expiration = if validity < Duration::zero() {
            start
        } else {
            start
                .checked_add_signed(validity)
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
        };
        Self { start, expiration }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn expiration(&self) -> DateTime<Utc> {
        self.expiration
    }

    /// Whether `time` falls inside the window, both ends included.
    pub fn is_valid_at(&self, time: DateTime<Utc>) -> bool {
        self.start <= time && time <= self.expiration
    }
}

/// A payload together with its validity window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stamped<P> {
    pub value: P,
    pub stamp: TimeStamp,
}

impl<P> Stamped<P> {
    pub fn new(value: P, stamp: TimeStamp) -> Self {
        Self { value, stamp }
    }

    pub fn is_valid_at(&self, time: DateTime<Utc>) -> bool {
        self.stamp.is_valid_at(time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    #[test]
    fn window_includes_both_ends() {
        let stamp = TimeStamp::new(at(1_000), Duration::milliseconds(100));

        assert!(!stamp.is_valid_at(at(999)));
        assert!(stamp.is_valid_at(at(1_000)));
        assert!(stamp.is_valid_at(at(1_100)));
        assert!(!stamp.is_valid_at(at(1_101)));
    }

    #[test]
    fn negative_validity_collapses_window() {
        let stamp = TimeStamp::new(at(500), Duration::milliseconds(-10));
        assert_eq!(stamp.expiration(), stamp.start());
        assert!(stamp.is_valid_at(at(500)));
    }

    #[test]
    fn huge_validity_saturates() {
        let validity = Duration::milliseconds(i64::MAX);
        let stamp = TimeStamp::new(at(1_000), validity);

        assert_eq!(stamp.expiration(), DateTime::<Utc>::MAX_UTC);
        assert!(stamp.is_valid_at(at(1_000)));
        assert!(!stamp.is_valid_at(at(999)));
    }

    #[test]
    fn stamped_delegates_to_window() {
        let stamped = Stamped::new([1.0, 2.0, 3.0], TimeStamp::new(at(0), Duration::seconds(1)));
        assert!(stamped.is_valid_at(at(10)));
        assert!(!stamped.is_valid_at(at(2_000)));
    }
}
