//! Timestamp value object for immutable points in time.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from a DateTime<Utc>.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Checks if this timestamp is before another.
    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }

    /// Checks if this timestamp is after another.
    pub fn is_after(&self, other: &Timestamp) -> bool {
        self.0 > other.0
    }

    /// Creates a new timestamp by adding the specified number of days.
    ///
    /// Negative values subtract days.
    pub fn add_days(&self, days: i64) -> Self {
        Self(self.0 + Duration::days(days))
    }

    /// Returns the whole days from this timestamp until another.
    pub fn days_until(&self, other: &Timestamp) -> i64 {
        other.0.signed_duration_since(self.0).num_days()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_creates_current_time() {
        let before = Utc::now();
        let ts = Timestamp::now();
        let after = Utc::now();

        assert!(ts.as_datetime() >= &before);
        assert!(ts.as_datetime() <= &after);
    }

    #[test]
    fn ordering_follows_time() {
        let earlier = Timestamp::now();
        let later = earlier.add_days(1);

        assert!(earlier.is_before(&later));
        assert!(later.is_after(&earlier));
        assert!(earlier < later);
    }

    #[test]
    fn add_days_handles_negative_values() {
        let ts = Timestamp::now();
        let yesterday = ts.add_days(-1);
        assert!(yesterday.is_before(&ts));
    }

    #[test]
    fn days_until_counts_whole_days() {
        let ts = Timestamp::now();
        assert_eq!(ts.days_until(&ts.add_days(7)), 7);
        assert_eq!(ts.days_until(&ts.add_days(-3)), -3);
    }

    #[test]
    fn serializes_transparently() {
        let ts = Timestamp::now();
        let json = serde_json::to_string(&ts).unwrap();
        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(ts, back);
    }
}
