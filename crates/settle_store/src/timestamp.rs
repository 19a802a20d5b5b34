//! Snapshot version marker.

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A snapshot's last-modified marker, in milliseconds since the Unix
/// epoch.
///
/// The marker is the sync protocol's version token: it changes only
/// when a writer replaces the snapshot content. Comparisons are exact;
/// millisecond resolution is the common denominator across backends
/// (file mtimes are truncated on conversion).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Creates a timestamp from milliseconds since the Unix epoch.
    #[must_use]
    pub fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Milliseconds since the Unix epoch.
    #[must_use]
    pub fn as_millis(self) -> u64 {
        self.0
    }

    /// The current wall-clock time.
    #[must_use]
    pub fn now() -> Self {
        SystemTime::now().into()
    }
}

impl From<SystemTime> for Timestamp {
    fn from(time: SystemTime) -> Self {
        let millis = time
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self(millis)
    }
}

impl From<Timestamp> for SystemTime {
    fn from(ts: Timestamp) -> Self {
        UNIX_EPOCH + Duration::from_millis(ts.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millis_roundtrip() {
        let ts = Timestamp::from_millis(1_500_000_000_123);
        assert_eq!(ts.as_millis(), 1_500_000_000_123);
    }

    #[test]
    fn system_time_roundtrip_truncates_to_millis() {
        let time = UNIX_EPOCH + Duration::new(1_500, 123_456_789);
        let ts: Timestamp = time.into();
        assert_eq!(ts.as_millis(), 1_500_123);

        let back: SystemTime = ts.into();
        assert_eq!(back, UNIX_EPOCH + Duration::from_millis(1_500_123));
    }

    #[test]
    fn pre_epoch_times_clamp_to_zero() {
        let time = UNIX_EPOCH - Duration::from_secs(10);
        let ts: Timestamp = time.into();
        assert_eq!(ts.as_millis(), 0);
    }

    #[test]
    fn ordering_follows_millis() {
        assert!(Timestamp::from_millis(1) < Timestamp::from_millis(2));
    }
}
