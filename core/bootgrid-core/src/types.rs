//! Shared data types for the bootgrid pipeline.
//!
//! Instants are always `DateTime<Utc>`. Calendar questions (which day, which
//! hour) go through [`crate::zone::Zone`] so no code depends on the process
//! timezone.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

// ═══════════════════════════════════════════════════════════════════════════════
// Session Intervals
// ═══════════════════════════════════════════════════════════════════════════════

/// How a recorded session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Shutdown time is known.
    Closed(DateTime<Utc>),
    /// The session is the current boot; it ends at "now".
    Running,
    /// The end time could not be recovered (crash, clock jump, corrupt record).
    Unknown,
}

/// One contiguous period the machine was powered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionInterval {
    pub start: DateTime<Utc>,
    pub end: SessionEnd,
}

impl SessionInterval {
    /// A session with a known end. An end before the start cannot be a real
    /// duration, so such records are downgraded to [`SessionEnd::Unknown`].
    pub fn closed(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let end = if end < start {
            SessionEnd::Unknown
        } else {
            SessionEnd::Closed(end)
        };
        Self { start, end }
    }

    pub fn running(start: DateTime<Utc>) -> Self {
        Self {
            start,
            end: SessionEnd::Running,
        }
    }

    pub fn unknown(start: DateTime<Utc>) -> Self {
        Self {
            start,
            end: SessionEnd::Unknown,
        }
    }

    /// End instant with `Running` resolved against `now`. `None` for unknown ends.
    pub fn end_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self.end {
            SessionEnd::Closed(end) => Some(end),
            SessionEnd::Running => Some(now.max(self.start)),
            SessionEnd::Unknown => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Coverage
// ═══════════════════════════════════════════════════════════════════════════════

/// Uptime of one bucket.
///
/// `NoData` means the bucket lies outside the observed or requested range,
/// which is different from a bucket where the machine was simply off.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Coverage {
    #[default]
    NoData,
    Ratio(f64),
}

impl Coverage {
    pub fn ratio(&self) -> Option<f64> {
        match self {
            Coverage::NoData => None,
            Coverage::Ratio(r) => Some(*r),
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Coverage::NoData)
    }
}

impl Serialize for Coverage {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.ratio().serialize(serializer)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Color Levels
// ═══════════════════════════════════════════════════════════════════════════════

/// Index into an ordered palette. Level 0 is reserved for "no data";
/// data levels start at 1 and grow with coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ColorLevel(pub usize);

impl ColorLevel {
    pub const NO_DATA: ColorLevel = ColorLevel(0);

    pub fn is_no_data(&self) -> bool {
        *self == Self::NO_DATA
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, 1, h, m, 0).unwrap()
    }

    #[test]
    fn closed_with_end_before_start_becomes_unknown() {
        let session = SessionInterval::closed(at(5, 0), at(4, 0));
        assert_eq!(session.end, SessionEnd::Unknown);
    }

    #[test]
    fn zero_duration_session_is_kept_closed() {
        let session = SessionInterval::closed(at(5, 0), at(5, 0));
        assert_eq!(session.end, SessionEnd::Closed(at(5, 0)));
    }

    #[test]
    fn running_session_ends_at_now() {
        let session = SessionInterval::running(at(1, 0));
        assert_eq!(session.end_at(at(2, 30)), Some(at(2, 30)));
        assert_eq!(SessionInterval::unknown(at(1, 0)).end_at(at(2, 30)), None);
    }

    #[test]
    fn coverage_serializes_no_data_as_null() {
        let json = serde_json::to_string(&vec![Coverage::NoData, Coverage::Ratio(0.5)]).unwrap();
        assert_eq!(json, "[null,0.5]");
    }
}
