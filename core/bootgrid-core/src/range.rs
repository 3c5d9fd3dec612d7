//! Time ranges and requested display windows.

use crate::error::{BootgridError, Result};
use crate::types::SessionInterval;
use crate::zone::Zone;
use chrono::{DateTime, Days, NaiveDate, Utc};

/// Half-open span `[from, to)` of absolute time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Self> {
        if from > to {
            return Err(BootgridError::InvalidRange { from, to });
        }
        Ok(Self { from, to })
    }

    /// The range the session log actually speaks for: from the earliest
    /// session start up to `now`. Sessions that start after `now` (clock
    /// resets) do not widen it.
    pub fn observed(intervals: &[SessionInterval], now: DateTime<Utc>) -> Option<Self> {
        intervals
            .iter()
            .map(|session| session.start)
            .filter(|start| *start <= now)
            .min()
            .map(|from| Self { from, to: now })
    }

    pub fn intersect(&self, other: &TimeRange) -> Option<TimeRange> {
        let from = self.from.max(other.from);
        let to = self.to.min(other.to);
        (from < to).then_some(TimeRange { from, to })
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.from <= instant && instant < self.to
    }

    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }

    /// Last calendar day touched by the range. `to` is exclusive, so a range
    /// ending exactly at midnight does not reach the next day.
    pub fn last_day(&self, zone: Zone) -> NaiveDate {
        if self.to > self.from {
            zone.date_of(self.to - chrono::Duration::milliseconds(1))
        } else {
            zone.date_of(self.to)
        }
    }
}

/// Which calendar days the caller wants to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Window {
    /// Everything the session log covers.
    #[default]
    All,
    /// Today and the `n - 1` days before it.
    LastDays(u32),
    /// Whole days `from..=to`.
    Between { from: NaiveDate, to: NaiveDate },
}

/// Longest window that may be requested, about a century of days.
pub const MAX_WINDOW_DAYS: u32 = 36_525;

impl Window {
    /// Rejects windows that are empty, inverted or absurdly long.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Window::All => Ok(()),
            Window::LastDays(0) => Err(BootgridError::InvalidSetting {
                name: "days".to_string(),
                details: "must be at least 1".to_string(),
            }),
            Window::LastDays(days) if days > MAX_WINDOW_DAYS => Err(BootgridError::InvalidSetting {
                name: "days".to_string(),
                details: format!("must be at most {MAX_WINDOW_DAYS}"),
            }),
            Window::LastDays(_) => Ok(()),
            Window::Between { from, to } if from > to => Err(BootgridError::InvalidSetting {
                name: "from/to".to_string(),
                details: format!("{from} is after {to}"),
            }),
            Window::Between { from, to }
                if to.signed_duration_since(from).num_days() >= i64::from(MAX_WINDOW_DAYS) =>
            {
                Err(BootgridError::InvalidSetting {
                    name: "from/to".to_string(),
                    details: format!("spans more than {MAX_WINDOW_DAYS} days"),
                })
            }
            Window::Between { .. } => Ok(()),
        }
    }

    /// Resolves the window into absolute time. `None` means "no restriction".
    pub fn resolve(&self, now: DateTime<Utc>, zone: Zone) -> Result<Option<TimeRange>> {
        self.validate()?;
        match *self {
            Window::All => Ok(None),
            Window::LastDays(days) => {
                let today = zone.date_of(now);
                let first = today
                    .checked_sub_days(Days::new(u64::from(days.saturating_sub(1))))
                    .unwrap_or(NaiveDate::MIN);
                let end = next_midnight(today, zone);
                TimeRange::new(zone.midnight(first), end).map(Some)
            }
            Window::Between { from, to } => {
                TimeRange::new(zone.midnight(from), next_midnight(to, zone)).map(Some)
            }
        }
    }
}

fn next_midnight(date: NaiveDate, zone: Zone) -> DateTime<Utc> {
    match date.succ_opt() {
        Some(next) => zone.midnight(next),
        None => zone.midnight(date),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, d, h, 0, 0).unwrap()
    }

    #[test]
    fn rejects_inverted_range() {
        assert!(matches!(
            TimeRange::new(at(2, 0), at(1, 0)),
            Err(BootgridError::InvalidRange { .. })
        ));
        assert!(TimeRange::new(at(1, 0), at(1, 0)).unwrap().is_empty());
    }

    #[test]
    fn observed_ignores_sessions_after_now() {
        let sessions = [
            SessionInterval::running(at(5, 0)),
            SessionInterval::unknown(at(2, 3)),
        ];
        let observed = TimeRange::observed(&sessions, at(4, 0)).unwrap();
        assert_eq!(observed.from, at(2, 3));
        assert_eq!(observed.to, at(4, 0));

        assert!(TimeRange::observed(&sessions[..1], at(4, 0)).is_none());
        assert!(TimeRange::observed(&[], at(4, 0)).is_none());
    }

    #[test]
    fn last_days_covers_whole_days_up_to_today() {
        let range = Window::LastDays(2)
            .resolve(at(3, 15), Zone::Utc)
            .unwrap()
            .unwrap();
        assert_eq!(range.from, at(2, 0));
        assert_eq!(range.to, at(4, 0));
        assert_eq!(range.last_day(Zone::Utc), NaiveDate::from_ymd_opt(2023, 1, 3).unwrap());
    }

    #[test]
    fn between_is_inclusive_of_last_day() {
        let from = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let range = Window::Between { from, to }
            .resolve(at(20, 0), Zone::Utc)
            .unwrap()
            .unwrap();
        assert_eq!(range.from, at(1, 0));
        assert_eq!(range.to, at(3, 0));
        assert!(Window::Between { from: to, to: from }
            .resolve(at(20, 0), Zone::Utc)
            .is_err());
    }

    #[test]
    fn zero_days_is_rejected() {
        assert!(Window::LastDays(0).resolve(at(3, 0), Zone::Utc).is_err());
        assert_eq!(Window::All.resolve(at(3, 0), Zone::Utc).unwrap(), None);
    }

    #[test]
    fn overlong_windows_are_rejected() {
        assert!(Window::LastDays(MAX_WINDOW_DAYS).resolve(at(3, 0), Zone::Utc).is_ok());
        assert!(matches!(
            Window::LastDays(4_000_000_000).resolve(at(3, 0), Zone::Utc),
            Err(BootgridError::InvalidSetting { .. })
        ));

        let to = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let from = NaiveDate::from_ymd_opt(1000, 1, 1).unwrap();
        assert!(matches!(
            Window::Between { from, to }.validate(),
            Err(BootgridError::InvalidSetting { .. })
        ));
    }

    #[test]
    fn intersection_of_disjoint_ranges_is_none() {
        let a = TimeRange::new(at(1, 0), at(2, 0)).unwrap();
        let b = TimeRange::new(at(3, 0), at(4, 0)).unwrap();
        assert!(a.intersect(&b).is_none());
        let c = TimeRange::new(at(1, 12), at(5, 0)).unwrap();
        assert_eq!(a.intersect(&c), Some(TimeRange::new(at(1, 12), at(2, 0)).unwrap()));
        assert!(c.contains(at(1, 12)));
        assert!(!c.contains(at(5, 0)));
    }
}
