//! Explicit timezone context threaded through the pipeline.
//!
//! Day and hour boundaries depend on the zone, including DST transitions,
//! so the zone is chosen once and passed down instead of read from the
//! environment at arbitrary points.

use crate::error::{BootgridError, Result};
use chrono::{
    DateTime, Duration, FixedOffset, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime,
    TimeZone, Utc,
};
use std::fmt;
use std::str::FromStr;

/// Longest DST gap we probe across when a wall-clock time does not exist.
const MAX_GAP_MINUTES: i64 = 180;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Zone {
    #[default]
    Local,
    Utc,
    Fixed(FixedOffset),
}

impl Zone {
    /// Interprets a wall-clock time in this zone.
    ///
    /// Ambiguous times take the earlier instant. Times inside a DST gap
    /// resolve to the first wall-clock minute after the gap.
    pub fn resolve(&self, naive: NaiveDateTime) -> DateTime<Utc> {
        match self {
            Zone::Local => resolve_in(&Local, naive),
            Zone::Utc => Utc.from_utc_datetime(&naive),
            Zone::Fixed(offset) => resolve_in(offset, naive),
        }
    }

    pub fn wall_clock(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        match self {
            Zone::Local => instant.with_timezone(&Local).naive_local(),
            Zone::Utc => instant.naive_utc(),
            Zone::Fixed(offset) => instant.with_timezone(offset).naive_local(),
        }
    }

    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        self.wall_clock(instant).date()
    }

    pub fn midnight(&self, date: NaiveDate) -> DateTime<Utc> {
        self.resolve(date.and_time(NaiveTime::MIN))
    }
}

fn resolve_in<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    let mut probe = naive;
    for _ in 0..=MAX_GAP_MINUTES {
        match tz.from_local_datetime(&probe) {
            LocalResult::Single(t) => return t.with_timezone(&Utc),
            LocalResult::Ambiguous(earliest, _) => return earliest.with_timezone(&Utc),
            LocalResult::None => probe += Duration::minutes(1),
        }
    }
    tracing::warn!(%naive, "wall-clock time could not be resolved; treating it as UTC");
    Utc.from_utc_datetime(&naive)
}

impl FromStr for Zone {
    type Err = BootgridError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "local" => return Ok(Zone::Local),
            "utc" | "z" => return Ok(Zone::Utc),
            _ => {}
        }
        parse_offset(trimmed)
            .map(Zone::Fixed)
            .ok_or_else(|| BootgridError::InvalidZone(s.to_string()))
    }
}

/// Parses `+HH:MM`, `-HH:MM`, `+HHMM` or `+HH`.
fn parse_offset(s: &str) -> Option<FixedOffset> {
    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i32>().ok()?, 0),
        4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
        _ => return None,
    };
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zone::Local => write!(f, "local"),
            Zone::Utc => write!(f, "utc"),
            Zone::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    #[test]
    fn parses_named_zones_and_offsets() {
        assert_eq!("local".parse::<Zone>().unwrap(), Zone::Local);
        assert_eq!("UTC".parse::<Zone>().unwrap(), Zone::Utc);
        assert_eq!(
            "+02:00".parse::<Zone>().unwrap(),
            Zone::Fixed(FixedOffset::east_opt(7200).unwrap())
        );
        assert_eq!(
            "-0530".parse::<Zone>().unwrap(),
            Zone::Fixed(FixedOffset::west_opt(5 * 3600 + 1800).unwrap())
        );
        assert!("Mars/Olympus".parse::<Zone>().is_err());
        assert!("+25:00".parse::<Zone>().is_err());
    }

    #[test]
    fn fixed_offset_shifts_calendar_day() {
        let zone: Zone = "+03:00".parse().unwrap();
        let instant = Utc.with_ymd_and_hms(2023, 1, 1, 22, 0, 0).unwrap();
        assert_eq!(zone.date_of(instant), NaiveDate::from_ymd_opt(2023, 1, 2).unwrap());
        assert_eq!(zone.resolve(naive(2023, 1, 2, 1, 0)), instant);
    }

    #[test]
    fn midnight_in_utc_is_start_of_day() {
        let date = NaiveDate::from_ymd_opt(2023, 3, 4).unwrap();
        assert_eq!(
            Zone::Utc.midnight(date),
            Utc.with_ymd_and_hms(2023, 3, 4, 0, 0, 0).unwrap()
        );
    }
}
