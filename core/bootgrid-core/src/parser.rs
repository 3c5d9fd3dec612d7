//! Session record parsing.
//!
//! Turns the raw text of a session-history tool into [`SessionInterval`]s.
//! Two dialects are understood: the boot records printed by
//! `last -R -F reboot` and a plain `start=... end=...` form. A line that
//! fits neither is skipped; one corrupt record never aborts a run.

use crate::error::LineError;
use crate::patterns::*;
use crate::types::SessionInterval;
use crate::zone::Zone;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which record dialect to accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordFormat {
    /// Try every dialect on every line.
    #[default]
    Auto,
    Last,
    KeyValue,
}

/// Result of parsing a whole document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutcome {
    /// Sessions in input order.
    pub intervals: Vec<SessionInterval>,
    /// Number of non-blank lines that were skipped.
    pub skipped: usize,
}

/// Parses every line of `text`, skipping the ones that are not session records.
pub fn parse_sessions(text: &str, format: RecordFormat, zone: Zone) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();

    for (index, line) in text.lines().enumerate() {
        match parse_line(line, format, zone) {
            Ok(interval) => outcome.intervals.push(interval),
            Err(LineError::Empty) => {}
            Err(reason) => {
                outcome.skipped += 1;
                tracing::debug!(line = index + 1, %reason, "skipping session record");
            }
        }
    }

    tracing::debug!(
        sessions = outcome.intervals.len(),
        skipped = outcome.skipped,
        "parsed session records"
    );
    outcome
}

/// Parses one record line.
pub fn parse_line(
    line: &str,
    format: RecordFormat,
    zone: Zone,
) -> Result<SessionInterval, LineError> {
    if line.trim().is_empty() {
        return Err(LineError::Empty);
    }

    match format {
        RecordFormat::Last => parse_last_line(line, zone),
        RecordFormat::KeyValue => parse_key_value_line(line, zone),
        RecordFormat::Auto => match parse_last_line(line, zone) {
            Err(LineError::Unrecognized) => parse_key_value_line(line, zone),
            other => other,
        },
    }
}

fn parse_last_line(line: &str, zone: Zone) -> Result<SessionInterval, LineError> {
    let caps = RE_LAST_BOOT
        .captures(line.trim_end())
        .ok_or(LineError::Unrecognized)?;
    let start = parse_timestamp(&caps["start"], zone)?;

    let end = RE_LAST_END
        .captures(&caps["rest"])
        .ok_or(LineError::Unrecognized)?;

    if end.name("running").is_some() {
        return Ok(SessionInterval::running(start));
    }
    if end.name("lost").is_some() {
        return Ok(SessionInterval::unknown(start));
    }
    match end.name("end") {
        Some(ts) => Ok(SessionInterval::closed(start, parse_timestamp(ts.as_str(), zone)?)),
        None => Err(LineError::Unrecognized),
    }
}

fn parse_key_value_line(line: &str, zone: Zone) -> Result<SessionInterval, LineError> {
    let caps = RE_KEY_VALUE.captures(line).ok_or(LineError::Unrecognized)?;
    let start = parse_timestamp(&caps["start"], zone)?;

    let end = &caps["end"];
    if end.eq_ignore_ascii_case(MARKER_RUNNING) {
        Ok(SessionInterval::running(start))
    } else if end.eq_ignore_ascii_case(MARKER_UNKNOWN) {
        Ok(SessionInterval::unknown(start))
    } else {
        Ok(SessionInterval::closed(start, parse_timestamp(end, zone)?))
    }
}

/// Wall-clock formats, tried after the offset-carrying ones.
const NAIVE_FORMATS: &[&str] = &[
    "%a %b %d %H:%M:%S %Y",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parses a record timestamp. Times without an offset are read in `zone`.
pub fn parse_timestamp(raw: &str, zone: Zone) -> Result<DateTime<Utc>, LineError> {
    let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ").replace(',', ".");

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Ok(dt.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&normalized, fmt).ok())
        .map(|naive| zone.resolve(naive))
        .ok_or_else(|| LineError::BadTimestamp(raw.trim().to_string()))
}
