//! Uptime bucketing.
//!
//! Measures, for each time slot, how much of it was covered by at least one
//! session. Sessions are resolved to spans, sorted and merged once, then swept
//! against the slots in a single pass, so duplicated or overlapping records
//! never count twice.
//!
//! ## Unknown ends
//!
//! A session whose end was lost (crash, clock jump) is handled by an explicit
//! [`UnknownEndPolicy`]. The default, [`UnknownEndPolicy::FillStartBucket`],
//! marks the whole slot the session started in as covered: the boot record
//! proves the machine was on in that slot, and nothing proves for how long.

use crate::error::{BootgridError, Result};
use crate::range::TimeRange;
use crate::types::{SessionEnd, SessionInterval};
use chrono::{DateTime, Duration, Utc};

pub const MINUTES_PER_DAY: u32 = 24 * 60;

// ═══════════════════════════════════════════════════════════════════════════════
// Slots
// ═══════════════════════════════════════════════════════════════════════════════

/// Bucket granularity in minutes. Always tiles a calendar day exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketWidth(u32);

impl BucketWidth {
    pub fn new(minutes: u32) -> Result<Self> {
        if minutes == 0 || MINUTES_PER_DAY % minutes != 0 {
            return Err(BootgridError::InvalidBucketWidth { minutes });
        }
        Ok(Self(minutes))
    }

    pub fn minutes(&self) -> u32 {
        self.0
    }

    pub fn duration(&self) -> Duration {
        Duration::minutes(i64::from(self.0))
    }

    /// Number of buckets in one calendar day.
    pub fn per_day(&self) -> usize {
        (MINUTES_PER_DAY / self.0) as usize
    }
}

impl Default for BucketWidth {
    fn default() -> Self {
        Self(60)
    }
}

/// Half-open slice of time `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeSlot {
    pub fn length(&self) -> Duration {
        self.end - self.start
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Consecutive fixed-width slots starting at `range.from` until `range.to`
    /// is reached. The last slot may extend past `range.to`.
    pub fn series(range: &TimeRange, width: BucketWidth) -> Vec<TimeSlot> {
        let step = width.duration();
        let mut slots = Vec::new();
        let mut start = range.from;
        while start < range.to {
            slots.push(TimeSlot {
                start,
                end: start + step,
            });
            start += step;
        }
        slots
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Unknown-end Policy
// ═══════════════════════════════════════════════════════════════════════════════

/// How a session without a recoverable end contributes to coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownEndPolicy {
    /// Cover the entire slot the session started in.
    #[default]
    FillStartBucket,
    /// Contribute nothing.
    Ignore,
    /// Assume the session ran for a fixed number of minutes.
    Assume { minutes: u32 },
}

// ═══════════════════════════════════════════════════════════════════════════════
// Spans
// ═══════════════════════════════════════════════════════════════════════════════

/// A resolved period of uptime `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Turns sessions into concrete spans.
///
/// Running sessions end at `now`, no span reaches past `now`, and sessions
/// starting after `now` are dropped. Zero-length spans are dropped since they
/// cover nothing. `slots` must be sorted; it is only consulted for the
/// fill-start-bucket policy.
pub fn resolve_spans(
    intervals: &[SessionInterval],
    slots: &[TimeSlot],
    now: DateTime<Utc>,
    policy: UnknownEndPolicy,
) -> Vec<Span> {
    let mut spans = Vec::with_capacity(intervals.len());

    for session in intervals {
        if session.start > now {
            tracing::debug!(start = %session.start, %now, "session starts in the future; ignoring");
            continue;
        }

        let span = match session.end {
            SessionEnd::Closed(_) | SessionEnd::Running => Span {
                start: session.start,
                end: session.end_at(now).unwrap_or(now).min(now),
            },
            SessionEnd::Unknown => match policy {
                UnknownEndPolicy::Ignore => continue,
                UnknownEndPolicy::Assume { minutes } => Span {
                    start: session.start,
                    end: (session.start + Duration::minutes(i64::from(minutes))).min(now),
                },
                UnknownEndPolicy::FillStartBucket => match slot_containing(slots, session.start) {
                    Some(slot) => Span {
                        start: slot.start,
                        end: slot.end.min(now),
                    },
                    None => continue,
                },
            },
        };

        if span.end > span.start {
            spans.push(span);
        }
    }

    spans
}

fn slot_containing(slots: &[TimeSlot], instant: DateTime<Utc>) -> Option<&TimeSlot> {
    let index = slots.partition_point(|slot| slot.end <= instant);
    slots.get(index).filter(|slot| slot.contains(instant))
}

/// Sorts spans and unions every overlapping or touching pair.
pub fn merge_spans(mut spans: Vec<Span>) -> Vec<Span> {
    spans.sort_by_key(|span| span.start);

    let mut merged: Vec<Span> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(last) if span.start <= last.end => last.end = last.end.max(span.end),
            _ => merged.push(span),
        }
    }
    merged
}

// ═══════════════════════════════════════════════════════════════════════════════
// Coverage
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotCoverage {
    /// Length of the slot covered by the union of all sessions.
    pub covered: Duration,
    /// `covered / slot length`, within [0, 1]. Zero-length slots report 0.
    pub fraction: f64,
}

/// Computes coverage for every slot. `slots` must be sorted and must not overlap.
pub fn compute_coverage(
    intervals: &[SessionInterval],
    slots: &[TimeSlot],
    now: DateTime<Utc>,
    policy: UnknownEndPolicy,
) -> Vec<SlotCoverage> {
    debug_assert!(slots.windows(2).all(|pair| pair[0].end <= pair[1].start));

    let merged = merge_spans(resolve_spans(intervals, slots, now, policy));
    let mut first = 0;

    slots
        .iter()
        .map(|slot| {
            while first < merged.len() && merged[first].end <= slot.start {
                first += 1;
            }

            let mut covered = Duration::zero();
            for span in &merged[first..] {
                if span.start >= slot.end {
                    break;
                }
                covered += span.end.min(slot.end) - span.start.max(slot.start);
            }

            let length = slot.length().num_milliseconds();
            let fraction = if length > 0 {
                (covered.num_milliseconds() as f64 / length as f64).clamp(0.0, 1.0)
            } else {
                0.0
            };
            SlotCoverage { covered, fraction }
        })
        .collect()
}

/// One linear bucket of a [`TimeRange`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bucket {
    pub index: usize,
    pub slot: TimeSlot,
    pub coverage: f64,
}

/// Buckets a range into fixed-width slots without any calendar layout.
pub fn bucket_range(
    intervals: &[SessionInterval],
    range: &TimeRange,
    width: BucketWidth,
    now: DateTime<Utc>,
    policy: UnknownEndPolicy,
) -> Vec<Bucket> {
    let slots = TimeSlot::series(range, width);
    let coverage = compute_coverage(intervals, &slots, now, policy);

    slots
        .into_iter()
        .zip(coverage)
        .enumerate()
        .map(|(index, (slot, coverage))| Bucket {
            index,
            slot,
            coverage: coverage.fraction,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, 1, h, m, 0).unwrap()
    }

    fn hour_slots(hours: u32) -> Vec<TimeSlot> {
        let range = TimeRange::new(at(0, 0), at(hours, 0)).unwrap();
        TimeSlot::series(&range, BucketWidth::default())
    }

    fn fractions(intervals: &[SessionInterval], now: DateTime<Utc>) -> Vec<f64> {
        compute_coverage(intervals, &hour_slots(3), now, UnknownEndPolicy::default())
            .iter()
            .map(|c| c.fraction)
            .collect()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn bucket_width_must_divide_a_day() {
        assert!(BucketWidth::new(30).is_ok());
        assert_eq!(BucketWidth::new(90).unwrap().per_day(), 16);
        assert!(matches!(
            BucketWidth::new(7),
            Err(BootgridError::InvalidBucketWidth { minutes: 7 })
        ));
        assert!(BucketWidth::new(0).is_err());
    }

    #[test]
    fn disjoint_sessions_in_one_bucket_sum() {
        let sessions = [
            SessionInterval::closed(at(0, 0), at(0, 10)),
            SessionInterval::closed(at(0, 20), at(0, 35)),
        ];
        let got = fractions(&sessions, at(5, 0));
        assert!(approx(got[0], 25.0 / 60.0));
        assert!(approx(got[1], 0.0));
    }

    #[test]
    fn overlapping_sessions_are_not_double_counted() {
        let sessions = [
            SessionInterval::closed(at(0, 0), at(0, 30)),
            SessionInterval::closed(at(0, 10), at(0, 40)),
        ];
        let got = fractions(&sessions, at(5, 0));
        assert!(approx(got[0], 40.0 / 60.0));
    }

    #[test]
    fn duplicated_full_sessions_cap_at_one() {
        let session = SessionInterval::closed(at(0, 0), at(2, 0));
        let got = fractions(&[session, session, session], at(5, 0));
        assert!(approx(got[0], 1.0));
        assert!(approx(got[1], 1.0));
        assert!(approx(got[2], 0.0));
    }

    #[test]
    fn session_spanning_buckets_is_split() {
        let got = fractions(&[SessionInterval::closed(at(0, 45), at(2, 15))], at(5, 0));
        assert!(approx(got[0], 0.25));
        assert!(approx(got[1], 1.0));
        assert!(approx(got[2], 0.25));
    }

    #[test]
    fn running_session_stops_at_now() {
        let got = fractions(&[SessionInterval::running(at(0, 30))], at(1, 15));
        assert!(approx(got[0], 0.5));
        assert!(approx(got[1], 0.25));
        assert!(approx(got[2], 0.0));
    }

    #[test]
    fn closed_session_past_now_is_clamped() {
        let got = fractions(&[SessionInterval::closed(at(0, 0), at(2, 30))], at(1, 30));
        assert!(approx(got[1], 0.5));
        assert!(approx(got[2], 0.0));
    }

    #[test]
    fn future_sessions_are_dropped() {
        let got = fractions(&[SessionInterval::running(at(2, 0))], at(1, 0));
        assert!(got.iter().all(|f| *f == 0.0));
    }

    #[test]
    fn zero_length_session_covers_nothing() {
        let got = fractions(&[SessionInterval::closed(at(0, 30), at(0, 30))], at(5, 0));
        assert!(approx(got[0], 0.0));
    }

    #[test]
    fn unknown_end_fills_start_bucket_by_default() {
        let got = fractions(&[SessionInterval::unknown(at(1, 50))], at(5, 0));
        assert!(approx(got[0], 0.0));
        assert!(approx(got[1], 1.0));
        assert!(approx(got[2], 0.0));
    }

    #[test]
    fn unknown_end_policies() {
        let sessions = [SessionInterval::unknown(at(0, 30))];
        let slots = hour_slots(3);

        let ignored = compute_coverage(&sessions, &slots, at(5, 0), UnknownEndPolicy::Ignore);
        assert!(ignored.iter().all(|c| c.fraction == 0.0));

        let assumed = compute_coverage(
            &sessions,
            &slots,
            at(5, 0),
            UnknownEndPolicy::Assume { minutes: 60 },
        );
        assert!(approx(assumed[0].fraction, 0.5));
        assert!(approx(assumed[1].fraction, 0.5));
    }

    #[test]
    fn unknown_end_in_current_bucket_stops_at_now() {
        let got = fractions(&[SessionInterval::unknown(at(1, 10))], at(1, 30));
        assert!(approx(got[1], 0.5));
    }

    #[test]
    fn covered_duration_is_reported() {
        let coverage = compute_coverage(
            &[SessionInterval::closed(at(0, 0), at(0, 45))],
            &hour_slots(1),
            at(5, 0),
            UnknownEndPolicy::default(),
        );
        assert_eq!(coverage[0].covered, Duration::minutes(45));
    }

    #[test]
    fn merge_unions_touching_spans() {
        let merged = merge_spans(vec![
            Span { start: at(1, 0), end: at(2, 0) },
            Span { start: at(0, 0), end: at(1, 0) },
            Span { start: at(3, 0), end: at(4, 0) },
        ]);
        assert_eq!(
            merged,
            vec![
                Span { start: at(0, 0), end: at(2, 0) },
                Span { start: at(3, 0), end: at(4, 0) },
            ]
        );
    }

    #[test]
    fn bucket_range_indexes_linear_buckets() {
        let range = TimeRange::new(at(0, 0), at(2, 0)).unwrap();
        let buckets = bucket_range(
            &[SessionInterval::closed(at(0, 0), at(1, 30))],
            &range,
            BucketWidth::new(30).unwrap(),
            at(5, 0),
            UnknownEndPolicy::default(),
        );
        assert_eq!(buckets.len(), 4);
        assert_eq!(buckets[3].index, 3);
        assert_eq!(buckets[3].slot.start, at(1, 30));
        assert!(approx(buckets[2].coverage, 1.0));
        assert!(approx(buckets[3].coverage, 0.0));
    }
}
