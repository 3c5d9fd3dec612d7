//! Calendar grid of uptime coverage.
//!
//! Rows are calendar days and columns are wall-clock buckets within a day,
//! both taken in an explicit [`Zone`]. Every row has the same number of
//! columns. On DST days one bucket is either zero-length (the skipped hour,
//! always `NoData`) or longer than usual (the repeated hour, measured against
//! its real length).

use crate::bucketing::{compute_coverage, BucketWidth, TimeSlot, UnknownEndPolicy};
use crate::range::TimeRange;
use crate::types::{Coverage, SessionInterval};
use crate::zone::Zone;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridOptions {
    pub width: BucketWidth,
    pub unknown_policy: UnknownEndPolicy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    pub date: NaiveDate,
    pub cells: Vec<Coverage>,
    /// Total covered time across the row's data cells.
    pub uptime: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub width: BucketWidth,
    /// Range with real data: the requested window intersected with the
    /// observed range. `None` when there is nothing to show.
    pub data_range: Option<TimeRange>,
    pub rows: Vec<GridRow>,
}

impl Grid {
    pub fn columns(&self) -> usize {
        self.width.per_day()
    }

    /// `(rows, columns)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows.len(), self.columns())
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<Coverage> {
        self.rows.get(row)?.cells.get(col).copied()
    }

    pub fn total_uptime(&self) -> Duration {
        self.rows
            .iter()
            .fold(Duration::zero(), |total, row| total + row.uptime)
    }

    pub fn has_data(&self) -> bool {
        self.rows
            .iter()
            .any(|row| row.cells.iter().any(|cell| !cell.is_no_data()))
    }
}

/// Builds the grid.
///
/// Rows cover the days of `window` when given, otherwise the days of the
/// observed range (first session to `now`), otherwise just today. Cells
/// outside the requested window, before the first session, or at/after `now`
/// are `NoData`.
pub fn build_grid(
    intervals: &[SessionInterval],
    window: Option<TimeRange>,
    now: DateTime<Utc>,
    zone: Zone,
    options: &GridOptions,
) -> Grid {
    let observed = TimeRange::observed(intervals, now);
    let shown = window.or(observed).unwrap_or(TimeRange { from: now, to: now });
    let data_range = match (window, observed) {
        (Some(requested), Some(observed)) => requested.intersect(&observed),
        (None, observed) => observed,
        (Some(_), None) => None,
    };

    let first_day = zone.date_of(shown.from);
    let last_day = shown.last_day(zone);
    let days: Vec<NaiveDate> = first_day
        .iter_days()
        .take_while(|day| *day <= last_day)
        .collect();

    let columns = options.width.per_day();
    let slots: Vec<TimeSlot> = days
        .iter()
        .flat_map(|day| day_slots(*day, options.width, zone))
        .collect();
    let coverage = compute_coverage(intervals, &slots, now, options.unknown_policy);

    let rows = days
        .iter()
        .enumerate()
        .map(|(row, date)| {
            let offset = row * columns;
            let mut uptime = Duration::zero();
            let cells = (offset..offset + columns)
                .map(|index| {
                    let slot = &slots[index];
                    if !has_data(slot, data_range.as_ref()) {
                        return Coverage::NoData;
                    }
                    uptime += coverage[index].covered;
                    Coverage::Ratio(coverage[index].fraction)
                })
                .collect();
            GridRow {
                date: *date,
                cells,
                uptime,
            }
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        rows = rows.len(),
        columns,
        first_day = %first_day,
        last_day = %last_day,
        "built uptime grid"
    );

    Grid {
        width: options.width,
        data_range,
        rows,
    }
}

fn has_data(slot: &TimeSlot, data_range: Option<&TimeRange>) -> bool {
    match data_range {
        Some(range) => {
            slot.length() > Duration::zero() && slot.end > range.from && slot.start < range.to
        }
        None => false,
    }
}

/// Wall-clock slots of one day resolved to absolute time.
fn day_slots(day: NaiveDate, width: BucketWidth, zone: Zone) -> Vec<TimeSlot> {
    let midnight = day.and_time(NaiveTime::MIN);
    let step = width.duration();
    (0..width.per_day() as i32)
        .map(|col| {
            let start = midnight + step * col;
            TimeSlot {
                start: zone.resolve(start),
                end: zone.resolve(start + step),
            }
        })
        .collect()
}
