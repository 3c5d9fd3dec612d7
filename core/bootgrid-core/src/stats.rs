//! Summary statistics over a built grid.
//!
//! Total running time, the daily average and the time-of-day profile
//! (average coverage of each column across all days that have data).

use crate::grid::Grid;
use chrono::{Duration, NaiveDate};

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub first_day: Option<NaiveDate>,
    pub last_day: Option<NaiveDate>,
    /// Number of displayed days.
    pub days: usize,
    pub total_uptime: Duration,
    /// `total_uptime / days`; zero for an empty grid.
    pub daily_average: Duration,
    /// Mean coverage per column over rows where that column has data.
    pub profile: Vec<Option<f64>>,
}

impl Summary {
    pub fn from_grid(grid: &Grid) -> Self {
        let days = grid.rows.len();
        let total_uptime = grid.total_uptime();
        let daily_average = if days > 0 {
            Duration::milliseconds(total_uptime.num_milliseconds() / days as i64)
        } else {
            Duration::zero()
        };

        Self {
            first_day: grid.rows.first().map(|row| row.date),
            last_day: grid.rows.last().map(|row| row.date),
            days,
            total_uptime,
            daily_average,
            profile: time_of_day_profile(grid),
        }
    }

    /// Profile rescaled so its minimum is 0 and its maximum is 1, which
    /// makes small differences visible in a short histogram. A flat profile
    /// maps to all zeros.
    pub fn normalized_profile(&self) -> Vec<Option<f64>> {
        let known = self.profile.iter().flatten();
        let min = known.clone().copied().fold(f64::INFINITY, f64::min);
        let max = known.copied().fold(f64::NEG_INFINITY, f64::max);
        let spread = max - min;

        self.profile
            .iter()
            .map(|value| {
                value.map(|v| {
                    if spread > f64::EPSILON {
                        (v - min) / spread
                    } else {
                        0.0
                    }
                })
            })
            .collect()
    }
}

fn time_of_day_profile(grid: &Grid) -> Vec<Option<f64>> {
    (0..grid.columns())
        .map(|col| {
            let (sum, count) = grid
                .rows
                .iter()
                .filter_map(|row| row.cells.get(col).and_then(|c| c.ratio()))
                .fold((0.0, 0usize), |(sum, count), ratio| (sum + ratio, count + 1));
            (count > 0).then(|| sum / count as f64)
        })
        .collect()
}

/// Whole minutes, rounded to nearest. Every displayed or serialized minute
/// count goes through this.
pub fn rounded_minutes(duration: Duration) -> i64 {
    (duration.num_seconds() as f64 / 60.0).round() as i64
}

/// `" 5:07"` style running time; `"  :07"` below an hour; empty when zero.
pub fn format_hours_minutes(duration: Duration) -> String {
    let total_minutes = rounded_minutes(duration);
    let (hours, minutes) = (total_minutes / 60, total_minutes % 60);
    match (hours, minutes) {
        (0, 0) => String::new(),
        (0, m) => format!("  :{m:02}"),
        (h, m) => format!("{h:2}:{m:02}"),
    }
}

/// `"123 hours 4 minutes"` style running time.
pub fn format_long(duration: Duration) -> String {
    let total_minutes = rounded_minutes(duration);
    format!(
        "{} hours {} minutes",
        total_minutes / 60,
        total_minutes % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{build_grid, GridOptions};
    use crate::types::SessionInterval;
    use crate::zone::Zone;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, d, h, 0, 0).unwrap()
    }

    fn two_day_grid() -> Grid {
        // Day 1: on 08:00-10:00. Day 2: on 08:00-09:00.
        let sessions = [
            SessionInterval::closed(at(1, 8), at(1, 10)),
            SessionInterval::closed(at(2, 8), at(2, 9)),
        ];
        build_grid(&sessions, None, at(3, 0), Zone::Utc, &GridOptions::default())
    }

    #[test]
    fn totals_and_average() {
        let summary = Summary::from_grid(&two_day_grid());
        assert_eq!(summary.days, 2);
        assert_eq!(summary.total_uptime, Duration::hours(3));
        assert_eq!(summary.daily_average, Duration::minutes(90));
        assert_eq!(summary.first_day, NaiveDate::from_ymd_opt(2023, 1, 1));
    }

    #[test]
    fn profile_averages_days_with_data() {
        let summary = Summary::from_grid(&two_day_grid());
        assert_eq!(summary.profile.len(), 24);
        // Column 7 on day 1 is before the first session.
        assert_eq!(summary.profile[7], Some(0.0));
        assert_eq!(summary.profile[8], Some(1.0));
        assert_eq!(summary.profile[9], Some(0.5));
        assert_eq!(summary.profile[0], Some(0.0));
    }

    #[test]
    fn profile_is_none_without_data() {
        let grid = build_grid(&[], None, at(3, 0), Zone::Utc, &GridOptions::default());
        let summary = Summary::from_grid(&grid);
        assert!(summary.profile.iter().all(Option::is_none));
        assert_eq!(summary.daily_average, Duration::zero());
    }

    #[test]
    fn normalized_profile_spans_zero_to_one() {
        let summary = Summary::from_grid(&two_day_grid());
        let normalized = summary.normalized_profile();
        assert_eq!(normalized[8], Some(1.0));
        assert_eq!(normalized[9], Some(0.5));
        assert_eq!(normalized[0], Some(0.0));
    }

    #[test]
    fn formats_running_time() {
        assert_eq!(format_hours_minutes(Duration::zero()), "");
        assert_eq!(format_hours_minutes(Duration::minutes(7)), "  :07");
        assert_eq!(format_hours_minutes(Duration::minutes(307)), " 5:07");
        assert_eq!(format_long(Duration::minutes(1505)), "25 hours 5 minutes");
    }

    #[test]
    fn minutes_round_to_nearest() {
        assert_eq!(rounded_minutes(Duration::seconds(89 * 60 + 29)), 89);
        assert_eq!(rounded_minutes(Duration::seconds(89 * 60 + 30)), 90);
        assert_eq!(format_long(Duration::seconds(89 * 60 + 30)), "1 hours 30 minutes");
    }
}
