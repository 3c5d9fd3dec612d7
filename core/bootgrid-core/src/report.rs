//! Render model handed to output sinks.
//!
//! A [`Report`] is the finished grid in renderer terms: quantized levels,
//! axis labels, a legend and the summary. It serializes to JSON as-is.

use crate::color::{LegendEntry, Quantizer};
use crate::grid::Grid;
use crate::stats::{format_hours_minutes, rounded_minutes, Summary};
use crate::types::{ColorLevel, Coverage};
use crate::zone::Zone;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

/// Column labels are placed on these minute-of-day multiples.
const LABEL_EVERY_MINUTES: u32 = 6 * 60;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub zone: String,
    pub bucket_minutes: u32,
    pub columns: usize,
    pub column_labels: Vec<ColumnLabel>,
    pub rows: Vec<ReportRow>,
    pub legend: Vec<LegendEntry>,
    pub summary: ReportSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnLabel {
    pub column: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub date: NaiveDate,
    /// `"Mon 16"`.
    pub label: String,
    pub weekend: bool,
    pub levels: Vec<ColorLevel>,
    pub coverage: Vec<Coverage>,
    pub uptime_minutes: i64,
    /// `" 5:07"`, empty for a day without uptime.
    pub uptime_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub first_day: Option<NaiveDate>,
    pub last_day: Option<NaiveDate>,
    pub days: usize,
    pub total_uptime_minutes: i64,
    pub daily_average_minutes: i64,
    pub profile: Vec<Option<f64>>,
    pub profile_normalized: Vec<Option<f64>>,
}

impl Report {
    pub fn build(grid: &Grid, quantizer: &Quantizer, zone: Zone) -> Self {
        let summary = Summary::from_grid(grid);
        let width = grid.width.minutes();

        let column_labels = (0..grid.columns())
            .filter(|col| (*col as u32 * width) % LABEL_EVERY_MINUTES == 0)
            .map(|col| ColumnLabel {
                column: col,
                text: hour_label(col as u32 * width),
            })
            .collect();

        let rows = grid
            .rows
            .iter()
            .map(|row| ReportRow {
                date: row.date,
                label: row.date.format("%a %e").to_string(),
                weekend: matches!(row.date.weekday(), Weekday::Sat | Weekday::Sun),
                levels: row.cells.iter().map(|c| quantizer.level(*c)).collect(),
                coverage: row.cells.clone(),
                uptime_minutes: rounded_minutes(row.uptime),
                uptime_label: format_hours_minutes(row.uptime),
            })
            .collect();

        Self {
            zone: zone.to_string(),
            bucket_minutes: width,
            columns: grid.columns(),
            column_labels,
            rows,
            legend: quantizer.legend(),
            summary: ReportSummary {
                first_day: summary.first_day,
                last_day: summary.last_day,
                days: summary.days,
                total_uptime_minutes: rounded_minutes(summary.total_uptime),
                daily_average_minutes: rounded_minutes(summary.daily_average),
                profile_normalized: summary.normalized_profile(),
                profile: summary.profile,
            },
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// `"6:00"` for minute-of-day 360.
pub fn hour_label(minute_of_day: u32) -> String {
    format!("{}:{:02}", minute_of_day / 60, minute_of_day % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{build_grid, GridOptions};
    use crate::types::SessionInterval;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, d, h, 0, 0).unwrap()
    }

    fn report() -> Report {
        // 2023-01-01 is a Sunday.
        let sessions = [SessionInterval::closed(at(1, 6), at(2, 6))];
        let grid = build_grid(&sessions, None, at(2, 12), Zone::Utc, &GridOptions::default());
        Report::build(&grid, &Quantizer::even(4).unwrap(), Zone::Utc)
    }

    #[test]
    fn rows_carry_labels_and_levels() {
        let report = report();
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].label, "Sun  1");
        assert!(report.rows[0].weekend);
        assert!(!report.rows[1].weekend);
        assert_eq!(report.rows[0].levels[0], ColorLevel::NO_DATA);
        assert_eq!(report.rows[0].levels[6], ColorLevel(4));
        assert_eq!(report.rows[1].levels[6], ColorLevel(1));
        assert_eq!(report.rows[1].levels[12], ColorLevel::NO_DATA);
        assert_eq!(report.rows[0].uptime_label, "18:00");
        assert_eq!(report.rows[1].uptime_minutes, 360);
    }

    #[test]
    fn column_labels_every_six_hours() {
        let texts: Vec<(usize, String)> = report()
            .column_labels
            .into_iter()
            .map(|l| (l.column, l.text))
            .collect();
        assert_eq!(
            texts,
            vec![
                (0, "0:00".to_string()),
                (6, "6:00".to_string()),
                (12, "12:00".to_string()),
                (18, "18:00".to_string()),
            ]
        );
    }

    #[test]
    fn minute_counts_match_printed_labels() {
        let end = Utc.with_ymd_and_hms(2023, 1, 1, 1, 29, 30).unwrap();
        let sessions = [SessionInterval::closed(at(1, 0), end)];
        let grid = build_grid(&sessions, None, at(1, 12), Zone::Utc, &GridOptions::default());
        let report = Report::build(&grid, &Quantizer::default(), Zone::Utc);

        assert_eq!(report.rows[0].uptime_minutes, 90);
        assert_eq!(report.rows[0].uptime_label, " 1:30");
        assert_eq!(report.summary.total_uptime_minutes, 90);
        assert_eq!(report.summary.daily_average_minutes, 90);
    }

    #[test]
    fn serializes_no_data_as_null() {
        let json = report().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["rows"][0]["coverage"][0].is_null());
        assert_eq!(value["rows"][0]["coverage"][6], 1.0);
        assert_eq!(value["rows"][0]["levels"][0], 0);
        assert_eq!(value["legend"][0]["label"], "no data");
        assert_eq!(value["summary"]["total_uptime_minutes"], 24 * 60);
    }
}
