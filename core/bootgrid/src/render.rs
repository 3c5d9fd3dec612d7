//! Output sinks for a [`Report`]: a colored text grid or JSON.

use bootgrid_core::report::ReportSummary;
use bootgrid_core::stats::format_long;
use bootgrid_core::{ColorLevel, Report};
use chrono::{Datelike, Duration};
use crossterm::queue;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use std::io::{self, Write};
use thiserror::Error;

use crate::terminal::{PaletteKind, RenderStyle};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Unsupported terminal: {detail} ({hint})")]
    UnsupportedTerminal { detail: String, hint: String },

    #[error("Failed to write output: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to encode report: {0}")]
    Json(#[from] serde_json::Error),
}

impl RenderError {
    /// The reader closed its end (e.g. `| head`); not worth reporting.
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, RenderError::Io(e) if e.kind() == io::ErrorKind::BrokenPipe)
    }
}

/// Day label (`"Sun  1"`) plus one space.
const LABEL_WIDTH: usize = 7;
const HISTOGRAM_HEIGHT: usize = 4;

const UNICODE_RAMP: [char; 8] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇'];
const ASCII_RAMP: [char; 8] = [' ', '.', ':', '-', '=', '+', '*', '#'];
const UNICODE_BARS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const ASCII_BARS: [char; 9] = [' ', ' ', '.', '.', ':', ':', '|', '|', '#'];

// Dark gray through green to yellow.
const RAMP_256: [u8; 10] = [236, 22, 28, 34, 40, 46, 82, 118, 154, 190];
const RAMP_16: [Color; 6] = [
    Color::DarkGrey,
    Color::DarkGreen,
    Color::Green,
    Color::DarkYellow,
    Color::Yellow,
    Color::White,
];
const RAMP_8: [Color; 5] = [
    Color::DarkBlue,
    Color::DarkCyan,
    Color::DarkGreen,
    Color::DarkYellow,
    Color::Grey,
];

pub fn render_json<W: Write>(out: &mut W, report: &Report) -> Result<(), RenderError> {
    let json = serde_json::to_string_pretty(report)?;
    out.write_all(json.as_bytes())?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

pub fn render_text<W: Write>(
    out: &mut W,
    report: &Report,
    style: &RenderStyle,
) -> Result<(), RenderError> {
    let painter = Painter {
        palette: style.palette,
        unicode: style.unicode,
        levels: report.legend.len().saturating_sub(1),
    };

    write_summary(out, &report.summary)?;
    writeln!(out)?;
    write_histogram(out, &report.summary.profile_normalized, style.unicode)?;
    write_axis(out, report)?;

    let mut rows: Vec<_> = report.rows.iter().collect();
    if style.newest_first {
        rows.reverse();
    }

    let mut month = None;
    for row in rows {
        let this_month = (row.date.year(), row.date.month());
        if month != Some(this_month) {
            if month.is_some() {
                writeln!(out)?;
            }
            painter.heading(out, &row.date.format("%B %Y").to_string())?;
            month = Some(this_month);
        }

        painter.label(out, &row.label, row.weekend)?;
        for level in &row.levels {
            painter.cell(out, *level)?;
        }
        if row.uptime_label.is_empty() {
            writeln!(out)?;
        } else {
            writeln!(out, " {}", row.uptime_label)?;
        }
    }

    writeln!(out)?;
    write!(out, "{:<width$}", "Legend", width = LABEL_WIDTH)?;
    for entry in &report.legend {
        painter.cell(out, entry.level)?;
        write!(out, " {}  ", entry.label)?;
    }
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

fn write_summary<W: Write>(out: &mut W, summary: &ReportSummary) -> io::Result<()> {
    match (summary.first_day, summary.last_day) {
        (Some(first), Some(last)) => writeln!(
            out,
            "Period   {} to {}",
            first.format("%a %b %e %Y"),
            last.format("%a %b %e %Y")
        )?,
        _ => writeln!(out, "Period   no data")?,
    }
    writeln!(out, "Days     {}", summary.days)?;
    writeln!(
        out,
        "Uptime   {}",
        format_long(Duration::minutes(summary.total_uptime_minutes))
    )?;
    writeln!(
        out,
        "Average  {} per day",
        format_long(Duration::minutes(summary.daily_average_minutes))
    )
}

/// Time-of-day profile as a small bar chart above the grid.
fn write_histogram<W: Write>(out: &mut W, profile: &[Option<f64>], unicode: bool) -> io::Result<()> {
    if profile.iter().all(Option::is_none) {
        return Ok(());
    }
    let bars = if unicode { &UNICODE_BARS } else { &ASCII_BARS };
    let steps = bars.len() - 1;

    for line in (0..HISTOGRAM_HEIGHT).rev() {
        let text: String = profile
            .iter()
            .map(|value| {
                let eighths = value
                    .map(|v| (v.clamp(0.0, 1.0) * (HISTOGRAM_HEIGHT * steps) as f64).round() as usize)
                    .unwrap_or(0);
                bars[eighths.saturating_sub(line * steps).min(steps)]
            })
            .collect();
        writeln!(out, "{:width$}{}", "", text.trim_end(), width = LABEL_WIDTH)?;
    }
    Ok(())
}

fn write_axis<W: Write>(out: &mut W, report: &Report) -> io::Result<()> {
    let mut axis = vec![' '; report.columns];
    let mut next_free = 0;
    for label in &report.column_labels {
        if label.column < next_free {
            continue;
        }
        for (offset, ch) in label.text.chars().enumerate() {
            let at = label.column + offset;
            if at < axis.len() {
                axis[at] = ch;
            } else {
                axis.push(ch);
            }
        }
        next_free = label.column + label.text.chars().count() + 1;
    }
    let axis: String = axis.into_iter().collect();
    writeln!(out, "{:width$}{}", "", axis.trim_end(), width = LABEL_WIDTH)
}

struct Painter {
    palette: Option<PaletteKind>,
    unicode: bool,
    levels: usize,
}

impl Painter {
    fn heading<W: Write>(&self, out: &mut W, text: &str) -> io::Result<()> {
        if self.palette.is_some() {
            queue!(
                out,
                SetAttribute(Attribute::Bold),
                Print(text),
                SetAttribute(Attribute::Reset),
                Print("\n")
            )
        } else {
            writeln!(out, "{text}")
        }
    }

    fn label<W: Write>(&self, out: &mut W, label: &str, weekend: bool) -> io::Result<()> {
        let padded = format!("{label:<width$}", width = LABEL_WIDTH);
        if weekend && self.palette.is_some() {
            queue!(
                out,
                SetAttribute(Attribute::Bold),
                Print(padded),
                SetAttribute(Attribute::Reset)
            )
        } else {
            write!(out, "{padded}")
        }
    }

    fn cell<W: Write>(&self, out: &mut W, level: ColorLevel) -> io::Result<()> {
        let Some(kind) = self.palette else {
            return write!(out, "{}", self.plain_glyph(level));
        };

        let (glyph, color) = if level.is_no_data() {
            (self.no_data_glyph(), no_data_color(kind))
        } else {
            let solid = if self.unicode { '█' } else { '#' };
            (solid, Some(self.level_color(kind, level)))
        };
        match color {
            Some(color) => queue!(out, SetForegroundColor(color), Print(glyph), ResetColor),
            None => queue!(out, Print(glyph)),
        }
    }

    fn plain_glyph(&self, level: ColorLevel) -> char {
        if level.is_no_data() {
            return self.no_data_glyph();
        }
        let ramp = if self.unicode { &UNICODE_RAMP } else { &ASCII_RAMP };
        ramp[ramp_index(level, self.levels, ramp.len())]
    }

    fn no_data_glyph(&self) -> char {
        if self.unicode {
            '·'
        } else {
            '~'
        }
    }

    fn level_color(&self, kind: PaletteKind, level: ColorLevel) -> Color {
        match kind {
            PaletteKind::Ansi256 => {
                Color::AnsiValue(RAMP_256[ramp_index(level, self.levels, RAMP_256.len())])
            }
            PaletteKind::Basic16 => RAMP_16[ramp_index(level, self.levels, RAMP_16.len())],
            PaletteKind::Basic8 => RAMP_8[ramp_index(level, self.levels, RAMP_8.len())],
        }
    }
}

fn no_data_color(kind: PaletteKind) -> Option<Color> {
    match kind {
        PaletteKind::Ansi256 => Some(Color::AnsiValue(240)),
        PaletteKind::Basic16 => Some(Color::DarkGrey),
        PaletteKind::Basic8 => None,
    }
}

/// Spreads data levels `1..=levels` over a palette of `len` entries,
/// lowest level first and highest level last.
fn ramp_index(level: ColorLevel, levels: usize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    if levels <= 1 {
        return len - 1;
    }
    let step = level.0.saturating_sub(1).min(levels - 1);
    let index = (step as f64 * (len - 1) as f64 / (levels - 1) as f64).round() as usize;
    index.min(len - 1)
}
