//! BootgridEngine - one-shot pipeline from raw records to a [`Report`].
//!
//! The engine is:
//! - **Synchronous**: parse, bucket, lay out and quantize in one pass
//! - **Deterministic**: "now" is a parameter, never read from the clock here
//! - **Tolerant**: malformed lines are counted and skipped
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use bootgrid_core::{BootgridEngine, Config};
//!
//! let engine = BootgridEngine::from_config(&Config::default())?;
//! let run = engine.run(&raw_last_output, chrono::Utc::now())?;
//! println!("{}", run.report.to_json()?);
//! ```

use crate::color::Quantizer;
use crate::config::Config;
use crate::error::Result;
use crate::grid::{build_grid, Grid, GridOptions};
use crate::parser::{parse_sessions, RecordFormat};
use crate::range::Window;
use crate::report::Report;
use crate::zone::Zone;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct BootgridEngine {
    pub format: RecordFormat,
    pub zone: Zone,
    pub window: Window,
    pub grid: GridOptions,
    pub quantizer: Quantizer,
}

/// Everything one run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineRun {
    pub grid: Grid,
    pub report: Report,
    pub sessions: usize,
    pub skipped_lines: usize,
}

impl BootgridEngine {
    /// Builds an engine from validated configuration values.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            format: config.format,
            zone: config.zone()?,
            window: config.window(),
            grid: config.grid_options()?,
            quantizer: config.quantizer()?,
        })
    }

    /// Runs the whole pipeline against `text` as of `now`.
    pub fn run(&self, text: &str, now: DateTime<Utc>) -> Result<EngineRun> {
        let parsed = parse_sessions(text, self.format, self.zone);
        if parsed.intervals.is_empty() {
            tracing::warn!(
                skipped = parsed.skipped,
                "no session records found; the grid will be empty"
            );
        } else if parsed.skipped > 0 {
            tracing::info!(skipped = parsed.skipped, "skipped malformed session records");
        }

        let window = self.window.resolve(now, self.zone)?;
        let grid = build_grid(&parsed.intervals, window, now, self.zone, &self.grid);
        let report = Report::build(&grid, &self.quantizer, self.zone);

        Ok(EngineRun {
            grid,
            report,
            sessions: parsed.intervals.len(),
            skipped_lines: parsed.skipped,
        })
    }
}
