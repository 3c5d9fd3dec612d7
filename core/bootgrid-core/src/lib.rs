//! # bootgrid-core
//!
//! Core library for bootgrid: turns boot/shutdown session records into a
//! calendar grid of uptime coverage, ready for a renderer.
//!
//! ## Pipeline
//!
//! 1. [`parser`]: raw record text to [`SessionInterval`]s (bad lines skipped)
//! 2. [`bucketing`]: union of sessions measured against fixed time slots
//! 3. [`grid`]: slots laid out as day rows and time-of-day columns
//! 4. [`color`]: coverage quantized into palette levels
//!
//! ## Design Principles
//!
//! - **Synchronous**: No async runtime; the whole input fits in memory.
//! - **Explicit context**: "now" and the timezone are parameters.
//! - **Graceful degradation**: Malformed records are skipped, not fatal.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bootgrid_core::{BootgridEngine, Config};
//!
//! let engine = BootgridEngine::from_config(&Config::default())?;
//! let run = engine.run(&text, chrono::Utc::now())?;
//! ```

pub mod bucketing;
pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod parser;
pub mod patterns;
pub mod range;
pub mod report;
pub mod stats;
pub mod types;
pub mod zone;

// Re-export commonly used items at crate root
pub use bucketing::{
    bucket_range, compute_coverage, Bucket, BucketWidth, SlotCoverage, TimeSlot, UnknownEndPolicy,
};
pub use color::{LegendEntry, Quantizer};
pub use config::{load_config, Config};
pub use engine::{BootgridEngine, EngineRun};
pub use error::{BootgridError, LineError, Result};
pub use grid::{build_grid, Grid, GridOptions, GridRow};
pub use parser::{parse_line, parse_sessions, ParseOutcome, RecordFormat};
pub use range::{TimeRange, Window};
pub use report::Report;
pub use stats::Summary;
pub use types::*;
pub use zone::Zone;
