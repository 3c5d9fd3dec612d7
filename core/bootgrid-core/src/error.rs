//! Error types for bootgrid-core operations.
//!
//! Only configuration and range problems are errors here. Malformed input
//! lines are reported through [`LineError`] and skipped by the parser.

use chrono::{DateTime, Utc};
use std::path::PathBuf;

// ═══════════════════════════════════════════════════════════════════════════════
// Pipeline Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// All errors that can occur in bootgrid-core operations.
#[derive(Debug, thiserror::Error)]
pub enum BootgridError {
    // ─────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Configuration file malformed: {path}: {details}")]
    ConfigMalformed { path: PathBuf, details: String },

    #[error("Bucket width of {minutes} minutes does not evenly divide a day")]
    InvalidBucketWidth { minutes: u32 },

    #[error("Invalid color breakpoints: {0}")]
    InvalidBreakpoints(String),

    #[error("Unknown timezone '{0}' (expected local, utc or an offset like +02:00)")]
    InvalidZone(String),

    #[error("Invalid setting {name}: {details}")]
    InvalidSetting { name: String, details: String },

    // ─────────────────────────────────────────────────────────────────────
    // Range Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Time range starts after it ends: {from} > {to}")]
    InvalidRange {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },

    // ─────────────────────────────────────────────────────────────────────
    // I/O Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Results using BootgridError.
pub type Result<T> = std::result::Result<T, BootgridError>;

// ═══════════════════════════════════════════════════════════════════════════════
// Per-line Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Why a single input line was skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LineError {
    #[error("line is empty")]
    Empty,

    #[error("line does not look like a session record")]
    Unrecognized,

    #[error("unparseable timestamp '{0}'")]
    BadTimestamp(String),
}
