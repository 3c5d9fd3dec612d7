//! Compiled regex patterns for session record lines.
//!
//! These patterns are compiled once on first use. Update them when the
//! output of `last(1)` changes shape.

use once_cell::sync::Lazy;
use regex::Regex;

// ═══════════════════════════════════════════════════════════════════════════════
// last(1) Output
// ═══════════════════════════════════════════════════════════════════════════════

/// `Wed Jan 16 21:36:54 2013` (`last -F`) or `2013-01-16T21:36:54+01:00` (`--time-format iso`).
const TIMESTAMP: &str = r"(?:[A-Z][a-z]{2}\s+[A-Z][a-z]{2}\s+\d{1,2}\s+\d{2}:\d{2}:\d{2}\s+\d{4}|\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:,\d+)?(?:Z|[+-]\d{2}:?\d{2})?)";

/// Boot record: `reboot   system boot  6.1.0-13-amd64 Wed Jan 16 21:36:54 2013 - ...`
/// The kernel column is optional and skipped; `rest` holds the end column.
pub static RE_LAST_BOOT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^reboot\s+system boot\s+(?:\S+\s+)*?(?P<start>{TIMESTAMP})\s*(?P<rest>.*)$"
    ))
    .unwrap()
});

/// End column of a boot record.
pub static RE_LAST_END: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^(?:(?P<running>still running|still logged in)|-\s+(?:(?P<end>{TIMESTAMP})|(?P<lost>crash|down|gone - no logout)))"
    ))
    .unwrap()
});

// ═══════════════════════════════════════════════════════════════════════════════
// key=value Records
// ═══════════════════════════════════════════════════════════════════════════════

/// `start=2023-01-01T00:00 end=2023-01-01T00:30` with `end=STILL_RUNNING` or `end=UNKNOWN`.
pub static RE_KEY_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*start=(?P<start>\S+)\s+end=(?P<end>\S+)\s*$").unwrap()
});

pub const MARKER_RUNNING: &str = "STILL_RUNNING";
pub const MARKER_UNKNOWN: &str = "UNKNOWN";
