//! Command-line arguments. Values given here override the config file.

use bootgrid_core::config::UnknownEndSetting;
use bootgrid_core::parser::parse_timestamp;
use bootgrid_core::{Config, RecordFormat, Window, Zone};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

use crate::error::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored grid for a terminal
    Text,
    /// The computed report as JSON
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Color when stdout is a capable terminal
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PaletteChoice {
    /// Richest palette the terminal supports
    Auto,
    #[value(name = "8")]
    Basic8,
    #[value(name = "16")]
    Basic16,
    #[value(name = "256")]
    Ansi256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UnknownEndArg {
    /// Count the whole bucket the session started in as running
    FillStartBucket,
    /// Ignore sessions whose end is unknown
    Ignore,
    /// Assume the session lasted --assume-minutes
    Assume,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Auto,
    Last,
    KeyValue,
}

#[derive(Parser, Debug)]
#[command(name = "bootgrid")]
#[command(version)]
#[command(about = "Show when this machine was running, as a day-by-hour heat map", long_about = None)]
pub struct Cli {
    /// Config file (default: <config dir>/bootgrid/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Read session records from a file ("-" for stdin) instead of running the command
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Show only the last N days
    #[arg(short, long, value_name = "N", conflicts_with = "from")]
    pub days: Option<u32>,

    /// First day to show (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub from: Option<NaiveDate>,

    /// Last day to show (YYYY-MM-DD, default: today)
    #[arg(long, value_name = "DATE", requires = "from")]
    pub to: Option<NaiveDate>,

    /// Bucket width in minutes; must divide 1440
    #[arg(short = 'b', long, value_name = "MINUTES")]
    pub bucket_minutes: Option<u32>,

    /// Number of evenly spaced color levels
    #[arg(long, value_name = "N")]
    pub levels: Option<usize>,

    /// Explicit level breakpoints, e.g. 0.1,0.5,0.9
    #[arg(long, value_name = "LIST", value_delimiter = ',', conflicts_with = "levels")]
    pub breakpoints: Option<Vec<f64>>,

    /// How sessions without a recorded end are counted
    #[arg(long, value_enum, value_name = "POLICY")]
    pub unknown_end: Option<UnknownEndArg>,

    /// Session length assumed by --unknown-end assume
    #[arg(long, value_name = "MINUTES")]
    pub assume_minutes: Option<u32>,

    /// Timezone for days and hours: local, utc or an offset like +02:00
    #[arg(long, value_name = "TZ", conflicts_with = "utc")]
    pub timezone: Option<String>,

    /// Shorthand for --timezone utc
    #[arg(long)]
    pub utc: bool,

    /// Record dialect of the input
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// When to use color
    #[arg(long, value_enum, default_value = "auto")]
    pub color: ColorChoice,

    /// Terminal palette
    #[arg(long, value_enum, default_value = "auto")]
    pub palette: PaletteChoice,

    /// Draw with ASCII characters only
    #[arg(long)]
    pub ascii: bool,

    /// Print the oldest day first
    #[arg(long)]
    pub oldest_first: bool,

    /// Pretend the current time is TIMESTAMP
    #[arg(long, value_name = "TIMESTAMP", hide = true)]
    pub now: Option<String>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Write logs to a file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Applies command-line overrides on top of the loaded config.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(days) = self.days {
            config.days = Some(days);
        }
        if let Some(minutes) = self.bucket_minutes {
            config.bucket_minutes = minutes;
        }
        if let Some(levels) = self.levels {
            config.levels = levels;
            config.breakpoints = None;
        }
        if let Some(breakpoints) = &self.breakpoints {
            config.breakpoints = Some(breakpoints.clone());
        }
        if let Some(policy) = self.unknown_end {
            config.unknown_end = match policy {
                UnknownEndArg::FillStartBucket => UnknownEndSetting::FillStartBucket,
                UnknownEndArg::Ignore => UnknownEndSetting::Ignore,
                UnknownEndArg::Assume => UnknownEndSetting::Assume,
            };
        }
        if let Some(minutes) = self.assume_minutes {
            config.assume_minutes = minutes;
        }
        if self.utc {
            config.timezone = "utc".to_string();
        } else if let Some(zone) = &self.timezone {
            config.timezone = zone.clone();
        }
        if let Some(format) = self.format {
            config.format = match format {
                FormatArg::Auto => RecordFormat::Auto,
                FormatArg::Last => RecordFormat::Last,
                FormatArg::KeyValue => RecordFormat::KeyValue,
            };
        }
    }

    /// The "now" the whole run is computed against.
    pub fn now(&self, zone: Zone) -> Result<DateTime<Utc>, CliError> {
        match &self.now {
            Some(raw) => parse_timestamp(raw, zone).map_err(|e| CliError::InvalidArgument {
                name: "--now".to_string(),
                details: e.to_string(),
            }),
            None => Ok(Utc::now()),
        }
    }

    /// Explicit `--from/--to` window, if given.
    pub fn window(&self, now: DateTime<Utc>, zone: Zone) -> Option<Window> {
        self.from.map(|from| Window::Between {
            from,
            to: self.to.unwrap_or_else(|| zone.date_of(now)),
        })
    }
}
