//! Configuration loading.
//!
//! Settings live in `~/.config/bootgrid/config.toml` (platform config dir).
//! A missing file means defaults; a file that exists but cannot be read or
//! parsed is an error.

use crate::bucketing::{BucketWidth, UnknownEndPolicy};
use crate::color::Quantizer;
use crate::error::{BootgridError, Result};
use crate::grid::GridOptions;
use crate::parser::RecordFormat;
use crate::range::Window;
use crate::zone::Zone;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_DIR_NAME: &str = "bootgrid";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Default number of color levels (excluding "no data").
pub const DEFAULT_LEVELS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownEndSetting {
    #[default]
    FillStartBucket,
    Ignore,
    Assume,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bucket_minutes: u32,
    /// Lookback in days. `None` shows the whole history.
    pub days: Option<u32>,
    pub levels: usize,
    /// Overrides `levels` when set.
    pub breakpoints: Option<Vec<f64>>,
    pub unknown_end: UnknownEndSetting,
    pub assume_minutes: u32,
    pub timezone: String,
    pub format: RecordFormat,
    /// Session-history command and its arguments.
    pub command: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bucket_minutes: BucketWidth::default().minutes(),
            days: None,
            levels: DEFAULT_LEVELS,
            breakpoints: None,
            unknown_end: UnknownEndSetting::default(),
            assume_minutes: 60,
            timezone: "local".to_string(),
            format: RecordFormat::default(),
            command: default_command(),
        }
    }
}

fn default_command() -> Vec<String> {
    ["last", "-R", "-F", "reboot"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Config {
    pub fn grid_options(&self) -> Result<GridOptions> {
        Ok(GridOptions {
            width: BucketWidth::new(self.bucket_minutes)?,
            unknown_policy: self.unknown_policy(),
        })
    }

    pub fn unknown_policy(&self) -> UnknownEndPolicy {
        match self.unknown_end {
            UnknownEndSetting::FillStartBucket => UnknownEndPolicy::FillStartBucket,
            UnknownEndSetting::Ignore => UnknownEndPolicy::Ignore,
            UnknownEndSetting::Assume => UnknownEndPolicy::Assume {
                minutes: self.assume_minutes,
            },
        }
    }

    pub fn quantizer(&self) -> Result<Quantizer> {
        match &self.breakpoints {
            Some(breakpoints) => Quantizer::from_breakpoints(breakpoints.clone()),
            None => Quantizer::even(self.levels),
        }
    }

    pub fn zone(&self) -> Result<Zone> {
        self.timezone.parse()
    }

    pub fn window(&self) -> Window {
        match self.days {
            Some(days) => Window::LastDays(days),
            None => Window::All,
        }
    }

    /// Checks every derived setting at once so bad values fail before any work.
    pub fn validate(&self) -> Result<()> {
        self.grid_options()?;
        self.quantizer()?;
        self.zone()?;
        self.window().validate()?;
        if self.command.is_empty() {
            return Err(BootgridError::InvalidSetting {
                name: "command".to_string(),
                details: "must name a program".to_string(),
            });
        }
        Ok(())
    }
}

/// Returns the bootgrid config directory.
pub fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME))
}

/// Returns the default config file path.
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|d| d.join(CONFIG_FILE_NAME))
}

/// Loads configuration from `path`, or from the default location when `None`.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config_path = match path {
        Some(path) => path.to_path_buf(),
        None => match get_config_path() {
            Some(path) => path,
            None => return Ok(Config::default()),
        },
    };

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "no config file; using defaults");
        return Ok(Config::default());
    }

    let content = fs_err::read_to_string(&config_path).map_err(|e| BootgridError::Io {
        context: format!("Failed to read config {}", config_path.display()),
        source: e,
    })?;
    let config: Config = toml::from_str(&content).map_err(|e| BootgridError::ConfigMalformed {
        path: config_path.clone(),
        details: e.to_string(),
    })?;

    tracing::debug!(path = %config_path.display(), "loaded config");
    Ok(config)
}
