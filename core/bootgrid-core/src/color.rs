//! Coverage quantization.
//!
//! A [`Quantizer`] maps coverage to a [`ColorLevel`] using an explicit,
//! ordered list of breakpoints. The list is independent of any terminal
//! palette, so an 8-color and a 256-color renderer share the same mapping.

use crate::error::{BootgridError, Result};
use crate::types::{ColorLevel, Coverage};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub struct Quantizer {
    breakpoints: Vec<f64>,
}

/// One legend line: a level and the coverage range it stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub level: ColorLevel,
    pub label: String,
}

impl Quantizer {
    /// Evenly spaced breakpoints giving `levels` data levels.
    pub fn even(levels: usize) -> Result<Self> {
        if levels == 0 {
            return Err(BootgridError::InvalidBreakpoints(
                "at least one level is required".to_string(),
            ));
        }
        let breakpoints = (1..levels).map(|i| i as f64 / levels as f64).collect();
        Ok(Self { breakpoints })
    }

    /// Custom breakpoints: strictly increasing, each inside (0, 1).
    /// `n` breakpoints give `n + 1` data levels.
    pub fn from_breakpoints(breakpoints: Vec<f64>) -> Result<Self> {
        if let Some(bad) = breakpoints
            .iter()
            .find(|b| !b.is_finite() || **b <= 0.0 || **b >= 1.0)
        {
            return Err(BootgridError::InvalidBreakpoints(format!(
                "{bad} is outside (0, 1)"
            )));
        }
        if let Some(pair) = breakpoints.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(BootgridError::InvalidBreakpoints(format!(
                "{} is not greater than {}",
                pair[1], pair[0]
            )));
        }
        Ok(Self { breakpoints })
    }

    pub fn breakpoints(&self) -> &[f64] {
        &self.breakpoints
    }

    /// Number of data levels, excluding the no-data level.
    pub fn level_count(&self) -> usize {
        self.breakpoints.len() + 1
    }

    pub fn level(&self, coverage: Coverage) -> ColorLevel {
        match coverage {
            Coverage::NoData => ColorLevel::NO_DATA,
            Coverage::Ratio(ratio) => self.level_of_ratio(ratio),
        }
    }

    /// Level for a ratio; NaN is treated as zero coverage.
    pub fn level_of_ratio(&self, ratio: f64) -> ColorLevel {
        let ratio = if ratio.is_nan() { 0.0 } else { ratio };
        ColorLevel(1 + self.breakpoints.partition_point(|b| *b <= ratio))
    }

    pub fn legend(&self) -> Vec<LegendEntry> {
        let mut bounds = Vec::with_capacity(self.breakpoints.len() + 2);
        bounds.push(0.0);
        bounds.extend_from_slice(&self.breakpoints);
        bounds.push(1.0);

        let mut entries = vec![LegendEntry {
            level: ColorLevel::NO_DATA,
            label: "no data".to_string(),
        }];
        entries.extend(bounds.windows(2).enumerate().map(|(i, pair)| LegendEntry {
            level: ColorLevel(i + 1),
            label: format!("{}-{}%", percent(pair[0]), percent(pair[1])),
        }));
        entries
    }
}

impl Default for Quantizer {
    fn default() -> Self {
        Self {
            breakpoints: vec![0.125, 0.25, 0.375, 0.5, 0.625, 0.75, 0.875],
        }
    }
}

fn percent(ratio: f64) -> String {
    let value = ratio * 100.0;
    if (value - value.round()).abs() < 0.05 {
        format!("{}", value.round() as i64)
    } else {
        format!("{value:.1}")
    }
}
