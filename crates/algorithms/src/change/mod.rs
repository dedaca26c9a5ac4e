//! Vegetation change detection between consecutive grids
//!
//! A pair of co-registered grids goes through:
//! 1. [`difference`]: `later - earlier`
//! 2. [`threshold`]: zero differences whose magnitude does not exceed the threshold
//! 3. [`denoise`]: median filter removing isolated cells
//! 4. [`classify`]: sign of each cell as +1 / -1 / 0
//!
//! [`detect`] runs the four stages for one pair, [`aggregate`] runs it over
//! every consecutive pair of a series and tabulates class percentages.

mod aggregate;
mod classify;
mod denoise;
mod detect;
mod difference;
mod stats;
mod threshold;

pub use aggregate::{ChangeSeries, GridSource, aggregate, aggregate_with, change_table};
pub use classify::{ChangeClass, ClassGrid, classify};
pub use denoise::denoise;
pub use detect::detect;
pub use difference::difference;
pub use stats::{ChangeRecord, ChangeStats, ChangeTable};
pub use threshold::threshold;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use vegchange_core::raster::{EdgeMode, Window};
use vegchange_core::{Error, Result};

/// Treatment of NaN and nodata cells in a pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodataPolicy {
    /// Cells missing in either grid are excluded from the class percentages
    #[default]
    Mask,
    /// Missing values flow through the arithmetic; they end up as no change
    Propagate,
}

impl fmt::Display for NodataPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NodataPolicy::Mask => "mask",
            NodataPolicy::Propagate => "propagate",
        })
    }
}

impl FromStr for NodataPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "mask" => Ok(NodataPolicy::Mask),
            "propagate" => Ok(NodataPolicy::Propagate),
            _ => Err(Error::invalid_parameter("nodata", s, "expected mask or propagate")),
        }
    }
}

/// Parameters of the pair change pipeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChangeParams {
    /// Minimum magnitude (index units) a difference must exceed to count
    pub threshold: f64,
    /// Median filter side length, odd and >= 1
    pub window: usize,
    /// Boundary sampling of the median filter
    pub edge: EdgeMode,
    pub nodata: NodataPolicy,
}

impl Default for ChangeParams {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            window: 3,
            edge: EdgeMode::Reflect,
            nodata: NodataPolicy::Mask,
        }
    }
}

impl ChangeParams {
    /// Check threshold and window before any grid is touched
    pub fn validate(&self) -> Result<()> {
        threshold::validate_threshold(self.threshold)?;
        Window::new(self.window)?;
        Ok(())
    }
}
