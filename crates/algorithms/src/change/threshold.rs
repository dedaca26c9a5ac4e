//! Suppression of differences below a significance threshold

use vegchange_core::raster::Raster;
use vegchange_core::{Error, Result};

/// Reject thresholds that are negative or NaN. `+inf` is accepted and
/// suppresses every cell.
pub(crate) fn validate_threshold(threshold: f64) -> Result<()> {
    if threshold.is_nan() || threshold < 0.0 {
        return Err(Error::invalid_parameter("threshold", threshold, "must be >= 0"));
    }
    Ok(())
}

/// Keep cells whose magnitude strictly exceeds `threshold`, zero the rest.
///
/// A cell survives when `v > threshold` or `v < -threshold`; a cell exactly at
/// `±threshold` becomes `0.0`. Surviving cells keep their magnitude. NaN fails
/// both comparisons and is therefore zeroed as well.
pub fn threshold(diff: &Raster<f64>, threshold: f64) -> Result<Raster<f64>> {
    validate_threshold(threshold)?;
    let mut output = diff.map(|v| {
        if v > threshold || v < -threshold {
            v
        } else {
            0.0
        }
    });
    output.set_nodata(diff.nodata());
    Ok(output)
}
