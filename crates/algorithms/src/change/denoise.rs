//! Median filtering to remove isolated change speckle
//!
//! Single-cell false positives caused by sensor noise disappear under a
//! `window x window` median, while contiguous change regions wider than half
//! the window keep their outline.

use crate::maybe_rayon::*;
use ndarray::Array2;
use vegchange_core::raster::{EdgeMode, Raster, Window};
use vegchange_core::{Error, Result};

/// Median filter with a square window.
///
/// `window` must be odd and at least 1 ([`Error::InvalidParameter`]
/// otherwise); a window of 1 returns the input unchanged. Cells outside the
/// grid are sampled according to `edge`. NaN samples are skipped, and a
/// window without any finite sample produces NaN. When the number of usable
/// samples is even (only possible with [`EdgeMode::Truncate`] or NaN
/// samples) the two middle values are averaged.
pub fn denoise(grid: &Raster<f64>, window: usize, edge: EdgeMode) -> Result<Raster<f64>> {
    let window = Window::new(window)?;
    let (rows, cols) = grid.shape();

    if window.size() == 1 {
        return Ok(grid.clone());
    }

    let offsets = window.offsets();
    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut samples = Vec::with_capacity(offsets.len());
            let mut row_data = Vec::with_capacity(cols);

            for col in 0..cols {
                samples.clear();
                for &(dr, dc) in &offsets {
                    let r = edge.resolve(row as isize + dr, rows);
                    let c = edge.resolve(col as isize + dc, cols);
                    if let (Some(r), Some(c)) = (r, c) {
                        let v = unsafe { grid.get_unchecked(r, c) };
                        if !v.is_nan() {
                            samples.push(v);
                        }
                    }
                }
                row_data.push(median(&mut samples));
            }
            row_data
        })
        .collect();

    let mut output = grid.with_same_meta::<f64>(rows, cols);
    output.set_nodata(grid.nodata());
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;

    Ok(output)
}

fn median(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.sort_unstable_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}
