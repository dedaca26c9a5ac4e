//! Land-cover classes from a single NDVI grid
//!
//! Breakpoints split NDVI into water, bare soil, sparse vegetation and dense
//! vegetation. Missing cells get class 0.

use crate::maybe_rayon::*;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use vegchange_core::raster::Raster;
use vegchange_core::{Error, Result};

/// Land-cover class codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum LandCover {
    NoData = 0,
    Water = 1,
    BareSoil = 2,
    SparseVegetation = 3,
    DenseVegetation = 4,
}

impl LandCover {
    pub const ALL: [LandCover; 5] = [
        LandCover::NoData,
        LandCover::Water,
        LandCover::BareSoil,
        LandCover::SparseVegetation,
        LandCover::DenseVegetation,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            LandCover::NoData => "No data",
            LandCover::Water => "Water",
            LandCover::BareSoil => "Bare soil",
            LandCover::SparseVegetation => "Sparse vegetation / pasture",
            LandCover::DenseVegetation => "Dense vegetation / forest",
        }
    }
}

/// NDVI breakpoints; each class covers `[previous, breakpoint)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandCoverParams {
    /// Below this value: water
    pub water_below: f64,
    /// Below this value: bare soil
    pub bare_soil_below: f64,
    /// Below this value: sparse vegetation; at or above it: dense vegetation
    pub sparse_below: f64,
}

impl Default for LandCoverParams {
    fn default() -> Self {
        Self {
            water_below: 0.0,
            bare_soil_below: 0.2,
            sparse_below: 0.5,
        }
    }
}

impl LandCoverParams {
    pub fn validate(&self) -> Result<()> {
        let breaks = [self.water_below, self.bare_soil_below, self.sparse_below];
        if breaks.iter().any(|b| !b.is_finite()) {
            return Err(Error::invalid_parameter(
                "land_cover_breaks",
                format!("{:?}", breaks),
                "breakpoints must be finite",
            ));
        }
        if !(breaks[0] < breaks[1] && breaks[1] < breaks[2]) {
            return Err(Error::invalid_parameter(
                "land_cover_breaks",
                format!("{:?}", breaks),
                "breakpoints must be strictly increasing",
            ));
        }
        Ok(())
    }

    fn classify(&self, v: f64) -> LandCover {
        if v < self.water_below {
            LandCover::Water
        } else if v < self.bare_soil_below {
            LandCover::BareSoil
        } else if v < self.sparse_below {
            LandCover::SparseVegetation
        } else {
            LandCover::DenseVegetation
        }
    }
}

/// Classify every NDVI cell into a [`LandCover`] code.
///
/// NaN and cells equal to the raster's nodata marker become
/// [`LandCover::NoData`]. The output declares 0 as its nodata marker.
pub fn land_cover(ndvi: &Raster<f64>, params: LandCoverParams) -> Result<Raster<u8>> {
    params.validate()?;
    let (rows, cols) = ndvi.shape();

    let data: Vec<u8> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![LandCover::NoData.code(); cols];
            for (col, out) in row_data.iter_mut().enumerate() {
                let v = unsafe { ndvi.get_unchecked(row, col) };
                if !ndvi.is_nodata(v) {
                    *out = params.classify(v).code();
                }
            }
            row_data
        })
        .collect();

    let mut output = ndvi.with_same_meta::<u8>(rows, cols);
    output.set_nodata(Some(LandCover::NoData.code()));
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    Ok(output)
}

/// Cells and share of the grid for one land-cover class
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LandCoverShare {
    pub class: LandCover,
    pub cells: usize,
    pub percent: f64,
}

/// Share of every class (including no data) over all cells, in code order.
pub fn land_cover_summary(classes: &Raster<u8>) -> Vec<LandCoverShare> {
    let mut counts = [0usize; LandCover::ALL.len()];
    for &code in classes.data().iter() {
        let class = LandCover::from_code(code).unwrap_or(LandCover::NoData);
        counts[class.code() as usize] += 1;
    }
    let total = classes.len();
    LandCover::ALL
        .iter()
        .zip(counts)
        .map(|(&class, cells)| LandCoverShare {
            class,
            cells,
            percent: if total == 0 {
                0.0
            } else {
                cells as f64 / total as f64 * 100.0
            },
        })
        .collect()
}
