//! Tri-state change classes

use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};
use vegchange_core::raster::Raster;
use vegchange_core::{Error, Result};

/// Direction of a significant change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i8)]
pub enum ChangeClass {
    Decrease = -1,
    NoChange = 0,
    Increase = 1,
}

impl ChangeClass {
    /// Sign rule: positive is an increase, negative a decrease, anything else
    /// (exact zero, NaN) no change.
    pub fn from_value(v: f64) -> Self {
        if v > 0.0 {
            ChangeClass::Increase
        } else if v < 0.0 {
            ChangeClass::Decrease
        } else {
            ChangeClass::NoChange
        }
    }

    pub fn code(self) -> i8 {
        self as i8
    }

    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            -1 => Some(ChangeClass::Decrease),
            0 => Some(ChangeClass::NoChange),
            1 => Some(ChangeClass::Increase),
            _ => None,
        }
    }
}

/// Per-cell change classes for one pair of grids.
///
/// The class raster only ever holds -1, 0 or +1. Cells excluded by the nodata
/// policy are tracked in a separate validity mask and hold 0.
#[derive(Debug, Clone)]
pub struct ClassGrid {
    classes: Raster<i8>,
    valid: Option<Array2<bool>>,
}

impl ClassGrid {
    /// Restrict the grid to cells where `valid` is true; other cells become 0.
    pub fn with_mask(mut self, valid: Array2<bool>) -> Result<Self> {
        if valid.dim() != self.classes.shape() {
            return Err(Error::shape_mismatch(self.classes.shape(), valid.dim()));
        }
        Zip::from(self.classes.data_mut())
            .and(&valid)
            .for_each(|class, &ok| {
                if !ok {
                    *class = ChangeClass::NoChange.code();
                }
            });
        self.valid = Some(valid);
        Ok(self)
    }

    /// Class raster with values in {-1, 0, +1}
    pub fn classes(&self) -> &Raster<i8> {
        &self.classes
    }

    /// Validity mask, `None` when every cell counts
    pub fn valid_mask(&self) -> Option<&Array2<bool>> {
        self.valid.as_ref()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.classes.shape()
    }

    /// Class at (row, col); `None` for masked or out-of-range cells
    pub fn class_at(&self, row: usize, col: usize) -> Option<ChangeClass> {
        if let Some(valid) = &self.valid {
            if !valid.get((row, col)).copied().unwrap_or(false) {
                return None;
            }
        }
        self.classes
            .get(row, col)
            .ok()
            .and_then(ChangeClass::from_code)
    }

    /// Float raster of the class values for export, masked cells as NaN.
    pub fn to_raster(&self) -> Raster<f64> {
        let mut out = self.classes.map(f64::from);
        if let Some(valid) = &self.valid {
            Zip::from(out.data_mut()).and(valid).for_each(|v, &ok| {
                if !ok {
                    *v = f64::NAN;
                }
            });
            out.set_nodata(Some(f64::NAN));
        }
        out
    }
}

/// Reduce a grid to change classes by the sign of each cell.
///
/// Total over every input: positive cells become +1, negative cells -1, and
/// exact zeros and NaN become 0. The result inherits the input's transform and CRS.
pub fn classify(grid: &Raster<f64>) -> ClassGrid {
    ClassGrid {
        classes: grid.map(|v| ChangeClass::from_value(v).code()),
        valid: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_rule() {
        let g = Raster::from_vec(vec![0.3, -0.01, 0.0, -0.0, f64::NAN, 1e-300], 2, 3).unwrap();
        let c = classify(&g);
        let codes: Vec<i8> = c.classes().data().iter().copied().collect();
        assert_eq!(codes, vec![1, -1, 0, 0, 0, 1]);
    }

    #[test]
    fn test_idempotent_on_class_values() {
        let g = Raster::from_vec(vec![0.4, -2.0, 0.0, 0.1, -0.1, 0.0], 3, 2).unwrap();
        let once = classify(&g);
        let twice = classify(&once.to_raster());
        assert_eq!(once.classes().data(), twice.classes().data());
    }

    #[test]
    fn test_mask_zeroes_and_hides_cells() {
        let g = Raster::from_vec(vec![0.4, -0.5, 0.2, 0.0], 2, 2).unwrap();
        let mask = Array2::from_shape_vec((2, 2), vec![true, false, true, true]).unwrap();
        let c = classify(&g).with_mask(mask).unwrap();

        assert_eq!(c.classes().get(0, 1).unwrap(), 0);
        assert_eq!(c.class_at(0, 1), None);
        assert_eq!(c.class_at(0, 0), Some(ChangeClass::Increase));
        assert!(c.to_raster().get(0, 1).unwrap().is_nan());
        assert_eq!(c.to_raster().get(1, 0).unwrap(), 1.0);
    }

    #[test]
    fn test_mask_shape_checked() {
        let g: Raster<f64> = Raster::new(2, 2);
        let mask = Array2::from_elem((2, 3), true);
        assert!(matches!(
            classify(&g).with_mask(mask),
            Err(Error::ShapeMismatch { .. })
        ));
    }
}
