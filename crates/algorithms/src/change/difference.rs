//! Pointwise difference of two co-registered grids

use crate::maybe_rayon::*;
use ndarray::Array2;
use vegchange_core::raster::Raster;
use vegchange_core::{Error, Result};

/// Compute `later - earlier` cell by cell.
///
/// Both grids must have the same `(rows, cols)`; otherwise
/// [`Error::ShapeMismatch`] is returned with `earlier`'s shape as the
/// expected one. NaN in either input yields NaN. The result inherits the
/// transform and CRS of `earlier` and declares NaN as its nodata marker.
pub fn difference(earlier: &Raster<f64>, later: &Raster<f64>) -> Result<Raster<f64>> {
    let (rows, cols) = earlier.shape();
    if later.shape() != (rows, cols) {
        return Err(Error::shape_mismatch((rows, cols), later.shape()));
    }

    let a = earlier.data();
    let b = later.data();
    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            a.row(row)
                .iter()
                .zip(b.row(row).iter())
                .map(|(&x, &y)| y - x)
                .collect::<Vec<_>>()
        })
        .collect();

    let mut output = earlier.with_same_meta::<f64>(rows, cols);
    output.set_nodata(Some(f64::NAN));
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vegchange_core::{CRS, GeoTransform};

    fn grid(data: &[f64], rows: usize, cols: usize) -> Raster<f64> {
        Raster::from_vec(data.to_vec(), rows, cols).unwrap()
    }

    #[test]
    fn test_later_minus_earlier() {
        let a = grid(&[0.1, 0.2, 0.3, 0.4], 2, 2);
        let b = grid(&[0.3, 0.2, 0.1, 0.9], 2, 2);
        let d = difference(&a, &b).unwrap();
        let expected = [0.2, 0.0, -0.2, 0.5];
        for (got, want) in d.data().iter().zip(expected) {
            assert!((got - want).abs() < 1e-12, "{} vs {}", got, want);
        }
    }

    #[test]
    fn test_self_difference_is_zero() {
        let a = grid(&[0.7, -0.1, 0.0, 0.33, 0.5, 0.9], 2, 3);
        let d = difference(&a, &a).unwrap();
        assert!(d.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_antisymmetric() {
        let a = grid(&[0.12, 0.5, -0.3, 0.8, 0.05, 0.61], 3, 2);
        let b = grid(&[0.4, 0.1, 0.2, 0.79, -0.5, 0.6], 3, 2);
        let ab = difference(&a, &b).unwrap();
        let ba = difference(&b, &a).unwrap();
        for (x, y) in ab.data().iter().zip(ba.data().iter()) {
            assert_eq!(*x, -*y);
        }
    }

    #[test]
    fn test_shape_mismatch() {
        let a: Raster<f64> = Raster::new(4, 4);
        let b: Raster<f64> = Raster::new(4, 5);
        match difference(&a, &b) {
            Err(Error::ShapeMismatch { er, ec, ar, ac }) => {
                assert_eq!((er, ec, ar, ac), (4, 4, 4, 5));
            }
            other => panic!("expected ShapeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_nan_propagates_and_meta_inherited() {
        let mut a = grid(&[0.1, f64::NAN], 1, 2);
        a.set_transform(GeoTransform::new(13.0, -9.0, 0.01, -0.01));
        a.set_crs(Some(CRS::wgs84()));
        let b = grid(&[0.2, 0.3], 1, 2);

        let d = difference(&a, &b).unwrap();
        assert!(d.get(0, 1).unwrap().is_nan());
        assert_eq!(d.transform(), a.transform());
        assert_eq!(d.crs(), a.crs());
        assert!(d.nodata().is_some_and(|nd| nd.is_nan()));
    }
}
