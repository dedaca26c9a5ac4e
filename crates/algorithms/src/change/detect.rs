//! Change classification for one pair of grids

use ndarray::Zip;
use vegchange_core::raster::Raster;
use vegchange_core::Result;

use super::{ChangeParams, ClassGrid, NodataPolicy, classify, denoise, difference, threshold};

/// Classify the change from `earlier` to `later`.
///
/// Runs `classify(denoise(threshold(difference(earlier, later))))`. Parameters
/// are validated before any computation, then the shapes are compared.
///
/// Under [`NodataPolicy::Mask`] a cell is masked when it is NaN or equal to
/// the declared nodata marker in either grid. Masked cells are blanked before
/// the median filter so they do not leak into their neighbours, and the
/// returned grid carries the validity mask.
pub fn detect(
    earlier: &Raster<f64>,
    later: &Raster<f64>,
    params: &ChangeParams,
) -> Result<ClassGrid> {
    params.validate()?;

    let diff = difference(earlier, later)?;
    let mut significant = threshold(&diff, params.threshold)?;

    let valid = match params.nodata {
        NodataPolicy::Propagate => None,
        NodataPolicy::Mask => {
            let mut valid = earlier.valid_mask();
            Zip::from(&mut valid)
                .and(later.data())
                .for_each(|ok, &v| *ok = *ok && !later.is_nodata(v));
            Zip::from(significant.data_mut())
                .and(&valid)
                .for_each(|v, &ok| {
                    if !ok {
                        *v = f64::NAN;
                    }
                });
            Some(valid)
        }
    };

    let smoothed = denoise(&significant, params.window, params.edge)?;
    let classes = classify(&smoothed);

    match valid {
        Some(valid) => classes.with_mask(valid),
        None => Ok(classes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::ChangeClass;
    use vegchange_core::{EdgeMode, Error};

    #[test]
    fn test_uniform_increase_without_smoothing() {
        let a = Raster::filled(4, 4, 0.1);
        let b = Raster::filled(4, 4, 0.3);
        let params = ChangeParams {
            threshold: 0.1,
            window: 1,
            ..Default::default()
        };
        let classes = detect(&a, &b, &params).unwrap();
        assert!(classes.classes().data().iter().all(|&c| c == 1));
    }

    #[test]
    fn test_uniform_decrease_with_smoothing() {
        let a = Raster::filled(5, 5, 0.8);
        let b = Raster::filled(5, 5, 0.2);
        let classes = detect(&a, &b, &ChangeParams::default()).unwrap();
        assert!(classes.classes().data().iter().all(|&c| c == -1));
    }

    #[test]
    fn test_below_threshold_is_no_change() {
        let a = Raster::filled(3, 3, 0.5);
        let b = Raster::filled(3, 3, 0.55);
        let classes = detect(&a, &b, &ChangeParams::default()).unwrap();
        assert!(classes.classes().data().iter().all(|&c| c == 0));
    }

    #[test]
    fn test_validation_precedes_shape_check() {
        let a: Raster<f64> = Raster::new(3, 3);
        let b: Raster<f64> = Raster::new(4, 4);
        let params = ChangeParams {
            window: 4,
            ..Default::default()
        };
        assert!(matches!(detect(&a, &b, &params), Err(Error::InvalidParameter { .. })));
        assert!(matches!(
            detect(&a, &b, &ChangeParams::default()),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_nodata_masked_in_either_grid() {
        let mut a = Raster::filled(3, 3, 0.2);
        a.set_nodata(Some(-3000.0));
        a.set(0, 0, -3000.0).unwrap();
        let mut b = Raster::filled(3, 3, 0.6);
        b.set(2, 2, f64::NAN).unwrap();

        let params = ChangeParams {
            window: 1,
            edge: EdgeMode::Reflect,
            ..Default::default()
        };
        let classes = detect(&a, &b, &params).unwrap();
        assert_eq!(classes.class_at(0, 0), None);
        assert_eq!(classes.class_at(2, 2), None);
        assert_eq!(classes.class_at(1, 1), Some(ChangeClass::Increase));
        assert_eq!(classes.classes().get(2, 2).unwrap(), 0);
    }

    #[test]
    fn test_masked_cells_do_not_spread() {
        // A huge nodata-driven difference must not vote in its neighbours' medians.
        let mut a = Raster::filled(3, 3, 0.5);
        a.set_nodata(Some(-3000.0));
        a.set(1, 0, -3000.0).unwrap();
        a.set(1, 1, -3000.0).unwrap();
        a.set(1, 2, -3000.0).unwrap();
        let mut b = Raster::filled(3, 3, 0.5);
        b.set(0, 0, 0.9).unwrap();

        let classes = detect(&a, &b, &ChangeParams::default()).unwrap();
        assert_eq!(classes.class_at(0, 1), Some(ChangeClass::NoChange));
        assert_eq!(classes.class_at(2, 1), Some(ChangeClass::NoChange));
        assert_eq!(classes.class_at(1, 1), None);
    }

    #[test]
    fn test_propagate_keeps_every_cell() {
        let a = Raster::filled(2, 2, 0.2);
        let mut b = Raster::filled(2, 2, 0.6);
        b.set(0, 1, f64::NAN).unwrap();
        let params = ChangeParams {
            window: 1,
            nodata: NodataPolicy::Propagate,
            ..Default::default()
        };
        let classes = detect(&a, &b, &params).unwrap();
        assert!(classes.valid_mask().is_none());
        assert_eq!(classes.class_at(0, 1), Some(ChangeClass::NoChange));
        assert_eq!(classes.class_at(0, 0), Some(ChangeClass::Increase));
    }
}
