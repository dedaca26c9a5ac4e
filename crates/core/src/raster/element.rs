//! Cell value types

use num_traits::{NumCast, Zero};
use std::fmt::Debug;

/// Types that can be stored in a raster cell.
///
/// Vegetation index grids are `f64`, change classes are `i8` and land-cover
/// codes are `u8`; the integer widths read from GeoTIFF files are covered too.
pub trait RasterElement:
    Copy + Debug + PartialOrd + PartialEq + NumCast + Zero + Send + Sync + 'static
{
    /// Marker used for missing cells when a decoded value cannot be cast
    fn default_nodata() -> Self;

    /// Whether this value is missing, given the raster's declared nodata marker.
    ///
    /// Floating point NaN always counts as missing.
    fn is_nodata(&self, nodata: Option<Self>) -> bool;

    /// Convert self to f64
    fn to_f64(self) -> Option<f64> {
        NumCast::from(self)
    }
}

macro_rules! impl_raster_element_int {
    ($($t:ty),*) => {
        $(
            impl RasterElement for $t {
                fn default_nodata() -> Self {
                    <$t>::MIN
                }

                fn is_nodata(&self, nodata: Option<Self>) -> bool {
                    nodata.is_some_and(|nd| *self == nd)
                }
            }
        )*
    };
}

macro_rules! impl_raster_element_float {
    ($($t:ty),*) => {
        $(
            impl RasterElement for $t {
                fn default_nodata() -> Self {
                    <$t>::NAN
                }

                fn is_nodata(&self, nodata: Option<Self>) -> bool {
                    if self.is_nan() {
                        return true;
                    }
                    match nodata {
                        Some(nd) if nd.is_nan() => false,
                        Some(nd) => (self - nd).abs() <= <$t>::EPSILON * nd.abs().max(1.0),
                        None => false,
                    }
                }
            }
        )*
    };
}

impl_raster_element_int!(i8, i16, i32, u8, u16, u32);
impl_raster_element_float!(f32, f64);
