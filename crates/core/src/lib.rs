//! # vegchange core
//!
//! Raster types, errors and GeoTIFF I/O shared by the vegchange crates.
//!
//! This crate provides:
//! - `Raster<T>`: a 2D grid with opaque georeferencing metadata
//! - `GeoTransform` and `CRS`: metadata carried through every derived grid
//! - `Window` / `EdgeMode`: square moving windows and boundary policies
//! - GeoTIFF reading and writing (transform, EPSG code, nodata marker)

pub mod crs;
pub mod error;
pub mod io;
pub mod raster;

pub use crs::CRS;
pub use error::{Error, Result};
pub use raster::{EdgeMode, GeoTransform, Raster, RasterElement, Window};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::CRS;
    pub use crate::error::{Error, Result};
    pub use crate::raster::{EdgeMode, GeoTransform, Raster, RasterElement, Window};
}
