//! Reading and writing single-band GeoTIFF rasters

mod native;

pub use native::{
    Compression, GeoTiffOptions, read_geotiff, read_geotiff_from_buffer, write_geotiff,
    write_geotiff_to_buffer,
};
