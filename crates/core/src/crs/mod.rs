//! Coordinate Reference System handling

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coordinate reference system of a raster, identified by its EPSG code.
///
/// Only carried through the pipeline; vegchange never reprojects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CRS {
    epsg: u32,
}

impl CRS {
    /// Create a CRS from an EPSG code
    pub fn from_epsg(code: u32) -> Self {
        Self { epsg: code }
    }

    /// WGS84 geographic CRS (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::from_epsg(4326)
    }

    pub fn epsg(&self) -> u32 {
        self.epsg
    }

    /// Whether the EPSG code denotes a geographic (lat/lon) system.
    ///
    /// Geographic 2D codes in the EPSG registry live in 4000..5000.
    pub fn is_geographic(&self) -> bool {
        (4000..5000).contains(&self.epsg)
    }
}

impl fmt::Display for CRS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg)
    }
}
