//! Affine georeferencing of a raster

use serde::{Deserialize, Serialize};

/// Affine transformation between pixel (col, row) and map (x, y) coordinates:
///
/// ```text
/// x = origin_x + col * pixel_width + row * row_rotation
/// y = origin_y + col * col_rotation + row * pixel_height
/// ```
///
/// For north-up images the rotation terms are 0 and `pixel_height` is negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    /// X coordinate of the upper-left corner
    pub origin_x: f64,
    /// Y coordinate of the upper-left corner
    pub origin_y: f64,
    /// Cell size in X
    pub pixel_width: f64,
    /// Cell size in Y (usually negative)
    pub pixel_height: f64,
    pub row_rotation: f64,
    pub col_rotation: f64,
}

impl GeoTransform {
    /// North-up transform with no rotation
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
            row_rotation: 0.0,
            col_rotation: 0.0,
        }
    }

    /// Build from the GeoTIFF ModelTiepoint `[I, J, K, X, Y, Z]` and
    /// ModelPixelScale `[ScaleX, ScaleY, ScaleZ]` tags.
    ///
    /// Returns `None` when either tag is too short.
    pub fn from_tiepoint_scale(tiepoint: &[f64], scale: &[f64]) -> Option<Self> {
        if tiepoint.len() < 6 || scale.len() < 2 {
            return None;
        }
        let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
        let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
        Some(Self::new(origin_x, origin_y, scale[0], -scale[1]))
    }

    /// Tiepoint anchored at pixel (0, 0)
    pub fn tiepoint(&self) -> [f64; 6] {
        [0.0, 0.0, 0.0, self.origin_x, self.origin_y, 0.0]
    }

    /// Pixel scale as stored in GeoTIFF (both components positive)
    pub fn pixel_scale(&self) -> [f64; 3] {
        [self.pixel_width.abs(), self.pixel_height.abs(), 0.0]
    }

    /// Map coordinates of a pixel's upper-left corner
    pub fn pixel_to_geo_corner(&self, col: usize, row: usize) -> (f64, f64) {
        let (c, r) = (col as f64, row as f64);
        (
            self.origin_x + c * self.pixel_width + r * self.row_rotation,
            self.origin_y + c * self.col_rotation + r * self.pixel_height,
        )
    }

    /// Map coordinates of a pixel's center
    pub fn pixel_to_geo(&self, col: usize, row: usize) -> (f64, f64) {
        let (x, y) = self.pixel_to_geo_corner(col, row);
        (
            x + 0.5 * (self.pixel_width + self.row_rotation),
            y + 0.5 * (self.col_rotation + self.pixel_height),
        )
    }

    /// Cell size (assumes square pixels and no rotation)
    pub fn cell_size(&self) -> f64 {
        self.pixel_width.abs()
    }

    /// Bounding box `(min_x, min_y, max_x, max_y)` of a `width x height` raster
    pub fn bounds(&self, width: usize, height: usize) -> (f64, f64, f64, f64) {
        let corners = [
            self.pixel_to_geo_corner(0, 0),
            self.pixel_to_geo_corner(width, 0),
            self.pixel_to_geo_corner(0, height),
            self.pixel_to_geo_corner(width, height),
        ];
        corners.iter().fold(
            (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            |(min_x, min_y, max_x, max_y), &(x, y)| {
                (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
            },
        )
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, -1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_tiepoint_scale_roundtrip() {
        let gt = GeoTransform::new(12.5, -8.0, 0.0025, -0.0025);
        let back = GeoTransform::from_tiepoint_scale(&gt.tiepoint(), &gt.pixel_scale()).unwrap();
        assert_eq!(back, gt);
    }

    #[test]
    fn test_tiepoint_too_short() {
        assert!(GeoTransform::from_tiepoint_scale(&[0.0, 0.0, 0.0], &[1.0, 1.0]).is_none());
    }

    #[test]
    fn test_pixel_center() {
        let gt = GeoTransform::new(100.0, 200.0, 10.0, -10.0);
        let (x, y) = gt.pixel_to_geo(5, 10);
        assert_relative_eq!(x, 155.0, epsilon = 1e-10);
        assert_relative_eq!(y, 95.0, epsilon = 1e-10);
    }

    #[test]
    fn test_bounds() {
        let gt = GeoTransform::new(0.0, 100.0, 1.0, -1.0);
        let (min_x, min_y, max_x, max_y) = gt.bounds(100, 50);
        assert_relative_eq!(min_x, 0.0, epsilon = 1e-10);
        assert_relative_eq!(min_y, 50.0, epsilon = 1e-10);
        assert_relative_eq!(max_x, 100.0, epsilon = 1e-10);
        assert_relative_eq!(max_y, 100.0, epsilon = 1e-10);
    }
}
