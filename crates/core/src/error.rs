//! Error types for vegchange

use thiserror::Error;

/// Main error type for raster and change detection operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// Two grids of a pair do not share the same (rows, cols).
    #[error("Raster shape mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    ShapeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    /// A change series needs at least two grids to form a pair.
    #[error("Series of {len} grid(s) is too short: at least 2 are required")]
    InsufficientSeriesLength { len: usize },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build a shape mismatch from the expected and actual `(rows, cols)`.
    pub fn shape_mismatch(expected: (usize, usize), actual: (usize, usize)) -> Self {
        Error::ShapeMismatch {
            er: expected.0,
            ec: expected.1,
            ar: actual.0,
            ac: actual.1,
        }
    }

    pub fn invalid_parameter(
        name: &'static str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Error::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for vegchange operations
pub type Result<T> = std::result::Result<T, Error>;
