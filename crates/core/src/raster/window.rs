//! Square moving windows and boundary handling

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a moving window samples cells that fall outside the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeMode {
    /// Mirror about the outer edge, repeating the edge cell:
    /// `d c b a | a b c d | d c b a`
    #[default]
    Reflect,
    /// Repeat the closest edge cell: `a a a a | a b c d | d d d d`
    Nearest,
    /// Drop samples outside the grid
    Truncate,
}

impl EdgeMode {
    /// Map a possibly out-of-range index onto `0..len`.
    ///
    /// Returns `None` only for [`EdgeMode::Truncate`] outside the grid, or when `len == 0`.
    pub fn resolve(self, index: isize, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let n = len as isize;
        if (0..n).contains(&index) {
            return Some(index as usize);
        }
        match self {
            EdgeMode::Reflect => {
                // Reflection with a repeated edge is periodic in 2n.
                let m = index.rem_euclid(2 * n);
                let folded = if m < n { m } else { 2 * n - 1 - m };
                Some(folded as usize)
            }
            EdgeMode::Nearest => Some(index.clamp(0, n - 1) as usize),
            EdgeMode::Truncate => None,
        }
    }
}

impl fmt::Display for EdgeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EdgeMode::Reflect => "reflect",
            EdgeMode::Nearest => "nearest",
            EdgeMode::Truncate => "truncate",
        };
        f.write_str(name)
    }
}

impl FromStr for EdgeMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "reflect" | "mirror" => Ok(EdgeMode::Reflect),
            "nearest" | "clamp" => Ok(EdgeMode::Nearest),
            "truncate" | "none" => Ok(EdgeMode::Truncate),
            _ => Err(Error::invalid_parameter(
                "edge",
                s,
                "expected reflect, nearest or truncate",
            )),
        }
    }
}

/// A square `size x size` window centered on a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    size: usize,
}

impl Window {
    /// Create a window; `size` must be odd and at least 1.
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 || size % 2 == 0 {
            return Err(Error::invalid_parameter(
                "window",
                size,
                "must be an odd number >= 1",
            ));
        }
        Ok(Self { size })
    }

    /// Side length in cells
    pub fn size(&self) -> usize {
        self.size
    }

    /// Cells on each side of the center
    pub fn radius(&self) -> usize {
        self.size / 2
    }

    /// Relative `(row, col)` offsets covered by the window, row-major
    pub fn offsets(&self) -> Vec<(isize, isize)> {
        let r = self.radius() as isize;
        (-r..=r)
            .flat_map(|dr| (-r..=r).map(move |dc| (dr, dc)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_validation() {
        assert!(Window::new(0).is_err());
        assert!(Window::new(4).is_err());
        assert_eq!(Window::new(1).unwrap().radius(), 0);
        assert_eq!(Window::new(5).unwrap().radius(), 2);
    }

    #[test]
    fn test_window_offsets() {
        let w = Window::new(3).unwrap();
        let offsets = w.offsets();
        assert_eq!(offsets.len(), 9);
        assert_eq!(offsets[0], (-1, -1));
        assert_eq!(offsets[4], (0, 0));
        assert_eq!(offsets[8], (1, 1));
    }

    #[test]
    fn test_reflect_repeats_edge() {
        // d c b a | a b c d | d c b a
        let m = EdgeMode::Reflect;
        assert_eq!(m.resolve(-1, 4), Some(0));
        assert_eq!(m.resolve(-2, 4), Some(1));
        assert_eq!(m.resolve(-4, 4), Some(3));
        assert_eq!(m.resolve(4, 4), Some(3));
        assert_eq!(m.resolve(5, 4), Some(2));
        assert_eq!(m.resolve(2, 4), Some(2));
    }

    #[test]
    fn test_reflect_wider_than_grid() {
        let m = EdgeMode::Reflect;
        assert_eq!(m.resolve(-3, 2), Some(1));
        assert_eq!(m.resolve(-5, 2), Some(0));
        assert_eq!(m.resolve(7, 1), Some(0));
    }

    #[test]
    fn test_nearest_and_truncate() {
        assert_eq!(EdgeMode::Nearest.resolve(-3, 4), Some(0));
        assert_eq!(EdgeMode::Nearest.resolve(9, 4), Some(3));
        assert_eq!(EdgeMode::Truncate.resolve(-1, 4), None);
        assert_eq!(EdgeMode::Truncate.resolve(3, 4), Some(3));
        assert_eq!(EdgeMode::Reflect.resolve(0, 0), None);
    }

    #[test]
    fn test_edge_mode_parse() {
        assert_eq!("Reflect".parse::<EdgeMode>().unwrap(), EdgeMode::Reflect);
        assert_eq!("nearest".parse::<EdgeMode>().unwrap(), EdgeMode::Nearest);
        assert!("wrap".parse::<EdgeMode>().is_err());
        assert_eq!(EdgeMode::Truncate.to_string(), "truncate");
    }
}
