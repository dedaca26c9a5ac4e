//! File-backed NDVI series

use anyhow::{Context, Result};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::debug;

use vegchange_algorithms::change::GridSource;
use vegchange_core::Raster;
use vegchange_core::io::read_geotiff;

/// GeoTIFF files of a directory, ordered by file name. Each grid is read
/// from disk only when its pair is processed.
#[derive(Debug, Clone)]
pub struct TiffSeries {
    paths: Vec<PathBuf>,
}

impl TiffSeries {
    pub fn discover(dir: &Path) -> Result<Self> {
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read input directory {}", dir.display()))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && is_tiff(&path) {
                paths.push(path);
            }
        }
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(Self { paths })
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

fn is_tiff(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("tif") || e.eq_ignore_ascii_case("tiff"))
}

impl GridSource for TiffSeries {
    fn len(&self) -> usize {
        self.paths.len()
    }

    fn load(&self, index: usize) -> vegchange_core::Result<Cow<'_, Raster<f64>>> {
        let path = &self.paths[index];
        debug!("Loading {}", path.display());
        read_geotiff(path).map(Cow::Owned)
    }
}
