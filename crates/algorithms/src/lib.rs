//! # vegchange algorithms
//!
//! Change detection for vegetation index time series.
//!
//! ## Modules
//!
//! - **change**: difference, significance threshold, median denoising,
//!   sign classification, and per-pair statistics over a series
//! - **landcover**: NDVI land-cover classes for a single grid

pub mod change;
pub mod landcover;
mod maybe_rayon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::change::{
        ChangeClass, ChangeParams, ChangeRecord, ChangeSeries, ChangeStats, ChangeTable, ClassGrid,
        GridSource, NodataPolicy, aggregate, aggregate_with, change_table, classify, denoise,
        detect, difference, threshold,
    };
    pub use crate::landcover::{LandCover, LandCoverParams, land_cover, land_cover_summary};
    pub use vegchange_core::prelude::*;
    pub use vegchange_parallel::ProcessingMode;
}
