//! # vegchange parallel
//!
//! Execution strategies for independent units of work, such as the
//! consecutive pairs of a raster time series.
//!
//! Results always come back in index order, whatever the mode, so callers can
//! rely on ordering for correctness. Without the `parallel` feature every mode
//! runs sequentially.

pub mod strategy;

pub use strategy::{ParallelStrategy, ProcessingMode, num_cpus};
