//! Change statistics across an ordered series of grids

use std::borrow::Cow;
use tracing::{debug, info};
use vegchange_core::raster::Raster;
use vegchange_core::{Error, Result};
use vegchange_parallel::{ParallelStrategy, ProcessingMode};

use super::{ChangeParams, ChangeRecord, ChangeStats, ChangeTable, ClassGrid, detect};

/// An ordered series of grids that can be loaded by index.
///
/// In-memory slices hand out borrows; file-backed sources can load each grid
/// on demand so only the grids of the pairs in flight are held in memory.
pub trait GridSource: Sync {
    /// Number of grids in the series
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Load the grid at `index` (`index < len()`)
    fn load(&self, index: usize) -> Result<Cow<'_, Raster<f64>>>;
}

impl GridSource for [Raster<f64>] {
    fn len(&self) -> usize {
        <[Raster<f64>]>::len(self)
    }

    fn load(&self, index: usize) -> Result<Cow<'_, Raster<f64>>> {
        self.get(index).map(Cow::Borrowed).ok_or(Error::IndexOutOfBounds {
            row: index,
            col: 0,
            rows: <[Raster<f64>]>::len(self),
            cols: 1,
        })
    }
}

impl GridSource for Vec<Raster<f64>> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn load(&self, index: usize) -> Result<Cow<'_, Raster<f64>>> {
        self.as_slice().load(index)
    }
}

/// Class grids of every consecutive pair and their statistics, in series order.
#[derive(Debug, Clone)]
pub struct ChangeSeries {
    pub class_grids: Vec<ClassGrid>,
    pub table: ChangeTable,
}

fn check_series<S: GridSource + ?Sized>(series: &S, params: &ChangeParams) -> Result<usize> {
    params.validate()?;
    let len = series.len();
    if len < 2 {
        return Err(Error::InsufficientSeriesLength { len });
    }
    Ok(len - 1)
}

fn detect_pair<S: GridSource + ?Sized>(
    series: &S,
    index: usize,
    params: &ChangeParams,
) -> Result<(ClassGrid, ChangeStats)> {
    let earlier = series.load(index)?;
    let later = series.load(index + 1)?;
    let grid = detect(&earlier, &later, params)?;
    let stats = ChangeStats::from_class_grid(&grid);
    debug!(
        "pair {} to {}: +{:.2}% -{:.2}% ={:.2}% ({} masked)",
        index,
        index + 1,
        stats.increase_pct,
        stats.decrease_pct,
        stats.no_change_pct,
        stats.masked_cells
    );
    Ok((grid, stats))
}

/// Run change detection over every consecutive pair using all cores.
///
/// See [`aggregate_with`].
pub fn aggregate<S: GridSource + ?Sized>(
    series: &S,
    params: &ChangeParams,
) -> Result<ChangeSeries> {
    aggregate_with(series, params, ProcessingMode::default())
}

/// Run change detection over every consecutive pair of `series`.
///
/// Parameters are validated first, then the series must hold at least two
/// grids ([`Error::InsufficientSeriesLength`]). Pairs are independent and are
/// distributed according to `mode`; results are merged by pair index, so the
/// table and the class grids follow the series order. If any pair fails, the
/// error of the lowest failing pair is returned.
pub fn aggregate_with<S: GridSource + ?Sized>(
    series: &S,
    params: &ChangeParams,
    mode: ProcessingMode,
) -> Result<ChangeSeries> {
    let pairs = check_series(series, params)?;

    let results = mode.par_map(0..pairs, |i| detect_pair(series, i, params));

    let mut class_grids = Vec::with_capacity(pairs);
    let mut table = ChangeTable::new();
    for (i, result) in results.into_iter().enumerate() {
        let (grid, stats) = result?;
        table.push(ChangeRecord::new(i, &stats));
        class_grids.push(grid);
    }

    info!("Aggregated {} pair(s) from {} grids", pairs, pairs + 1);
    Ok(ChangeSeries { class_grids, table })
}

/// Like [`aggregate_with`] but keeps only the table; each class grid is
/// dropped as soon as it has been counted.
pub fn change_table<S: GridSource + ?Sized>(
    series: &S,
    params: &ChangeParams,
    mode: ProcessingMode,
) -> Result<ChangeTable> {
    let pairs = check_series(series, params)?;

    let results = mode.par_map(0..pairs, |i| {
        detect_pair(series, i, params).map(|(_, stats)| ChangeRecord::new(i, &stats))
    });

    let table = results.into_iter().collect::<Result<ChangeTable>>()?;
    info!("Tabulated {} pair(s)", table.len());
    Ok(table)
}
