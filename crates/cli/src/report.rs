//! Change table export and console output

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use vegchange_algorithms::change::{ChangeStats, ChangeTable};
use vegchange_algorithms::landcover::LandCoverShare;
use vegchange_core::Raster;

/// Dimensions, georeferencing and value statistics of a raster, as printed by `info`.
pub fn describe_raster<W: Write>(out: &mut W, raster: &Raster<f64>, path: &Path) -> Result<()> {
    let (rows, cols) = raster.shape();
    let bounds = raster.bounds();
    let stats = raster.statistics();

    writeln!(out, "File: {}", path.display())?;
    writeln!(out, "Dimensions: {} x {} ({} cells)", cols, rows, raster.len())?;
    writeln!(out, "Cell size: {}", raster.cell_size())?;
    writeln!(
        out,
        "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
        bounds.0, bounds.1, bounds.2, bounds.3
    )?;
    let (x, y) = raster.transform().pixel_to_geo(0, 0);
    writeln!(out, "First cell center: ({:.6}, {:.6})", x, y)?;
    if let Some(crs) = raster.crs() {
        writeln!(out, "CRS: {}", crs)?;
    }
    if let Some(nodata) = raster.nodata() {
        writeln!(out, "NoData: {}", nodata)?;
    }

    writeln!(out, "\nStatistics:")?;
    if let Some(min) = stats.min {
        writeln!(out, "  Min: {:.4}", min)?;
    }
    if let Some(max) = stats.max {
        writeln!(out, "  Max: {:.4}", max)?;
    }
    if let Some(mean) = stats.mean {
        writeln!(out, "  Mean: {:.4}", mean)?;
    }
    if !raster.is_empty() {
        writeln!(
            out,
            "  Valid cells: {} ({:.1}%)",
            stats.valid_count,
            100.0 * stats.valid_count as f64 / raster.len() as f64
        )?;
    }
    Ok(())
}

/// Write the change table as CSV, one row per consecutive pair.
pub fn write_csv(table: &ChangeTable, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_csv_to(table, file)
}

pub fn write_csv_to<W: Write>(table: &ChangeTable, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in table {
        wtr.serialize(record).context("Failed to serialize change record")?;
    }
    wtr.flush().context("Failed to flush CSV output")?;
    Ok(())
}

pub fn print_table(table: &ChangeTable) {
    println!(
        "{:<12} {:>10} {:>10} {:>10} {:>12}",
        "Period", "Increase%", "Decrease%", "NoChange%", "Valid cells"
    );
    for r in table {
        println!(
            "{:<12} {:>10.2} {:>10.2} {:>10.2} {:>12}",
            r.period, r.increase_pct, r.decrease_pct, r.no_change_pct, r.valid_cells
        );
    }
    if let Some(r) = table.max_increase() {
        println!("\nLargest gain:    {} ({:.2}%)", r.period, r.increase_pct);
    }
    if let Some(r) = table.max_decrease() {
        println!("Largest loss:    {} ({:.2}%)", r.period, r.decrease_pct);
    }
}

pub fn print_stats(stats: &ChangeStats) {
    println!("  Increase:  {:>7.2}% ({} cells)", stats.increase_pct, stats.increase_cells);
    println!("  Decrease:  {:>7.2}% ({} cells)", stats.decrease_pct, stats.decrease_cells);
    println!("  No change: {:>7.2}% ({} cells)", stats.no_change_pct, stats.no_change_cells);
    if stats.masked_cells > 0 {
        println!("  Masked:    {} of {} cells", stats.masked_cells, stats.total_cells);
    }
}

pub fn print_land_cover(shares: &[LandCoverShare]) {
    for share in shares {
        println!(
            "  {:<28} {:>7.2}% ({} cells)",
            share.class.label(),
            share.percent,
            share.cells
        );
    }
}
