//! vegchange CLI - vegetation change detection over NDVI time series

mod report;
mod series;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use vegchange_algorithms::change::{
    ChangeParams, ChangeStats, GridSource, NodataPolicy, aggregate_with, detect,
};
use vegchange_algorithms::landcover::{LandCoverParams, land_cover, land_cover_summary};
use vegchange_core::io::{Compression, GeoTiffOptions, read_geotiff, write_geotiff};
use vegchange_core::{EdgeMode, Raster, RasterElement};
use vegchange_parallel::{ProcessingMode, num_cpus};

use series::TiffSeries;

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "vegchange")]
#[command(author, version, long_about = None)]
#[command(about = "Vegetation change detection from NDVI series")]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a raster file
    Info {
        /// Input raster file
        input: PathBuf,
    },
    /// Classify change between two NDVI rasters
    Detect {
        /// Earlier NDVI raster
        #[arg(long)]
        before: PathBuf,
        /// Later NDVI raster
        #[arg(long)]
        after: PathBuf,
        /// Output class raster (-1 decrease, 0 no change, 1 increase)
        output: PathBuf,
        #[command(flatten)]
        change: ChangeArgs,
        #[command(flatten)]
        output_args: OutputArgs,
    },
    /// Detect change across every consecutive pair of a directory of rasters
    Series {
        /// Directory of NDVI GeoTIFFs, ordered by file name
        input_dir: PathBuf,
        /// Directory for per-pair class rasters and the statistics table
        output_dir: PathBuf,
        #[command(flatten)]
        change: ChangeArgs,
        #[command(flatten)]
        output_args: OutputArgs,
        /// Number of worker threads (default: all cores)
        #[arg(short, long)]
        jobs: Option<usize>,
        /// Process pairs one after another
        #[arg(long, conflicts_with = "jobs")]
        sequential: bool,
        /// File name of the statistics table inside the output directory
        #[arg(long, default_value = "change_statistics.csv")]
        csv: String,
    },
    /// Classify an NDVI raster into land-cover classes
    LandCover {
        /// Input NDVI raster
        input: PathBuf,
        /// Output class raster (0 nodata, 1 water, 2 bare soil, 3 sparse, 4 dense)
        output: PathBuf,
        /// Upper NDVI bound of water
        #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
        water_below: f64,
        /// Upper NDVI bound of bare soil
        #[arg(long, default_value = "0.2")]
        bare_soil_below: f64,
        /// Upper NDVI bound of sparse vegetation
        #[arg(long, default_value = "0.5")]
        sparse_below: f64,
        #[command(flatten)]
        output_args: OutputArgs,
    },
}

#[derive(Args)]
struct ChangeArgs {
    /// Minimum absolute NDVI difference counted as change
    #[arg(short, long, default_value = "0.1")]
    threshold: f64,
    /// Median filter window size (odd, 1 disables smoothing)
    #[arg(short, long, default_value = "3")]
    window: usize,
    /// Border handling of the median filter: reflect, nearest, truncate
    #[arg(short, long, default_value = "reflect")]
    edge: String,
    /// Invalid cell handling: mask, propagate
    #[arg(short, long, default_value = "mask")]
    nodata: String,
}

#[derive(Args)]
struct OutputArgs {
    /// Output compression: none, lzw, deflate
    #[arg(long, default_value = "deflate")]
    compress: String,
}

impl ChangeArgs {
    fn params(&self) -> Result<ChangeParams> {
        let edge: EdgeMode = self.edge.parse()?;
        let nodata: NodataPolicy = self.nodata.parse()?;
        let params = ChangeParams {
            threshold: self.threshold,
            window: self.window,
            edge,
            nodata,
        };
        params.validate()?;
        Ok(params)
    }
}

impl OutputArgs {
    fn options(&self) -> Result<GeoTiffOptions> {
        parse_compression(&self.compress).map(|compression| GeoTiffOptions { compression })
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to install log subscriber")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn read_ndvi(path: &Path) -> Result<Raster<f64>> {
    let pb = spinner("Reading raster...");
    let raster: Raster<f64> = read_geotiff(path)
        .with_context(|| format!("Failed to read raster {}", path.display()))?;
    pb.finish_and_clear();
    info!("Input: {} x {}", raster.cols(), raster.rows());
    Ok(raster)
}

fn write_result<T: RasterElement>(
    raster: &Raster<T>,
    path: &Path,
    options: GeoTiffOptions,
) -> Result<()> {
    let pb = spinner("Writing output...");
    write_geotiff(raster, path, Some(options))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    pb.finish_and_clear();
    Ok(())
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

fn parse_compression(s: &str) -> Result<Compression> {
    match s.to_lowercase().as_str() {
        "none" => Ok(Compression::None),
        "lzw" => Ok(Compression::Lzw),
        "deflate" | "zip" => Ok(Compression::Deflate),
        _ => anyhow::bail!("Unknown compression: {}. Use none, lzw, or deflate.", s),
    }
}

fn processing_mode(jobs: Option<usize>, sequential: bool) -> Result<ProcessingMode> {
    match jobs {
        Some(0) => anyhow::bail!("--jobs must be at least 1"),
        Some(n) => Ok(ProcessingMode::ParallelWith(n)),
        None if sequential => Ok(ProcessingMode::Sequential),
        None => Ok(ProcessingMode::Parallel),
    }
}

fn worker_threads(mode: ProcessingMode) -> usize {
    match mode {
        ProcessingMode::Sequential => 1,
        ProcessingMode::Parallel => num_cpus(),
        ProcessingMode::ParallelWith(n) => n,
    }
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Info { input } => {
            let raster = read_ndvi(&input)?;
            report::describe_raster(&mut std::io::stdout().lock(), &raster, &input)?;
        }

        Commands::Detect {
            before,
            after,
            output,
            change,
            output_args,
        } => {
            let params = change.params()?;
            let options = output_args.options()?;
            let earlier = read_ndvi(&before)?;
            let later = read_ndvi(&after)?;

            let start = Instant::now();
            let pb = spinner("Detecting change...");
            let classes = detect(&earlier, &later, &params).context("Change detection failed")?;
            pb.finish_and_clear();
            let stats = ChangeStats::from_class_grid(&classes);
            let elapsed = start.elapsed();

            write_result(&classes.to_raster(), &output, options)?;
            report::print_stats(&stats);
            done("Change classes", &output, elapsed);
        }

        Commands::Series {
            input_dir,
            output_dir,
            change,
            output_args,
            jobs,
            sequential,
            csv,
        } => {
            let params = change.params()?;
            let options = output_args.options()?;
            let mode = processing_mode(jobs, sequential)?;

            let series = TiffSeries::discover(&input_dir)?;
            info!("Found {} rasters in {}", series.len(), input_dir.display());
            info!("Using {} worker thread(s)", worker_threads(mode));
            std::fs::create_dir_all(&output_dir).with_context(|| {
                format!("Failed to create output directory {}", output_dir.display())
            })?;

            let start = Instant::now();
            let pb = spinner(&format!(
                "Detecting change across {} pairs...",
                series.len().saturating_sub(1)
            ));
            let result = aggregate_with(&series, &params, mode).context("Change detection failed")?;
            pb.finish_and_clear();

            for record in &result.table {
                let grid = &result.class_grids[record.from_index];
                let name = format!("changes_{}_to_{}.tif", record.from_index, record.to_index);
                write_result(&grid.to_raster(), &output_dir.join(name), options.clone())?;
            }
            let csv_path = output_dir.join(&csv);
            report::write_csv(&result.table, &csv_path)?;
            let elapsed = start.elapsed();

            report::print_table(&result.table);
            println!();
            done("Change statistics", &csv_path, elapsed);
        }

        Commands::LandCover {
            input,
            output,
            water_below,
            bare_soil_below,
            sparse_below,
            output_args,
        } => {
            let options = output_args.options()?;
            let ndvi = read_ndvi(&input)?;
            let params = LandCoverParams {
                water_below,
                bare_soil_below,
                sparse_below,
            };

            let start = Instant::now();
            let pb = spinner("Classifying land cover...");
            let classes = land_cover(&ndvi, params).context("Land-cover classification failed")?;
            pb.finish_and_clear();
            let elapsed = start.elapsed();

            write_result(&classes, &output, options)?;
            report::print_land_cover(&land_cover_summary(&classes));
            done("Land cover", &output, elapsed);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_mode() {
        assert_eq!(processing_mode(None, false).unwrap(), ProcessingMode::Parallel);
        assert_eq!(processing_mode(None, true).unwrap(), ProcessingMode::Sequential);
        assert_eq!(
            processing_mode(Some(4), false).unwrap(),
            ProcessingMode::ParallelWith(4)
        );
        assert!(processing_mode(Some(0), false).is_err());
    }

    #[test]
    fn test_worker_threads() {
        assert_eq!(worker_threads(ProcessingMode::Sequential), 1);
        assert_eq!(worker_threads(ProcessingMode::ParallelWith(3)), 3);
        assert!(worker_threads(ProcessingMode::Parallel) >= 1);
    }

    #[test]
    fn test_land_cover_compression() {
        let cli =
            Cli::try_parse_from(["vegchange", "land-cover", "ndvi.tif", "cover.tif"]).unwrap();
        match cli.command {
            Commands::LandCover { output_args, .. } => {
                assert_eq!(output_args.options().unwrap().compression, Compression::Deflate);
            }
            _ => panic!("expected land-cover command"),
        }

        let cli = Cli::try_parse_from([
            "vegchange",
            "land-cover",
            "ndvi.tif",
            "cover.tif",
            "--compress",
            "lzw",
        ])
        .unwrap();
        match cli.command {
            Commands::LandCover { output_args, .. } => {
                assert_eq!(output_args.options().unwrap().compression, Compression::Lzw);
            }
            _ => panic!("expected land-cover command"),
        }
    }

    #[test]
    fn test_parse_compression() {
        assert_eq!(parse_compression("LZW").unwrap(), Compression::Lzw);
        assert_eq!(parse_compression("zip").unwrap(), Compression::Deflate);
        assert!(parse_compression("jpeg").is_err());
    }

    #[test]
    fn test_cli_parses_series() {
        let cli = Cli::try_parse_from([
            "vegchange",
            "series",
            "in",
            "out",
            "--threshold",
            "0.15",
            "--window",
            "5",
            "--edge",
            "nearest",
            "--jobs",
            "2",
        ])
        .unwrap();
        match cli.command {
            Commands::Series { change, jobs, csv, .. } => {
                let params = change.params().unwrap();
                assert_eq!(params.threshold, 0.15);
                assert_eq!(params.window, 5);
                assert_eq!(params.edge, EdgeMode::Nearest);
                assert_eq!(jobs, Some(2));
                assert_eq!(csv, "change_statistics.csv");
            }
            _ => panic!("expected series command"),
        }
    }

    #[test]
    fn test_change_args_reject_even_window() {
        let cli = Cli::try_parse_from([
            "vegchange",
            "detect",
            "--before",
            "a.tif",
            "--after",
            "b.tif",
            "out.tif",
            "--window",
            "4",
        ])
        .unwrap();
        match cli.command {
            Commands::Detect { change, .. } => assert!(change.params().is_err()),
            _ => panic!("expected detect command"),
        }
    }

    #[test]
    fn test_series_end_to_end() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        for (name, v) in [("t0.tif", 0.2), ("t1.tif", 0.6), ("t2.tif", 0.6)] {
            let r = Raster::filled(4, 4, v);
            write_geotiff(&r, input.path().join(name), None).unwrap();
        }

        let series = TiffSeries::discover(input.path()).unwrap();
        let result =
            aggregate_with(&series, &ChangeParams::default(), ProcessingMode::Sequential).unwrap();
        assert_eq!(result.table.len(), 2);
        assert_eq!(result.table.records()[0].increase_pct, 100.0);
        assert_eq!(result.table.records()[1].no_change_pct, 100.0);

        let csv_path = output.path().join("change_statistics.csv");
        report::write_csv(&result.table, &csv_path).unwrap();
        assert!(csv_path.exists());
    }
}
