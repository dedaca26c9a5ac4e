//! Benchmarks for the change pipeline

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use vegchange_algorithms::change::{ChangeParams, aggregate_with, denoise, detect};
use vegchange_core::{EdgeMode, GeoTransform, Raster};
use vegchange_parallel::ProcessingMode;

fn create_ndvi(size: usize, phase: usize) -> Raster<f64> {
    let mut r = Raster::new(size, size);
    r.set_transform(GeoTransform::new(0.0, size as f64, 1.0, -1.0));
    for row in 0..size {
        for col in 0..size {
            let v = ((row * 7 + col * 13 + phase * 31) % 200) as f64 / 200.0;
            r.set(row, col, v).unwrap();
        }
    }
    r
}

fn bench_denoise(c: &mut Criterion) {
    let mut group = c.benchmark_group("denoise");
    for size in [256, 512, 1024] {
        let grid = create_ndvi(size, 0);
        group.bench_with_input(BenchmarkId::new("median_3x3", size), &grid, |b, g| {
            b.iter(|| denoise(black_box(g), 3, EdgeMode::Reflect).unwrap())
        });
    }
    group.finish();
}

fn bench_detect(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect");
    let params = ChangeParams::default();
    for size in [256, 512, 1024] {
        let pair = (create_ndvi(size, 0), create_ndvi(size, 1));
        group.bench_with_input(BenchmarkId::new("pair", size), &pair, |b, (x, y)| {
            b.iter(|| detect(black_box(x), black_box(y), &params).unwrap())
        });
    }
    group.finish();
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");
    group.sample_size(20);
    let series: Vec<Raster<f64>> = (0..12).map(|i| create_ndvi(256, i)).collect();
    let params = ChangeParams::default();
    for (name, mode) in [
        ("sequential", ProcessingMode::Sequential),
        ("parallel", ProcessingMode::Parallel),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| aggregate_with(black_box(&series), &params, mode).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_denoise, bench_detect, bench_aggregate);
criterion_main!(benches);
