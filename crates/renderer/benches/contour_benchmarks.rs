//! Benchmarks for contour extraction.
//!
//! Run with: cargo bench --package renderer --bench contour_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use renderer::contour::{
    connect_segments, evenly_spaced_levels, generate_contours, march_squares, smooth_contour,
};
use survey_common::Field;

/// Several overlapping bumps: many closed rings per level.
fn generate_smooth_field(n: usize) -> Vec<f64> {
    let centres = [(0.3, 0.3, 5.0), (0.7, 0.6, -4.0), (0.5, 0.8, 3.0)];
    (0..n * n)
        .map(|i| {
            let (x, y) = ((i % n) as f64 / n as f64, (i / n) as f64 / n as f64);
            centres
                .iter()
                .map(|&(cx, cy, a)| a * (-((x - cx).powi(2) + (y - cy).powi(2)) * 30.0).exp())
                .sum()
        })
        .collect()
}

fn generate_noisy_field(n: usize) -> Vec<f64> {
    let mut rng = rand::thread_rng();
    generate_smooth_field(n)
        .into_iter()
        .map(|v| v + rng.gen_range(-0.5..0.5))
        .collect()
}

fn bench_march_squares(c: &mut Criterion) {
    let mut group = c.benchmark_group("march_squares");
    for n in [100, 300, 1000] {
        let data = generate_smooth_field(n);
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &data, |b, data| {
            b.iter(|| march_squares(black_box(data), n, n, 1.0))
        });
    }
    group.finish();
}

fn bench_connect_segments(c: &mut Criterion) {
    let mut group = c.benchmark_group("connect_segments");
    for (label, data) in [
        ("smooth", generate_smooth_field(300)),
        ("noisy", generate_noisy_field(300)),
    ] {
        let segments = march_squares(&data, 300, 300, 1.0);
        group.bench_function(label, |b| b.iter(|| connect_segments(black_box(segments.clone()))));
    }
    group.finish();
}

fn bench_smoothing(c: &mut Criterion) {
    let mut group = c.benchmark_group("smooth_contour");
    let data = generate_smooth_field(300);
    let contours = connect_segments(march_squares(&data, 300, 300, 1.0));
    for passes in [1, 2, 4] {
        group.bench_with_input(BenchmarkId::from_parameter(passes), &passes, |b, &passes| {
            b.iter(|| {
                contours
                    .iter()
                    .map(|c| smooth_contour(black_box(c), passes).points.len())
                    .sum::<usize>()
            })
        });
    }
    group.finish();
}

fn bench_generate_contours(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_contours");
    group.sample_size(20);
    let n = 300;
    let field = Field::from_values(n, n, generate_smooth_field(n)).expect("square field");
    let (lo, hi) = field.finite_range().expect("finite values");

    for count in [5, 10, 40] {
        let levels = evenly_spaced_levels(lo, hi, count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &levels, |b, levels| {
            b.iter(|| generate_contours(black_box(&field), levels, 1))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_march_squares,
    bench_connect_segments,
    bench_smoothing,
    bench_generate_contours,
);
criterion_main!(benches);
