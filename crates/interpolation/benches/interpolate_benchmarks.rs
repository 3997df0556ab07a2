//! Benchmarks for scattered-data interpolation.
//!
//! Run with: cargo bench --package interpolation --bench interpolate_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use interpolation::{interpolate, InterpolationMethod};
use rand::Rng;
use survey_common::{build_lattice, SamplePoint, SampleSet};

/// Scattered stations over a smooth anomaly with measurement noise.
fn generate_survey(count: usize) -> SampleSet {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| {
            let x: f64 = rng.gen_range(0.0..1000.0);
            let y: f64 = rng.gen_range(0.0..1000.0);
            let r2 = (x - 500.0).powi(2) + (y - 500.0).powi(2);
            let value = 30.0 * (-r2 / 80_000.0).exp() + rng.gen_range(-0.5..0.5);
            SamplePoint::new(x, y, value)
        })
        .collect()
}

// =============================================================================
// METHOD COMPARISON
// =============================================================================

fn bench_methods(c: &mut Criterion) {
    let mut group = c.benchmark_group("interpolate_methods");
    let samples = generate_survey(500);
    let lattice = build_lattice(&samples.bounds().unwrap(), 250).unwrap();
    group.throughput(Throughput::Elements(lattice.len() as u64));

    for method in InterpolationMethod::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(method), &method, |b, &method| {
            b.iter(|| black_box(interpolate(&samples, &lattice, method).unwrap()));
        });
    }

    group.finish();
}

// =============================================================================
// RESOLUTION SCALING
// =============================================================================

fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("interpolate_linear_resolution");
    group.sample_size(20);
    let samples = generate_survey(500);
    let bounds = samples.bounds().unwrap();

    for resolution in [100usize, 250, 500, 1000] {
        let lattice = build_lattice(&bounds, resolution).unwrap();
        group.throughput(Throughput::Elements(lattice.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(resolution),
            &lattice,
            |b, lattice| {
                b.iter(|| {
                    black_box(interpolate(&samples, lattice, InterpolationMethod::Linear).unwrap())
                });
            },
        );
    }

    group.finish();
}

fn bench_sample_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("interpolate_cubic_samples");
    group.sample_size(20);

    for count in [50usize, 500, 5000] {
        let samples = generate_survey(count);
        let lattice = build_lattice(&samples.bounds().unwrap(), 250).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(count), &samples, |b, samples| {
            b.iter(|| black_box(interpolate(samples, &lattice, InterpolationMethod::Cubic).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_methods, bench_resolution, bench_sample_count);
criterion_main!(benches);
