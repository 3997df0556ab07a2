//! Synthetic survey generators.
//!
//! These create predictable, verifiable sample sets and fields that can be
//! used across the test suite. All "random" placement is driven by a
//! deterministic hash so every run sees the same points.

use survey_common::{Field, SamplePoint, SampleSet};

/// Samples of the plane `a*x + b*y + c` on a regular `n × n` grid spanning
/// `[0, extent]` on both axes.
///
/// Triangulation-based methods reproduce this exactly (linear) or to within
/// gradient-estimation tolerance (cubic).
///
/// # Example
///
/// ```
/// use test_utils::create_plane_samples;
///
/// let samples = create_plane_samples(3, 2.0, (1.0, 0.0, 0.5));
/// assert_eq!(samples.len(), 9);
/// assert_eq!(samples.points()[1].value, 1.5); // x = 1, y = 0
/// ```
pub fn create_plane_samples(n: usize, extent: f64, (a, b, c): (f64, f64, f64)) -> SampleSet {
    let step = if n > 1 { extent / (n - 1) as f64 } else { 0.0 };
    let mut points = Vec::with_capacity(n * n);
    for row in 0..n {
        for col in 0..n {
            let x = col as f64 * step;
            let y = row as f64 * step;
            points.push(SamplePoint::new(x, y, a * x + b * y + c));
        }
    }
    SampleSet::new(points)
}

/// Scattered samples of a Gaussian anomaly centred in `[0, extent]²`.
///
/// Values are `amplitude * exp(-r² / (2 σ²))` with `σ = extent / 5`, the
/// shape of a typical isolated gravity or magnetic anomaly. Locations are
/// spread by a deterministic hash of `seed`.
pub fn create_anomaly_samples(count: usize, extent: f64, amplitude: f64, seed: u32) -> SampleSet {
    let centre = extent / 2.0;
    let sigma = extent / 5.0;
    let points = (0..count as u32).map(|i| {
        let x = unit(simple_hash(i, 0, seed)) * extent;
        let y = unit(simple_hash(i, 1, seed)) * extent;
        let r2 = (x - centre).powi(2) + (y - centre).powi(2);
        SamplePoint::new(x, y, amplitude * (-r2 / (2.0 * sigma * sigma)).exp())
    });
    SampleSet::new(points)
}

/// Evaluate the same anomaly as [`create_anomaly_samples`] at `(x, y)`.
pub fn anomaly_value(x: f64, y: f64, extent: f64, amplitude: f64) -> f64 {
    let centre = extent / 2.0;
    let sigma = extent / 5.0;
    let r2 = (x - centre).powi(2) + (y - centre).powi(2);
    amplitude * (-r2 / (2.0 * sigma * sigma)).exp()
}

/// A `n × n` grid of stations jittered by up to `jitter` of the spacing,
/// with values `x * 1000 + y` so a sample's origin is easy to read back.
pub fn create_jittered_grid_samples(n: usize, spacing: f64, jitter: f64, seed: u32) -> SampleSet {
    let mut points = Vec::with_capacity(n * n);
    for row in 0..n as u32 {
        for col in 0..n as u32 {
            let dx = (unit(simple_hash(col, row, seed)) - 0.5) * jitter * spacing;
            let dy = (unit(simple_hash(row, col, seed ^ 0x9e37)) - 0.5) * jitter * spacing;
            let x = col as f64 * spacing + dx;
            let y = row as f64 * spacing + dy;
            points.push(SamplePoint::new(x, y, x * 1000.0 + y));
        }
    }
    SampleSet::new(points)
}

/// A field of `nx × ny` values ramping from `lo` (first node) to `hi`
/// (last node) in row-major order.
pub fn create_ramp_field(nx: usize, ny: usize, lo: f64, hi: f64) -> Field {
    let n = nx * ny;
    let span = if n > 1 { (hi - lo) / (n - 1) as f64 } else { 0.0 };
    let values = (0..n).map(|i| lo + i as f64 * span).collect();
    Field::from_values(nx, ny, values).unwrap_or_else(|_| Field::undefined(nx, ny))
}

/// Creates a field with NaN values at specified positions, `fill` elsewhere.
pub fn create_field_with_nans(
    nx: usize,
    ny: usize,
    fill: f64,
    nan_positions: &[(usize, usize)],
) -> Field {
    let mut field = Field::undefined(nx, ny);
    field.values_mut().iter_mut().for_each(|v| *v = fill);
    for &(col, row) in nan_positions {
        if col < nx && row < ny {
            field.values_mut()[row * nx + col] = f64::NAN;
        }
    }
    field
}

/// Map a hash onto `[0, 1)`.
fn unit(h: u32) -> f64 {
    h as f64 / (u32::MAX as f64 + 1.0)
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}
