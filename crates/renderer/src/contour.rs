//! Contour line (isoline) extraction using the marching squares algorithm.
//!
//! Contours are produced in lattice index space: `x` is a fractional column
//! and `y` a fractional row (row 0 = minimum Y). Cells touching an
//! undefined node are skipped, so lines stop at the edge of the data.

use std::collections::{HashMap, VecDeque};

use survey_common::Field;

/// A point in lattice index space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A line segment crossing one cell
#[derive(Debug, Clone)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
    /// Identity of the lattice edge each endpoint lies on.
    start_edge: usize,
    end_edge: usize,
}

/// A complete contour line (polyline)
#[derive(Debug, Clone)]
pub struct Contour {
    pub level: f64,
    pub points: Vec<Point>,
    pub closed: bool,
}

/// `count` levels evenly spaced strictly inside `[min, max]`.
///
/// Empty when `count` is 0 or the range has no width.
pub fn evenly_spaced_levels(min: f64, max: f64, count: usize) -> Vec<f64> {
    if count == 0 || !(max > min) {
        return vec![];
    }
    let step = (max - min) / (count + 1) as f64;
    (1..=count).map(|i| min + i as f64 * step).collect()
}

/// Extract and join the contours of `field` at each level.
///
/// `smoothing_passes` rounds of Chaikin corner cutting are applied to every
/// polyline.
pub fn generate_contours(field: &Field, levels: &[f64], smoothing_passes: u32) -> Vec<Contour> {
    let mut contours = Vec::new();
    for &level in levels {
        let segments = march_squares(field.values(), field.nx(), field.ny(), level);
        for mut contour in connect_segments(segments) {
            contour.level = level;
            contours.push(smooth_contour(&contour, smoothing_passes));
        }
    }
    contours
}

/// Marching squares over a row-major grid.
///
/// Cell `(x, y)` has corners `c00 = (x, y)`, `c10 = (x+1, y)`,
/// `c11 = (x+1, y+1)` and `c01 = (x, y+1)`.
pub fn march_squares(data: &[f64], width: usize, height: usize, level: f64) -> Vec<Segment> {
    if width < 2 || height < 2 || data.len() != width * height || !level.is_finite() {
        return vec![];
    }

    let horizontal = |x: usize, y: usize| 2 * (y * width + x);
    let vertical = |x: usize, y: usize| 2 * (y * width + x) + 1;

    let mut segments = Vec::new();

    for y in 0..(height - 1) {
        for x in 0..(width - 1) {
            let c00 = data[y * width + x];
            let c10 = data[y * width + x + 1];
            let c11 = data[(y + 1) * width + x + 1];
            let c01 = data[(y + 1) * width + x];

            if c00.is_nan() || c10.is_nan() || c11.is_nan() || c01.is_nan() {
                continue;
            }

            let mut cell_index = 0u8;
            if c00 >= level {
                cell_index |= 1;
            }
            if c10 >= level {
                cell_index |= 2;
            }
            if c11 >= level {
                cell_index |= 4;
            }
            if c01 >= level {
                cell_index |= 8;
            }
            if cell_index == 0 || cell_index == 15 {
                continue;
            }

            let (fx, fy) = (x as f32, y as f32);
            let low = (
                interpolate_edge(fx, fy, fx + 1.0, fy, c00, c10, level),
                horizontal(x, y),
            );
            let right = (
                interpolate_edge(fx + 1.0, fy, fx + 1.0, fy + 1.0, c10, c11, level),
                vertical(x + 1, y),
            );
            let high = (
                interpolate_edge(fx, fy + 1.0, fx + 1.0, fy + 1.0, c01, c11, level),
                horizontal(x, y + 1),
            );
            let left = (
                interpolate_edge(fx, fy, fx, fy + 1.0, c00, c01, level),
                vertical(x, y),
            );

            let mut push = |a: (Point, usize), b: (Point, usize)| {
                segments.push(Segment {
                    start: a.0,
                    end: b.0,
                    start_edge: a.1,
                    end_edge: b.1,
                })
            };

            match cell_index {
                1 | 14 => push(left, low),
                2 | 13 => push(low, right),
                3 | 12 => push(left, right),
                4 | 11 => push(right, high),
                5 => {
                    // Saddle: two separate segments
                    push(left, low);
                    push(right, high);
                }
                6 | 9 => push(low, high),
                7 | 8 => push(left, high),
                10 => {
                    // Saddle: two separate segments
                    push(low, right);
                    push(left, high);
                }
                _ => {}
            }
        }
    }

    segments
}

/// Linearly interpolate between two edge points based on data values
fn interpolate_edge(x1: f32, y1: f32, x2: f32, y2: f32, val1: f64, val2: f64, level: f64) -> Point {
    if (val2 - val1).abs() < f64::EPSILON {
        return Point::new((x1 + x2) / 2.0, (y1 + y2) / 2.0);
    }

    let t = ((level - val1) / (val2 - val1)).clamp(0.0, 1.0) as f32;
    Point::new(x1 + t * (x2 - x1), y1 + t * (y2 - y1))
}

/// Connect line segments into continuous polylines.
///
/// Segments are joined where they share a lattice edge, growing each line
/// in both directions. A line whose two ends meet on the same edge is
/// closed.
pub fn connect_segments(segments: Vec<Segment>) -> Vec<Contour> {
    if segments.is_empty() {
        return vec![];
    }

    let mut by_edge: HashMap<usize, Vec<usize>> = HashMap::new();
    for (i, seg) in segments.iter().enumerate() {
        by_edge.entry(seg.start_edge).or_default().push(i);
        by_edge.entry(seg.end_edge).or_default().push(i);
    }

    let mut used = vec![false; segments.len()];
    let mut contours = Vec::new();

    // The unused segment touching `edge`, and the point/edge at its far end.
    let next = |edge: usize, used: &[bool]| -> Option<(usize, Point, usize)> {
        by_edge.get(&edge)?.iter().find(|&&i| !used[i]).map(|&i| {
            let seg = &segments[i];
            if seg.start_edge == edge {
                (i, seg.end, seg.end_edge)
            } else {
                (i, seg.start, seg.start_edge)
            }
        })
    };

    for start_idx in 0..segments.len() {
        if used[start_idx] {
            continue;
        }
        used[start_idx] = true;

        let seed = &segments[start_idx];
        let mut points = VecDeque::from([seed.start, seed.end]);
        let head_edge = seed.start_edge;
        let mut tail_edge = seed.end_edge;

        while let Some((i, point, edge)) = next(tail_edge, &used) {
            used[i] = true;
            points.push_back(point);
            tail_edge = edge;
        }

        let closed = tail_edge == head_edge && points.len() > 3;
        if closed {
            points.pop_back();
        } else {
            let mut edge = head_edge;
            while let Some((i, point, far)) = next(edge, &used) {
                used[i] = true;
                points.push_front(point);
                edge = far;
            }
        }

        contours.push(Contour {
            level: 0.0, // Level will be set by caller
            points: points.into(),
            closed,
        });
    }

    contours
}

/// Apply Chaikin's corner cutting algorithm for smoothing
pub fn smooth_contour(contour: &Contour, iterations: u32) -> Contour {
    if iterations == 0 || contour.points.len() < 3 {
        return contour.clone();
    }

    let mut points = contour.points.clone();

    for _ in 0..iterations {
        let n = points.len();
        let pairs = if contour.closed { n } else { n - 1 };
        let mut new_points = Vec::with_capacity(pairs * 2 + 2);

        if !contour.closed {
            new_points.push(points[0]);
        }
        for i in 0..pairs {
            let p1 = points[i];
            let p2 = points[(i + 1) % n];

            // Two new points: 25% and 75% along the segment
            new_points.push(Point::new(0.75 * p1.x + 0.25 * p2.x, 0.75 * p1.y + 0.25 * p2.y));
            new_points.push(Point::new(0.25 * p1.x + 0.75 * p2.x, 0.25 * p1.y + 0.75 * p2.y));
        }
        if !contour.closed {
            new_points.push(points[n - 1]);
        }

        points = new_points;
    }

    Contour {
        level: contour.level,
        points,
        closed: contour.closed,
    }
}
