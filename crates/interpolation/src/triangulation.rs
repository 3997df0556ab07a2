//! Delaunay triangulation of sample locations and lattice rasterization.

use delaunator::{Point, EMPTY};
use rayon::prelude::*;
use survey_common::{Field, Lattice, SamplePoint, SurveyError, SurveyResult};
use tracing::debug;

use crate::method::InterpolationMethod;

/// Barycentric coordinates below this are treated as outside the triangle.
/// Nodes on a shared edge or vertex are therefore claimed by a triangle.
const INSIDE_TOLERANCE: f64 = -1e-10;

/// Widening, in node spacings, applied when bucketing triangles into rows.
const ROW_SLACK: f64 = 1e-9;

/// A Delaunay triangulation of distinct sample locations.
#[derive(Debug)]
pub struct Triangulation {
    points: Vec<SamplePoint>,
    triangles: Vec<[usize; 3]>,
    /// `neighbors[t][k]` is the triangle across the edge opposite vertex `k`.
    neighbors: Vec<[Option<usize>; 3]>,
}

impl Triangulation {
    /// Triangulate `points`, which must already be free of duplicate locations.
    ///
    /// Fewer than three points, or points that are all collinear, leave
    /// `method` unavailable.
    pub fn build(points: Vec<SamplePoint>, method: InterpolationMethod) -> SurveyResult<Self> {
        if points.len() < 3 {
            return Err(SurveyError::interpolation_unavailable(
                method.as_str(),
                format!(
                    "needs at least 3 distinct sample locations, got {}",
                    points.len()
                ),
            ));
        }

        let coords: Vec<Point> = points.iter().map(|p| Point { x: p.x, y: p.y }).collect();
        let delaunay = delaunator::triangulate(&coords);

        if delaunay.triangles.is_empty() {
            return Err(SurveyError::interpolation_unavailable(
                method.as_str(),
                "sample locations are collinear",
            ));
        }

        let triangle_count = delaunay.triangles.len() / 3;
        let mut triangles = Vec::with_capacity(triangle_count);
        let mut neighbors = Vec::with_capacity(triangle_count);

        for t in 0..triangle_count {
            let base = 3 * t;
            triangles.push([
                delaunay.triangles[base],
                delaunay.triangles[base + 1],
                delaunay.triangles[base + 2],
            ]);

            let mut across = [None; 3];
            for (k, slot) in across.iter_mut().enumerate() {
                let twin = delaunay.halfedges[base + (k + 1) % 3];
                if twin != EMPTY {
                    *slot = Some(twin / 3);
                }
            }
            neighbors.push(across);
        }

        debug!(
            points = points.len(),
            triangles = triangle_count,
            hull = delaunay.hull.len(),
            "Triangulated samples"
        );

        Ok(Self {
            points,
            triangles,
            neighbors,
        })
    }

    pub fn points(&self) -> &[SamplePoint] {
        &self.points
    }

    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    pub fn neighbors(&self) -> &[[Option<usize>; 3]] {
        &self.neighbors
    }

    /// Vertices sharing an edge with each vertex, sorted and deduplicated.
    pub fn vertex_neighbors(&self) -> Vec<Vec<usize>> {
        let mut adjacency = vec![Vec::new(); self.points.len()];
        for tri in &self.triangles {
            for k in 0..3 {
                let a = tri[k];
                let b = tri[(k + 1) % 3];
                adjacency[a].push(b);
                adjacency[b].push(a);
            }
        }
        for list in &mut adjacency {
            list.sort_unstable();
            list.dedup();
        }
        adjacency
    }

    /// Centroid of triangle `t`.
    pub fn centroid(&self, t: usize) -> (f64, f64) {
        let [a, b, c] = self.corners(t);
        ((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0)
    }

    fn corners(&self, t: usize) -> [&SamplePoint; 3] {
        let [i, j, k] = self.triangles[t];
        [&self.points[i], &self.points[j], &self.points[k]]
    }

    /// Barycentric coordinates of `(x, y)` with respect to triangle `t`.
    ///
    /// Unclamped, so points outside the triangle get negative weights.
    /// `None` for a zero-area triangle.
    pub fn barycentric(&self, t: usize, x: f64, y: f64) -> Option<[f64; 3]> {
        let [a, b, c] = self.corners(t);
        let det = (b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y);
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let l0 = ((b.x - x) * (c.y - y) - (c.x - x) * (b.y - y)) / det;
        let l1 = ((c.x - x) * (a.y - y) - (a.x - x) * (c.y - y)) / det;
        Some([l0, l1, 1.0 - l0 - l1])
    }

    /// Evaluate `eval(triangle, barycentric)` at every lattice node covered
    /// by the triangulation. Uncovered nodes stay undefined.
    ///
    /// A node on an edge shared by two triangles takes the value from the
    /// lower-numbered triangle, so the result never depends on scheduling.
    pub fn rasterize<F>(&self, lattice: &Lattice, eval: F) -> Field
    where
        F: Fn(usize, [f64; 3]) -> f64 + Sync,
    {
        let nx = lattice.nx();
        let xs = lattice.x_coords();
        let ys = lattice.y_coords();

        let mut rows: Vec<Vec<(usize, usize, usize)>> = vec![Vec::new(); lattice.ny()];
        for t in 0..self.triangles.len() {
            let [a, b, c] = self.corners(t);
            let (min_x, max_x) = (a.x.min(b.x).min(c.x), a.x.max(b.x).max(c.x));
            let (min_y, max_y) = (a.y.min(b.y).min(c.y), a.y.max(b.y).max(c.y));

            let Some((col_lo, col_hi)) = lattice.cols_between(min_x, max_x, ROW_SLACK) else {
                continue;
            };
            if let Some((row_lo, row_hi)) = lattice.rows_between(min_y, max_y, ROW_SLACK) {
                for bucket in &mut rows[row_lo..=row_hi] {
                    bucket.push((t, col_lo, col_hi));
                }
            }
        }

        let mut field = Field::undefined(nx, lattice.ny());
        field
            .values_mut()
            .par_chunks_mut(nx)
            .zip(rows.par_iter())
            .enumerate()
            .for_each(|(row, (out, bucket))| {
                let y = ys[row];
                for &(t, col_lo, col_hi) in bucket {
                    for col in col_lo..=col_hi {
                        if !out[col].is_nan() {
                            continue;
                        }
                        let Some(bary) = self.barycentric(t, xs[col], y) else {
                            continue;
                        };
                        if bary.iter().all(|&l| l >= INSIDE_TOLERANCE) {
                            out[col] = eval(t, bary);
                        }
                    }
                }
            });

        field
    }
}
