//! Clough-Tocher piecewise-cubic interpolation.
//!
//! Each Delaunay triangle is split at its centroid into three sub-triangles,
//! each carrying a cubic Bernstein-Bézier patch. Patches share values and
//! gradients at the sample locations and are C1 across all edges.
//!
//! Vertex gradients are not measured; they are estimated from the samples
//! by minimising the curvature of the interpolant along every triangulation
//! edge (a Gauss-Seidel sweep over the vertices).

use nalgebra::{Matrix2, Vector2};
use rayon::prelude::*;
use survey_common::{Field, Lattice};
use tracing::debug;

use crate::triangulation::Triangulation;

/// Stop the gradient sweep once no gradient moves by more than this
/// (relative to its magnitude, or absolute below 1).
const GRADIENT_TOLERANCE: f64 = 1e-6;

/// Upper bound on Gauss-Seidel sweeps.
const GRADIENT_MAX_SWEEPS: usize = 400;

/// Clough-Tocher interpolation of the triangulated samples onto `lattice`.
pub fn cubic_field(tri: &Triangulation, lattice: &Lattice) -> Field {
    let gradients = estimate_gradients(tri);
    let patches: Vec<Patch> = (0..tri.triangles().len())
        .into_par_iter()
        .map(|t| Patch::new(tri, &gradients, t))
        .collect();

    tri.rasterize(lattice, |t, bary| patches[t].eval(bary))
}

/// Estimate a gradient at each vertex of the triangulation.
///
/// For every vertex the gradient is chosen to minimise the summed squared
/// second derivative of the cubic along each incident edge, holding the
/// neighbours' gradients fixed. Sweeps repeat until the largest relative
/// change falls below [`GRADIENT_TOLERANCE`].
pub fn estimate_gradients(tri: &Triangulation) -> Vec<Vector2<f64>> {
    let points = tri.points();
    let adjacency = tri.vertex_neighbors();
    let mut grad = vec![Vector2::zeros(); points.len()];

    for sweep in 0..GRADIENT_MAX_SWEEPS {
        let mut worst = 0.0f64;

        for (i, neighbors) in adjacency.iter().enumerate() {
            if neighbors.is_empty() {
                continue;
            }

            let mut q = Matrix2::<f64>::zeros();
            let mut s = Vector2::<f64>::zeros();
            let f1 = points[i].value;

            for &j in neighbors {
                let e = Vector2::new(points[j].x - points[i].x, points[j].y - points[i].y);
                let l3 = e.norm().powi(3);
                if l3 == 0.0 {
                    continue;
                }
                let f2 = points[j].value;
                let df2 = -e.dot(&grad[j]);

                q += e * e.transpose() * (4.0 / l3);
                s += e * ((6.0 * (f1 - f2) - 2.0 * df2) / l3);
            }

            let Some(q_inv) = q.try_inverse() else {
                continue;
            };
            let r = q_inv * s;

            let change = (grad[i] + r).amax() / r.amax().max(1.0);
            grad[i] = -r;
            worst = worst.max(change);
        }

        if worst < GRADIENT_TOLERANCE {
            debug!(sweeps = sweep + 1, "Gradient estimation converged");
            return grad;
        }
    }

    debug!(
        sweeps = GRADIENT_MAX_SWEEPS,
        "Gradient estimation stopped at sweep limit"
    );
    grad
}

/// Bézier control net of one macro-triangle.
///
/// Indices `ijkl` weight vertex 0, vertex 1, vertex 2 and the centroid.
#[derive(Debug, Clone, Copy)]
struct Patch {
    c3000: f64,
    c0300: f64,
    c0030: f64,
    c0003: f64,
    c2100: f64,
    c2010: f64,
    c1200: f64,
    c0210: f64,
    c1020: f64,
    c0120: f64,
    c2001: f64,
    c0201: f64,
    c0021: f64,
    c1101: f64,
    c1011: f64,
    c0111: f64,
    c1002: f64,
    c0102: f64,
    c0012: f64,
}

impl Patch {
    fn new(tri: &Triangulation, grad: &[Vector2<f64>], t: usize) -> Self {
        let points = tri.points();
        let [i0, i1, i2] = tri.triangles()[t];
        let (p0, p1, p2) = (&points[i0], &points[i1], &points[i2]);

        let e12 = Vector2::new(p1.x - p0.x, p1.y - p0.y);
        let e23 = Vector2::new(p2.x - p1.x, p2.y - p1.y);
        let e31 = Vector2::new(p0.x - p2.x, p0.y - p2.y);

        // Directional derivatives along each edge, from each end.
        let df12 = grad[i0].dot(&e12);
        let df21 = -grad[i1].dot(&e12);
        let df23 = grad[i1].dot(&e23);
        let df32 = -grad[i2].dot(&e23);
        let df31 = grad[i2].dot(&e31);
        let df13 = -grad[i0].dot(&e31);

        let c3000 = p0.value;
        let c0300 = p1.value;
        let c0030 = p2.value;

        let c2100 = (df12 + 3.0 * c3000) / 3.0;
        let c2010 = (df13 + 3.0 * c3000) / 3.0;
        let c0210 = (df23 + 3.0 * c0300) / 3.0;
        let c1200 = (df21 + 3.0 * c0300) / 3.0;
        let c1020 = (df31 + 3.0 * c0030) / 3.0;
        let c0120 = (df32 + 3.0 * c0030) / 3.0;

        let c2001 = (c2100 + c2010 + c3000) / 3.0;
        let c0201 = (c1200 + c0300 + c0210) / 3.0;
        let c0021 = (c1020 + c0120 + c0030) / 3.0;

        let g = edge_weights(tri, t);

        let c0111 = (g[0] * (-c0300 + 3.0 * c0210 - 3.0 * c0120 + c0030)
            + (-c0300 + 2.0 * c0210 - c0120 + c0021 + c0201))
            / 2.0;
        let c1011 = (g[1] * (-c0030 + 3.0 * c1020 - 3.0 * c2010 + c3000)
            + (-c0030 + 2.0 * c1020 - c2010 + c2001 + c0021))
            / 2.0;
        let c1101 = (g[2] * (-c3000 + 3.0 * c2100 - 3.0 * c1200 + c0300)
            + (-c3000 + 2.0 * c2100 - c1200 + c2001 + c0201))
            / 2.0;

        let c1002 = (c1101 + c1011 + c2001) / 3.0;
        let c0102 = (c1101 + c0111 + c0201) / 3.0;
        let c0012 = (c1011 + c0111 + c0021) / 3.0;
        let c0003 = (c1002 + c0102 + c0012) / 3.0;

        Self {
            c3000,
            c0300,
            c0030,
            c0003,
            c2100,
            c2010,
            c1200,
            c0210,
            c1020,
            c0120,
            c2001,
            c0201,
            c0021,
            c1101,
            c1011,
            c0111,
            c1002,
            c0102,
            c0012,
        }
    }

    /// Evaluate at barycentric coordinates of the macro-triangle.
    fn eval(&self, [b0, b1, b2]: [f64; 3]) -> f64 {
        // Coordinates within the sub-triangle opposite the smallest weight.
        let m = b0.min(b1).min(b2);
        let (u, v, w, z) = (b0 - m, b1 - m, b2 - m, 3.0 * m);

        let cubes = self.c3000 * u * u * u
            + self.c0300 * v * v * v
            + self.c0030 * w * w * w
            + self.c0003 * z * z * z;

        let squares = self.c2100 * u * u * v
            + self.c2010 * u * u * w
            + self.c2001 * u * u * z
            + self.c1200 * u * v * v
            + self.c0210 * v * v * w
            + self.c0201 * v * v * z
            + self.c1020 * u * w * w
            + self.c0120 * v * w * w
            + self.c0021 * w * w * z
            + self.c1002 * u * z * z
            + self.c0102 * v * z * z
            + self.c0012 * w * z * z;

        // The uvw term vanishes: one of u, v, w is always zero.
        let mixed = self.c1101 * u * v * z + self.c1011 * u * w * z + self.c0111 * v * w * z;

        cubes + 3.0 * squares + 6.0 * mixed
    }
}

/// Cross-edge continuity weights for triangle `t`, one per edge opposite
/// each vertex. Derived from where the neighbour's centroid falls in this
/// triangle's barycentric frame; hull edges use the default −½.
fn edge_weights(tri: &Triangulation, t: usize) -> [f64; 3] {
    let mut g = [-0.5; 3];
    for (k, slot) in g.iter_mut().enumerate() {
        let Some(other) = tri.neighbors()[t][k] else {
            continue;
        };
        let (cx, cy) = tri.centroid(other);
        let Some(c) = tri.barycentric(t, cx, cy) else {
            continue;
        };
        let (num, den) = match k {
            0 => (2.0 * c[2] + c[1] - 1.0, 2.0 - 3.0 * c[2] - 3.0 * c[1]),
            1 => (2.0 * c[0] + c[2] - 1.0, 2.0 - 3.0 * c[0] - 3.0 * c[2]),
            _ => (2.0 * c[1] + c[0] - 1.0, 2.0 - 3.0 * c[1] - 3.0 * c[0]),
        };
        if den.abs() > f64::EPSILON {
            *slot = num / den;
        }
    }
    g
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::InterpolationMethod;
    use survey_common::SamplePoint;

    fn plane_samples() -> Vec<SamplePoint> {
        [
            (0.0, 0.0),
            (3.0, 0.0),
            (6.0, 0.5),
            (0.5, 3.0),
            (2.7, 2.9),
            (6.0, 3.5),
            (0.0, 6.0),
            (3.2, 6.0),
            (5.5, 6.0),
        ]
        .iter()
        .map(|&(x, y)| SamplePoint::new(x, y, 0.5 * x + 2.0 * y - 1.0))
        .collect()
    }

    #[test]
    fn test_gradients_of_plane() {
        let tri = Triangulation::build(plane_samples(), InterpolationMethod::Cubic).unwrap();
        for g in estimate_gradients(&tri) {
            assert!((g.x - 0.5).abs() < 1e-4, "gx = {}", g.x);
            assert!((g.y - 2.0).abs() < 1e-4, "gy = {}", g.y);
        }
    }

    #[test]
    fn test_patch_hits_vertex_values() {
        let tri = Triangulation::build(plane_samples(), InterpolationMethod::Cubic).unwrap();
        let grad = estimate_gradients(&tri);
        for t in 0..tri.triangles().len() {
            let patch = Patch::new(&tri, &grad, t);
            let [a, b, c] = tri.triangles()[t];
            let pts = tri.points();
            assert_eq!(patch.eval([1.0, 0.0, 0.0]), pts[a].value);
            assert_eq!(patch.eval([0.0, 1.0, 0.0]), pts[b].value);
            assert_eq!(patch.eval([0.0, 0.0, 1.0]), pts[c].value);
        }
    }

    #[test]
    fn test_patch_reproduces_plane_with_exact_gradients() {
        let tri = Triangulation::build(plane_samples(), InterpolationMethod::Cubic).unwrap();
        let grad = vec![Vector2::new(0.5, 2.0); tri.points().len()];
        let pts = tri.points();
        for t in 0..tri.triangles().len() {
            let patch = Patch::new(&tri, &grad, t);
            let [a, b, c] = tri.triangles()[t];
            for bary in [[1.0 / 3.0; 3], [0.2, 0.5, 0.3], [0.6, 0.1, 0.3], [0.5, 0.5, 0.0]] {
                let x = bary[0] * pts[a].x + bary[1] * pts[b].x + bary[2] * pts[c].x;
                let y = bary[0] * pts[a].y + bary[1] * pts[b].y + bary[2] * pts[c].y;
                let expected = 0.5 * x + 2.0 * y - 1.0;
                assert!((patch.eval(bary) - expected).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_hull_edges_use_default_weight() {
        let points = vec![
            SamplePoint::new(0.0, 0.0, 1.0),
            SamplePoint::new(1.0, 0.0, 2.0),
            SamplePoint::new(0.0, 1.0, 3.0),
        ];
        let tri = Triangulation::build(points, InterpolationMethod::Cubic).unwrap();
        assert_eq!(edge_weights(&tri, 0), [-0.5; 3]);
    }
}
