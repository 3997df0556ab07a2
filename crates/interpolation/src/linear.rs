//! Piecewise-linear interpolation on a Delaunay triangulation.

use survey_common::{Field, Lattice};

use crate::triangulation::Triangulation;

/// Barycentric blend of the three vertex values of the containing triangle.
pub fn linear_field(tri: &Triangulation, lattice: &Lattice) -> Field {
    let points = tri.points();
    let triangles = tri.triangles();

    tri.rasterize(lattice, |t, [l0, l1, l2]| {
        let [a, b, c] = triangles[t];
        l0 * points[a].value + l1 * points[b].value + l2 * points[c].value
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::InterpolationMethod;
    use survey_common::{build_lattice, BoundingBox, SamplePoint};

    #[test]
    fn test_reproduces_plane() {
        let plane = |x: f64, y: f64| 2.0 * x - 3.0 * y + 1.0;
        let points = [(0.0, 0.0), (4.0, 0.0), (0.0, 4.0), (4.0, 4.0), (1.5, 2.5)]
            .iter()
            .map(|&(x, y)| SamplePoint::new(x, y, plane(x, y)))
            .collect();
        let tri = Triangulation::build(points, InterpolationMethod::Linear).unwrap();
        let lattice = build_lattice(&BoundingBox::new(0.0, 0.0, 4.0, 4.0), 9).unwrap();
        let field = linear_field(&tri, &lattice);

        for row in 0..lattice.ny() {
            for col in 0..lattice.nx() {
                let (x, y) = lattice.node(col, row).unwrap();
                let v = field.get(col, row).unwrap();
                assert!((v - plane(x, y)).abs() < 1e-9, "({}, {}) -> {}", x, y, v);
            }
        }
    }
}
