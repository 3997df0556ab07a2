//! Regular sampling lattice over a survey's bounding box.

use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;
use crate::error::{SurveyError, SurveyResult};

/// A regular `nx × ny` grid of node coordinates.
///
/// Nodes are evenly spaced from min to max inclusive along each axis. Row 0
/// is the minimum-Y row; data laid out on the lattice is row-major,
/// bottom-up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lattice {
    bounds: BoundingBox,
    xs: Vec<f64>,
    ys: Vec<f64>,
}

/// Build the `resolution × resolution` lattice spanning `bounds`.
///
/// Degenerate bounds are reported, never turned into a zero-area grid.
pub fn build_lattice(bounds: &BoundingBox, resolution: usize) -> SurveyResult<Lattice> {
    bounds.validate()?;
    if resolution == 0 {
        return Err(SurveyError::invalid_parameter(
            "resolution",
            "lattice needs at least one node per axis",
        ));
    }

    Ok(Lattice {
        bounds: *bounds,
        xs: linspace(bounds.min_x, bounds.max_x, resolution),
        ys: linspace(bounds.min_y, bounds.max_y, resolution),
    })
}

/// `n` evenly spaced values from `start` to `end` inclusive.
///
/// The last value is pinned to `end` so corner nodes match the bounds
/// exactly.
fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![start];
    }
    let step = (end - start) / (n - 1) as f64;
    let mut values: Vec<f64> = (0..n).map(|i| start + i as f64 * step).collect();
    values[n - 1] = end;
    values
}

impl Lattice {
    /// Number of nodes along X (columns).
    pub fn nx(&self) -> usize {
        self.xs.len()
    }

    /// Number of nodes along Y (rows).
    pub fn ny(&self) -> usize {
        self.ys.len()
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.nx() * self.ny()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    /// Column coordinates, west to east.
    pub fn x_coords(&self) -> &[f64] {
        &self.xs
    }

    /// Row coordinates, south to north.
    pub fn y_coords(&self) -> &[f64] {
        &self.ys
    }

    /// Spacing between adjacent columns and rows. Zero on a 1-node axis.
    pub fn spacing(&self) -> (f64, f64) {
        let step = |v: &[f64]| {
            if v.len() > 1 {
                (v[v.len() - 1] - v[0]) / (v.len() - 1) as f64
            } else {
                0.0
            }
        };
        (step(&self.xs), step(&self.ys))
    }

    /// Coordinates of node `(col, row)`.
    pub fn node(&self, col: usize, row: usize) -> Option<(f64, f64)> {
        Some((*self.xs.get(col)?, *self.ys.get(row)?))
    }

    /// Row-major index of node `(col, row)`.
    #[inline]
    pub fn flat_index(&self, col: usize, row: usize) -> usize {
        row * self.nx() + col
    }

    /// The two coordinate arrays of the lattice (meshgrid semantics).
    ///
    /// Both are row-major `ny × nx`: `xx[r][c] = x_coords()[c]`,
    /// `yy[r][c] = y_coords()[r]`.
    pub fn meshgrid(&self) -> (Vec<f64>, Vec<f64>) {
        let mut xx = Vec::with_capacity(self.len());
        let mut yy = Vec::with_capacity(self.len());
        for &y in &self.ys {
            for &x in &self.xs {
                xx.push(x);
                yy.push(y);
            }
        }
        (xx, yy)
    }

    /// Range of row indices whose Y lies within `[lo, hi]`, widened by
    /// `slack` node spacings. `None` when no row qualifies.
    pub fn rows_between(&self, lo: f64, hi: f64, slack: f64) -> Option<(usize, usize)> {
        index_range(&self.ys, lo, hi, slack)
    }

    /// Range of column indices whose X lies within `[lo, hi]`, widened by
    /// `slack` node spacings. `None` when no column qualifies.
    pub fn cols_between(&self, lo: f64, hi: f64, slack: f64) -> Option<(usize, usize)> {
        index_range(&self.xs, lo, hi, slack)
    }
}

fn index_range(axis: &[f64], lo: f64, hi: f64, slack: f64) -> Option<(usize, usize)> {
    let n = axis.len();
    if n == 1 {
        return (axis[0] >= lo && axis[0] <= hi).then_some((0, 0));
    }
    let start = axis[0];
    let step = (axis[n - 1] - start) / (n - 1) as f64;
    let first = ((lo - start) / step - slack).ceil().max(0.0);
    let last = ((hi - start) / step + slack).floor().min((n - 1) as f64);
    if first > last {
        return None;
    }
    Some((first as usize, last as usize))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linspace_pins_end() {
        let v = linspace(0.1, 0.7, 7);
        assert_eq!(v[0], 0.1);
        assert_eq!(v[6], 0.7);
    }

    #[test]
    fn test_single_node_lattice() {
        let lattice = build_lattice(&BoundingBox::new(1.0, 2.0, 3.0, 4.0), 1).unwrap();
        assert_eq!(lattice.node(0, 0), Some((1.0, 2.0)));
        assert_eq!(lattice.spacing(), (0.0, 0.0));
    }

    #[test]
    fn test_zero_resolution_rejected() {
        let err = build_lattice(&BoundingBox::new(0.0, 0.0, 1.0, 1.0), 0).unwrap_err();
        assert!(matches!(err, SurveyError::InvalidParameter { .. }));
    }

    #[test]
    fn test_index_range() {
        let lattice = build_lattice(&BoundingBox::new(0.0, 0.0, 10.0, 10.0), 11).unwrap();
        assert_eq!(lattice.cols_between(2.5, 5.0, 0.0), Some((3, 5)));
        assert_eq!(lattice.rows_between(-5.0, 0.0, 0.0), Some((0, 0)));
        assert_eq!(lattice.rows_between(10.5, 12.0, 0.0), None);
    }
}
