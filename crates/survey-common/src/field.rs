//! Dense field of estimates over a lattice.

use serde::{Deserialize, Serialize};

use crate::error::{SurveyError, SurveyResult};

/// Estimated values, one per lattice node, row-major and bottom-up.
///
/// `NaN` marks a node without an estimate (outside the convex hull for
/// triangulation-based methods). It is distinct from every valid value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    nx: usize,
    ny: usize,
    values: Vec<f64>,
}

impl Field {
    /// The "no estimate" sentinel.
    pub const UNDEFINED: f64 = f64::NAN;

    /// Wrap row-major values. Fails when the length does not match the shape.
    pub fn from_values(nx: usize, ny: usize, values: Vec<f64>) -> SurveyResult<Self> {
        if values.len() != nx * ny {
            return Err(SurveyError::invalid_parameter(
                "field",
                format!("expected {} values for {}x{}, got {}", nx * ny, nx, ny, values.len()),
            ));
        }
        Ok(Self { nx, ny, values })
    }

    /// A field with every node undefined.
    pub fn undefined(nx: usize, ny: usize) -> Self {
        Self {
            nx,
            ny,
            values: vec![Self::UNDEFINED; nx * ny],
        }
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    /// Row-major values, row 0 = minimum Y.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// Value at `(col, row)`; `None` outside the shape.
    pub fn get(&self, col: usize, row: usize) -> Option<f64> {
        if col >= self.nx || row >= self.ny {
            return None;
        }
        Some(self.values[row * self.nx + col])
    }

    /// Whether node `(col, row)` has a finite estimate.
    pub fn is_defined(&self, col: usize, row: usize) -> bool {
        self.get(col, row).map_or(false, f64::is_finite)
    }

    /// Number of nodes with a finite estimate.
    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_finite()).count()
    }

    /// Finite min/max, ignoring undefined nodes. `None` if none are finite.
    pub fn finite_range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Row `row` as a slice.
    pub fn row(&self, row: usize) -> &[f64] {
        &self.values[row * self.nx..(row + 1) * self.nx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finite_range_ignores_undefined() {
        let field = Field::from_values(2, 2, vec![f64::NAN, 3.0, -1.0, f64::NAN]).unwrap();
        assert_eq!(field.finite_range(), Some((-1.0, 3.0)));
        assert_eq!(field.defined_count(), 2);
        assert!(!field.is_defined(0, 0));
        assert!(field.is_defined(1, 0));
    }

    #[test]
    fn test_all_undefined_has_no_range() {
        assert_eq!(Field::undefined(3, 3).finite_range(), None);
    }

    #[test]
    fn test_shape_mismatch() {
        assert!(Field::from_values(2, 2, vec![0.0; 3]).is_err());
    }
}
