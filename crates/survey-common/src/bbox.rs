//! Bounding box of a survey.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{SurveyError, SurveyResult};

/// An axis-aligned bounding box in survey coordinates.
///
/// No reprojection is applied anywhere in the pipeline: the same box spans
/// the lattice and becomes the overlay's west/south/east/north edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Smallest box containing every `(x, y)` pair. `None` for an empty input.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut iter = points.into_iter();
        let (x0, y0) = iter.next()?;
        let mut bbox = Self::new(x0, y0, x0, y0);
        for (x, y) in iter {
            bbox.min_x = bbox.min_x.min(x);
            bbox.min_y = bbox.min_y.min(y);
            bbox.max_x = bbox.max_x.max(x);
            bbox.max_y = bbox.max_y.max(y);
        }
        Some(bbox)
    }

    /// Check that the box has finite edges and a non-zero extent on both axes.
    pub fn validate(&self) -> SurveyResult<()> {
        let edges = [self.min_x, self.min_y, self.max_x, self.max_y];
        if edges.iter().any(|v| !v.is_finite()) {
            return Err(self.invalid("edges must be finite"));
        }
        if self.min_x >= self.max_x {
            return Err(self.invalid("min_x must be less than max_x (all samples share one x)"));
        }
        if self.min_y >= self.max_y {
            return Err(self.invalid("min_y must be less than max_y (all samples share one y)"));
        }
        Ok(())
    }

    /// Width of the bounding box in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Check if a point is contained within this bbox (edges inclusive).
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    fn invalid(&self, reason: &str) -> SurveyError {
        SurveyError::InvalidBounds {
            bounds: self.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[x: {} .. {}, y: {} .. {}]",
            self.min_x, self.max_x, self.min_y, self.max_y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        let bbox = BoundingBox::from_points([(3.0, -1.0), (-2.0, 4.0), (0.5, 0.5)]).unwrap();
        assert_eq!(bbox, BoundingBox::new(-2.0, -1.0, 3.0, 4.0));
    }

    #[test]
    fn test_from_no_points() {
        assert!(BoundingBox::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn test_degenerate_x_is_rejected() {
        let err = BoundingBox::new(0.0, 0.0, 0.0, 5.0).validate().unwrap_err();
        assert!(matches!(err, SurveyError::InvalidBounds { .. }));
    }
}
