//! Scattered survey samples.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::bbox::BoundingBox;
use crate::error::{SurveyError, SurveyResult};

/// A single measurement at `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

impl SamplePoint {
    pub fn new(x: f64, y: f64, value: f64) -> Self {
        Self { x, y, value }
    }

    /// Whether all three components are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.value.is_finite()
    }

    /// Squared Euclidean distance from this sample to `(x, y)`.
    #[inline]
    pub fn dist_sq(&self, x: f64, y: f64) -> f64 {
        let dx = self.x - x;
        let dy = self.y - y;
        dx * dx + dy * dy
    }
}

/// The ordered set of finite samples of one survey.
///
/// Non-finite samples are dropped on construction; duplicates in `(x, y)` are
/// kept in input order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SampleSet {
    points: Vec<SamplePoint>,
    dropped: usize,
}

impl SampleSet {
    /// Build a set from samples, dropping any with a non-finite component.
    pub fn new(points: impl IntoIterator<Item = SamplePoint>) -> Self {
        let mut kept = Vec::new();
        let mut dropped = 0;
        for p in points {
            if p.is_finite() {
                kept.push(p);
            } else {
                dropped += 1;
            }
        }
        Self {
            points: kept,
            dropped,
        }
    }

    /// Build a set from three aligned columns.
    pub fn from_columns(xs: &[f64], ys: &[f64], values: &[f64]) -> SurveyResult<Self> {
        if xs.len() != ys.len() || xs.len() != values.len() {
            return Err(SurveyError::invalid_parameter(
                "columns",
                format!(
                    "x, y and value columns must have equal length (got {}, {}, {})",
                    xs.len(),
                    ys.len(),
                    values.len()
                ),
            ));
        }
        Ok(Self::new(
            xs.iter()
                .zip(ys)
                .zip(values)
                .map(|((&x, &y), &v)| SamplePoint::new(x, y, v)),
        ))
    }

    pub fn points(&self) -> &[SamplePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of samples dropped on construction for being non-finite.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Bounding box of the samples.
    ///
    /// The box is not validated here: a survey along a single line still has
    /// bounds, it just cannot be gridded.
    pub fn bounds(&self) -> SurveyResult<BoundingBox> {
        BoundingBox::from_points(self.points.iter().map(|p| (p.x, p.y))).ok_or_else(|| {
            SurveyError::InvalidBounds {
                bounds: "<empty>".to_string(),
                reason: "sample set has no points".to_string(),
            }
        })
    }

    /// Samples with exact-duplicate coordinates collapsed, first one kept.
    pub fn distinct(&self) -> Vec<SamplePoint> {
        let mut seen = HashSet::with_capacity(self.points.len());
        // Adding 0.0 folds -0.0 into 0.0 so both hash alike.
        self.points
            .iter()
            .filter(|p| seen.insert(((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits())))
            .copied()
            .collect()
    }

    /// Finite min/max of the sample values.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.points.iter().fold(None, |acc, p| match acc {
            None => Some((p.value, p.value)),
            Some((lo, hi)) => Some((lo.min(p.value), hi.max(p.value))),
        })
    }
}

impl FromIterator<SamplePoint> for SampleSet {
    fn from_iter<T: IntoIterator<Item = SamplePoint>>(iter: T) -> Self {
        Self::new(iter)
    }
}
