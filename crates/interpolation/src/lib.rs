//! Scattered-data interpolation onto a regular lattice.
//!
//! Three methods are supported:
//! - [`InterpolationMethod::Nearest`]: closest sample, defined everywhere
//! - [`InterpolationMethod::Linear`]: barycentric on a Delaunay triangulation
//! - [`InterpolationMethod::Cubic`]: Clough-Tocher C1 cubic on the same triangulation
//!
//! Triangulation-based methods leave nodes outside the convex hull of the
//! samples undefined (`NaN`); they never extrapolate.
//!
//! # Example
//!
//! ```
//! use interpolation::{interpolate, InterpolationMethod};
//! use survey_common::{build_lattice, SamplePoint, SampleSet};
//!
//! let samples = SampleSet::new([
//!     SamplePoint::new(0.0, 0.0, 1.0),
//!     SamplePoint::new(1.0, 0.0, 3.0),
//!     SamplePoint::new(0.0, 1.0, 5.0),
//! ]);
//! let lattice = build_lattice(&samples.bounds().unwrap(), 2).unwrap();
//! let field = interpolate(&samples, &lattice, InterpolationMethod::Nearest).unwrap();
//! assert_eq!(field.values(), &[1.0, 3.0, 5.0, 3.0]);
//! ```

pub mod cubic;
pub mod kdtree;
pub mod linear;
pub mod method;
pub mod nearest;
pub mod triangulation;

pub use method::{FallbackPolicy, InterpolationMethod};

use serde::Serialize;
use survey_common::{Field, Lattice, SampleSet, SurveyResult};
use tracing::debug;

use crate::triangulation::Triangulation;

/// Estimate a value at every node of `lattice` from `samples`.
///
/// Fails with `InterpolationUnavailable` when the method cannot run on
/// these samples: no samples at all, or for `Linear`/`Cubic` fewer than
/// three distinct locations or all locations collinear. No fallback is
/// attempted; see [`interpolate_with_policy`].
pub fn interpolate(
    samples: &SampleSet,
    lattice: &Lattice,
    method: InterpolationMethod,
) -> SurveyResult<Field> {
    let field = match method {
        InterpolationMethod::Nearest => nearest::nearest_field(samples, lattice)?,
        InterpolationMethod::Linear => {
            let tri = Triangulation::build(samples.distinct(), method)?;
            linear::linear_field(&tri, lattice)
        }
        InterpolationMethod::Cubic => {
            let tri = Triangulation::build(samples.distinct(), method)?;
            cubic::cubic_field(&tri, lattice)
        }
    };

    debug!(
        method = %method,
        samples = samples.len(),
        nodes = lattice.len(),
        defined = field.defined_count(),
        "Interpolated field"
    );

    Ok(field)
}

/// Record of a method substitution made under [`FallbackPolicy::Nearest`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FallbackReport {
    /// The method the caller asked for.
    pub requested: InterpolationMethod,
    /// Why the requested method could not run.
    pub reason: String,
}

/// A field together with the method that actually produced it.
#[derive(Debug, Clone)]
pub struct Interpolation {
    pub field: Field,
    pub method: InterpolationMethod,
    /// Present only when a fallback happened.
    pub fallback: Option<FallbackReport>,
}

impl Interpolation {
    pub fn fell_back(&self) -> bool {
        self.fallback.is_some()
    }
}

/// [`interpolate`], retrying with nearest-neighbour when `policy` allows it.
///
/// Only `InterpolationUnavailable` triggers the retry; every other error is
/// returned as is. A substitution is always reported in
/// [`Interpolation::fallback`].
pub fn interpolate_with_policy(
    samples: &SampleSet,
    lattice: &Lattice,
    method: InterpolationMethod,
    policy: FallbackPolicy,
) -> SurveyResult<Interpolation> {
    match interpolate(samples, lattice, method) {
        Ok(field) => Ok(Interpolation {
            field,
            method,
            fallback: None,
        }),
        Err(err)
            if policy == FallbackPolicy::Nearest
                && method != InterpolationMethod::Nearest
                && err.is_recoverable_with_nearest() =>
        {
            debug!(requested = %method, error = %err, "Falling back to nearest");
            let field = nearest::nearest_field(samples, lattice)?;
            Ok(Interpolation {
                field,
                method: InterpolationMethod::Nearest,
                fallback: Some(FallbackReport {
                    requested: method,
                    reason: err.to_string(),
                }),
            })
        }
        Err(err) => Err(err),
    }
}
