//! Nearest-neighbour gridding.

use rayon::prelude::*;
use survey_common::{Field, Lattice, SampleSet, SurveyError, SurveyResult};

use crate::kdtree::KdTree;

/// Assign every lattice node the value of its closest sample.
///
/// Defined everywhere, including outside the convex hull. Equidistant
/// samples resolve to the one listed first.
pub fn nearest_field(samples: &SampleSet, lattice: &Lattice) -> SurveyResult<Field> {
    if samples.is_empty() {
        return Err(SurveyError::interpolation_unavailable(
            "nearest",
            "no finite samples",
        ));
    }

    let tree = KdTree::build(samples.points());
    let xs = lattice.x_coords();
    let ys = lattice.y_coords();
    let nx = lattice.nx();

    let mut field = Field::undefined(nx, lattice.ny());
    field
        .values_mut()
        .par_chunks_mut(nx)
        .enumerate()
        .for_each(|(row, out)| {
            let y = ys[row];
            for (col, cell) in out.iter_mut().enumerate() {
                if let Some(found) = tree.nearest(xs[col], y) {
                    *cell = found.point.value;
                }
            }
        });

    Ok(field)
}
