//! Common types shared by the survey overlay crates.
//!
//! The pipeline passes immutable values from stage to stage:
//! [`SampleSet`] → [`Lattice`] → [`Field`] → raster → overlay archive.

pub mod bbox;
pub mod error;
pub mod field;
pub mod lattice;
pub mod sample;

pub use bbox::BoundingBox;
pub use error::{SurveyError, SurveyResult};
pub use field::Field;
pub use lattice::{build_lattice, Lattice};
pub use sample::{SamplePoint, SampleSet};
