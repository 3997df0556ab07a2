//! Common test fixtures for survey-overlay tests.
//!
//! Pre-defined bounds, sample sets and CSV documents that represent common
//! scenarios in field-survey processing.

use std::io::Write;
use std::path::PathBuf;

use survey_common::{SamplePoint, SampleSet};
use tempfile::TempDir;

/// Common bounding box definitions for testing, as `(min_x, min_y, max_x, max_y)`.
pub mod bbox {
    /// Unit square
    pub const UNIT: (f64, f64, f64, f64) = (0.0, 0.0, 1.0, 1.0);

    /// A small survey block in geographic coordinates (East Java)
    pub const SURVEY_BLOCK: (f64, f64, f64, f64) = (112.70, -7.30, 112.80, -7.20);

    /// A projected survey block in metres
    pub const UTM_BLOCK: (f64, f64, f64, f64) = (680_000.0, 9_190_000.0, 684_000.0, 9_194_000.0);

    /// Zero width (all samples share one X)
    pub const ZERO_WIDTH: (f64, f64, f64, f64) = (0.0, 0.0, 0.0, 5.0);

    /// Invalid bbox (min > max)
    pub const INVALID: (f64, f64, f64, f64) = (10.0, 10.0, 5.0, 5.0);
}

/// The three-station survey used throughout the docs: values 1, 3 and 5 at
/// three corners of the unit square.
pub fn three_station_survey() -> SampleSet {
    SampleSet::new([
        SamplePoint::new(0.0, 0.0, 1.0),
        SamplePoint::new(1.0, 0.0, 3.0),
        SamplePoint::new(0.0, 1.0, 5.0),
    ])
}

/// Five stations of a gravity survey, in degrees, with anomaly values in mGal.
pub fn gravity_survey() -> SampleSet {
    SampleSet::new([
        SamplePoint::new(112.71, -7.29, -12.4),
        SamplePoint::new(112.79, -7.28, 3.1),
        SamplePoint::new(112.75, -7.25, 18.7),
        SamplePoint::new(112.72, -7.21, 6.0),
        SamplePoint::new(112.78, -7.22, -4.5),
    ])
}

/// CSV documents exercising the column heuristics.
pub mod csv {
    /// Canonical headers.
    pub const XY_VALUE: &str = "x,y,value\n0,0,1\n1,0,3\n0,1,5\n1,1,7\n";

    /// Long-form headers in mixed case with a value column named `Anomali`.
    pub const LONG_HEADERS: &str = "Station,X_Easting,Y_Northing,Anomali\n\
        S1,680100,9190200,-12.4\n\
        S2,683900,9190400,3.1\n\
        S3,682000,9192000,18.7\n\
        S4,680500,9193800,6.0\n";

    /// Headers with `z` for the value and rows that must be dropped.
    pub const WITH_BAD_ROWS: &str = "x,y,z\n0,0,1\n1,0,\n0,1,abc\n1,1,NaN\n2,2,4\n0.5,0.5,2\n";

    /// No header row: columns are taken in order.
    pub const HEADERLESS: &str = "0,0,1\n1,0,3\n0,1,5\n";

    /// Every station on one line.
    pub const COLLINEAR: &str = "x,y,value\n0,0,1\n1,1,2\n2,2,3\n3,3,4\n";

    /// A single station.
    pub const SINGLE: &str = "x,y,value\n0.5,0.5,10\n";
}

/// Write `contents` to `name` inside a fresh temporary directory.
///
/// The directory lives as long as the returned [`TempDir`].
pub fn write_temp_file(name: &str, contents: &str) -> std::io::Result<(TempDir, PathBuf)> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path)?;
    file.write_all(contents.as_bytes())?;
    Ok((dir, path))
}
