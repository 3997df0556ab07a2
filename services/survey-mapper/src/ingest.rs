//! CSV survey ingestion with column-name heuristics.
//!
//! Header names are matched case-insensitively: X is the first column whose
//! name starts with `x`, Y the first starting with `y`, and the value column
//! is `value` if present, otherwise the first column starting with `v` or
//! `z`, or named `anomali`/`anomaly`. A file whose first record is all
//! numbers has no header and is read as `x, y, value`.

use std::path::Path;

use anyhow::{bail, Context, Result};
use csv::StringRecord;
use serde::Serialize;
use tracing::debug;

use survey_common::{SamplePoint, SampleSet};

/// Column positions used for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnMapping {
    pub x: usize,
    pub y: usize,
    pub value: usize,
}

impl ColumnMapping {
    pub const HEADERLESS: ColumnMapping = ColumnMapping {
        x: 0,
        y: 1,
        value: 2,
    };
}

/// Parsed survey plus ingestion bookkeeping.
#[derive(Debug, Clone)]
pub struct SurveyData {
    pub samples: SampleSet,
    pub columns: ColumnMapping,
    /// Header names of the chosen columns, when the file has a header.
    pub column_names: Option<[String; 3]>,
    /// Data rows read, including dropped ones.
    pub rows: usize,
    /// Rows dropped for missing, unparseable or non-finite fields.
    pub dropped: usize,
}

/// Pick the x, y and value columns from header names.
pub fn detect_columns<I, S>(headers: I) -> Option<ColumnMapping>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let lower: Vec<String> = headers
        .into_iter()
        .map(|h| h.as_ref().trim().to_lowercase())
        .collect();

    let x = lower.iter().position(|h| h.starts_with('x'))?;
    let y = lower.iter().position(|h| h.starts_with('y'))?;
    let free = |i: &usize| *i != x && *i != y;

    let value = lower
        .iter()
        .position(|h| h == "value")
        .filter(free)
        .or_else(|| {
            lower
                .iter()
                .enumerate()
                .find(|(i, h)| {
                    free(i)
                        && (h.starts_with('v')
                            || h.starts_with('z')
                            || *h == "anomali"
                            || *h == "anomaly")
                })
                .map(|(i, _)| i)
        })?;

    Some(ColumnMapping { x, y, value })
}

pub fn load_csv(path: &Path) -> Result<SurveyData> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_csv(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Parse CSV text into samples.
///
/// Blank lines and `#` comments are skipped. Rows with too few fields,
/// unparseable numbers or non-finite values are dropped and counted.
pub fn parse_csv(content: &str) -> Result<SurveyData> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(content.as_bytes());

    let mut records = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV parse error at record {}", index + 1))?;
        if !is_skipped(&record) {
            records.push(record);
        }
    }

    let Some(first) = records.first() else {
        bail!("CSV file is empty");
    };

    let headerless = first.iter().all(|f| f.parse::<f64>().is_ok());
    let (columns, column_names) = if headerless {
        if first.len() < 3 {
            bail!(
                "headerless CSV needs at least 3 columns, found {}",
                first.len()
            );
        }
        (ColumnMapping::HEADERLESS, None)
    } else {
        let Some(columns) = detect_columns(first) else {
            bail!(
                "could not find X, Y and value columns among: {}",
                first.iter().collect::<Vec<_>>().join(", ")
            );
        };
        let name = |i: usize| first.get(i).unwrap_or_default().to_string();
        let names = [name(columns.x), name(columns.y), name(columns.value)];
        (columns, Some(names))
    };

    let data_rows = if headerless { &records[..] } else { &records[1..] };
    let mut points = Vec::with_capacity(data_rows.len());
    let mut dropped = 0;

    for record in data_rows {
        match parse_row(record, &columns) {
            Some(point) => points.push(point),
            None => dropped += 1,
        }
    }

    let rows = data_rows.len();
    debug!(rows, dropped, ?columns, "Parsed survey CSV");

    Ok(SurveyData {
        samples: SampleSet::new(points),
        columns,
        column_names,
        rows,
        dropped,
    })
}

/// Blank records and comment lines with leading whitespace.
fn is_skipped(record: &StringRecord) -> bool {
    record.iter().all(str::is_empty) || record.get(0).is_some_and(|f| f.starts_with('#'))
}

fn parse_row(record: &StringRecord, columns: &ColumnMapping) -> Option<SamplePoint> {
    let number = |i: usize| -> Option<f64> {
        record
            .get(i)?
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
    };
    Some(SamplePoint::new(
        number(columns.x)?,
        number(columns.y)?,
        number(columns.value)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_plain_headers() {
        assert_eq!(
            detect_columns(&["X", "Y", "Value"]),
            Some(ColumnMapping { x: 0, y: 1, value: 2 })
        );
    }

    #[test]
    fn test_detect_prefixed_headers() {
        let headers = ["Station", "X_Easting", "Y_Northing", "Anomali"];
        assert_eq!(
            detect_columns(&headers),
            Some(ColumnMapping { x: 1, y: 2, value: 3 })
        );
    }

    #[test]
    fn test_value_preferred_over_prefix_match() {
        let headers = ["z_index", "x", "y", "value"];
        assert_eq!(detect_columns(&headers).map(|c| c.value), Some(3));
    }

    #[test]
    fn test_z_column() {
        assert_eq!(detect_columns(&["x", "y", "z"]).map(|c| c.value), Some(2));
    }

    #[test]
    fn test_missing_value_column() {
        assert_eq!(detect_columns(&["x", "y", "depth"]), None);
        assert_eq!(detect_columns(&["lon", "lat", "value"]), None);
    }

    #[test]
    fn test_detect_from_string_record() {
        let header = StringRecord::from(vec!["Station", "X", "Y", "Value"]);
        assert_eq!(
            detect_columns(&header),
            Some(ColumnMapping { x: 1, y: 2, value: 3 })
        );
    }

    #[test]
    fn test_indented_comment_skipped() {
        let data = parse_csv("x,y,value\n   # note\n1,2,3\n").unwrap();
        assert_eq!(data.rows, 1);
        assert_eq!(data.dropped, 0);
    }
}
