//! The end-to-end mapping run.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use interpolation::{interpolate_with_policy, InterpolationMethod};
use overlay::{package_overlay_png, samples_to_kml, OverlayOptions};
use renderer::{render_display, render_with_options, DisplayOptions, RenderOptions};
use survey_common::{build_lattice, Field, SurveyError};

use crate::config::MapperConfig;
use crate::ingest::load_csv;

pub const HEATMAP_FILE: &str = "heatmap.png";
pub const DISPLAY_FILE: &str = "map.png";

/// Files written by a run.
#[derive(Debug, Clone, Serialize)]
pub struct OutputFiles {
    pub heatmap: PathBuf,
    pub display: PathBuf,
    pub overlay: PathBuf,
    pub stations: PathBuf,
}

/// What a run did, for logging and tests.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub samples: usize,
    pub rows: usize,
    pub dropped: usize,
    pub requested_method: InterpolationMethod,
    pub method: InterpolationMethod,
    /// Why the requested method was replaced, if it was.
    pub fallback: Option<String>,
    pub value_min: f64,
    pub value_max: f64,
    pub defined_nodes: usize,
    pub outputs: OutputFiles,
}

/// Grid, render and export one survey.
pub fn run(config: &MapperConfig) -> Result<RunSummary> {
    config.validate()?;
    let colormap = config.colormap()?;

    let data = load_csv(&config.input)?;
    if data.samples.is_empty() {
        bail!(
            "{} has no usable samples ({} rows dropped)",
            config.input.display(),
            data.dropped
        );
    }
    if data.dropped > 0 {
        warn!(dropped = data.dropped, rows = data.rows, "Dropped unusable rows");
    }
    info!(
        samples = data.samples.len(),
        columns = ?data.column_names,
        "Loaded survey"
    );

    let bounds = data.samples.bounds()?;
    let lattice = build_lattice(&bounds, config.resolution)
        .with_context(|| format!("Cannot grid survey with bounds {}", bounds))?;

    let result = interpolate_with_policy(&data.samples, &lattice, config.method, config.fallback)
        .with_context(|| format!("{} interpolation failed", config.method))?;
    if let Some(fallback) = &result.fallback {
        warn!(
            requested = %fallback.requested,
            reason = %fallback.reason,
            "Fell back to nearest-neighbour interpolation"
        );
    }
    let field = result.field;
    let (value_min, value_max) = defined_range(&field)?;
    info!(
        method = %result.method,
        defined = field.defined_count(),
        total = field.nx() * field.ny(),
        value_min,
        value_max,
        "Interpolated field"
    );

    let render_options = RenderOptions {
        center_on_zero: config.center_on_zero,
        ..RenderOptions::default()
    };
    let heatmap = render_with_options(&field, &colormap, None, &render_options)
        .context("Failed to render heatmap")?;
    let heatmap_png = heatmap.encode_png().context("Failed to encode heatmap")?;

    let display_options = DisplayOptions {
        width: config.display_width,
        contour_levels: config.contours,
        show_samples: config.show_samples,
        render: render_options,
        ..DisplayOptions::default()
    };
    let display = render_display(
        &field,
        &lattice,
        data.samples.points(),
        &colormap,
        None,
        &display_options,
    )
    .context("Failed to render display map")?;
    let display_png = display.encode_png().context("Failed to encode display map")?;

    let overlay_options = OverlayOptions {
        image_path: config.image_path.clone(),
        ..OverlayOptions::default()
    };
    let archive = package_overlay_png(heatmap_png.clone(), &bounds, &config.title, &overlay_options)
        .context("Failed to package overlay")?;
    let stations = samples_to_kml(data.samples.points(), &config.title);

    fs::create_dir_all(&config.output_dir).with_context(|| {
        format!("Failed to create output directory {}", config.output_dir.display())
    })?;
    let stem = config.stem();
    let outputs = OutputFiles {
        heatmap: config.output_dir.join(HEATMAP_FILE),
        display: config.output_dir.join(DISPLAY_FILE),
        overlay: config.output_dir.join(format!("{}_overlay.kmz", stem)),
        stations: config.output_dir.join(format!("{}_stations.kml", stem)),
    };
    write(&outputs.heatmap, &heatmap_png)?;
    write(&outputs.display, &display_png)?;
    write(&outputs.overlay, archive.bytes())?;
    write(&outputs.stations, stations.as_bytes())?;

    let summary = RunSummary {
        samples: data.samples.len(),
        rows: data.rows,
        dropped: data.dropped,
        requested_method: config.method,
        method: result.method,
        fallback: result.fallback.map(|f| f.reason),
        value_min,
        value_max,
        defined_nodes: field.defined_count(),
        outputs,
    };
    info!(
        samples = summary.samples,
        dropped = summary.dropped,
        method = %summary.method,
        fallback = summary.fallback.is_some(),
        value_min = summary.value_min,
        value_max = summary.value_max,
        overlay = %summary.outputs.overlay.display(),
        "Survey mapped"
    );

    Ok(summary)
}

fn write(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}

/// Value range of the interpolated field; an all-undefined field is `EmptyField`.
fn defined_range(field: &Field) -> Result<(f64, f64)> {
    field
        .finite_range()
        .ok_or(SurveyError::EmptyField)
        .context("Interpolation produced no defined nodes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undefined_field_reports_empty_field() {
        let err = defined_range(&Field::undefined(3, 3)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SurveyError>(),
            Some(SurveyError::EmptyField)
        ));
    }

    #[test]
    fn test_defined_range() {
        let field = Field::from_values(2, 1, vec![f64::NAN, 4.0]).unwrap();
        assert_eq!(defined_range(&field).unwrap(), (4.0, 4.0));
    }
}
