//! Survey mapper CLI.
//!
//! Reads a CSV of scattered survey measurements, grids it, and writes a
//! heatmap PNG, a display map with contours, a KMZ ground overlay and a
//! station placemark KML.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use interpolation::{FallbackPolicy, InterpolationMethod};
use survey_mapper::{run, MapperConfig};

#[derive(Parser, Debug)]
#[command(name = "survey-mapper")]
#[command(about = "Grid a CSV survey and export a georeferenced overlay")]
struct Args {
    /// CSV file with X, Y and value columns
    #[arg(short, long, env = "SURVEY_INPUT")]
    input: PathBuf,

    /// Directory for the generated files
    #[arg(short, long, env = "SURVEY_OUTPUT_DIR", default_value = "out")]
    output_dir: PathBuf,

    /// Lattice nodes per axis (30-1000)
    #[arg(short, long, env = "SURVEY_RESOLUTION", default_value = "250")]
    resolution: usize,

    /// Interpolation method: linear, cubic or nearest
    #[arg(short, long, env = "SURVEY_METHOD", default_value = "linear")]
    method: InterpolationMethod,

    /// What to do when the method cannot run: strict or nearest
    #[arg(long, env = "SURVEY_FALLBACK", default_value = "strict")]
    fallback: FallbackPolicy,

    /// Palette name or comma-separated hex colours
    #[arg(short, long, env = "SURVEY_COLORMAP", default_value = "viridis")]
    colormap: String,

    /// Centre the colour scale on zero (anomaly maps)
    #[arg(long, env = "SURVEY_CENTER_ON_ZERO")]
    center_on_zero: bool,

    /// Contour levels on the display map (0 disables)
    #[arg(long, env = "SURVEY_CONTOURS", default_value = "12")]
    contours: usize,

    /// Do not draw sample markers on the display map
    #[arg(long)]
    no_samples: bool,

    /// Title written into the KML documents
    #[arg(short, long, env = "SURVEY_TITLE", default_value = "Survey Overlay")]
    title: String,

    /// Image path inside the KMZ archive
    #[arg(long, env = "SURVEY_IMAGE_PATH", default_value = "heatmap.png")]
    image_path: String,

    /// Width of the display map in pixels
    #[arg(long, env = "SURVEY_DISPLAY_WIDTH", default_value = "800")]
    display_width: u32,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn into_config(self) -> MapperConfig {
        MapperConfig {
            resolution: self.resolution,
            method: self.method,
            fallback: self.fallback,
            colormap: self.colormap,
            center_on_zero: self.center_on_zero,
            contours: self.contours,
            show_samples: !self.no_samples,
            title: self.title,
            image_path: self.image_path,
            display_width: self.display_width,
            ..MapperConfig::new(self.input, self.output_dir)
        }
    }
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);
    if args.json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    let config = args.into_config();
    info!(config = %serde_json::to_string(&config)?, "Starting survey mapper");

    let summary = run(&config)?;
    info!(
        heatmap = %summary.outputs.heatmap.display(),
        display = %summary.outputs.display.display(),
        stations = %summary.outputs.stations.display(),
        "Done"
    );
    Ok(())
}
