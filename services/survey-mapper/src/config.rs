//! Run configuration and its validation.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use interpolation::{FallbackPolicy, InterpolationMethod};
use renderer::Colormap;

pub const MIN_RESOLUTION: usize = 30;
pub const MAX_RESOLUTION: usize = 1000;
pub const MAX_CONTOURS: usize = 40;

/// Everything one mapping run needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapperConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    /// Lattice nodes per axis.
    pub resolution: usize,
    pub method: InterpolationMethod,
    pub fallback: FallbackPolicy,
    /// Palette name or comma-separated hex colours.
    pub colormap: String,
    pub center_on_zero: bool,
    /// Contour levels on the display map; 0 disables them.
    pub contours: usize,
    pub show_samples: bool,
    pub title: String,
    /// Image path inside the KMZ.
    pub image_path: String,
    /// Width of `map.png` in pixels.
    pub display_width: u32,
}

impl MapperConfig {
    /// Defaults for everything but the input and output locations.
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
            resolution: 250,
            method: InterpolationMethod::Linear,
            fallback: FallbackPolicy::Strict,
            colormap: "viridis".to_string(),
            center_on_zero: false,
            contours: 12,
            show_samples: true,
            title: "Survey Overlay".to_string(),
            image_path: "heatmap.png".to_string(),
            display_width: 800,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_RESOLUTION..=MAX_RESOLUTION).contains(&self.resolution) {
            bail!(
                "resolution must be between {} and {}, got {}",
                MIN_RESOLUTION,
                MAX_RESOLUTION,
                self.resolution
            );
        }
        if self.contours > MAX_CONTOURS {
            bail!(
                "contour level count must be at most {}, got {}",
                MAX_CONTOURS,
                self.contours
            );
        }
        if self.title.trim().is_empty() {
            bail!("title must not be empty");
        }
        if self.display_width == 0 {
            bail!("display width must be positive");
        }
        self.colormap()?;
        Ok(())
    }

    pub fn colormap(&self) -> Result<Colormap> {
        self.colormap
            .parse()
            .with_context(|| format!("Unknown colormap '{}'", self.colormap))
    }

    /// File name stem used for the KMZ and station KML.
    pub fn stem(&self) -> String {
        self.input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "survey".to_string())
    }
}
