//! Heatmap rasterization of interpolated fields.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use survey_common::{Field, SurveyError, SurveyResult};

use crate::colormap::{Color, Colormap, ValueRange};
use crate::png;

/// Options for [`render_with_options`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Colour of nodes without an estimate. Fully transparent by default,
    /// which no data colour can equal since colour maps are opaque.
    pub no_data_color: Color,
    /// Symmetric range around zero, for anomaly maps.
    pub center_on_zero: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            no_data_color: Color::transparent(),
            center_on_zero: false,
        }
    }
}

/// An RGBA8 image, row 0 at the top (maximum Y).
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl RasterImage {
    /// Wrap RGBA bytes. Fails when the length does not match the size.
    pub fn from_rgba(width: usize, height: usize, pixels: Vec<u8>) -> SurveyResult<Self> {
        if pixels.len() != width * height * 4 {
            return Err(SurveyError::Encoding(format!(
                "expected {} RGBA bytes for {}x{}, got {}",
                width * height * 4,
                width,
                height,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// RGBA bytes, row-major from the top row.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Pixel at column `x`, row `y` (from the top).
    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        Some(Color::new(
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ))
    }

    /// Encode as PNG, indexed when the image has at most 256 colours.
    pub fn encode_png(&self) -> SurveyResult<Vec<u8>> {
        let bytes = png::create_png_auto(&self.pixels, self.width, self.height)?;
        debug!(
            width = self.width,
            height = self.height,
            bytes = bytes.len(),
            "Encoded PNG"
        );
        Ok(bytes)
    }
}

/// Render `field` through `colormap` with default options.
///
/// `range` defaults to the finite min/max of the field.
pub fn render(
    field: &Field,
    colormap: &Colormap,
    range: Option<ValueRange>,
) -> SurveyResult<RasterImage> {
    render_with_options(field, colormap, range, &RenderOptions::default())
}

/// Render `field` as a `nx × ny` heatmap.
///
/// Each defined value is normalised against the range and looked up in the
/// colour map's 256-entry table; undefined nodes get
/// `options.no_data_color`. Image row `r` shows field row `ny - 1 - r`, so
/// north is up. A field without any finite value is an `EmptyField` error,
/// and a no-data colour that the colour map can also produce is rejected.
pub fn render_with_options(
    field: &Field,
    colormap: &Colormap,
    range: Option<ValueRange>,
    options: &RenderOptions,
) -> SurveyResult<RasterImage> {
    if field.defined_count() == 0 {
        return Err(SurveyError::EmptyField);
    }

    let mut range = match range {
        Some(range) => range,
        None => ValueRange::from_field(field)?,
    };
    if options.center_on_zero {
        range = range.centered_on_zero();
    }

    let (width, height) = (field.nx(), field.ny());
    let lut = colormap.lut();
    if lut.contains(&options.no_data_color) {
        return Err(SurveyError::invalid_parameter(
            "no_data_color",
            format!(
                "{} also appears in colormap '{}'",
                options.no_data_color,
                colormap.name()
            ),
        ));
    }
    let no_data = options.no_data_color.to_array();

    let mut pixels = vec![0u8; width * height * 4];
    pixels
        .par_chunks_mut(width * 4)
        .enumerate()
        .for_each(|(r, out)| {
            let row = field.row(height - 1 - r);
            for (px, &value) in out.chunks_exact_mut(4).zip(row) {
                let rgba = if value.is_finite() {
                    lut[range.color_index(value) as usize].to_array()
                } else {
                    no_data
                };
                px.copy_from_slice(&rgba);
            }
        });

    debug!(
        width,
        height,
        colormap = colormap.name(),
        min = range.min,
        max = range.max,
        "Rendered heatmap"
    );

    RasterImage::from_rgba(width, height, pixels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_are_flipped() {
        // Bottom row 0, top row 1.
        let field = Field::from_values(1, 2, vec![0.0, 1.0]).unwrap();
        let cmap = Colormap::custom(&[Color::rgb(0, 0, 0), Color::rgb(255, 255, 255)]).unwrap();
        let image = render(&field, &cmap, None).unwrap();

        assert_eq!(image.pixel(0, 0), Some(Color::rgb(255, 255, 255)));
        assert_eq!(image.pixel(0, 1), Some(Color::rgb(0, 0, 0)));
    }

    #[test]
    fn test_all_undefined_is_empty() {
        let field = Field::undefined(3, 3);
        let err = render(&field, &Colormap::default(), None).unwrap_err();
        assert!(matches!(err, SurveyError::EmptyField));
    }

    #[test]
    fn test_rgba_length_checked() {
        assert!(RasterImage::from_rgba(2, 2, vec![0; 15]).is_err());
    }
}
