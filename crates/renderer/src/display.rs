//! Display rendering: heatmap with contour lines and sample markers.
//!
//! This is presentation only. The exported overlay image comes from
//! [`crate::raster::render`] and never carries these decorations.

use serde::{Deserialize, Serialize};
use tiny_skia::{
    FillRule, FilterQuality, IntSize, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint,
    Stroke, Transform,
};
use tracing::debug;

use survey_common::{Field, Lattice, SamplePoint, SurveyError, SurveyResult};

use crate::colormap::{Color, Colormap, ValueRange};
use crate::contour::{evenly_spaced_levels, generate_contours, Contour};
use crate::raster::{render_with_options, RasterImage, RenderOptions};

/// Configuration for [`render_display`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayOptions {
    /// Output width in pixels; the height follows the bounds' aspect ratio.
    pub width: u32,
    pub background: Color,
    /// Number of evenly spaced contour levels (0 = no contours).
    pub contour_levels: usize,
    /// Chaikin smoothing passes applied to each contour.
    pub contour_smoothing: u32,
    pub contour_color: Color,
    pub contour_width: f32,
    pub show_samples: bool,
    pub marker_color: Color,
    pub marker_radius: f32,
    pub render: RenderOptions,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            width: 800,
            background: Color::rgb(255, 255, 255),
            contour_levels: 10,
            contour_smoothing: 1,
            contour_color: Color::new(0, 0, 0, 200),
            contour_width: 1.0,
            show_samples: true,
            marker_color: Color::rgb(0, 0, 0),
            marker_radius: 2.5,
            render: RenderOptions::default(),
        }
    }
}

/// Maps lattice index space and survey coordinates to canvas pixels.
struct CanvasTransform {
    nx: usize,
    ny: usize,
    px_per_col: f32,
    px_per_row: f32,
    min_x: f64,
    min_y: f64,
    step_x: f64,
    step_y: f64,
}

impl CanvasTransform {
    fn new(lattice: &Lattice, width: u32, height: u32) -> Self {
        let (step_x, step_y) = lattice.spacing();
        Self {
            nx: lattice.nx(),
            ny: lattice.ny(),
            px_per_col: width as f32 / lattice.nx() as f32,
            px_per_row: height as f32 / lattice.ny() as f32,
            min_x: lattice.bounds().min_x,
            min_y: lattice.bounds().min_y,
            step_x,
            step_y,
        }
    }

    /// Node `(col, row)` sits at the centre of its heatmap pixel.
    fn grid_to_canvas(&self, col: f32, row: f32) -> (f32, f32) {
        let x = (col + 0.5) * self.px_per_col;
        let y = ((self.ny - 1) as f32 - row + 0.5) * self.px_per_row;
        (x, y)
    }

    fn survey_to_canvas(&self, x: f64, y: f64) -> (f32, f32) {
        let col = if self.step_x > 0.0 { (x - self.min_x) / self.step_x } else { 0.0 };
        let row = if self.step_y > 0.0 { (y - self.min_y) / self.step_y } else { 0.0 };
        self.grid_to_canvas(col as f32, row as f32)
    }

    fn heatmap_scale(&self) -> Transform {
        Transform::from_scale(self.px_per_col, self.px_per_row)
    }
}

/// Render a display map: the heatmap scaled to `options.width`, overlaid
/// with contour lines of the field and markers at the sample locations.
pub fn render_display(
    field: &Field,
    lattice: &Lattice,
    samples: &[SamplePoint],
    colormap: &Colormap,
    range: Option<ValueRange>,
    options: &DisplayOptions,
) -> SurveyResult<RasterImage> {
    if field.nx() != lattice.nx() || field.ny() != lattice.ny() {
        return Err(SurveyError::invalid_parameter(
            "field",
            format!(
                "field is {}x{} but lattice is {}x{}",
                field.nx(),
                field.ny(),
                lattice.nx(),
                lattice.ny()
            ),
        ));
    }

    let heatmap = render_with_options(field, colormap, range, &options.render)?;

    let width = options.width.max(1);
    let aspect = lattice.bounds().height() / lattice.bounds().width();
    let height = ((width as f64 * aspect).round() as u32).clamp(1, width.saturating_mul(4));

    let mut canvas = Pixmap::new(width, height).ok_or_else(|| {
        SurveyError::Encoding(format!("cannot allocate a {}x{} canvas", width, height))
    })?;
    canvas.fill(to_skia(options.background));

    let transform = CanvasTransform::new(lattice, width, height);

    let heat = to_pixmap(&heatmap)?;
    let paint = PixmapPaint {
        quality: FilterQuality::Nearest,
        ..PixmapPaint::default()
    };
    canvas.draw_pixmap(0, 0, heat.as_ref(), &paint, transform.heatmap_scale(), None);

    let mut contour_count = 0;
    if options.contour_levels > 0 {
        if let Some((lo, hi)) = field.finite_range() {
            let levels = evenly_spaced_levels(lo, hi, options.contour_levels);
            let contours = generate_contours(field, &levels, options.contour_smoothing);
            contour_count = contours.len();
            draw_contours(&mut canvas, &contours, &transform, options);
        }
    }

    if options.show_samples {
        draw_markers(&mut canvas, samples, &transform, options);
    }

    debug!(
        width,
        height,
        contours = contour_count,
        markers = if options.show_samples { samples.len() } else { 0 },
        "Rendered display map"
    );

    from_pixmap(&canvas)
}

fn draw_contours(
    canvas: &mut Pixmap,
    contours: &[Contour],
    transform: &CanvasTransform,
    options: &DisplayOptions,
) {
    let mut paint = Paint::default();
    let c = options.contour_color;
    paint.set_color_rgba8(c.r, c.g, c.b, c.a);
    paint.anti_alias = true;

    let stroke = Stroke {
        width: options.contour_width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };

    for contour in contours {
        let Some((first, rest)) = contour.points.split_first() else {
            continue;
        };
        if rest.is_empty() {
            continue;
        }

        let mut pb = PathBuilder::new();
        let (x, y) = transform.grid_to_canvas(first.x, first.y);
        pb.move_to(x, y);
        for point in rest {
            let (x, y) = transform.grid_to_canvas(point.x, point.y);
            pb.line_to(x, y);
        }
        if contour.closed {
            pb.close();
        }

        if let Some(path) = pb.finish() {
            canvas.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
    }
}

fn draw_markers(
    canvas: &mut Pixmap,
    samples: &[SamplePoint],
    transform: &CanvasTransform,
    options: &DisplayOptions,
) {
    let mut paint = Paint::default();
    let c = options.marker_color;
    paint.set_color_rgba8(c.r, c.g, c.b, c.a);
    paint.anti_alias = true;

    for sample in samples {
        let (x, y) = transform.survey_to_canvas(sample.x, sample.y);
        if let Some(circle) = PathBuilder::from_circle(x, y, options.marker_radius) {
            canvas.fill_path(&circle, &paint, FillRule::Winding, Transform::identity(), None);
        }
    }
}

fn to_skia(color: Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a)
}

/// Straight RGBA image to a premultiplied pixmap.
fn to_pixmap(image: &RasterImage) -> SurveyResult<Pixmap> {
    let premultiply = |c: u8, a: u8| ((c as u16 * a as u16 + 127) / 255) as u8;
    let data: Vec<u8> = image
        .pixels()
        .chunks_exact(4)
        .flat_map(|p| {
            let a = p[3];
            [premultiply(p[0], a), premultiply(p[1], a), premultiply(p[2], a), a]
        })
        .collect();

    let size = IntSize::from_wh(image.width() as u32, image.height() as u32)
        .ok_or_else(|| SurveyError::Encoding("heatmap has zero size".to_string()))?;
    Pixmap::from_vec(data, size)
        .ok_or_else(|| SurveyError::Encoding("heatmap does not fit a pixmap".to_string()))
}

/// Premultiplied pixmap back to a straight RGBA image.
fn from_pixmap(pixmap: &Pixmap) -> SurveyResult<RasterImage> {
    let pixels: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    RasterImage::from_rgba(pixmap.width() as usize, pixmap.height() as usize, pixels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_common::{build_lattice, BoundingBox};

    #[test]
    fn test_canvas_transform_corners() {
        let lattice = build_lattice(&BoundingBox::new(0.0, 0.0, 10.0, 10.0), 11).unwrap();
        let t = CanvasTransform::new(&lattice, 110, 110);

        // South-west node sits in the bottom-left pixel block.
        assert_eq!(t.survey_to_canvas(0.0, 0.0), (5.0, 105.0));
        // North-east node sits in the top-right pixel block.
        assert_eq!(t.survey_to_canvas(10.0, 10.0), (105.0, 5.0));
    }

    #[test]
    fn test_pixmap_round_trip_keeps_opaque_pixels() {
        let image = RasterImage::from_rgba(2, 1, vec![10, 20, 30, 255, 0, 0, 0, 0]).unwrap();
        let back = from_pixmap(&to_pixmap(&image).unwrap()).unwrap();
        assert_eq!(back.pixel(0, 0), image.pixel(0, 0));
        assert_eq!(back.pixel(1, 0).map(|c| c.a), Some(0));
    }
}
