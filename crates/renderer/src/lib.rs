//! Image rendering for interpolated survey fields.
//!
//! Implements:
//! - Colour maps and value normalisation ([`colormap`])
//! - Heatmap rasterization of a field ([`raster`])
//! - Contour lines (marching squares) ([`contour`])
//! - Display maps with contours and sample markers ([`display`])
//! - PNG encoding ([`png`])

pub mod colormap;
pub mod contour;
pub mod display;
pub mod png;
pub mod raster;

pub use colormap::{Color, Colormap, NamedColormap, ValueRange};
pub use display::{render_display, DisplayOptions};
pub use raster::{render, render_with_options, RasterImage, RenderOptions};
