//! Georeferenced overlay packaging.
//!
//! An overlay archive is a ZIP (KMZ) holding exactly two entries: the
//! `doc.kml` descriptor and the PNG it references. The descriptor's
//! LatLonBox carries the survey bounds unchanged, so a viewer stretches
//! the image over the surveyed area.
//!
//! ```no_run
//! use overlay::package_overlay;
//! use renderer::{render, Colormap};
//! use survey_common::{BoundingBox, Field};
//!
//! let field = Field::from_values(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
//! let raster = render(&field, &Colormap::default(), None).unwrap();
//! let bounds = BoundingBox::new(112.70, -7.30, 112.80, -7.20);
//! let archive = package_overlay(&raster, &bounds, "Gravity survey").unwrap();
//! std::fs::write("survey_overlay.kmz", archive.bytes()).unwrap();
//! ```

pub mod archive;
pub mod kml;
pub mod placemarks;

use serde::{Deserialize, Serialize};
use tracing::debug;

use renderer::RasterImage;
use survey_common::{BoundingBox, SurveyError, SurveyResult};

pub use archive::ArchiveEntry;
pub use kml::OverlayDescriptor;
pub use placemarks::samples_to_kml;

/// Name of the descriptor entry inside every overlay archive.
pub const DESCRIPTOR_NAME: &str = "doc.kml";

/// Naming inside the archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayOptions {
    /// Archive path of the image, also written as the descriptor href.
    pub image_path: String,
    /// Name of the GroundOverlay element.
    pub overlay_name: String,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            image_path: "heatmap.png".to_string(),
            overlay_name: "Heatmap".to_string(),
        }
    }
}

/// A packaged overlay: archive bytes plus what went into them.
#[derive(Debug, Clone)]
pub struct OverlayArchive {
    bytes: Vec<u8>,
    descriptor: OverlayDescriptor,
    entry_names: Vec<String>,
}

impl OverlayArchive {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn descriptor(&self) -> &OverlayDescriptor {
        &self.descriptor
    }

    /// Entry names in archive order.
    pub fn entry_names(&self) -> &[String] {
        &self.entry_names
    }
}

/// An overlay read back from archive bytes.
#[derive(Debug, Clone)]
pub struct UnpackedOverlay {
    pub descriptor: OverlayDescriptor,
    pub image: Vec<u8>,
}

/// Encode `raster` as PNG and package it with default naming.
pub fn package_overlay(
    raster: &RasterImage,
    bounds: &BoundingBox,
    title: &str,
) -> SurveyResult<OverlayArchive> {
    package_overlay_with_options(raster, bounds, title, &OverlayOptions::default())
}

pub fn package_overlay_with_options(
    raster: &RasterImage,
    bounds: &BoundingBox,
    title: &str,
    options: &OverlayOptions,
) -> SurveyResult<OverlayArchive> {
    let png = raster.encode_png()?;
    package_overlay_png(png, bounds, title, options)
}

/// Package already encoded PNG bytes.
///
/// Fails with `InvalidBounds` for a degenerate box and with
/// `ArchiveConsistency` when the image path cannot be referenced from the
/// descriptor. Nothing is returned on failure.
pub fn package_overlay_png(
    png: Vec<u8>,
    bounds: &BoundingBox,
    title: &str,
    options: &OverlayOptions,
) -> SurveyResult<OverlayArchive> {
    bounds.validate()?;
    check_image_path(&options.image_path)?;

    let descriptor = OverlayDescriptor {
        title: title.to_string(),
        overlay_name: options.overlay_name.clone(),
        href: options.image_path.clone(),
        bounds: *bounds,
    };
    let entries = [
        ArchiveEntry::new(DESCRIPTOR_NAME, descriptor.to_kml().into_bytes()),
        ArchiveEntry::new(options.image_path.as_str(), png),
    ];

    let entry_names: Vec<String> = entries.iter().map(|e| e.name.clone()).collect();
    if !entry_names.iter().any(|name| *name == descriptor.href) {
        return Err(SurveyError::ArchiveConsistency(format!(
            "descriptor references '{}' but the archive holds {:?}",
            descriptor.href, entry_names
        )));
    }

    let bytes = archive::write_zip(&entries)?;
    debug!(
        bytes = bytes.len(),
        image = %descriptor.href,
        bounds = %bounds,
        "Packaged overlay archive"
    );

    Ok(OverlayArchive {
        bytes,
        descriptor,
        entry_names,
    })
}

/// Read an overlay archive back.
///
/// The archive must contain `doc.kml`, and the href it declares must name
/// another entry.
pub fn unpack_overlay(bytes: &[u8]) -> SurveyResult<UnpackedOverlay> {
    let mut entries = archive::read_zip(bytes)?;

    let kml_index = entries
        .iter()
        .position(|e| e.name == DESCRIPTOR_NAME)
        .ok_or_else(|| SurveyError::MalformedArchive(format!("no {} entry", DESCRIPTOR_NAME)))?;
    let kml = std::str::from_utf8(&entries[kml_index].data)
        .map_err(|_| SurveyError::MalformedArchive(format!("{} is not UTF-8", DESCRIPTOR_NAME)))?;
    let descriptor = OverlayDescriptor::parse(kml)?;

    let image_index = entries
        .iter()
        .position(|e| e.name == descriptor.href)
        .ok_or_else(|| {
            SurveyError::MalformedArchive(format!(
                "descriptor references '{}', which is not in the archive",
                descriptor.href
            ))
        })?;
    let image = entries.swap_remove(image_index).data;

    Ok(UnpackedOverlay { descriptor, image })
}

/// The image path must be a plain relative archive path.
fn check_image_path(path: &str) -> SurveyResult<()> {
    let problem = if path.trim().is_empty() {
        Some("is empty")
    } else if path != path.trim() {
        Some("has surrounding whitespace")
    } else if path.starts_with('/') || path.contains('\\') {
        Some("is not a relative forward-slash path")
    } else if path.split('/').any(|part| part.is_empty() || part == "." || part == "..") {
        Some("has an empty, '.' or '..' component")
    } else if path == DESCRIPTOR_NAME {
        Some("collides with the descriptor")
    } else {
        None
    };

    match problem {
        Some(problem) => Err(SurveyError::ArchiveConsistency(format!(
            "image path '{}' {}",
            path, problem
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> BoundingBox {
        BoundingBox::new(0.0, 0.0, 10.0, 5.0)
    }

    #[test]
    fn test_image_path_rules() {
        for bad in ["", " a.png", "/abs.png", "a\\b.png", "../up.png", "a//b.png", "doc.kml"] {
            assert!(
                matches!(check_image_path(bad), Err(SurveyError::ArchiveConsistency(_))),
                "{:?}",
                bad
            );
        }
        for good in ["heatmap.png", "images/heatmap.png", "a/b/c.png"] {
            assert!(check_image_path(good).is_ok(), "{:?}", good);
        }
    }

    #[test]
    fn test_bad_image_path_yields_no_archive() {
        let options = OverlayOptions {
            image_path: "../escape.png".to_string(),
            ..OverlayOptions::default()
        };
        let result = package_overlay_png(vec![1, 2, 3], &bounds(), "t", &options);
        assert!(matches!(result, Err(SurveyError::ArchiveConsistency(_))));
    }

    #[test]
    fn test_entries_in_order() {
        let archive =
            package_overlay_png(vec![1, 2, 3], &bounds(), "t", &OverlayOptions::default()).unwrap();
        assert_eq!(archive.entry_names(), ["doc.kml", "heatmap.png"]);
    }
}
