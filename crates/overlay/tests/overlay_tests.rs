//! End-to-end packaging tests: raster → archive → unpack.

use overlay::{
    package_overlay, package_overlay_png, package_overlay_with_options, unpack_overlay,
    OverlayOptions,
};
use renderer::{render, Colormap, RasterImage};
use survey_common::{BoundingBox, SurveyError};
use test_utils::{bbox, create_ramp_field, gravity_survey};

fn raster() -> RasterImage {
    render(&create_ramp_field(16, 12, -3.0, 9.0), &Colormap::default(), None).unwrap()
}

#[test]
fn test_round_trip_keeps_edges_and_image() {
    let bounds = BoundingBox::new(112.7501, -7.3333333333333, 112.8, -7.2);
    let raster = raster();
    let archive = package_overlay(&raster, &bounds, "Gravity survey").unwrap();

    let unpacked = unpack_overlay(archive.bytes()).unwrap();
    assert_eq!(unpacked.descriptor.bounds, bounds);
    assert_eq!(unpacked.descriptor.title, "Gravity survey");
    assert_eq!(unpacked.descriptor.href, "heatmap.png");
    assert_eq!(unpacked.image, raster.encode_png().unwrap());
}

#[test]
fn test_unpacked_image_decodes_to_raster() {
    let raster = raster();
    let archive = package_overlay(&raster, &BoundingBox::new(0.0, 0.0, 1.0, 1.0), "t").unwrap();
    let unpacked = unpack_overlay(archive.bytes()).unwrap();

    let decoded = image::load_from_memory(&unpacked.image).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (16, 12));
    assert_eq!(decoded.into_raw(), raster.pixels());
}

#[test]
fn test_nested_image_path() {
    let options = OverlayOptions {
        image_path: "images/heatmap.png".to_string(),
        overlay_name: "Anomaly heatmap".to_string(),
    };
    let archive = package_overlay_with_options(
        &raster(),
        &BoundingBox::new(500000.0, 9190000.0, 501000.0, 9191000.0),
        "UTM block",
        &options,
    )
    .unwrap();
    assert_eq!(archive.entry_names(), ["doc.kml", "images/heatmap.png"]);

    let unpacked = unpack_overlay(archive.bytes()).unwrap();
    assert_eq!(unpacked.descriptor.href, "images/heatmap.png");
    assert_eq!(unpacked.descriptor.overlay_name, "Anomaly heatmap");
    assert_eq!(unpacked.descriptor.bounds.max_y, 9191000.0);
}

#[test]
fn test_descriptor_text() {
    let bounds = BoundingBox::new(-0.5, 10.0, 0.25, 10.125);
    let archive = package_overlay_png(vec![0; 8], &bounds, "Q & A", &OverlayOptions::default())
        .unwrap();
    let kml = archive.descriptor().to_kml();

    assert!(kml.contains("<name>Q &amp; A</name>"));
    assert!(kml.contains("<north>10.125</north>"));
    assert!(kml.contains("<south>10</south>"));
    assert!(kml.contains("<east>0.25</east>"));
    assert!(kml.contains("<west>-0.5</west>"));
}

#[test]
fn test_degenerate_bounds_rejected() {
    let result = package_overlay(&raster(), &BoundingBox::new(0.0, 0.0, 0.0, 5.0), "t");
    assert!(matches!(result, Err(SurveyError::InvalidBounds { .. })));
}

#[test]
fn test_packaging_is_deterministic() {
    let bounds = BoundingBox::new(0.0, 0.0, 2.0, 1.0);
    let a = package_overlay(&raster(), &bounds, "t").unwrap();
    let b = package_overlay(&raster(), &bounds, "t").unwrap();
    assert_eq!(a.bytes(), b.bytes());
}

#[test]
fn test_unpack_rejects_non_archives() {
    assert!(matches!(
        unpack_overlay(b"PK but not really"),
        Err(SurveyError::MalformedArchive(_))
    ));
}

#[test]
fn test_unpack_requires_descriptor() {
    let bytes = overlay::archive::write_zip(&[overlay::ArchiveEntry::new(
        "heatmap.png",
        vec![1, 2, 3],
    )])
    .unwrap();
    assert!(matches!(
        unpack_overlay(&bytes),
        Err(SurveyError::MalformedArchive(_))
    ));
}

#[test]
fn test_unpack_requires_referenced_image() {
    let archive = package_overlay_png(
        vec![1, 2, 3],
        &BoundingBox::new(0.0, 0.0, 1.0, 1.0),
        "t",
        &OverlayOptions::default(),
    )
    .unwrap();
    let kml = archive.descriptor().to_kml();
    let bytes = overlay::archive::write_zip(&[
        overlay::ArchiveEntry::new("doc.kml", kml.into_bytes()),
        overlay::ArchiveEntry::new("other.png", vec![1, 2, 3]),
    ])
    .unwrap();
    assert!(matches!(
        unpack_overlay(&bytes),
        Err(SurveyError::MalformedArchive(_))
    ));
}

#[test]
fn test_station_placemarks_for_survey() {
    let survey = gravity_survey();
    let kml = overlay::samples_to_kml(survey.points(), "Gravity stations");

    assert_eq!(kml.matches("<Placemark>").count(), survey.len());
    assert!(kml.contains("<name>Value: -12.40</name>"));
    assert!(kml.contains("<coordinates>112.75,-7.25,0</coordinates>"));
}

#[test]
fn test_survey_block_edges_exact() {
    let (west, south, east, north) = bbox::SURVEY_BLOCK;
    let bounds = BoundingBox::new(west, south, east, north);
    let archive = package_overlay(&raster(), &bounds, "Block").unwrap();
    let kml = archive.descriptor().to_kml();

    assert!(kml.contains("<north>-7.2</north>"));
    assert!(kml.contains("<south>-7.3</south>"));
    assert!(kml.contains("<east>112.8</east>"));
    assert!(kml.contains("<west>112.7</west>"));
}
