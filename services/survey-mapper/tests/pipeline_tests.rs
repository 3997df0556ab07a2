//! End-to-end runs writing into temporary directories.

use interpolation::{FallbackPolicy, InterpolationMethod};
use overlay::unpack_overlay;
use survey_mapper::{run, MapperConfig};
use test_utils::{csv, write_temp_file};

fn config_for(contents: &str) -> (tempfile::TempDir, MapperConfig) {
    let (dir, input) = write_temp_file("gravity.csv", contents).unwrap();
    let mut config = MapperConfig::new(input, dir.path().join("out"));
    config.resolution = 40;
    config.display_width = 200;
    (dir, config)
}

#[test]
fn test_run_writes_all_outputs() {
    let (_dir, config) = config_for(csv::LONG_HEADERS);
    let summary = run(&config).unwrap();

    assert_eq!(summary.samples, 4);
    assert_eq!(summary.method, InterpolationMethod::Linear);
    assert!(summary.fallback.is_none());
    assert!(summary.value_min >= -12.4 && summary.value_max <= 18.7);

    let out = &summary.outputs;
    assert!(out.overlay.ends_with("gravity_overlay.kmz"));
    assert!(out.stations.ends_with("gravity_stations.kml"));

    let heatmap = std::fs::read(&out.heatmap).unwrap();
    let decoded = image::load_from_memory(&heatmap).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (40, 40));

    let display = image::open(&out.display).unwrap();
    assert_eq!(display.width(), 200);

    let kml = std::fs::read_to_string(&out.stations).unwrap();
    assert_eq!(kml.matches("<Placemark>").count(), 4);
    assert!(kml.contains("<coordinates>680100,9190200,0</coordinates>"));
}

#[test]
fn test_overlay_matches_heatmap_and_bounds() {
    let (_dir, config) = config_for(csv::LONG_HEADERS);
    let summary = run(&config).unwrap();

    let kmz = std::fs::read(&summary.outputs.overlay).unwrap();
    let unpacked = unpack_overlay(&kmz).unwrap();
    assert_eq!(unpacked.image, std::fs::read(&summary.outputs.heatmap).unwrap());

    let b = unpacked.descriptor.bounds;
    assert_eq!((b.min_x, b.max_x), (680100.0, 683900.0));
    assert_eq!((b.min_y, b.max_y), (9190200.0, 9193800.0));
    assert_eq!(unpacked.descriptor.title, "Survey Overlay");
}

#[test]
fn test_collinear_strict_fails() {
    let (_dir, config) = config_for(csv::COLLINEAR);
    let err = run(&config).unwrap_err();
    assert!(format!("{:#}", err).contains("collinear"), "{:#}", err);
}

#[test]
fn test_nearest_fallback_is_reported() {
    // The valid rows lie on the line y = x, so triangulation is impossible.
    let (_dir, mut config) = config_for(csv::WITH_BAD_ROWS);
    config.fallback = FallbackPolicy::Nearest;
    let summary = run(&config).unwrap();

    assert_eq!(summary.requested_method, InterpolationMethod::Linear);
    assert_eq!(summary.method, InterpolationMethod::Nearest);
    assert!(summary.fallback.is_some());
    assert_eq!(summary.dropped, 3);
    assert_eq!(summary.defined_nodes, 40 * 40);
}

#[test]
fn test_strict_policy_surfaces_unavailability() {
    let (_dir, config) = config_for(csv::WITH_BAD_ROWS);
    let err = run(&config).unwrap_err();
    assert!(format!("{:#}", err).contains("unavailable"), "{:#}", err);
    assert!(!config.output_dir.exists(), "no files on failure");
}

#[test]
fn test_single_sample_cannot_be_gridded() {
    let (_dir, mut config) = config_for(csv::SINGLE);
    config.method = InterpolationMethod::Nearest;
    assert!(run(&config).is_err());
}

#[test]
fn test_nested_image_path_and_cubic() {
    let (_dir, mut config) = config_for(csv::LONG_HEADERS);
    config.method = InterpolationMethod::Cubic;
    config.image_path = "images/heatmap.png".to_string();
    config.contours = 0;
    let summary = run(&config).unwrap();

    let kmz = std::fs::read(&summary.outputs.overlay).unwrap();
    assert_eq!(unpack_overlay(&kmz).unwrap().descriptor.href, "images/heatmap.png");
}

#[test]
fn test_invalid_config_rejected_before_reading() {
    let (_dir, mut config) = config_for(csv::XY_VALUE);
    config.resolution = 5;
    assert!(run(&config).is_err());
    assert!(!config.output_dir.exists());
}
