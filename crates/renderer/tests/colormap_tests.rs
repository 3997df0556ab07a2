//! Tests for colour maps and value normalisation.

use renderer::colormap::{Color, Colormap, NamedColormap, ValueRange, LUT_SIZE};
use renderer::render;
use survey_common::Field;

const BLUE: Color = Color::rgb(0, 0, 255);
const RED: Color = Color::rgb(255, 0, 0);

// ============================================================================
// Two-colour scenario
// ============================================================================

#[test]
fn test_blue_red_over_ten_to_twenty() {
    let cmap = Colormap::custom(&[BLUE, RED]).unwrap();
    let field = Field::from_values(3, 1, vec![10.0, 15.0, 20.0]).unwrap();
    let image = render(&field, &cmap, None).unwrap();

    assert_eq!(image.pixel(0, 0), Some(BLUE));
    assert_eq!(image.pixel(2, 0), Some(RED));

    // The midpoint is an even blend, to within one lookup-table step.
    let mid = image.pixel(1, 0).unwrap();
    assert_eq!(mid, cmap.lut()[128]);
    assert!((mid.r as i32 - 128).abs() <= 1, "{:?}", mid);
    assert!((mid.b as i32 - 127).abs() <= 1, "{:?}", mid);
    assert_eq!(mid.g, 0);
    assert_eq!(mid.a, 255);
}

#[test]
fn test_explicit_range_clamps() {
    let cmap = Colormap::custom(&[BLUE, RED]).unwrap();
    let field = Field::from_values(2, 1, vec![-100.0, 100.0]).unwrap();
    let range = ValueRange::new(10.0, 20.0).unwrap();
    let image = render(&field, &cmap, Some(range)).unwrap();

    assert_eq!(image.pixel(0, 0), Some(BLUE));
    assert_eq!(image.pixel(1, 0), Some(RED));
}

// ============================================================================
// Lookup table properties
// ============================================================================

#[test]
fn test_color_index_is_monotonic() {
    let range = ValueRange::new(-3.7, 12.9).unwrap();
    let mut previous = 0u8;
    for i in 0..=10_000 {
        let v = -5.0 + i as f64 * 20.0 / 10_000.0;
        let index = range.color_index(v);
        assert!(index >= previous, "index decreased at {}", v);
        previous = index;
    }
    assert_eq!(range.color_index(-3.7), 0);
    assert_eq!(range.color_index(12.9), 255);
}

#[test]
fn test_lut_endpoints_match_stops() {
    for name in NamedColormap::ALL {
        let cmap = Colormap::named(name);
        let lut = cmap.lut();
        assert_eq!(lut.len(), LUT_SIZE);
        assert_eq!(lut[0], cmap.stops()[0].color, "{}", name);
        assert_eq!(lut[255], cmap.stops()[cmap.stops().len() - 1].color, "{}", name);
    }
}

#[test]
fn test_gray_lut_is_identity() {
    let lut = Colormap::named(NamedColormap::Gray).lut();
    for (i, c) in lut.iter().enumerate() {
        assert_eq!((c.r as usize, c.g as usize, c.b as usize), (i, i, i));
    }
}

#[test]
fn test_three_stop_blend() {
    let cmap = Colormap::custom(&[BLUE, Color::rgb(0, 255, 0), RED]).unwrap();
    assert_eq!(cmap.color_at(0.5), Color::rgb(0, 255, 0));
    assert_eq!(cmap.color_at(0.25), Color::rgb(0, 128, 128));
    assert_eq!(cmap.color_at(-1.0), BLUE);
    assert_eq!(cmap.color_at(2.0), RED);
}

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn test_unknown_colormap_rejected() {
    assert!("rainbow".parse::<Colormap>().is_err());
    assert!("#ff0000".parse::<Colormap>().is_err()); // one colour only
}

#[test]
fn test_named_colormap_parse() {
    let cmap: Colormap = "coolwarm".parse().unwrap();
    assert_eq!(cmap.name(), "coolwarm");
}

#[test]
fn test_centered_range_puts_zero_mid_palette() {
    let field = Field::from_values(3, 1, vec![-2.0, 0.0, 8.0]).unwrap();
    let range = ValueRange::from_field(&field).unwrap().centered_on_zero();
    assert_eq!((range.min, range.max), (-8.0, 8.0));
    assert_eq!(range.color_index(0.0), 128);
}
