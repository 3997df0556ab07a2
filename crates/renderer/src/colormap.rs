//! Colour maps and value normalisation for heatmap rendering.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use survey_common::{Field, SurveyError, SurveyResult};

/// Number of entries in a colour lookup table.
pub const LUT_SIZE: usize = 256;

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn transparent() -> Self {
        Self { r: 0, g: 0, b: 0, a: 0 }
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> SurveyResult<Self> {
        let digits = hex.trim().trim_start_matches('#');
        let bad = || SurveyError::invalid_parameter("color", format!("invalid hex colour '{}'", hex));

        if !(digits.len() == 6 || digits.len() == 8) || !digits.is_ascii() {
            return Err(bad());
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| bad());

        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a: if digits.len() == 8 { channel(6)? } else { 255 },
        })
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

/// Linear color interpolation
fn interpolate_color(color1: Color, color2: Color, t: f64) -> Color {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;
    let mix = |a: u8, b: u8| (a as f64 * t_inv + b as f64 * t).round() as u8;

    Color::new(
        mix(color1.r, color2.r),
        mix(color1.g, color2.g),
        mix(color1.b, color2.b),
        mix(color1.a, color2.a),
    )
}

/// A colour at a position in `[0, 1]` along a colour map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub position: f64,
    pub color: Color,
}

/// Built-in palettes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamedColormap {
    Viridis,
    Plasma,
    Jet,
    Gray,
    Coolwarm,
}

impl NamedColormap {
    pub const ALL: [NamedColormap; 5] = [
        Self::Viridis,
        Self::Plasma,
        Self::Jet,
        Self::Gray,
        Self::Coolwarm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Viridis => "viridis",
            Self::Plasma => "plasma",
            Self::Jet => "jet",
            Self::Gray => "gray",
            Self::Coolwarm => "coolwarm",
        }
    }

    fn stops(&self) -> Vec<ColorStop> {
        let even = |colors: &[(u8, u8, u8)]| -> Vec<ColorStop> {
            let last = (colors.len() - 1) as f64;
            colors
                .iter()
                .enumerate()
                .map(|(i, &(r, g, b))| ColorStop {
                    position: i as f64 / last,
                    color: Color::rgb(r, g, b),
                })
                .collect()
        };

        match self {
            Self::Viridis => even(&[
                (68, 1, 84),
                (72, 40, 120),
                (62, 73, 137),
                (49, 104, 142),
                (38, 130, 142),
                (31, 158, 137),
                (53, 183, 121),
                (110, 206, 88),
                (253, 231, 37),
            ]),
            Self::Plasma => even(&[
                (13, 8, 135),
                (65, 4, 157),
                (106, 0, 168),
                (143, 13, 164),
                (177, 42, 144),
                (204, 71, 120),
                (225, 100, 98),
                (252, 166, 54),
                (240, 249, 33),
            ]),
            Self::Jet => even(&[
                (0, 0, 128),
                (0, 0, 255),
                (0, 128, 255),
                (0, 255, 255),
                (128, 255, 128),
                (255, 255, 0),
                (255, 128, 0),
                (255, 0, 0),
                (128, 0, 0),
            ]),
            Self::Gray => even(&[(0, 0, 0), (255, 255, 255)]),
            Self::Coolwarm => even(&[
                (59, 76, 192),
                (141, 176, 254),
                (221, 221, 221),
                (244, 154, 123),
                (180, 4, 38),
            ]),
        }
    }
}

impl FromStr for NamedColormap {
    type Err = SurveyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "viridis" => Ok(Self::Viridis),
            "plasma" => Ok(Self::Plasma),
            "jet" => Ok(Self::Jet),
            "gray" | "grey" => Ok(Self::Gray),
            "coolwarm" => Ok(Self::Coolwarm),
            other => Err(SurveyError::invalid_parameter(
                "colormap",
                format!(
                    "unknown colormap '{}' (expected one of viridis, plasma, jet, gray, coolwarm)",
                    other
                ),
            )),
        }
    }
}

impl fmt::Display for NamedColormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered sequence of colour stops mapping `[0, 1]` to colours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Colormap {
    name: String,
    stops: Vec<ColorStop>,
}

impl Colormap {
    /// A built-in palette.
    pub fn named(name: NamedColormap) -> Self {
        Self {
            name: name.as_str().to_string(),
            stops: name.stops(),
        }
    }

    /// A palette of evenly spaced colours, first at 0 and last at 1.
    ///
    /// Needs at least two colours.
    pub fn custom(colors: &[Color]) -> SurveyResult<Self> {
        if colors.len() < 2 {
            return Err(SurveyError::invalid_parameter(
                "colormap",
                format!("custom colormap needs at least 2 colours, got {}", colors.len()),
            ));
        }
        let last = (colors.len() - 1) as f64;
        Ok(Self {
            name: "custom".to_string(),
            stops: colors
                .iter()
                .enumerate()
                .map(|(i, &color)| ColorStop {
                    position: i as f64 / last,
                    color,
                })
                .collect(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Colour at `t`, blending the two surrounding stops. `t` is clamped to `[0, 1]`.
    pub fn color_at(&self, t: f64) -> Color {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        let first = self.stops[0];
        if t <= first.position {
            return first.color;
        }
        for pair in self.stops.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if t <= hi.position {
                let span = hi.position - lo.position;
                if span <= 0.0 {
                    return hi.color;
                }
                return interpolate_color(lo.color, hi.color, (t - lo.position) / span);
            }
        }
        self.stops[self.stops.len() - 1].color
    }

    /// 256-entry lookup table; entry `i` is the colour at `i / 255`.
    pub fn lut(&self) -> Vec<Color> {
        (0..LUT_SIZE)
            .map(|i| self.color_at(i as f64 / (LUT_SIZE - 1) as f64))
            .collect()
    }
}

impl Default for Colormap {
    fn default() -> Self {
        Self::named(NamedColormap::Viridis)
    }
}

impl FromStr for Colormap {
    type Err = SurveyError;

    /// A palette name, or a comma-separated list of hex colours.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains(',') || s.trim_start().starts_with('#') {
            let colors = s
                .split(',')
                .map(Color::from_hex)
                .collect::<SurveyResult<Vec<_>>>()?;
            return Self::custom(&colors);
        }
        Ok(Self::named(s.parse()?))
    }
}

/// The data interval mapped onto a colour map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    /// An explicit range. Both ends must be finite and `min <= max`.
    pub fn new(min: f64, max: f64) -> SurveyResult<Self> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(SurveyError::invalid_parameter(
                "value_range",
                format!("expected finite min <= max, got [{}, {}]", min, max),
            ));
        }
        Ok(Self { min, max })
    }

    /// The finite min/max of `field`. Fails with `EmptyField` if it has none.
    pub fn from_field(field: &Field) -> SurveyResult<Self> {
        let (min, max) = field.finite_range().ok_or(SurveyError::EmptyField)?;
        Ok(Self { min, max })
    }

    /// Widen symmetrically so zero sits at the middle of the colour map.
    pub fn centered_on_zero(self) -> Self {
        let extent = self.min.abs().max(self.max.abs());
        Self {
            min: -extent,
            max: extent,
        }
    }

    /// Position of `value` in `[0, 1]`. A zero-width range maps to 0.5.
    pub fn normalize(&self, value: f64) -> f64 {
        if self.max > self.min {
            ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
        } else {
            0.5
        }
    }

    /// Lookup-table index of `value`: `round(t * 255)`. Non-decreasing in `value`.
    pub fn color_index(&self, value: f64) -> u8 {
        (self.normalize(value) * (LUT_SIZE - 1) as f64).round() as u8
    }
}
