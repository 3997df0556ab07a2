//! Interpolation method and fallback policy selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use survey_common::SurveyError;

/// Scattered-data interpolation method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMethod {
    /// Piecewise-linear on a Delaunay triangulation; undefined outside the hull.
    #[default]
    Linear,
    /// Clough-Tocher C1 piecewise cubic; undefined outside the hull.
    Cubic,
    /// Value of the closest sample; defined everywhere.
    Nearest,
}

impl InterpolationMethod {
    /// All recognised methods, in the order a front-end would list them.
    pub const ALL: [InterpolationMethod; 3] = [Self::Linear, Self::Cubic, Self::Nearest];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Cubic => "cubic",
            Self::Nearest => "nearest",
        }
    }

    /// Whether the method needs a triangulation (and so ≥ 3 non-collinear samples).
    pub fn needs_triangulation(&self) -> bool {
        !matches!(self, Self::Nearest)
    }
}

impl FromStr for InterpolationMethod {
    type Err = SurveyError;

    /// Parse from string (case-insensitive). Unknown names are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "cubic" => Ok(Self::Cubic),
            "nearest" => Ok(Self::Nearest),
            other => Err(SurveyError::invalid_parameter(
                "method",
                format!("unknown interpolation method '{}' (expected linear, cubic or nearest)", other),
            )),
        }
    }
}

impl fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do when the requested method cannot run on the given samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// Surface `InterpolationUnavailable` to the caller.
    #[default]
    Strict,
    /// Retry with nearest-neighbour and report that a fallback happened.
    Nearest,
}

impl FromStr for FallbackPolicy {
    type Err = SurveyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" | "none" => Ok(Self::Strict),
            "nearest" => Ok(Self::Nearest),
            other => Err(SurveyError::invalid_parameter(
                "fallback",
                format!("unknown fallback policy '{}' (expected strict or nearest)", other),
            )),
        }
    }
}

impl fmt::Display for FallbackPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Nearest => write!(f, "nearest"),
        }
    }
}
