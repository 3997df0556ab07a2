//! Error types for the survey overlay pipeline.

use thiserror::Error;

/// Result type alias using SurveyError.
pub type SurveyResult<T> = Result<T, SurveyError>;

/// Primary error type for pipeline operations.
///
/// Every variant is a value-level failure returned to the immediate caller.
/// No stage returns a partial artefact alongside an error.
#[derive(Debug, Error)]
pub enum SurveyError {
    // === Input Errors ===
    #[error("Invalid bounds {bounds}: {reason}")]
    InvalidBounds { bounds: String, reason: String },

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    // === Interpolation Errors ===
    #[error("Interpolation method '{method}' unavailable: {reason}")]
    InterpolationUnavailable { method: String, reason: String },

    // === Rendering Errors ===
    #[error("Field has no finite values to render")]
    EmptyField,

    #[error("Encoding failed: {0}")]
    Encoding(String),

    // === Packaging Errors ===
    #[error("Archive consistency violated: {0}")]
    ArchiveConsistency(String),

    #[error("Malformed archive: {0}")]
    MalformedArchive(String),
}

impl SurveyError {
    /// Create an InvalidParameter error.
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create an InterpolationUnavailable error.
    pub fn interpolation_unavailable(method: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InterpolationUnavailable {
            method: method.into(),
            reason: reason.into(),
        }
    }

    /// Whether retrying with nearest-neighbour interpolation could succeed.
    pub fn is_recoverable_with_nearest(&self) -> bool {
        matches!(self, SurveyError::InterpolationUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_interpolation_errors_are_recoverable() {
        let err = SurveyError::interpolation_unavailable("linear", "single sample");
        assert!(err.is_recoverable_with_nearest());
        assert!(!SurveyError::EmptyField.is_recoverable_with_nearest());
    }

    #[test]
    fn test_error_messages_name_the_parameter() {
        let err = SurveyError::invalid_parameter("method", "unknown method 'spline'");
        assert_eq!(
            err.to_string(),
            "Invalid parameter value for 'method': unknown method 'spline'"
        );
    }
}
