//! Error taxonomy shared by every engine entry point.

use thiserror::Error;

/// Why a 3×3 matrix could not be Cholesky-factored.
///
/// The display strings are part of the public contract: callers surface them
/// verbatim next to the offending component.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CholeskyError {
    #[error("C11<=0")]
    FirstPivot,

    #[error("leading minor not positive (2x2)")]
    SecondMinor,

    #[error("leading minor not positive (3x3)")]
    ThirdMinor,
}

/// Invalid or missing numeric input, reported before any computation starts.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ParameterError {
    #[error("no component has a positive weight")]
    NoEligibleComponents,

    #[error("sum of component weights is not positive")]
    NonPositiveWeightSum,

    #[error("total samples must be a positive integer when no component sets its own sample count")]
    MissingTotalSamples,

    #[error("every component resolved to zero samples")]
    NoSamples,

    #[error("point size must be a positive number, got {0}")]
    NonPositivePointSize(f32),

    #[error("projection canvas must be at least 1x1, got {width}x{height}")]
    EmptyCanvas { width: u32, height: u32 },

    #[error("density resolution must lie in [16, 256], got {0}")]
    ResolutionOutOfRange(u32),

    #[error("sigma multiplier must be a positive number, got {0}")]
    NonPositiveSigma(f64),

    #[error("eigenvalue range [{min}, {max}] is invalid")]
    InvalidEigenRange { min: f64, max: f64 },

    #[error("anisotropy bias must be a non-negative number, got {0}")]
    NegativeAnisotropyBias(f64),
}

/// Top-level failure of a sampling, density or projection request.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum EngineError {
    #[error("invalid parameter: {0}")]
    Parameter(#[from] ParameterError),

    #[error("component {index}: covariance is not positive definite ({reason})")]
    NonPositiveDefinite { index: usize, reason: CholeskyError },
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cholesky_reasons_render_exact_strings() {
        assert_eq!(CholeskyError::FirstPivot.to_string(), "C11<=0");
        assert_eq!(
            CholeskyError::SecondMinor.to_string(),
            "leading minor not positive (2x2)"
        );
        assert_eq!(
            CholeskyError::ThirdMinor.to_string(),
            "leading minor not positive (3x3)"
        );
    }

    #[test]
    fn engine_error_names_component() {
        let err = EngineError::NonPositiveDefinite {
            index: 3,
            reason: CholeskyError::SecondMinor,
        };
        let message = err.to_string();
        assert!(message.contains("component 3"), "{message}");
        assert!(message.contains("(2x2)"), "{message}");
    }
}
