//! Error types for CDS pricing and calibration.

use credex_curves::CurveError;
use credex_math::MathError;
use thiserror::Error;

/// A specialized Result type for CDS operations.
pub type CdsResult<T> = Result<T, CdsError>;

/// Error type for CDS pricing, calibration, and quote conversion.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CdsError {
    /// Invalid instrument or market input.
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// Description of the invalid input.
        reason: String,
    },

    /// The instrument's protection has already ended.
    #[error("CDS has expired (protection end {protection_end:.6} <= 0)")]
    Expired {
        /// Protection end time in years.
        protection_end: f64,
    },

    /// Calibration failed for one instrument of a term structure.
    #[error("calibration failed at instrument {index}: {source}")]
    CalibrationFailed {
        /// Index of the instrument being calibrated.
        index: usize,
        /// Underlying solver failure.
        #[source]
        source: MathError,
    },

    /// A quote convention was used where it cannot be interpreted.
    #[error("unsupported quote convention: {0}")]
    UnsupportedQuote(String),

    /// The requested measure is not defined for the instrument.
    #[error("{measure} is not defined for {instrument}")]
    UnsupportedMeasure {
        /// Measure name.
        measure: &'static str,
        /// Instrument kind.
        instrument: &'static str,
    },

    /// Curve error.
    #[error("curve error: {0}")]
    Curve(#[from] CurveError),

    /// Math error.
    #[error("math error: {0}")]
    Math(#[from] MathError),
}

impl CdsError {
    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Creates an expired instrument error.
    #[must_use]
    pub fn expired(protection_end: f64) -> Self {
        Self::Expired { protection_end }
    }

    /// Creates a calibration failure for instrument `index`.
    #[must_use]
    pub fn calibration_failed(index: usize, source: MathError) -> Self {
        Self::CalibrationFailed { index, source }
    }
}
