//! Error types for curve operations.
//!
//! Every curve constructor validates its input and fails with one of these
//! variants. Nothing is truncated, sorted, or clamped on the caller's behalf.

use thiserror::Error;

/// A specialized Result type for curve operations.
pub type CurveResult<T> = Result<T, CurveError>;

/// Error types for curve operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurveError {
    /// No knots were supplied.
    #[error("Curve requires at least one knot")]
    Empty,

    /// Parallel arrays have different lengths.
    #[error("Length mismatch: {times} knot times but {values} values")]
    LengthMismatch {
        /// Number of knot times.
        times: usize,
        /// Number of values.
        values: usize,
    },

    /// Knot times are not strictly ascending.
    #[error("Non-ascending knot times at index {index}: {prev:.6} >= {current:.6}")]
    NonAscendingTimes {
        /// Index where the violation occurred.
        index: usize,
        /// Previous knot time.
        prev: f64,
        /// Current knot time.
        current: f64,
    },

    /// The first knot time is negative.
    #[error("First knot time must be non-negative, got {time}")]
    NegativeTime {
        /// The offending time.
        time: f64,
    },

    /// A value is NaN or infinite.
    #[error("Non-finite {what} at index {index}")]
    NonFinite {
        /// Which input was affected.
        what: &'static str,
        /// Index of the value.
        index: usize,
    },

    /// Node index out of range.
    #[error("Node index {index} out of range for curve with {len} knots")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of knots.
        len: usize,
    },

    /// Invalid argument.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Description of the invalid input.
        reason: String,
    },
}

impl CurveError {
    /// Creates a length mismatch error.
    #[must_use]
    pub fn length_mismatch(times: usize, values: usize) -> Self {
        Self::LengthMismatch { times, values }
    }

    /// Creates a non-ascending times error.
    #[must_use]
    pub fn non_ascending(index: usize, prev: f64, current: f64) -> Self {
        Self::NonAscendingTimes {
            index,
            prev,
            current,
        }
    }

    /// Creates an index out of range error.
    #[must_use]
    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }

    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}

/// Checks that `times` is non-empty, finite, non-negative, strictly ascending,
/// and that `values` has the same length and is finite.
pub(crate) fn validate_knots(times: &[f64], values: &[f64], what: &'static str) -> CurveResult<()> {
    if times.is_empty() {
        return Err(CurveError::Empty);
    }
    if times.len() != values.len() {
        return Err(CurveError::length_mismatch(times.len(), values.len()));
    }
    if let Some(index) = times.iter().position(|t| !t.is_finite()) {
        return Err(CurveError::NonFinite {
            what: "knot time",
            index,
        });
    }
    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(CurveError::NonFinite { what, index });
    }
    if times[0] < 0.0 {
        return Err(CurveError::NegativeTime { time: times[0] });
    }
    for (index, pair) in times.windows(2).enumerate() {
        if pair[1] <= pair[0] {
            return Err(CurveError::non_ascending(index + 1, pair[0], pair[1]));
        }
    }
    Ok(())
}
