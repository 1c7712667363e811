//! CLI error types.

use std::path::PathBuf;

use credex_cds::CdsError;
use credex_curves::CurveError;
use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// The market file could not be read.
    #[error("Cannot read {path}: {source}")]
    Read {
        /// File path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The market file is not valid JSON for the expected layout.
    #[error("Invalid market file {path}: {source}")]
    Parse {
        /// File path.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// Missing required input.
    #[error("Missing required input: {0}")]
    MissingInput(String),

    /// Invalid argument value.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Curve construction error.
    #[error("Curve error: {0}")]
    Curve(#[from] CurveError),

    /// Pricing or calibration error.
    #[error("Calculation error: {0}")]
    Calculation(#[from] CdsError),
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
