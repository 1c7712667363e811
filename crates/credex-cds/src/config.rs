//! Pricing and calibration settings.
//!
//! [`PricerConfig`] collects the choices a caller makes once per run: the
//! accrual-on-default formula, the calibration strategy, and the solver
//! settings. It deserializes with defaults for every missing field, so an
//! empty JSON object is a valid configuration.

use credex_math::prelude::*;
use serde::{Deserialize, Serialize};

use crate::bond::AnalyticBondPricer;
use crate::calibration::{
    calibrator, CalibrationMethod, CreditCurveCalibrator, CALIBRATION_TOLERANCE,
};
use crate::error::{CdsError, CdsResult};
use crate::instrument::CreditInstrumentPricer;
use crate::multi_pricer::MultiAnalyticCdsPricer;
use crate::pricer::{AccrualOnDefaultFormula, AnalyticCdsPricer};
use crate::quotes::MarketQuoteConverter;

/// Default iteration cap for the calibration solvers.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field that failed validation.
    pub field: String,
    /// Validation error message.
    pub message: String,
    /// Validation rule that was violated.
    pub rule: Option<String>,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: None,
        }
    }

    /// Creates a validation error with a rule name.
    pub fn with_rule(
        field: impl Into<String>,
        message: impl Into<String>,
        rule: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: Some(rule.into()),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref rule) = self.rule {
            write!(f, "{}: {} (rule: {})", self.field, self.message, rule)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

/// Pricer and calibrator settings.
///
/// # Example
///
/// ```rust
/// use credex_cds::prelude::*;
///
/// let config: PricerConfig =
///     serde_json::from_str(r#"{"accrual_formula": "markit_fix", "calibration_method": "fast"}"#)
///         .unwrap();
/// assert!(config.is_valid());
/// assert_eq!(config.pricer().formula(), AccrualOnDefaultFormula::MarkitFix);
/// assert_eq!(config.tolerance, 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricerConfig {
    /// Accrual-on-default formula.
    pub accrual_formula: AccrualOnDefaultFormula,
    /// Calibration strategy.
    pub calibration_method: CalibrationMethod,
    /// Root-finding tolerance.
    pub tolerance: f64,
    /// Iteration cap per root search.
    pub max_iterations: u32,
}

impl Default for PricerConfig {
    fn default() -> Self {
        Self {
            accrual_formula: AccrualOnDefaultFormula::default(),
            calibration_method: CalibrationMethod::default(),
            tolerance: CALIBRATION_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl PricerConfig {
    /// Builder method to set the accrual-on-default formula.
    #[must_use]
    pub fn with_accrual_formula(mut self, formula: AccrualOnDefaultFormula) -> Self {
        self.accrual_formula = formula;
        self
    }

    /// Builder method to set the calibration method.
    #[must_use]
    pub fn with_calibration_method(mut self, method: CalibrationMethod) -> Self {
        self.calibration_method = method;
        self
    }

    /// Builder method to set the solver tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Builder method to set the iteration cap.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Validates the configuration.
    ///
    /// Returns a list of validation errors, or an empty vector if valid.
    #[must_use]
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if !(self.tolerance > 0.0 && self.tolerance <= 1e-4) {
            errors.push(ValidationError::with_rule(
                "tolerance",
                "Tolerance must be between 0 and 1e-4",
                "valid_tolerance",
            ));
        }

        if self.max_iterations == 0 || self.max_iterations > 10_000 {
            errors.push(ValidationError::with_rule(
                "max_iterations",
                "Max iterations must be between 1 and 10000",
                "valid_iterations",
            ));
        }

        errors
    }

    /// Returns true if the configuration is valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Validates and returns an error if invalid.
    pub fn validate_or_error(&self) -> CdsResult<()> {
        let errors = self.validate();
        if errors.is_empty() {
            return Ok(());
        }
        let joined = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Err(CdsError::invalid_input(format!("invalid pricer config: {joined}")))
    }

    /// Solver settings for calibration.
    #[must_use]
    pub fn solver_config(&self) -> SolverConfig {
        SolverConfig::new(self.tolerance, self.max_iterations)
    }

    /// Single-CDS pricer.
    #[must_use]
    pub fn pricer(&self) -> AnalyticCdsPricer {
        AnalyticCdsPricer::new(self.accrual_formula)
    }

    /// Term-structure pricer.
    #[must_use]
    pub fn multi_pricer(&self) -> MultiAnalyticCdsPricer {
        MultiAnalyticCdsPricer::new(self.accrual_formula)
    }

    /// Pricer for any credit instrument.
    #[must_use]
    pub fn instrument_pricer(&self) -> CreditInstrumentPricer {
        CreditInstrumentPricer::new(self.accrual_formula)
    }

    /// Bond pricer.
    #[must_use]
    pub fn bond_pricer(&self) -> AnalyticBondPricer {
        AnalyticBondPricer::new(self.pricer())
    }

    /// Quote converter.
    #[must_use]
    pub fn quote_converter(&self) -> MarketQuoteConverter {
        MarketQuoteConverter::new(self.pricer())
    }

    /// Calibrator for the configured method.
    #[must_use]
    pub fn calibrator(&self) -> Box<dyn CreditCurveCalibrator + Send + Sync> {
        calibrator(
            self.calibration_method,
            self.accrual_formula,
            self.solver_config(),
        )
    }
}
