//! CLI command implementations.

pub mod calibrate;
pub mod convert;
pub mod price;

pub use calibrate::CalibrateArgs;
pub use convert::ConvertArgs;
pub use price::PriceArgs;

use clap::ValueEnum;
use credex_cds::prelude::*;

/// Calibration method choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MethodChoice {
    /// Bracket and Brent on every node
    Simple,
    /// Newton with analytic sensitivities
    Fast,
}

impl From<MethodChoice> for CalibrationMethod {
    fn from(choice: MethodChoice) -> Self {
        match choice {
            MethodChoice::Simple => Self::Simple,
            MethodChoice::Fast => Self::Fast,
        }
    }
}

/// Accrual-on-default formula choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormulaChoice {
    /// ISDA model with the half-day offset
    #[value(name = "original-isda")]
    OriginalIsda,
    /// Markit fix, no offset
    #[value(name = "markit-fix")]
    MarkitFix,
    /// Exact integral of accrued premium
    Correct,
}

impl From<FormulaChoice> for AccrualOnDefaultFormula {
    fn from(choice: FormulaChoice) -> Self {
        match choice {
            FormulaChoice::OriginalIsda => Self::OriginalIsda,
            FormulaChoice::MarkitFix => Self::MarkitFix,
            FormulaChoice::Correct => Self::Correct,
        }
    }
}

/// Price type choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PriceTypeChoice {
    /// Excluding accrued premium
    #[default]
    Clean,
    /// Including accrued premium
    Dirty,
}

impl From<PriceTypeChoice> for PriceType {
    fn from(choice: PriceTypeChoice) -> Self {
        match choice {
            PriceTypeChoice::Clean => Self::Clean,
            PriceTypeChoice::Dirty => Self::Dirty,
        }
    }
}

/// Applies command-line overrides to a configuration.
pub fn apply_overrides(
    config: PricerConfig,
    method: Option<MethodChoice>,
    formula: Option<FormulaChoice>,
) -> PricerConfig {
    let config = match method {
        Some(m) => config.with_calibration_method(m.into()),
        None => config,
    };
    match formula {
        Some(f) => config.with_accrual_formula(f.into()),
        None => config,
    }
}
