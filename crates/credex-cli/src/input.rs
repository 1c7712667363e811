//! Market file layout and loading.
//!
//! A market file is a JSON object:
//!
//! ```json
//! {
//!   "config": { "accrual_formula": "original_isda", "calibration_method": "fast" },
//!   "yield_curve": { "times": [1.0, 5.0, 10.0], "rates": [0.02, 0.025, 0.03] },
//!   "cds": [
//!     { "terms": { "accrual_start": -0.1, "maturity": 5.0 },
//!       "quote": { "type": "par_spread", "spread": 0.01 } }
//!   ],
//!   "instruments": [
//!     { "type": "cds", "terms": { "accrual_start": 0.0, "maturity": 3.0 }, "spread": 0.01 }
//!   ]
//! }
//! ```
//!
//! `credit_curve` may be given directly; otherwise it is calibrated to `cds`.

use std::path::Path;

use credex_cds::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{CliError, CliResult};

fn default_bond_interval() -> f64 {
    0.5
}

/// Knot times and zero rates of a curve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveInput {
    /// Knot times in years.
    pub times: Vec<f64>,
    /// Continuously compounded zero rates at the knots.
    pub rates: Vec<f64>,
}

impl CurveInput {
    /// Builds a yield curve.
    pub fn yield_curve(&self) -> CliResult<IsdaYieldCurve> {
        Ok(IsdaYieldCurve::new(self.times.clone(), self.rates.clone())?)
    }

    /// Builds a credit curve, reading the rates as zero hazard rates.
    pub fn credit_curve(&self) -> CliResult<IsdaCreditCurve> {
        Ok(IsdaCreditCurve::new(self.times.clone(), self.rates.clone())?)
    }
}

/// A CDS with its market quote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotedCds {
    /// Contract terms.
    pub terms: CdsTerms,
    /// Market quote.
    pub quote: CdsQuoteConvention,
}

/// An instrument to price, described by terms rather than analytics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InstrumentInput {
    /// Single CDS.
    Cds {
        /// Contract terms.
        terms: CdsTerms,
        /// Running spread.
        spread: f64,
    },
    /// CDS term structure.
    CdsTermStructure {
        /// Term-structure terms.
        terms: MultiCdsTerms,
        /// Running spread per maturity.
        spreads: Vec<f64>,
    },
    /// Bullet bond with a regular coupon.
    FixedRateBond {
        /// Maturity in years.
        maturity: f64,
        /// Annual coupon rate.
        coupon: f64,
        /// Coupon interval in years.
        #[serde(default = "default_bond_interval")]
        interval: f64,
        /// Recovery rate.
        recovery_rate: f64,
    },
    /// Bond given by its cash flows.
    Bond(BondAnalytic),
}

impl InstrumentInput {
    /// Label for output rows.
    pub fn label(&self, index: usize) -> String {
        match self {
            Self::Cds { terms, .. } => format!("#{index} cds {:.2}y", terms.maturity),
            Self::CdsTermStructure { .. } => format!("#{index} cds term structure"),
            Self::FixedRateBond { maturity, .. } => format!("#{index} bond {maturity:.2}y"),
            Self::Bond(bond) => format!("#{index} bond {:.2}y", bond.maturity()),
        }
    }

    /// Builds the priceable instrument.
    pub fn to_instrument(&self) -> CliResult<CreditInstrument> {
        Ok(match self {
            Self::Cds { terms, spread } => CreditInstrument::Cds {
                cds: terms.to_analytic()?,
                spread: *spread,
            },
            Self::CdsTermStructure { terms, spreads } => CreditInstrument::CdsTermStructure {
                multi: terms.to_analytic()?,
                spreads: spreads.clone(),
            },
            Self::FixedRateBond {
                maturity,
                coupon,
                interval,
                recovery_rate,
            } => CreditInstrument::Bond(BondAnalytic::fixed_rate(
                *maturity,
                *coupon,
                *interval,
                *recovery_rate,
            )?),
            Self::Bond(bond) => CreditInstrument::Bond(bond.clone()),
        })
    }

    /// Maturity label of each value the instrument prices to.
    pub fn maturities(&self) -> Vec<f64> {
        match self {
            Self::Cds { terms, .. } => vec![terms.maturity],
            Self::CdsTermStructure { terms, .. } => terms.maturities(),
            Self::FixedRateBond { maturity, .. } => vec![*maturity],
            Self::Bond(bond) => vec![bond.maturity()],
        }
    }
}

/// Contents of a market file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketFile {
    /// Pricer settings.
    #[serde(default)]
    pub config: PricerConfig,
    /// Yield curve.
    pub yield_curve: CurveInput,
    /// Credit curve, when not calibrated from `cds`.
    #[serde(default)]
    pub credit_curve: Option<CurveInput>,
    /// Quoted CDS to calibrate to.
    #[serde(default)]
    pub cds: Vec<QuotedCds>,
    /// Instruments to price.
    #[serde(default)]
    pub instruments: Vec<InstrumentInput>,
}

/// Market data ready for pricing.
pub struct Market {
    /// Validated settings.
    pub config: PricerConfig,
    /// Yield curve.
    pub yield_curve: IsdaYieldCurve,
    /// Quoted CDS analytics, in input order.
    pub cds: Vec<CdsAnalytic>,
    /// Quotes matching `cds`.
    pub quotes: Vec<CdsQuoteConvention>,
}

impl MarketFile {
    /// Reads and parses a market file.
    pub fn load(path: &Path) -> CliResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: Self = serde_json::from_str(&text).map_err(|source| CliError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            path = %path.display(),
            quotes = file.cds.len(),
            instruments = file.instruments.len(),
            "loaded market file"
        );
        Ok(file)
    }

    /// Validates the settings and builds curves and CDS analytics.
    pub fn market(&self) -> CliResult<Market> {
        self.config.validate_or_error()?;
        let cds = self
            .cds
            .iter()
            .map(|q| q.terms.to_analytic())
            .collect::<CdsResult<Vec<_>>>()?;
        Ok(Market {
            config: self.config,
            yield_curve: self.yield_curve.yield_curve()?,
            cds,
            quotes: self.cds.iter().map(|q| q.quote).collect(),
        })
    }
}

impl Market {
    /// Calibrates a credit curve to the quoted CDS.
    pub fn calibrate(&self) -> CliResult<IsdaCreditCurve> {
        if self.cds.is_empty() {
            return Err(CliError::MissingInput(
                "no quoted CDS to calibrate a credit curve to".into(),
            ));
        }
        let calibrator = self.config.calibrator();
        let curve = calibrator.calibrate_from_quotes(&self.cds, &self.quotes, &self.yield_curve)?;
        info!(
            method = %self.config.calibration_method,
            knots = curve.num_knots(),
            "calibrated credit curve"
        );
        Ok(curve)
    }

    /// The given credit curve, or one calibrated to the quoted CDS.
    pub fn credit_curve(&self, given: Option<&CurveInput>) -> CliResult<IsdaCreditCurve> {
        match given {
            Some(curve) => curve.credit_curve(),
            None => self.calibrate(),
        }
    }
}
