//! Credit instruments and measure dispatch.
//!
//! Every instrument the library prices is a variant of [`CreditInstrument`];
//! [`CreditInstrumentPricer`] matches on the variant to pick the pricer.
//! Measures are returned as vectors so that a term structure yields one
//! value per maturity and single instruments yield one value.

use credex_curves::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analytic::{CdsAnalytic, MultiCdsAnalytic};
use crate::bond::{AnalyticBondPricer, BondAnalytic};
use crate::error::{CdsError, CdsResult};
use crate::multi_pricer::MultiAnalyticCdsPricer;
use crate::pricer::{AccrualOnDefaultFormula, AnalyticCdsPricer, PriceType};

/// An instrument priced off a yield and a credit curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CreditInstrument {
    /// Single CDS paying a running spread.
    Cds {
        /// Instrument schedule.
        cds: CdsAnalytic,
        /// Running spread.
        spread: f64,
    },
    /// CDS term structure, one spread per maturity.
    CdsTermStructure {
        /// Term-structure schedule.
        multi: MultiCdsAnalytic,
        /// Running spread of each maturity.
        spreads: Vec<f64>,
    },
    /// Risky bond.
    Bond(BondAnalytic),
}

impl CreditInstrument {
    /// Short name of the instrument kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Cds { .. } => "cds",
            Self::CdsTermStructure { .. } => "cds term structure",
            Self::Bond(_) => "bond",
        }
    }

    /// Number of values a measure on this instrument returns.
    #[must_use]
    pub fn num_values(&self) -> usize {
        match self {
            Self::CdsTermStructure { multi, .. } => multi.num_maturities(),
            Self::Cds { .. } | Self::Bond(_) => 1,
        }
    }
}

impl From<BondAnalytic> for CreditInstrument {
    fn from(bond: BondAnalytic) -> Self {
        Self::Bond(bond)
    }
}

/// Computes measures on any [`CreditInstrument`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CreditInstrumentPricer {
    cds: AnalyticCdsPricer,
    multi: MultiAnalyticCdsPricer,
    bond: AnalyticBondPricer,
}

impl CreditInstrumentPricer {
    /// Creates a pricer using the given accrual-on-default formula for CDS.
    #[must_use]
    pub fn new(formula: AccrualOnDefaultFormula) -> Self {
        let cds = AnalyticCdsPricer::new(formula);
        Self {
            cds,
            multi: MultiAnalyticCdsPricer::new(formula),
            bond: AnalyticBondPricer::new(cds),
        }
    }

    /// Present value: protection minus premium for CDS, price for bonds.
    pub fn present_value(
        &self,
        instrument: &CreditInstrument,
        yc: &IsdaYieldCurve,
        cc: &IsdaCreditCurve,
        price_type: PriceType,
    ) -> CdsResult<Vec<f64>> {
        match instrument {
            CreditInstrument::Cds { cds, spread } => {
                Ok(vec![self.cds.pv(cds, yc, cc, *spread, price_type)?])
            }
            CreditInstrument::CdsTermStructure { multi, spreads } => {
                self.multi.pv(multi, yc, cc, spreads, price_type)
            }
            CreditInstrument::Bond(bond) => {
                Ok(vec![self.bond.bond_price(bond, yc, cc, price_type)?])
            }
        }
    }

    /// Risky annuity (RPV01) of the premium leg.
    ///
    /// # Errors
    ///
    /// Returns [`CdsError::UnsupportedMeasure`] for a bond.
    pub fn risky_annuity(
        &self,
        instrument: &CreditInstrument,
        yc: &IsdaYieldCurve,
        cc: &IsdaCreditCurve,
        price_type: PriceType,
    ) -> CdsResult<Vec<f64>> {
        match instrument {
            CreditInstrument::Cds { cds, .. } => Ok(vec![self
                .cds
                .pv_premium_leg_per_unit_spread(cds, yc, cc, price_type)?]),
            CreditInstrument::CdsTermStructure { multi, .. } => self
                .multi
                .pv_premium_leg_per_unit_spread(multi, yc, cc, price_type),
            CreditInstrument::Bond(_) => Err(CdsError::UnsupportedMeasure {
                measure: "risky annuity",
                instrument: instrument.kind(),
            }),
        }
    }

    /// Par spread.
    ///
    /// # Errors
    ///
    /// Returns [`CdsError::UnsupportedMeasure`] for a bond.
    pub fn par_spread(
        &self,
        instrument: &CreditInstrument,
        yc: &IsdaYieldCurve,
        cc: &IsdaCreditCurve,
    ) -> CdsResult<Vec<f64>> {
        match instrument {
            CreditInstrument::Cds { cds, .. } => Ok(vec![self.cds.par_spread(cds, yc, cc)?]),
            CreditInstrument::CdsTermStructure { multi, .. } => {
                self.multi.par_spreads(multi, yc, cc)
            }
            CreditInstrument::Bond(_) => Err(CdsError::UnsupportedMeasure {
                measure: "par spread",
                instrument: instrument.kind(),
            }),
        }
    }
}
