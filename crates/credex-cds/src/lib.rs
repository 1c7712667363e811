//! # Credex CDS
//!
//! ISDA standard model pricing and calibration for credit default swaps.
//!
//! This crate provides:
//!
//! - **Schedules**: [`CdsTerms`] and [`MultiCdsTerms`] build the year-fraction
//!   analytics ([`CdsAnalytic`], [`MultiCdsAnalytic`]) the pricers consume
//! - **Pricers**: [`AnalyticCdsPricer`] for single CDS and
//!   [`MultiAnalyticCdsPricer`] for a term structure in one sweep
//! - **Sensitivities**: analytic derivatives with respect to credit curve nodes
//! - **Calibration**: [`SimpleCreditCurveBuilder`] and [`FastCreditCurveBuilder`]
//!   behind the [`CreditCurveCalibrator`] trait
//! - **Quotes**: par spread, quoted spread and points upfront conversions
//! - **Bonds**: [`AnalyticBondPricer`] relating bond prices to hazard rates
//! - **Dispatch**: [`CreditInstrument`] and [`CreditInstrumentPricer`]
//!
//! ## Quick Start
//!
//! ```rust
//! use credex_cds::prelude::*;
//!
//! let yc = IsdaYieldCurve::flat(0.02).unwrap();
//! let cc = IsdaCreditCurve::flat(0.01).unwrap();
//! let cds = CdsTerms::new(0.0, 5.0).to_analytic().unwrap();
//!
//! let pricer = AnalyticCdsPricer::default();
//! let protection = pricer.protection_leg(&cds, &yc, &cc).unwrap();
//! let rpv01 = pricer
//!     .pv_premium_leg_per_unit_spread(&cds, &yc, &cc, PriceType::Clean)
//!     .unwrap();
//! let spread = pricer.par_spread(&cds, &yc, &cc).unwrap();
//! assert!((spread - protection / rpv01).abs() < 1e-15);
//! ```
//!
//! ## Feature Flags
//!
//! - `parallel`: prices batches of term structures on the rayon thread pool

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::float_cmp)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::too_many_arguments)]

pub mod analytic;
pub mod batch;
pub mod bond;
pub mod calibration;
pub mod config;
pub mod coupon;
pub mod day_count;
pub mod error;
pub mod instrument;
pub mod multi_pricer;
pub mod pricer;
pub mod quotes;
pub mod sensitivity;
pub mod terms;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use credex_curves::prelude::{
        Curve, CurveError, IsdaCreditCurve, IsdaCurve, IsdaYieldCurve,
    };

    pub use crate::analytic::{CdsAnalytic, MultiCdsAnalytic, ProtectionWindow};
    pub use crate::batch::BatchCdsPricer;
    pub use crate::bond::{AnalyticBondPricer, BondAnalytic};
    pub use crate::calibration::{
        calibrator, CalibrationMethod, CreditCurveCalibrator, FastCreditCurveBuilder,
        SimpleCreditCurveBuilder,
    };
    pub use crate::config::PricerConfig;
    pub use crate::coupon::CdsCoupon;
    pub use crate::day_count::AccrualDayCount;
    pub use crate::error::{CdsError, CdsResult};
    pub use crate::instrument::{CreditInstrument, CreditInstrumentPricer};
    pub use crate::multi_pricer::MultiAnalyticCdsPricer;
    pub use crate::pricer::{AccrualOnDefaultFormula, AnalyticCdsPricer, PriceType};
    pub use crate::quotes::{CdsQuoteConvention, MarketQuoteConverter};
    pub use crate::terms::{CdsConventions, CdsTerms, MultiCdsTerms};
}

pub use analytic::{CdsAnalytic, MultiCdsAnalytic};
pub use batch::BatchCdsPricer;
pub use bond::{AnalyticBondPricer, BondAnalytic};
pub use calibration::{
    CalibrationMethod, CreditCurveCalibrator, FastCreditCurveBuilder, SimpleCreditCurveBuilder,
};
pub use config::PricerConfig;
pub use error::{CdsError, CdsResult};
pub use instrument::{CreditInstrument, CreditInstrumentPricer};
pub use multi_pricer::MultiAnalyticCdsPricer;
pub use pricer::{AccrualOnDefaultFormula, AnalyticCdsPricer, PriceType};
pub use quotes::{CdsQuoteConvention, MarketQuoteConverter};
pub use terms::{CdsTerms, MultiCdsTerms};
