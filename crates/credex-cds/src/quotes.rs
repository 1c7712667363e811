//! CDS quote conventions and conversions between them.
//!
//! Standard contracts trade with a fixed running coupon (100bp or 500bp for
//! North American names) plus an upfront payment. Dealers quote either the
//! upfront itself or a *quoted spread*: the flat-hazard par spread that
//! reproduces the upfront. Converting between the two goes through a flat
//! credit curve calibrated to the quote.

use credex_curves::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analytic::CdsAnalytic;
use crate::calibration::{CreditCurveCalibrator, SimpleCreditCurveBuilder};
use crate::error::{CdsError, CdsResult};
use crate::pricer::AnalyticCdsPricer;

/// A market quote for one CDS.
///
/// Serialized with a `type` tag; an unknown tag fails to deserialize.
///
/// # Example
///
/// ```rust
/// use credex_cds::quotes::CdsQuoteConvention;
///
/// let json = r#"{"type": "points_up_front", "coupon": 0.01, "puf": 0.025}"#;
/// let quote: CdsQuoteConvention = serde_json::from_str(json).unwrap();
/// assert_eq!(quote.coupon(), 0.01);
///
/// assert!(serde_json::from_str::<CdsQuoteConvention>(r#"{"type": "price"}"#).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CdsQuoteConvention {
    /// Running spread at which the CDS has zero upfront.
    ParSpread {
        /// Par spread.
        spread: f64,
    },
    /// Flat-curve spread equivalent to an upfront at a standard coupon.
    QuotedSpread {
        /// Standard running coupon.
        coupon: f64,
        /// Quoted spread.
        quoted_spread: f64,
    },
    /// Upfront payment at a standard coupon.
    PointsUpFront {
        /// Standard running coupon.
        coupon: f64,
        /// Upfront as a fraction of notional.
        puf: f64,
    },
}

impl CdsQuoteConvention {
    /// Running coupon paid under this quote.
    #[must_use]
    pub fn coupon(&self) -> f64 {
        match *self {
            Self::ParSpread { spread } => spread,
            Self::QuotedSpread { coupon, .. } | Self::PointsUpFront { coupon, .. } => coupon,
        }
    }

    /// Name of the convention.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::ParSpread { .. } => "par spread",
            Self::QuotedSpread { .. } => "quoted spread",
            Self::PointsUpFront { .. } => "points upfront",
        }
    }
}

/// Converts upfront quotes to quoted spreads and back.
///
/// # Example
///
/// ```rust
/// use credex_cds::prelude::*;
///
/// let yc = IsdaYieldCurve::flat(0.03).unwrap();
/// let cds = CdsTerms::new(0.0, 5.0).to_analytic().unwrap();
/// let converter = MarketQuoteConverter::default();
///
/// let puf = converter.quoted_spread_to_puf(&cds, 0.01, 0.015, &yc).unwrap();
/// assert!(puf > 0.0);
///
/// let back = converter.puf_to_quoted_spread(&cds, 0.01, puf, &yc).unwrap();
/// assert!((back - 0.015).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MarketQuoteConverter {
    pricer: AnalyticCdsPricer,
    calibrator: SimpleCreditCurveBuilder,
}

impl MarketQuoteConverter {
    /// Creates a converter that prices with `pricer`.
    #[must_use]
    pub fn new(pricer: AnalyticCdsPricer) -> Self {
        Self {
            pricer,
            calibrator: SimpleCreditCurveBuilder::new(pricer.formula()),
        }
    }

    /// Quoted spread equivalent to an upfront at `coupon`.
    pub fn puf_to_quoted_spread(
        &self,
        cds: &CdsAnalytic,
        coupon: f64,
        puf: f64,
        yc: &IsdaYieldCurve,
    ) -> CdsResult<f64> {
        let cc = self.calibrator.calibrate_flat(cds, coupon, puf, yc)?;
        self.pricer.par_spread(cds, yc, &cc)
    }

    /// Upfront at `coupon` equivalent to a quoted spread.
    pub fn quoted_spread_to_puf(
        &self,
        cds: &CdsAnalytic,
        coupon: f64,
        quoted_spread: f64,
        yc: &IsdaYieldCurve,
    ) -> CdsResult<f64> {
        let cc = self.calibrator.calibrate_flat(cds, quoted_spread, 0.0, yc)?;
        self.pricer.points_upfront(cds, yc, &cc, coupon)
    }

    /// Re-expresses a quote as points upfront.
    ///
    /// # Errors
    ///
    /// Returns [`CdsError::UnsupportedQuote`] for a par spread, which
    /// carries no standard coupon.
    pub fn to_points_upfront(
        &self,
        cds: &CdsAnalytic,
        quote: &CdsQuoteConvention,
        yc: &IsdaYieldCurve,
    ) -> CdsResult<CdsQuoteConvention> {
        match *quote {
            CdsQuoteConvention::PointsUpFront { .. } => Ok(*quote),
            CdsQuoteConvention::QuotedSpread {
                coupon,
                quoted_spread,
            } => Ok(CdsQuoteConvention::PointsUpFront {
                coupon,
                puf: self.quoted_spread_to_puf(cds, coupon, quoted_spread, yc)?,
            }),
            CdsQuoteConvention::ParSpread { .. } => Err(CdsError::UnsupportedQuote(
                "a par spread has no standard coupon to express an upfront against".into(),
            )),
        }
    }

    /// Re-expresses a quote as a quoted spread.
    ///
    /// # Errors
    ///
    /// Returns [`CdsError::UnsupportedQuote`] for a par spread.
    pub fn to_quoted_spread(
        &self,
        cds: &CdsAnalytic,
        quote: &CdsQuoteConvention,
        yc: &IsdaYieldCurve,
    ) -> CdsResult<CdsQuoteConvention> {
        match *quote {
            CdsQuoteConvention::QuotedSpread { .. } => Ok(*quote),
            CdsQuoteConvention::PointsUpFront { coupon, puf } => {
                Ok(CdsQuoteConvention::QuotedSpread {
                    coupon,
                    quoted_spread: self.puf_to_quoted_spread(cds, coupon, puf, yc)?,
                })
            }
            CdsQuoteConvention::ParSpread { .. } => Err(CdsError::UnsupportedQuote(
                "a par spread has no standard coupon to express a quoted spread against".into(),
            )),
        }
    }

    /// Running premium and upfront to calibrate a quote against.
    pub fn premium_and_puf(
        &self,
        cds: &CdsAnalytic,
        quote: &CdsQuoteConvention,
        yc: &IsdaYieldCurve,
    ) -> CdsResult<(f64, f64)> {
        match *quote {
            CdsQuoteConvention::ParSpread { spread } => Ok((spread, 0.0)),
            CdsQuoteConvention::QuotedSpread {
                coupon,
                quoted_spread,
            } => Ok((
                coupon,
                self.quoted_spread_to_puf(cds, coupon, quoted_spread, yc)?,
            )),
            CdsQuoteConvention::PointsUpFront { coupon, puf } => Ok((coupon, puf)),
        }
    }

    /// Upfronts at `coupon` implied by a par-spread term structure.
    ///
    /// Calibrates a curve to all par spreads, then prices every instrument
    /// at the standard coupon.
    pub fn par_spreads_to_puf(
        &self,
        cds: &[CdsAnalytic],
        coupon: f64,
        par_spreads: &[f64],
        yc: &IsdaYieldCurve,
    ) -> CdsResult<Vec<f64>> {
        let cc = self.calibrator.calibrate_par_spreads(cds, par_spreads, yc)?;
        cds.iter()
            .map(|c| self.pricer.points_upfront(c, yc, &cc, coupon))
            .collect()
    }

    /// Upfront implied by a clean price quoted as a fraction of par.
    #[must_use]
    pub fn price_to_puf(price: f64) -> f64 {
        1.0 - price
    }

    /// Clean price as a fraction of par implied by an upfront.
    #[must_use]
    pub fn puf_to_price(puf: f64) -> f64 {
        1.0 - puf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terms::CdsTerms;
    use approx::assert_relative_eq;

    fn setup() -> (IsdaYieldCurve, CdsAnalytic) {
        (
            IsdaYieldCurve::new(vec![1.0, 5.0], vec![0.02, 0.03]).unwrap(),
            CdsTerms::new(-0.1, 5.0).to_analytic().unwrap(),
        )
    }

    #[test]
    fn test_puf_round_trip() {
        let (yc, cds) = setup();
        let converter = MarketQuoteConverter::default();
        for (coupon, spread) in [(0.01, 0.004), (0.01, 0.01), (0.05, 0.03), (0.05, 0.09)] {
            let puf = converter.quoted_spread_to_puf(&cds, coupon, spread, &yc).unwrap();
            assert_eq!(puf > 1e-12, spread > coupon);
            let back = converter.puf_to_quoted_spread(&cds, coupon, puf, &yc).unwrap();
            assert_relative_eq!(back, spread, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_quote_conversions() {
        let (yc, cds) = setup();
        let converter = MarketQuoteConverter::default();
        let quote = CdsQuoteConvention::QuotedSpread {
            coupon: 0.01,
            quoted_spread: 0.02,
        };
        let puf = converter.to_points_upfront(&cds, &quote, &yc).unwrap();
        let CdsQuoteConvention::PointsUpFront { coupon, puf: upfront } = puf else {
            panic!("expected points upfront, got {puf:?}");
        };
        assert_eq!(coupon, 0.01);
        assert!(upfront > 0.0);

        let back = converter.to_quoted_spread(&cds, &puf, &yc).unwrap();
        let CdsQuoteConvention::QuotedSpread { quoted_spread, .. } = back else {
            panic!("expected quoted spread, got {back:?}");
        };
        assert_relative_eq!(quoted_spread, 0.02, epsilon = 1e-10);

        let par = CdsQuoteConvention::ParSpread { spread: 0.02 };
        assert!(matches!(
            converter.to_points_upfront(&cds, &par, &yc),
            Err(CdsError::UnsupportedQuote(_))
        ));
        assert!(converter.to_quoted_spread(&cds, &par, &yc).is_err());
        assert_eq!(converter.premium_and_puf(&cds, &par, &yc).unwrap(), (0.02, 0.0));
    }

    #[test]
    fn test_par_spreads_to_puf() {
        let (yc, _) = setup();
        let cds: Vec<_> = [1.0, 3.0, 5.0]
            .iter()
            .map(|&m| CdsTerms::new(-0.1, m).to_analytic().unwrap())
            .collect();
        let converter = MarketQuoteConverter::default();
        let pufs = converter
            .par_spreads_to_puf(&cds, 0.01, &[0.01, 0.01, 0.01], &yc)
            .unwrap();
        for puf in pufs {
            assert!(puf.abs() < 1e-12);
        }
    }

    #[test]
    fn test_price_conversions() {
        assert_relative_eq!(MarketQuoteConverter::price_to_puf(0.97), 0.03, epsilon = 1e-15);
        assert_relative_eq!(MarketQuoteConverter::puf_to_price(-0.02), 1.02, epsilon = 1e-15);
    }

    #[test]
    fn test_serde_tags() {
        let quote = CdsQuoteConvention::QuotedSpread {
            coupon: 0.05,
            quoted_spread: 0.031,
        };
        let json = serde_json::to_string(&quote).unwrap();
        assert!(json.contains("\"type\":\"quoted_spread\""));
        let back: CdsQuoteConvention = serde_json::from_str(&json).unwrap();
        assert_eq!(back, quote);
        assert_eq!(back.coupon(), 0.05);
        assert_eq!(back.name(), "quoted spread");
    }
}
