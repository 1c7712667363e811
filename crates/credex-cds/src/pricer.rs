//! Analytic CDS pricer under the ISDA standard model.
//!
//! # Mathematical Background
//!
//! With `P(t)` the discount factor and `Q(t)` the survival probability, the
//! legs of a CDS are
//!
//! ```text
//! protection = LGD * integral P(t) dQ(t)                     over [start, end]
//! RPV01      = sum yf_i P(pay_i) Q(end_i)
//!            + sum yf_ratio_i * integral (t - s_i) P(t) dQ(t)  over period i
//! ```
//!
//! Both curves are linear in `rt`, so between consecutive knots of either
//! curve the integrand is a single exponential and every integral has a
//! closed form. When the combined exponent of a segment is tiny the closed
//! form loses precision and the epsilon function family takes over.

use credex_curves::prelude::*;
use credex_math::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analytic::CdsAnalytic;
use crate::coupon::CdsCoupon;
use crate::error::{CdsError, CdsResult};

/// Offset added to the exponent of every accrual-on-default segment.
///
/// Kept for parity with the ISDA reference model.
pub(crate) const AOD_EXPONENT_OFFSET: f64 = 1e-50;

/// Half a day, the accrual offset of the original ISDA formula.
const HALF_DAY: f64 = 1.0 / 730.0;

/// Formula used for the accrual-on-default integral.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccrualOnDefaultFormula {
    /// ISDA standard model as published: accrual measured from the period
    /// start plus half a day.
    #[default]
    OriginalIsda,
    /// The Markit variant: no half-day offset, and accrual on each
    /// integration segment counted from the start of that segment.
    MarkitFix,
    /// Accrual measured from the period start with no offset.
    Correct,
}

impl AccrualOnDefaultFormula {
    /// Accrual offset `omega` added to the time since period start.
    #[must_use]
    pub fn omega(self) -> f64 {
        match self {
            Self::OriginalIsda => HALF_DAY,
            Self::MarkitFix | Self::Correct => 0.0,
        }
    }

    /// Whether accrual is tracked from the start of the coupon period.
    #[must_use]
    pub(crate) fn tracks_period_start(self) -> bool {
        !matches!(self, Self::MarkitFix)
    }
}

impl std::fmt::Display for AccrualOnDefaultFormula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::OriginalIsda => "OriginalISDA",
            Self::MarkitFix => "MarkitFix",
            Self::Correct => "Correct",
        };
        f.write_str(name)
    }
}

/// Whether a premium-leg value includes accrued premium.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceType {
    /// Accrued premium at step-in removed.
    #[default]
    Clean,
    /// Full value including accrued premium.
    Dirty,
}

// =============================================================================
// SEGMENT INTEGRALS
// =============================================================================

/// Curve state at one integration point.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Node {
    pub t: f64,
    pub ht: f64,
    pub rt: f64,
    /// Risky discount factor `P(t) Q(t)`.
    pub b: f64,
}

impl Node {
    pub(crate) fn at(t: f64, yc: &IsdaYieldCurve, cc: &IsdaCreditCurve) -> Self {
        let ht = cc.rt(t);
        let rt = yc.rt(t);
        Self {
            t,
            ht,
            rt,
            b: (-ht - rt).exp(),
        }
    }
}

/// Integral of `P dQ` between two nodes, without LGD.
pub(crate) fn protection_segment(n0: &Node, n1: &Node) -> f64 {
    let dht = n1.ht - n0.ht;
    let dhrt = dht + n1.rt - n0.rt;
    if dhrt.abs() < EPSILON_SWITCH {
        dht * n0.b * epsilon(-dhrt)
    } else {
        (n0.b - n1.b) * dht / dhrt
    }
}

/// Accrual-on-default integral between two nodes.
///
/// `t0` and `t1` are the accrual times at the nodes, measured from the
/// period start plus the formula's offset; `MarkitFix` ignores them.
pub(crate) fn accrual_segment(
    formula: AccrualOnDefaultFormula,
    n0: &Node,
    n1: &Node,
    t0: f64,
    t1: f64,
) -> f64 {
    let dt = n1.t - n0.t;
    let dht = n1.ht - n0.ht;
    let dhrt = dht + n1.rt - n0.rt + AOD_EXPONENT_OFFSET;
    let (b0, b1) = (n0.b, n1.b);

    if formula.tracks_period_start() {
        if dhrt.abs() < EPSILON_SWITCH {
            dht * b0 * (t0 * epsilon(-dhrt) + dt * epsilon_p(-dhrt))
        } else {
            dht / dhrt * (t0 * b0 - t1 * b1 + dt / dhrt * (b0 - b1))
        }
    } else if dhrt.abs() < EPSILON_SWITCH {
        dht * dt * b0 * epsilon_p(-dhrt)
    } else {
        dht * dt / dhrt * ((b0 - b1) / dhrt - b1)
    }
}

/// Integral of `P dQ` over a schedule of points.
pub(crate) fn protection_integral(
    points: &[f64],
    yc: &IsdaYieldCurve,
    cc: &IsdaCreditCurve,
) -> f64 {
    let mut n0 = Node::at(points[0], yc, cc);
    let mut total = 0.0;
    for &t in &points[1..] {
        let n1 = Node::at(t, yc, cc);
        total += protection_segment(&n0, &n1);
        n0 = n1;
    }
    total
}

// =============================================================================
// PRICER
// =============================================================================

/// Prices a single CDS off a yield and a credit curve.
///
/// # Example
///
/// ```rust
/// use credex_cds::prelude::*;
///
/// let yc = IsdaYieldCurve::flat(0.02).unwrap();
/// let cc = IsdaCreditCurve::flat(0.01).unwrap();
/// let cds = CdsTerms::new(0.0, 5.0).to_analytic().unwrap();
///
/// let pricer = AnalyticCdsPricer::default();
/// let spread = pricer.par_spread(&cds, &yc, &cc).unwrap();
///
/// // Close to the credit triangle hazard * LGD
/// assert!((spread - 0.006).abs() < 1e-4);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticCdsPricer {
    formula: AccrualOnDefaultFormula,
}

impl AnalyticCdsPricer {
    /// Creates a pricer using the given accrual-on-default formula.
    #[must_use]
    pub fn new(formula: AccrualOnDefaultFormula) -> Self {
        Self { formula }
    }

    /// The accrual-on-default formula.
    #[must_use]
    pub fn formula(&self) -> AccrualOnDefaultFormula {
        self.formula
    }

    /// Integration points over the protection window of a live CDS.
    fn integration_schedule(
        cds: &CdsAnalytic,
        yc: &IsdaYieldCurve,
        cc: &IsdaCreditCurve,
    ) -> CdsResult<Vec<f64>> {
        Ok(curve_integration_points(
            cds.effective_protection_start(),
            cds.protection_end(),
            yc,
            cc,
        )?)
    }

    /// Present value of the protection leg for unit notional.
    ///
    /// Zero for an expired CDS.
    pub fn protection_leg(
        &self,
        cds: &CdsAnalytic,
        yc: &IsdaYieldCurve,
        cc: &IsdaCreditCurve,
    ) -> CdsResult<f64> {
        if cds.is_expired() {
            return Ok(0.0);
        }
        let points = Self::integration_schedule(cds, yc, cc)?;
        let value = protection_integral(&points, yc, cc);
        Ok(cds.lgd() * value / yc.discount_factor(cds.cash_settle_time()))
    }

    /// Present value of the premium leg per unit spread (RPV01).
    ///
    /// Includes accrual on default when the CDS pays it. The clean value
    /// subtracts the accrued year fraction at step-in. Zero for an expired
    /// CDS.
    pub fn pv_premium_leg_per_unit_spread(
        &self,
        cds: &CdsAnalytic,
        yc: &IsdaYieldCurve,
        cc: &IsdaCreditCurve,
        price_type: PriceType,
    ) -> CdsResult<f64> {
        if cds.is_expired() {
            return Ok(0.0);
        }
        let points = if cds.pay_accrued_on_default() {
            Self::integration_schedule(cds, yc, cc)?
        } else {
            Vec::new()
        };

        let mut pv = 0.0;
        for coupon in cds.coupons() {
            pv += coupon.year_fraction()
                * yc.discount_factor(coupon.payment_time())
                * cc.survival_probability(coupon.eff_end());
            if cds.pay_accrued_on_default() {
                pv += self.single_period_accrual_on_default(
                    coupon,
                    cds.effective_protection_start(),
                    &points,
                    yc,
                    cc,
                )?;
            }
        }
        pv /= yc.discount_factor(cds.cash_settle_time());

        Ok(match price_type {
            PriceType::Clean => pv - cds.accrued_yf(),
            PriceType::Dirty => pv,
        })
    }

    /// Accrual-on-default value of one coupon period per unit spread.
    ///
    /// # Arguments
    ///
    /// * `coupon` - The coupon period
    /// * `effective_start` - Time from which default is observed
    /// * `points` - Integration points covering the period, ascending
    /// * `yc` - Yield curve
    /// * `cc` - Credit curve
    ///
    /// # Returns
    ///
    /// Zero when the period ends on or before `effective_start`; otherwise
    /// the integral of accrued premium against default over the period,
    /// scaled by the coupon's year-fraction ratio. Not divided by the
    /// cash-settlement discount factor.
    pub fn single_period_accrual_on_default(
        &self,
        coupon: &CdsCoupon,
        effective_start: f64,
        points: &[f64],
        yc: &IsdaYieldCurve,
        cc: &IsdaCreditCurve,
    ) -> CdsResult<f64> {
        let start = coupon.eff_start().max(effective_start);
        if start >= coupon.eff_end() {
            return Ok(0.0);
        }
        let knots = truncate_inclusive(start, coupon.eff_end(), points)?;
        let omega = self.formula.omega();

        let mut n0 = Node::at(knots[0], yc, cc);
        let mut t0 = n0.t - coupon.eff_start() + omega;
        let mut pv = 0.0;
        for &t in &knots[1..] {
            let n1 = Node::at(t, yc, cc);
            let t1 = t - coupon.eff_start() + omega;
            pv += accrual_segment(self.formula, &n0, &n1, t0, t1);
            n0 = n1;
            t0 = t1;
        }
        Ok(coupon.yf_ratio() * pv)
    }

    /// Present value for unit notional of protection bought at `spread`.
    ///
    /// Zero for an expired CDS.
    pub fn pv(
        &self,
        cds: &CdsAnalytic,
        yc: &IsdaYieldCurve,
        cc: &IsdaCreditCurve,
        spread: f64,
        price_type: PriceType,
    ) -> CdsResult<f64> {
        self.pv_and_rpv01(cds, yc, cc, spread, price_type)
            .map(|(pv, _)| pv)
    }

    /// Present value together with the RPV01 it was computed from.
    pub fn pv_and_rpv01(
        &self,
        cds: &CdsAnalytic,
        yc: &IsdaYieldCurve,
        cc: &IsdaCreditCurve,
        spread: f64,
        price_type: PriceType,
    ) -> CdsResult<(f64, f64)> {
        if cds.is_expired() {
            return Ok((0.0, 0.0));
        }
        let rpv01 = self.pv_premium_leg_per_unit_spread(cds, yc, cc, price_type)?;
        let protection = self.protection_leg(cds, yc, cc)?;
        Ok((protection - spread * rpv01, rpv01))
    }

    /// Spread at which the clean PV is zero.
    ///
    /// # Errors
    ///
    /// Returns [`CdsError::Expired`] for an expired CDS and an error if the
    /// clean RPV01 is not positive.
    pub fn par_spread(
        &self,
        cds: &CdsAnalytic,
        yc: &IsdaYieldCurve,
        cc: &IsdaCreditCurve,
    ) -> CdsResult<f64> {
        if cds.is_expired() {
            return Err(CdsError::expired(cds.protection_end()));
        }
        let rpv01 = self.pv_premium_leg_per_unit_spread(cds, yc, cc, PriceType::Clean)?;
        if rpv01 <= 0.0 {
            return Err(CdsError::invalid_input(format!(
                "clean RPV01 must be positive to imply a par spread, got {rpv01}"
            )));
        }
        Ok(self.protection_leg(cds, yc, cc)? / rpv01)
    }

    /// Points upfront for a CDS paying a standard running `coupon`.
    pub fn points_upfront(
        &self,
        cds: &CdsAnalytic,
        yc: &IsdaYieldCurve,
        cc: &IsdaCreditCurve,
        coupon: f64,
    ) -> CdsResult<f64> {
        self.pv(cds, yc, cc, coupon, PriceType::Clean)
    }
}
