//! Analytic credit sensitivities.
//!
//! Derivatives of the leg values with respect to the zero rate of one credit
//! curve knot. Moving knot `k` changes `H(t) = h(t) t` by
//! `s(t) = dH/dr_k`, which is piecewise linear and known exactly from the
//! curve, so each segment integral of the pricer can be differentiated in
//! closed form:
//!
//! ```text
//! d(dht)  = s1 - s0
//! d(dhrt) = s1 - s0                (the yield curve does not move)
//! d(b_i)  = -b_i s_i
//! ```
//!
//! Small exponents use the next member of the epsilon family, so the
//! derivatives stay accurate wherever the prices do.

use credex_curves::prelude::*;
use credex_math::prelude::*;

use crate::analytic::CdsAnalytic;
use crate::coupon::CdsCoupon;
use crate::error::{CdsError, CdsResult};
use crate::pricer::{AccrualOnDefaultFormula, AnalyticCdsPricer, Node, PriceType};

/// Curve state at an integration point together with `dH/dr_k`.
#[derive(Debug, Clone, Copy)]
struct SensitivityNode {
    node: Node,
    s: f64,
}

impl SensitivityNode {
    fn at(
        t: f64,
        yc: &IsdaYieldCurve,
        cc: &IsdaCreditCurve,
        index: usize,
    ) -> CdsResult<Self> {
        Ok(Self {
            node: Node::at(t, yc, cc),
            s: cc.single_node_rt_sensitivity(t, index)?,
        })
    }
}

/// Per-segment quantities shared by the derivative formulas.
struct Segment {
    dt: f64,
    dht: f64,
    x: f64,
    delta: f64,
    b0: f64,
    b1: f64,
    db0: f64,
    db1: f64,
}

impl Segment {
    fn new(a: &SensitivityNode, b: &SensitivityNode, offset: f64) -> Self {
        let dht = b.node.ht - a.node.ht;
        Self {
            dt: b.node.t - a.node.t,
            dht,
            x: dht + b.node.rt - a.node.rt + offset,
            delta: b.s - a.s,
            b0: a.node.b,
            b1: b.node.b,
            db0: -a.node.b * a.s,
            db1: -b.node.b * b.s,
        }
    }
}

fn protection_segment_sensitivity(seg: &Segment) -> f64 {
    let Segment {
        dht,
        x,
        delta,
        b0,
        b1,
        db0,
        db1,
        ..
    } = *seg;
    if x.abs() < EPSILON_SWITCH {
        let e = epsilon(-x);
        delta * b0 * e + dht * db0 * e - dht * b0 * delta * epsilon_p(-x)
    } else {
        delta * (b0 - b1) / x + dht * (db0 - db1) / x - dht * (b0 - b1) * delta / (x * x)
    }
}

fn accrual_segment_sensitivity(
    formula: AccrualOnDefaultFormula,
    seg: &Segment,
    t0: f64,
    t1: f64,
) -> f64 {
    let Segment {
        dt,
        dht,
        x,
        delta,
        b0,
        b1,
        db0,
        db1,
    } = *seg;

    if formula.tracks_period_start() {
        if x.abs() < EPSILON_SWITCH {
            let (e, ep, epp) = (epsilon(-x), epsilon_p(-x), epsilon_pp(-x));
            let inner = t0 * e + dt * ep;
            delta * b0 * inner + dht * db0 * inner - dht * b0 * delta * (t0 * ep + dt * epp)
        } else {
            let w = t0 * b0 - t1 * b1 + dt * (b0 - b1) / x;
            let dw = t0 * db0 - t1 * db1 + dt * ((db0 - db1) / x - (b0 - b1) * delta / (x * x));
            (delta / x - dht * delta / (x * x)) * w + dht / x * dw
        }
    } else if x.abs() < EPSILON_SWITCH {
        let ep = epsilon_p(-x);
        dt * (delta * b0 * ep + dht * db0 * ep - dht * b0 * delta * epsilon_pp(-x))
    } else {
        let u = (b0 - b1) / x - b1;
        let du = (db0 - db1) / x - (b0 - b1) * delta / (x * x) - db1;
        dt * ((delta / x - dht * delta / (x * x)) * u + dht / x * du)
    }
}

impl AnalyticCdsPricer {
    /// Sensitivity of the accrual-on-default value of one coupon to credit
    /// knot `index`.
    fn single_period_accrual_sensitivity(
        &self,
        coupon: &CdsCoupon,
        effective_start: f64,
        points: &[f64],
        yc: &IsdaYieldCurve,
        cc: &IsdaCreditCurve,
        index: usize,
    ) -> CdsResult<f64> {
        let start = coupon.eff_start().max(effective_start);
        if start >= coupon.eff_end() {
            return Ok(0.0);
        }
        let knots = truncate_inclusive(start, coupon.eff_end(), points)?;
        let omega = self.formula().omega();

        let mut n0 = SensitivityNode::at(knots[0], yc, cc, index)?;
        let mut t0 = n0.node.t - coupon.eff_start() + omega;
        let mut total = 0.0;
        for &t in &knots[1..] {
            let n1 = SensitivityNode::at(t, yc, cc, index)?;
            let t1 = t - coupon.eff_start() + omega;
            let seg = Segment::new(&n0, &n1, crate::pricer::AOD_EXPONENT_OFFSET);
            total += accrual_segment_sensitivity(self.formula(), &seg, t0, t1);
            n0 = n1;
            t0 = t1;
        }
        Ok(coupon.yf_ratio() * total)
    }

    /// Sensitivity of the protection leg to the zero rate of credit knot
    /// `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is not a knot of the credit curve.
    pub fn protection_leg_credit_sensitivity(
        &self,
        cds: &CdsAnalytic,
        yc: &IsdaYieldCurve,
        cc: &IsdaCreditCurve,
        index: usize,
    ) -> CdsResult<f64> {
        check_node(cc, index)?;
        if cds.is_expired() {
            return Ok(0.0);
        }
        let points = curve_integration_points(
            cds.effective_protection_start(),
            cds.protection_end(),
            yc,
            cc,
        )?;
        let mut n0 = SensitivityNode::at(points[0], yc, cc, index)?;
        let mut total = 0.0;
        for &t in &points[1..] {
            let n1 = SensitivityNode::at(t, yc, cc, index)?;
            total += protection_segment_sensitivity(&Segment::new(&n0, &n1, 0.0));
            n0 = n1;
        }
        Ok(cds.lgd() * total / yc.discount_factor(cds.cash_settle_time()))
    }

    /// Sensitivity of the RPV01 to the zero rate of credit knot `index`.
    ///
    /// Clean and dirty RPV01 differ by a constant, so they share this value.
    pub fn pv_premium_leg_credit_sensitivity(
        &self,
        cds: &CdsAnalytic,
        yc: &IsdaYieldCurve,
        cc: &IsdaCreditCurve,
        index: usize,
    ) -> CdsResult<f64> {
        check_node(cc, index)?;
        if cds.is_expired() {
            return Ok(0.0);
        }
        let points = if cds.pay_accrued_on_default() {
            curve_integration_points(
                cds.effective_protection_start(),
                cds.protection_end(),
                yc,
                cc,
            )?
        } else {
            Vec::new()
        };

        let mut total = 0.0;
        for coupon in cds.coupons() {
            let (ht, s) = cc.rt_and_sensitivity(coupon.eff_end(), index)?;
            total -= coupon.year_fraction()
                * yc.discount_factor(coupon.payment_time())
                * (-ht).exp()
                * s;
            if cds.pay_accrued_on_default() {
                total += self.single_period_accrual_sensitivity(
                    coupon,
                    cds.effective_protection_start(),
                    &points,
                    yc,
                    cc,
                    index,
                )?;
            }
        }
        Ok(total / yc.discount_factor(cds.cash_settle_time()))
    }

    /// Sensitivity of the PV at `spread` to credit knot `index`.
    pub fn pv_credit_sensitivity(
        &self,
        cds: &CdsAnalytic,
        yc: &IsdaYieldCurve,
        cc: &IsdaCreditCurve,
        spread: f64,
        index: usize,
    ) -> CdsResult<f64> {
        let protection = self.protection_leg_credit_sensitivity(cds, yc, cc, index)?;
        let rpv01 = self.pv_premium_leg_credit_sensitivity(cds, yc, cc, index)?;
        Ok(protection - spread * rpv01)
    }

    /// Sensitivity of the PV at `spread` to every credit knot.
    pub fn pv_credit_sensitivities(
        &self,
        cds: &CdsAnalytic,
        yc: &IsdaYieldCurve,
        cc: &IsdaCreditCurve,
        spread: f64,
    ) -> CdsResult<Vec<f64>> {
        (0..cc.num_knots())
            .map(|i| self.pv_credit_sensitivity(cds, yc, cc, spread, i))
            .collect()
    }

    /// Sensitivity of the par spread to credit knot `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CdsError::Expired`] for an expired CDS.
    pub fn par_spread_credit_sensitivity(
        &self,
        cds: &CdsAnalytic,
        yc: &IsdaYieldCurve,
        cc: &IsdaCreditCurve,
        index: usize,
    ) -> CdsResult<f64> {
        if cds.is_expired() {
            return Err(CdsError::expired(cds.protection_end()));
        }
        let protection = self.protection_leg(cds, yc, cc)?;
        let rpv01 = self.pv_premium_leg_per_unit_spread(cds, yc, cc, PriceType::Clean)?;
        if rpv01 <= 0.0 {
            return Err(CdsError::invalid_input(format!(
                "clean RPV01 must be positive to imply a par spread, got {rpv01}"
            )));
        }
        let d_protection = self.protection_leg_credit_sensitivity(cds, yc, cc, index)?;
        let d_rpv01 = self.pv_premium_leg_credit_sensitivity(cds, yc, cc, index)?;
        Ok((d_protection * rpv01 - protection * d_rpv01) / (rpv01 * rpv01))
    }
}

fn check_node(cc: &IsdaCreditCurve, index: usize) -> CdsResult<()> {
    if index < cc.num_knots() {
        Ok(())
    } else {
        Err(CurveError::index_out_of_range(index, cc.num_knots()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terms::CdsTerms;
    use approx::assert_relative_eq;

    const BUMP: f64 = 1e-6;

    fn curves() -> (IsdaYieldCurve, IsdaCreditCurve) {
        (
            IsdaYieldCurve::new(vec![0.5, 2.0, 7.0], vec![0.01, 0.02, 0.03]).unwrap(),
            IsdaCreditCurve::new(vec![1.0, 3.0, 5.0, 7.0], vec![0.005, 0.012, 0.02, 0.022])
                .unwrap(),
        )
    }

    fn bumped(cc: &IsdaCreditCurve, index: usize, bump: f64) -> IsdaCreditCurve {
        cc.with_rate(cc.zero_rates()[index] + bump, index).unwrap()
    }

    fn central<F: Fn(&IsdaCreditCurve) -> f64>(cc: &IsdaCreditCurve, index: usize, f: F) -> f64 {
        (f(&bumped(cc, index, BUMP)) - f(&bumped(cc, index, -BUMP))) / (2.0 * BUMP)
    }

    const FORMULAS: [AccrualOnDefaultFormula; 3] = [
        AccrualOnDefaultFormula::OriginalIsda,
        AccrualOnDefaultFormula::MarkitFix,
        AccrualOnDefaultFormula::Correct,
    ];

    #[test]
    fn test_leg_sensitivities_match_finite_difference() {
        let (yc, cc) = curves();
        let cds = CdsTerms::new(-0.1, 5.0).to_analytic().unwrap();
        for formula in FORMULAS {
            let pricer = AnalyticCdsPricer::new(formula);
            for k in 0..cc.num_knots() {
                let fd = central(&cc, k, |c| pricer.protection_leg(&cds, &yc, c).unwrap());
                let analytic = pricer
                    .protection_leg_credit_sensitivity(&cds, &yc, &cc, k)
                    .unwrap();
                assert_relative_eq!(analytic, fd, epsilon = 1e-8);

                let fd = central(&cc, k, |c| {
                    pricer
                        .pv_premium_leg_per_unit_spread(&cds, &yc, c, PriceType::Dirty)
                        .unwrap()
                });
                let analytic = pricer
                    .pv_premium_leg_credit_sensitivity(&cds, &yc, &cc, k)
                    .unwrap();
                assert_relative_eq!(analytic, fd, epsilon = 1e-7);
            }
        }
    }

    #[test]
    fn test_small_exponent_sensitivities() {
        // Hazard and interest cancel so every segment uses the series branch
        let yc = IsdaYieldCurve::flat(-0.01).unwrap();
        let cc = IsdaCreditCurve::new(vec![1.0, 3.0], vec![0.01, 0.01]).unwrap();
        let cds = CdsTerms::new(0.0, 3.0).to_analytic().unwrap();
        for formula in FORMULAS {
            let pricer = AnalyticCdsPricer::new(formula);
            for k in 0..2 {
                let fd = central(&cc, k, |c| pricer.pv(&cds, &yc, c, 0.01, PriceType::Clean).unwrap());
                let analytic = pricer.pv_credit_sensitivity(&cds, &yc, &cc, 0.01, k).unwrap();
                assert_relative_eq!(analytic, fd, epsilon = 1e-7);
            }
        }
    }

    #[test]
    fn test_par_spread_sensitivity() {
        let (yc, cc) = curves();
        let cds = CdsTerms::new(0.0, 4.0).to_analytic().unwrap();
        let pricer = AnalyticCdsPricer::default();
        for k in 0..cc.num_knots() {
            let fd = central(&cc, k, |c| pricer.par_spread(&cds, &yc, c).unwrap());
            let analytic = pricer.par_spread_credit_sensitivity(&cds, &yc, &cc, k).unwrap();
            assert_relative_eq!(analytic, fd, epsilon = 1e-8);
        }
        // The 7Y knot does not reach a 4Y CDS
        let last = pricer.par_spread_credit_sensitivity(&cds, &yc, &cc, 3).unwrap();
        assert_eq!(last, 0.0);
    }

    #[test]
    fn test_all_nodes_and_bad_index() {
        let (yc, cc) = curves();
        let cds = CdsTerms::new(0.0, 5.0).to_analytic().unwrap();
        let pricer = AnalyticCdsPricer::default();
        let all = pricer.pv_credit_sensitivities(&cds, &yc, &cc, 0.01).unwrap();
        assert_eq!(all.len(), 4);
        // Protection gains value as hazard rises
        assert!(all.iter().sum::<f64>() > 0.0);
        assert!(pricer
            .protection_leg_credit_sensitivity(&cds, &yc, &cc, 4)
            .is_err());
    }

    #[test]
    fn test_expired() {
        let (yc, cc) = curves();
        let cds = CdsTerms::new(-2.0, -0.5).to_analytic().unwrap();
        let pricer = AnalyticCdsPricer::default();
        assert_eq!(pricer.pv_credit_sensitivity(&cds, &yc, &cc, 0.01, 0).unwrap(), 0.0);
        assert!(pricer.par_spread_credit_sensitivity(&cds, &yc, &cc, 0).is_err());
    }
}
