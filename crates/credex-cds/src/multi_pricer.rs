//! Term-structure pricer.
//!
//! Prices every maturity of a [`MultiCdsAnalytic`] in one sweep. The leg
//! integrals of maturity `i + 1` extend those of maturity `i`, so the pricer
//! carries running totals across maturities instead of integrating each
//! one from the protection start.

use credex_curves::prelude::*;
use credex_curves::schedule::POINT_TOLERANCE;

use crate::analytic::MultiCdsAnalytic;
use crate::coupon::CdsCoupon;
use crate::error::{CdsError, CdsResult};
use crate::pricer::{
    protection_segment, AccrualOnDefaultFormula, AnalyticCdsPricer, Node, PriceType,
};

/// Prices a CDS term structure.
///
/// Each value matches [`AnalyticCdsPricer`] applied to
/// [`MultiCdsAnalytic::cds`] for the same maturity.
///
/// # Example
///
/// ```rust
/// use credex_cds::prelude::*;
///
/// let yc = IsdaYieldCurve::flat(0.02).unwrap();
/// let cc = IsdaCreditCurve::flat(0.01).unwrap();
/// let multi = MultiCdsTerms::new(0.0, 0.0, vec![4, 12, 20]).to_analytic().unwrap();
///
/// let pricer = MultiAnalyticCdsPricer::default();
/// let spreads = pricer.par_spreads(&multi, &yc, &cc).unwrap();
/// assert_eq!(spreads.len(), 3);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MultiAnalyticCdsPricer {
    single: AnalyticCdsPricer,
}

impl MultiAnalyticCdsPricer {
    /// Creates a pricer using the given accrual-on-default formula.
    #[must_use]
    pub fn new(formula: AccrualOnDefaultFormula) -> Self {
        Self {
            single: AnalyticCdsPricer::new(formula),
        }
    }

    /// The accrual-on-default formula.
    #[must_use]
    pub fn formula(&self) -> AccrualOnDefaultFormula {
        self.single.formula()
    }

    /// Index of the first maturity that is not expired.
    fn first_live(multi: &MultiCdsAnalytic) -> Option<usize> {
        (0..multi.num_maturities()).find(|&i| !multi.is_expired(i))
    }

    fn last_end(multi: &MultiCdsAnalytic) -> f64 {
        let ends = multi.protection_ends();
        ends[ends.len() - 1]
    }

    /// Protection leg of every maturity. Expired maturities are zero.
    pub fn protection_leg(
        &self,
        multi: &MultiCdsAnalytic,
        yc: &IsdaYieldCurve,
        cc: &IsdaCreditCurve,
    ) -> CdsResult<Vec<f64>> {
        let n = multi.num_maturities();
        let mut out = vec![0.0; n];
        let Some(first) = Self::first_live(multi) else {
            return Ok(out);
        };
        let ends = multi.protection_ends();
        let knots = curve_integration_points(
            multi.effective_protection_start(),
            Self::last_end(multi),
            yc,
            cc,
        )?;
        let points = merge_knots(&knots, &ends[first..]);
        let scale = multi.lgd() / yc.discount_factor(multi.cash_settle_time());

        let mut k = first;
        let mut total = 0.0;
        let mut n0 = Node::at(points[0], yc, cc);
        for &t in &points[1..] {
            let n1 = Node::at(t, yc, cc);
            total += protection_segment(&n0, &n1);
            n0 = n1;
            while k < n && t >= ends[k] - POINT_TOLERANCE {
                out[k] = total * scale;
                k += 1;
            }
        }
        Ok(out)
    }

    /// Value of one coupon per unit spread, before cash-settle discounting.
    fn coupon_value(
        &self,
        multi: &MultiCdsAnalytic,
        coupon: &CdsCoupon,
        points: &[f64],
        yc: &IsdaYieldCurve,
        cc: &IsdaCreditCurve,
    ) -> CdsResult<f64> {
        let mut value = coupon.year_fraction()
            * yc.discount_factor(coupon.payment_time())
            * cc.survival_probability(coupon.eff_end());
        if multi.pay_accrued_on_default() {
            value += self.single.single_period_accrual_on_default(
                coupon,
                multi.effective_protection_start(),
                points,
                yc,
                cc,
            )?;
        }
        Ok(value)
    }

    /// RPV01 of every maturity. Expired maturities are zero.
    pub fn pv_premium_leg_per_unit_spread(
        &self,
        multi: &MultiCdsAnalytic,
        yc: &IsdaYieldCurve,
        cc: &IsdaCreditCurve,
        price_type: PriceType,
    ) -> CdsResult<Vec<f64>> {
        let n = multi.num_maturities();
        let mut out = vec![0.0; n];
        let Some(first) = Self::first_live(multi) else {
            return Ok(out);
        };
        let points = if multi.pay_accrued_on_default() {
            curve_integration_points(
                multi.effective_protection_start(),
                Self::last_end(multi),
                yc,
                cc,
            )?
        } else {
            Vec::new()
        };
        let df_cash = yc.discount_factor(multi.cash_settle_time());
        let accrued = match price_type {
            PriceType::Clean => multi.accrued_yf(),
            PriceType::Dirty => 0.0,
        };

        // Running total over the standard coupons paid so far
        let standard = multi.standard_coupons();
        let mut paid = 0;
        let mut running = 0.0;
        for i in first..n {
            let upto = multi.payment_indices()[i];
            while paid < upto {
                running += self.coupon_value(multi, &standard[paid], &points, yc, cc)?;
                paid += 1;
            }
            let terminal = &multi.terminal_coupons()[i];
            let total = running + self.coupon_value(multi, terminal, &points, yc, cc)?;
            out[i] = total / df_cash - accrued;
        }
        Ok(out)
    }

    /// PV of every maturity at its own spread.
    ///
    /// # Errors
    ///
    /// Returns an error if `spreads` does not have one entry per maturity.
    pub fn pv(
        &self,
        multi: &MultiCdsAnalytic,
        yc: &IsdaYieldCurve,
        cc: &IsdaCreditCurve,
        spreads: &[f64],
        price_type: PriceType,
    ) -> CdsResult<Vec<f64>> {
        if spreads.len() != multi.num_maturities() {
            return Err(CdsError::invalid_input(format!(
                "{} spreads for {} maturities",
                spreads.len(),
                multi.num_maturities()
            )));
        }
        let protection = self.protection_leg(multi, yc, cc)?;
        let rpv01 = self.pv_premium_leg_per_unit_spread(multi, yc, cc, price_type)?;
        Ok(protection
            .iter()
            .zip(&rpv01)
            .zip(spreads)
            .enumerate()
            .map(|(i, ((p, a), s))| if multi.is_expired(i) { 0.0 } else { p - s * a })
            .collect())
    }

    /// Par spread of every maturity.
    ///
    /// # Errors
    ///
    /// Returns [`CdsError::Expired`] if any maturity is expired.
    pub fn par_spreads(
        &self,
        multi: &MultiCdsAnalytic,
        yc: &IsdaYieldCurve,
        cc: &IsdaCreditCurve,
    ) -> CdsResult<Vec<f64>> {
        if let Some(i) = (0..multi.num_maturities()).find(|&i| multi.is_expired(i)) {
            return Err(CdsError::expired(multi.protection_ends()[i]));
        }
        let protection = self.protection_leg(multi, yc, cc)?;
        let rpv01 = self.pv_premium_leg_per_unit_spread(multi, yc, cc, PriceType::Clean)?;
        protection
            .iter()
            .zip(&rpv01)
            .map(|(p, a)| {
                if *a <= 0.0 {
                    Err(CdsError::invalid_input(format!(
                        "clean RPV01 must be positive to imply a par spread, got {a}"
                    )))
                } else {
                    Ok(p / a)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terms::MultiCdsTerms;
    use approx::assert_relative_eq;

    fn curves() -> (IsdaYieldCurve, IsdaCreditCurve) {
        (
            IsdaYieldCurve::new(vec![0.25, 1.0, 3.0, 10.0], vec![0.01, 0.015, 0.022, 0.03]).unwrap(),
            IsdaCreditCurve::new(vec![0.5, 2.0, 5.0], vec![0.004, 0.01, 0.018]).unwrap(),
        )
    }

    #[test]
    fn test_matches_single_pricer() {
        let (yc, cc) = curves();
        let multi = MultiCdsTerms::new(-0.05, 0.25, vec![1, 3, 7, 11, 19, 27])
            .to_analytic()
            .unwrap();
        for formula in [
            AccrualOnDefaultFormula::OriginalIsda,
            AccrualOnDefaultFormula::MarkitFix,
        ] {
            let pricer = MultiAnalyticCdsPricer::new(formula);
            let single = AnalyticCdsPricer::new(formula);
            let prot = pricer.protection_leg(&multi, &yc, &cc).unwrap();
            let rpv01 = pricer
                .pv_premium_leg_per_unit_spread(&multi, &yc, &cc, PriceType::Clean)
                .unwrap();
            for i in 0..multi.num_maturities() {
                let cds = multi.cds(i).unwrap();
                assert_relative_eq!(
                    prot[i],
                    single.protection_leg(&cds, &yc, &cc).unwrap(),
                    max_relative = 1e-12
                );
                assert_relative_eq!(
                    rpv01[i],
                    single
                        .pv_premium_leg_per_unit_spread(&cds, &yc, &cc, PriceType::Clean)
                        .unwrap(),
                    max_relative = 1e-12
                );
            }
        }
    }

    #[test]
    fn test_par_spreads_reprice_to_zero() {
        let (yc, cc) = curves();
        let multi = MultiCdsTerms::new(0.0, 0.0, vec![2, 4, 12, 20]).to_analytic().unwrap();
        let pricer = MultiAnalyticCdsPricer::default();
        let spreads = pricer.par_spreads(&multi, &yc, &cc).unwrap();
        let pvs = pricer.pv(&multi, &yc, &cc, &spreads, PriceType::Clean).unwrap();
        for pv in pvs {
            assert!(pv.abs() < 1e-14);
        }
        // Upward sloping credit curve gives upward sloping spreads
        assert!(spreads.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_expired_maturities() {
        let (yc, cc) = curves();
        let multi = MultiCdsTerms::new(-2.0, -1.0, vec![0, 2, 8])
            .to_analytic()
            .unwrap();
        assert!(multi.is_expired(0));
        assert!(!multi.is_expired(2));

        let pricer = MultiAnalyticCdsPricer::default();
        let prot = pricer.protection_leg(&multi, &yc, &cc).unwrap();
        assert_eq!(prot[0], 0.0);
        assert!(prot[2] > prot[1]);

        let pvs = pricer
            .pv(&multi, &yc, &cc, &[0.01, 0.01, 0.01], PriceType::Clean)
            .unwrap();
        assert_eq!(pvs[0], 0.0);
        assert!(matches!(
            pricer.par_spreads(&multi, &yc, &cc),
            Err(CdsError::Expired { .. })
        ));
        assert!(pricer
            .pv(&multi, &yc, &cc, &[0.01], PriceType::Clean)
            .is_err());
    }
}
