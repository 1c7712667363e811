//! Risky bond priced off ISDA curves.
//!
//! A bond is reduced to its remaining cash flows. Each flow is discounted
//! with the risky discount factor `P(t) Q(t)`, and on default the holder
//! receives the recovery rate times par, which adds
//! `R * integral of P dQ` up to the last payment.

use credex_curves::prelude::*;
use credex_math::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::analytic::CdsAnalytic;
use crate::error::{CdsError, CdsResult};
use crate::pricer::{protection_integral, AnalyticCdsPricer, PriceType};

/// Starting hazard rate when backing one out of a bond price.
const HAZARD_GUESS: f64 = 0.01;

/// Payment dates closer than this to the valuation time are dropped.
const PAYMENT_TOLERANCE: f64 = 1e-10;

/// Remaining cash flows of a bond, per unit of par.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BondAnalyticRepr", into = "BondAnalyticRepr")]
pub struct BondAnalytic {
    payment_times: Vec<f64>,
    payment_amounts: Vec<f64>,
    recovery_rate: f64,
    accrued_interest: f64,
}

impl BondAnalytic {
    /// Creates a bond from its payment schedule.
    ///
    /// # Arguments
    ///
    /// * `payment_times` - Strictly ascending payment times in years; the
    ///   last one is the maturity
    /// * `payment_amounts` - Amount paid at each time, the final one
    ///   including the principal
    /// * `recovery_rate` - Fraction of par recovered on default
    /// * `accrued_interest` - Accrued interest for the clean price
    ///
    /// # Errors
    ///
    /// Returns an error if the schedule is empty, the vectors differ in
    /// length, times are not strictly ascending, the last payment is not in
    /// the future, or the recovery rate is outside `[0, 1]`.
    pub fn new(
        payment_times: Vec<f64>,
        payment_amounts: Vec<f64>,
        recovery_rate: f64,
        accrued_interest: f64,
    ) -> CdsResult<Self> {
        if payment_times.is_empty() {
            return Err(CdsError::invalid_input("bond has no payments"));
        }
        if payment_times.len() != payment_amounts.len() {
            return Err(CdsError::invalid_input(format!(
                "{} payment times but {} amounts",
                payment_times.len(),
                payment_amounts.len()
            )));
        }
        if payment_times
            .iter()
            .chain(&payment_amounts)
            .any(|x| !x.is_finite())
            || !accrued_interest.is_finite()
        {
            return Err(CdsError::invalid_input("bond values must be finite"));
        }
        if let Some(i) = payment_times.windows(2).position(|w| w[1] <= w[0]) {
            return Err(CdsError::invalid_input(format!(
                "payment times must be strictly ascending, {} follows {}",
                payment_times[i + 1],
                payment_times[i]
            )));
        }
        let maturity = payment_times[payment_times.len() - 1];
        if maturity <= 0.0 {
            return Err(CdsError::expired(maturity));
        }
        if !(0.0..=1.0).contains(&recovery_rate) {
            return Err(CdsError::invalid_input(format!(
                "recovery rate must be in [0, 1], got {recovery_rate}"
            )));
        }
        Ok(Self {
            payment_times,
            payment_amounts,
            recovery_rate,
            accrued_interest,
        })
    }

    /// Creates a bullet bond paying `coupon * interval` every `interval`
    /// years until `maturity`, with the principal on the final date.
    ///
    /// The first coupon may be short; accrued interest is the part of the
    /// current period already elapsed.
    pub fn fixed_rate(
        maturity: f64,
        coupon: f64,
        interval: f64,
        recovery_rate: f64,
    ) -> CdsResult<Self> {
        if !(interval.is_finite() && interval > 0.0) {
            return Err(CdsError::invalid_input(format!(
                "coupon interval must be positive, got {interval}"
            )));
        }
        if !(maturity.is_finite() && maturity > PAYMENT_TOLERANCE) {
            return Err(CdsError::invalid_input(format!(
                "bond maturity must be positive, got {maturity}"
            )));
        }
        let mut times = Vec::new();
        let mut t = maturity;
        while t > PAYMENT_TOLERANCE {
            times.push(t);
            t -= interval;
        }
        times.reverse();
        let mut amounts = vec![coupon * interval; times.len()];
        if let Some(last) = amounts.last_mut() {
            *last += 1.0;
        }
        let accrued = coupon * (interval - times[0]);
        Self::new(times, amounts, recovery_rate, accrued)
    }

    /// Payment times.
    #[must_use]
    pub fn payment_times(&self) -> &[f64] {
        &self.payment_times
    }

    /// Payment amounts.
    #[must_use]
    pub fn payment_amounts(&self) -> &[f64] {
        &self.payment_amounts
    }

    /// Recovery rate.
    #[must_use]
    pub fn recovery_rate(&self) -> f64 {
        self.recovery_rate
    }

    /// Accrued interest.
    #[must_use]
    pub fn accrued_interest(&self) -> f64 {
        self.accrued_interest
    }

    /// Final payment time.
    #[must_use]
    pub fn maturity(&self) -> f64 {
        self.payment_times[self.payment_times.len() - 1]
    }
}

#[derive(Serialize, Deserialize)]
struct BondAnalyticRepr {
    payment_times: Vec<f64>,
    payment_amounts: Vec<f64>,
    recovery_rate: f64,
    #[serde(default)]
    accrued_interest: f64,
}

impl TryFrom<BondAnalyticRepr> for BondAnalytic {
    type Error = CdsError;

    fn try_from(repr: BondAnalyticRepr) -> CdsResult<Self> {
        Self::new(
            repr.payment_times,
            repr.payment_amounts,
            repr.recovery_rate,
            repr.accrued_interest,
        )
    }
}

impl From<BondAnalytic> for BondAnalyticRepr {
    fn from(bond: BondAnalytic) -> Self {
        Self {
            payment_times: bond.payment_times,
            payment_amounts: bond.payment_amounts,
            recovery_rate: bond.recovery_rate,
            accrued_interest: bond.accrued_interest,
        }
    }
}

/// Prices bonds and relates bond prices to hazard rates and CDS spreads.
///
/// # Example
///
/// ```rust
/// use credex_cds::prelude::*;
///
/// let yc = IsdaYieldCurve::flat(0.03).unwrap();
/// let bond = BondAnalytic::fixed_rate(5.0, 0.05, 0.5, 0.4).unwrap();
/// let pricer = AnalyticBondPricer::default();
///
/// let price = pricer.bond_price_for_hazard_rate(&bond, &yc, 0.02, PriceType::Dirty).unwrap();
/// let hazard = pricer
///     .equivalent_hazard_rate(&bond, &yc, price, PriceType::Dirty)
///     .unwrap();
/// assert!((hazard - 0.02).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyticBondPricer {
    cds_pricer: AnalyticCdsPricer,
    solver: SolverConfig,
    bracket: BracketConfig,
}

impl Default for AnalyticBondPricer {
    fn default() -> Self {
        Self::new(AnalyticCdsPricer::default())
    }
}

impl AnalyticBondPricer {
    /// Creates a bond pricer; `cds_pricer` is used for equivalent CDS spreads.
    #[must_use]
    pub fn new(cds_pricer: AnalyticCdsPricer) -> Self {
        Self {
            cds_pricer,
            solver: SolverConfig::default().with_tolerance(1e-14),
            bracket: BracketConfig::non_negative(),
        }
    }

    /// Sets the solver configuration used to back out hazard rates.
    #[must_use]
    pub fn with_solver_config(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    /// Bond price per unit of par.
    ///
    /// Payments at or before time zero are ignored. The recovery term runs
    /// over the knots of both curves between zero and the maturity.
    pub fn bond_price(
        &self,
        bond: &BondAnalytic,
        yc: &IsdaYieldCurve,
        cc: &IsdaCreditCurve,
        price_type: PriceType,
    ) -> CdsResult<f64> {
        let risky_flows: f64 = bond
            .payment_times
            .iter()
            .zip(&bond.payment_amounts)
            .filter(|(t, _)| **t > 0.0)
            .map(|(&t, &amount)| amount * yc.discount_factor(t) * cc.survival_probability(t))
            .sum();

        let points = curve_integration_points(0.0, bond.maturity(), yc, cc)?;
        let recovery = bond.recovery_rate * protection_integral(&points, yc, cc);

        let dirty = risky_flows + recovery;
        Ok(match price_type {
            PriceType::Dirty => dirty,
            PriceType::Clean => dirty - bond.accrued_interest,
        })
    }

    /// Bond price under a flat hazard rate.
    pub fn bond_price_for_hazard_rate(
        &self,
        bond: &BondAnalytic,
        yc: &IsdaYieldCurve,
        hazard_rate: f64,
        price_type: PriceType,
    ) -> CdsResult<f64> {
        let cc = IsdaCreditCurve::flat(hazard_rate)?;
        self.bond_price(bond, yc, &cc, price_type)
    }

    /// Flat hazard rate that reprices the bond to `bond_price`.
    ///
    /// # Errors
    ///
    /// Returns an error if no non-negative hazard rate reprices the bond,
    /// which happens when the price exceeds the risk-free price.
    pub fn equivalent_hazard_rate(
        &self,
        bond: &BondAnalytic,
        yc: &IsdaYieldCurve,
        bond_price: f64,
        price_type: PriceType,
    ) -> CdsResult<f64> {
        if !bond_price.is_finite() || bond_price <= 0.0 {
            return Err(CdsError::invalid_input(format!(
                "bond price must be positive, got {bond_price}"
            )));
        }
        let risk_free = self.bond_price_for_hazard_rate(bond, yc, 0.0, price_type)?;
        if bond_price > risk_free {
            return Err(CdsError::invalid_input(format!(
                "bond price {bond_price} exceeds the risk-free price {risk_free}"
            )));
        }

        let mut error = None;
        let mut objective = |h: f64| match self.bond_price_for_hazard_rate(bond, yc, h, price_type)
        {
            Ok(price) => price - bond_price,
            Err(e) => {
                error.get_or_insert(e);
                f64::NAN
            }
        };

        let bracketed = bracket_root(
            &mut objective,
            0.8 * HAZARD_GUESS,
            1.25 * HAZARD_GUESS,
            &self.bracket,
        );
        let solved = bracketed.and_then(|(a, b)| {
            trace!(lower = a, upper = b, "bracketed bond hazard rate");
            brent(&mut objective, a, b, &self.solver)
        });
        match (solved, error) {
            (_, Some(e)) => Err(e),
            (Ok(result), None) => Ok(result.root),
            (Err(e), None) => Err(e.into()),
        }
    }

    /// Par spread of `cds` under the flat hazard rate implied by a bond
    /// price.
    ///
    /// The CDS is priced with the bond's recovery rate.
    pub fn bond_equivalent_cds_spread(
        &self,
        bond: &BondAnalytic,
        yc: &IsdaYieldCurve,
        bond_price: f64,
        price_type: PriceType,
        cds: &CdsAnalytic,
    ) -> CdsResult<f64> {
        let hazard = self.equivalent_hazard_rate(bond, yc, bond_price, price_type)?;
        let cc = IsdaCreditCurve::flat(hazard)?;
        let cds = cds.with_recovery_rate(bond.recovery_rate)?;
        self.cds_pricer.par_spread(&cds, yc, &cc)
    }
}
