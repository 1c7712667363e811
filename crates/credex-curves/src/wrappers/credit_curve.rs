//! Credit curve wrapper providing survival semantics.

use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::builder::sealed;
use crate::error::{CurveError, CurveResult};
use crate::isda_curve::IsdaCurve;
use crate::traits::Curve;

/// An ISDA credit curve: `rt(t)` is the integrated hazard rate.
///
/// Zero rates on this curve are average hazard rates, forward rates are
/// instantaneous hazard rates, and discount factors are survival
/// probabilities.
///
/// # Example
///
/// ```rust
/// use credex_curves::IsdaCreditCurve;
///
/// let cc = IsdaCreditCurve::flat(0.01).unwrap();
/// assert!((cc.survival_probability(5.0) - (-0.05_f64).exp()).abs() < 1e-15);
/// assert_eq!(cc.hazard_rate(3.0), 0.01);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IsdaCreditCurve(IsdaCurve);

impl IsdaCreditCurve {
    /// Creates a credit curve from knot times and average hazard rates.
    pub fn new(times: Vec<f64>, hazard_rates: Vec<f64>) -> CurveResult<Self> {
        IsdaCurve::new(times, hazard_rates).map(Self)
    }

    /// Creates a credit curve with a constant hazard rate.
    pub fn flat(hazard_rate: f64) -> CurveResult<Self> {
        IsdaCurve::flat(hazard_rate).map(Self)
    }

    /// Creates a credit curve from survival probabilities at the knots.
    ///
    /// # Errors
    ///
    /// Returns an error if any probability is outside `(0, 1]` or any knot
    /// sits at `t = 0`.
    pub fn from_survival_probabilities(
        times: Vec<f64>,
        probabilities: &[f64],
    ) -> CurveResult<Self> {
        if times.len() != probabilities.len() {
            return Err(CurveError::length_mismatch(times.len(), probabilities.len()));
        }
        if let Some(p) = probabilities.iter().find(|p| !(**p > 0.0 && **p <= 1.0)) {
            return Err(CurveError::invalid_input(format!(
                "survival probability must lie in (0, 1], got {p}"
            )));
        }
        let rt = probabilities.iter().map(|p| -p.ln()).collect();
        IsdaCurve::from_rt(times, rt).map(Self)
    }

    /// Returns the underlying curve.
    #[must_use]
    pub fn curve(&self) -> &IsdaCurve {
        &self.0
    }

    /// Consumes the wrapper and returns the underlying curve.
    #[must_use]
    pub fn into_inner(self) -> IsdaCurve {
        self.0
    }

    /// Probability of no default before `t`.
    #[must_use]
    pub fn survival_probability(&self, t: f64) -> f64 {
        self.0.discount_factor(t)
    }

    /// Probability of default before `t`.
    #[must_use]
    pub fn default_probability(&self, t: f64) -> f64 {
        -(-self.0.rt(t)).exp_m1()
    }

    /// Instantaneous hazard rate at `t`.
    #[must_use]
    pub fn hazard_rate(&self, t: f64) -> f64 {
        self.0.forward_rate(t)
    }

    /// Average hazard rate from the valuation time to `t`.
    #[must_use]
    pub fn average_hazard_rate(&self, t: f64) -> f64 {
        self.0.zero_rate(t)
    }

    /// Rebases the curve to a valuation time `offset` years later.
    pub fn with_offset(&self, offset: f64) -> CurveResult<Self> {
        self.0.with_offset(offset).map(Self)
    }

    /// Returns a copy with the average hazard rate of knot `index` replaced.
    pub fn with_rate(&self, rate: f64, index: usize) -> CurveResult<Self> {
        self.0.with_rate(rate, index).map(Self)
    }

    /// Returns a curve on the same knot times with new average hazard rates.
    pub fn with_rates(&self, rates: Vec<f64>) -> CurveResult<Self> {
        self.0.with_rates(rates).map(Self)
    }
}

impl From<IsdaCurve> for IsdaCreditCurve {
    fn from(curve: IsdaCurve) -> Self {
        Self(curve)
    }
}

impl Deref for IsdaCreditCurve {
    type Target = IsdaCurve;

    fn deref(&self) -> &IsdaCurve {
        &self.0
    }
}

impl Curve for IsdaCreditCurve {
    fn knot_times(&self) -> &[f64] {
        self.0.times()
    }

    fn rt(&self, t: f64) -> f64 {
        self.0.rt(t)
    }
}

impl sealed::Sealed for IsdaCreditCurve {
    fn isda_curve_mut(&mut self) -> &mut IsdaCurve {
        &mut self.0
    }
}
