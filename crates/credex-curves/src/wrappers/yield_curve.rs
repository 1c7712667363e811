//! Yield curve wrapper.

use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::builder::sealed;
use crate::error::CurveResult;
use crate::isda_curve::IsdaCurve;
use crate::traits::Curve;

/// An ISDA yield curve: `rt(t)` is minus the log discount factor.
///
/// # Example
///
/// ```rust
/// use credex_curves::IsdaYieldCurve;
///
/// let yc = IsdaYieldCurve::new(vec![0.5, 1.0, 5.0], vec![0.01, 0.015, 0.02]).unwrap();
/// let df = yc.discount_factor(5.0);
/// assert!((df - (-0.1_f64).exp()).abs() < 1e-15);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IsdaYieldCurve(IsdaCurve);

impl IsdaYieldCurve {
    /// Creates a yield curve from knot times and zero rates.
    pub fn new(times: Vec<f64>, rates: Vec<f64>) -> CurveResult<Self> {
        IsdaCurve::new(times, rates).map(Self)
    }

    /// Creates a flat yield curve.
    pub fn flat(rate: f64) -> CurveResult<Self> {
        IsdaCurve::flat(rate).map(Self)
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

    /// Rebases the curve to a valuation time `offset` years later.
    pub fn with_offset(&self, offset: f64) -> CurveResult<Self> {
        self.0.with_offset(offset).map(Self)
    }

    /// Returns a copy with the zero rate of knot `index` replaced.
    pub fn with_rate(&self, rate: f64, index: usize) -> CurveResult<Self> {
        self.0.with_rate(rate, index).map(Self)
    }

    /// Continuously compounded forward rate between `t1` and `t2`.
    #[must_use]
    pub fn forward_rate_between(&self, t1: f64, t2: f64) -> f64 {
        if t2 <= t1 {
            return self.0.forward_rate(t1);
        }
        (self.0.rt(t2) - self.0.rt(t1)) / (t2 - t1)
    }
}

impl From<IsdaCurve> for IsdaYieldCurve {
    fn from(curve: IsdaCurve) -> Self {
        Self(curve)
    }
}

impl Deref for IsdaYieldCurve {
    type Target = IsdaCurve;

    fn deref(&self) -> &IsdaCurve {
        &self.0
    }
}

impl Curve for IsdaYieldCurve {
    fn knot_times(&self) -> &[f64] {
        self.0.times()
    }

    fn rt(&self, t: f64) -> f64 {
        self.0.rt(t)
    }
}

impl sealed::Sealed for IsdaYieldCurve {
    fn isda_curve_mut(&mut self) -> &mut IsdaCurve {
        &mut self.0
    }
}
