//! The ISDA piecewise-linear-in-`rt` curve.
//!
//! A curve is a set of knots `(t[i], rt[i])` with `rt[i] = r[i] * t[i]`.
//! Between knots `rt` is linear in `t`, so discount factors are piecewise
//! exponential and every leg integral has a closed form on each segment.
//!
//! # Interpolation Rules
//!
//! ```text
//! t <= t[0]            rt(t) = rt[0] * t / t[0]           (flat zero rate from the origin)
//! t[i-1] < t <= t[i]   rt(t) linear between rt[i-1] and rt[i]
//! t > t[n-1]           rt(t) continues the last segment  (flat if n = 1)
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{validate_knots, CurveError, CurveResult};
use crate::traits::Curve;

/// Where a time sits relative to the knots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Location {
    /// At or before the first knot, or anywhere on a single-knot curve.
    Front,
    /// Exactly on knot `i`, with `i >= 1`.
    Knot(usize),
    /// Inside the segment ending at knot `i`, or past the last knot with
    /// `i = n - 1`.
    Segment(usize),
}

/// Serialized form: the knot times and the matching `rt` values.
#[derive(Serialize, Deserialize)]
struct CurveRepr {
    t: Vec<f64>,
    rt: Vec<f64>,
}

/// A yield or hazard-rate curve in the ISDA standard model.
///
/// The curve is an immutable value. Operations that change knots return a
/// new curve; in-place node replacement is reserved for
/// [`IsdaCurveBuilder`](crate::IsdaCurveBuilder).
///
/// # Example
///
/// ```rust
/// use credex_curves::IsdaCurve;
///
/// let curve = IsdaCurve::new(vec![1.0, 2.0, 5.0], vec![0.01, 0.015, 0.02]).unwrap();
///
/// assert_eq!(curve.zero_rate(2.0), 0.015);
/// assert!((curve.rt(1.5) - 0.5 * (0.01 + 0.03)).abs() < 1e-15);
/// assert!((curve.discount_factor(5.0) - (-0.1_f64).exp()).abs() < 1e-15);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CurveRepr", into = "CurveRepr")]
pub struct IsdaCurve {
    t: Vec<f64>,
    rt: Vec<f64>,
    r: Vec<f64>,
}

impl IsdaCurve {
    /// Creates a curve from knot times and continuously compounded zero rates.
    ///
    /// # Errors
    ///
    /// Returns an error if the inputs are empty, of different lengths, not
    /// finite, or if the times are not strictly ascending from `t >= 0`.
    pub fn new(times: Vec<f64>, rates: Vec<f64>) -> CurveResult<Self> {
        validate_knots(&times, &rates, "zero rate")?;
        let rt = times.iter().zip(&rates).map(|(t, r)| t * r).collect();
        Ok(Self {
            t: times,
            rt,
            r: rates,
        })
    }

    /// Creates a curve from knot times and `rt` values.
    ///
    /// When the first knot sits at `t = 0` its `rt` must be zero, and the
    /// zero rate there is taken as the limit from the right.
    pub fn from_rt(times: Vec<f64>, rt: Vec<f64>) -> CurveResult<Self> {
        validate_knots(&times, &rt, "rt")?;
        let mut r: Vec<f64> = times
            .iter()
            .zip(&rt)
            .map(|(&t, &rt)| if t > 0.0 { rt / t } else { 0.0 })
            .collect();
        if times[0] == 0.0 {
            if rt[0] != 0.0 {
                return Err(CurveError::invalid_input(format!(
                    "rt at t = 0 must be zero, got {}",
                    rt[0]
                )));
            }
            if times.len() > 1 {
                r[0] = r[1];
            }
        }
        Ok(Self { t: times, rt, r })
    }

    /// Creates a curve from piecewise-constant forward rates.
    ///
    /// `forwards[0]` applies on `[0, t[0]]` and `forwards[i]` on
    /// `(t[i-1], t[i]]`.
    pub fn from_forward_rates(times: Vec<f64>, forwards: &[f64]) -> CurveResult<Self> {
        validate_knots(&times, forwards, "forward rate")?;
        let mut rt = Vec::with_capacity(times.len());
        let mut acc = forwards[0] * times[0];
        rt.push(acc);
        for i in 1..times.len() {
            acc += forwards[i] * (times[i] - times[i - 1]);
            rt.push(acc);
        }
        Self::from_rt(times, rt)
    }

    /// Creates a flat curve: a single knot at `t = 1`.
    pub fn flat(rate: f64) -> CurveResult<Self> {
        Self::new(vec![1.0], vec![rate])
    }

    /// Number of knots.
    #[must_use]
    pub fn num_knots(&self) -> usize {
        self.t.len()
    }

    /// Knot times.
    #[must_use]
    pub fn times(&self) -> &[f64] {
        &self.t
    }

    /// `rt` values at the knots.
    #[must_use]
    pub fn rt_values(&self) -> &[f64] {
        &self.rt
    }

    /// Zero rates at the knots.
    #[must_use]
    pub fn zero_rates(&self) -> &[f64] {
        &self.r
    }

    /// Time of knot `index`.
    #[must_use]
    pub fn knot_time(&self, index: usize) -> Option<f64> {
        self.t.get(index).copied()
    }

    /// Zero rate of knot `index`.
    #[must_use]
    pub fn knot_zero_rate(&self, index: usize) -> Option<f64> {
        self.r.get(index).copied()
    }

    /// `rt` of knot `index`.
    #[must_use]
    pub fn knot_rt(&self, index: usize) -> Option<f64> {
        self.rt.get(index).copied()
    }

    #[allow(clippy::float_cmp)]
    fn locate(&self, t: f64) -> Location {
        let n = self.t.len();
        if n == 1 || t <= self.t[0] {
            return Location::Front;
        }
        let index = self.t.partition_point(|&knot| knot < t);
        if index == n {
            Location::Segment(n - 1)
        } else if self.t[index] == t {
            Location::Knot(index)
        } else {
            Location::Segment(index)
        }
    }

    fn front_rt(&self, t: f64) -> f64 {
        if self.t[0] > 0.0 {
            self.rt[0] * t / self.t[0]
        } else {
            self.r[0] * t
        }
    }

    fn segment_rt(&self, i: usize, t: f64) -> f64 {
        let (t1, t2) = (self.t[i - 1], self.t[i]);
        ((t2 - t) * self.rt[i - 1] + (t - t1) * self.rt[i]) / (t2 - t1)
    }

    fn segment_forward(&self, i: usize) -> f64 {
        (self.rt[i] - self.rt[i - 1]) / (self.t[i] - self.t[i - 1])
    }

    /// Returns `rt(t)`, the zero rate times `t`.
    ///
    /// Runs in `O(log n)`.
    #[must_use]
    pub fn rt(&self, t: f64) -> f64 {
        match self.locate(t) {
            Location::Front => self.front_rt(t),
            Location::Knot(i) => self.rt[i],
            Location::Segment(i) => self.segment_rt(i, t),
        }
    }

    /// Returns the continuously compounded zero rate at `t`.
    ///
    /// At or before the first knot this is the first knot's zero rate,
    /// including at `t = 0`.
    #[must_use]
    pub fn zero_rate(&self, t: f64) -> f64 {
        match self.locate(t) {
            Location::Front => self.r[0],
            Location::Knot(i) => self.r[i],
            Location::Segment(i) => self.segment_rt(i, t) / t,
        }
    }

    /// Returns the discount factor `exp(-rt(t))`.
    #[must_use]
    pub fn discount_factor(&self, t: f64) -> f64 {
        (-self.rt(t)).exp()
    }

    /// Returns the instantaneous forward rate at `t`.
    ///
    /// This is the slope of `rt` on the segment containing `t`. At a knot
    /// the segment ending at that knot is used.
    #[must_use]
    pub fn forward_rate(&self, t: f64) -> f64 {
        match self.locate(t) {
            Location::Front => self.r[0],
            Location::Knot(i) | Location::Segment(i) => self.segment_forward(i),
        }
    }

    fn check_index(&self, index: usize) -> CurveResult<()> {
        if index < self.t.len() {
            Ok(())
        } else {
            Err(CurveError::index_out_of_range(index, self.t.len()))
        }
    }

    /// Sensitivity of the zero rate at `t` to each knot's zero rate.
    ///
    /// At most two entries are non-zero and they sum to one.
    #[must_use]
    pub fn node_sensitivity(&self, t: f64) -> Vec<f64> {
        let mut weights = vec![0.0; self.t.len()];
        match self.locate(t) {
            Location::Front => weights[0] = 1.0,
            Location::Knot(i) => weights[i] = 1.0,
            Location::Segment(i) => {
                let (t1, t2) = (self.t[i - 1], self.t[i]);
                let denom = (t2 - t1) * t;
                weights[i - 1] = t1 * (t2 - t) / denom;
                weights[i] = t2 * (t - t1) / denom;
            }
        }
        weights
    }

    /// Sensitivity of the zero rate at `t` to the zero rate of knot `index`.
    pub fn single_node_sensitivity(&self, t: f64, index: usize) -> CurveResult<f64> {
        self.check_index(index)?;
        if t <= 0.0 {
            return Ok(if index == 0 { 1.0 } else { 0.0 });
        }
        Ok(self.rt_weight(t, index) / t)
    }

    /// Sensitivity of `rt(t)` to the zero rate of knot `index`.
    pub fn single_node_rt_sensitivity(&self, t: f64, index: usize) -> CurveResult<f64> {
        self.check_index(index)?;
        Ok(self.rt_weight(t, index))
    }

    /// Sensitivity of `DF(t)` to the zero rate of knot `index`.
    pub fn single_node_discount_factor_sensitivity(
        &self,
        t: f64,
        index: usize,
    ) -> CurveResult<f64> {
        let (rt, sense) = self.rt_and_sensitivity(t, index)?;
        Ok(-sense * (-rt).exp())
    }

    /// Returns `rt(t)` together with its sensitivity to knot `index`.
    pub fn rt_and_sensitivity(&self, t: f64, index: usize) -> CurveResult<(f64, f64)> {
        self.check_index(index)?;
        let location = self.locate(t);
        let rt = match location {
            Location::Front => self.front_rt(t),
            Location::Knot(i) => self.rt[i],
            Location::Segment(i) => self.segment_rt(i, t),
        };
        Ok((rt, self.rt_weight_at(location, t, index)))
    }

    fn rt_weight(&self, t: f64, index: usize) -> f64 {
        self.rt_weight_at(self.locate(t), t, index)
    }

    fn rt_weight_at(&self, location: Location, t: f64, index: usize) -> f64 {
        match location {
            Location::Front => {
                if index == 0 {
                    t
                } else {
                    0.0
                }
            }
            Location::Knot(i) => {
                if index == i {
                    t
                } else {
                    0.0
                }
            }
            Location::Segment(i) => {
                let (t1, t2) = (self.t[i - 1], self.t[i]);
                if index == i - 1 {
                    t1 * (t2 - t) / (t2 - t1)
                } else if index == i {
                    t2 * (t - t1) / (t2 - t1)
                } else {
                    0.0
                }
            }
        }
    }

    /// Returns a copy with the zero rate of knot `index` replaced.
    pub fn with_rate(&self, rate: f64, index: usize) -> CurveResult<Self> {
        let mut curve = self.clone();
        curve.set_rate(index, rate)?;
        Ok(curve)
    }

    /// Returns a curve on the same knot times with new zero rates.
    pub fn with_rates(&self, rates: Vec<f64>) -> CurveResult<Self> {
        Self::new(self.t.clone(), rates)
    }

    /// Returns a copy with the discount factor at knot `index` replaced.
    pub fn with_discount_factor(&self, discount_factor: f64, index: usize) -> CurveResult<Self> {
        self.check_index(index)?;
        if discount_factor <= 0.0 || !discount_factor.is_finite() {
            return Err(CurveError::invalid_input(format!(
                "discount factor must be positive, got {discount_factor}"
            )));
        }
        let t = self.t[index];
        if t == 0.0 {
            return Err(CurveError::invalid_input(
                "cannot set a discount factor on a knot at t = 0",
            ));
        }
        self.with_rate(-discount_factor.ln() / t, index)
    }

    /// Rebases the curve to a valuation time `offset` years later.
    ///
    /// The result satisfies `DF'(t) = DF(t + offset) / DF(offset)` for all
    /// `t >= 0`. Knots at or before `offset` are dropped; if none remain the
    /// curve collapses to a single knot at `t = 1` carrying the final
    /// forward rate.
    ///
    /// # Errors
    ///
    /// Returns an error for a negative or non-finite offset.
    pub fn with_offset(&self, offset: f64) -> CurveResult<Self> {
        if offset < 0.0 || !offset.is_finite() {
            return Err(CurveError::invalid_input(format!(
                "offset must be finite and non-negative, got {offset}"
            )));
        }
        if offset == 0.0 {
            return Ok(self.clone());
        }

        let n = self.t.len();
        if offset < self.t[0] {
            let eta = self.r[0] * offset;
            let t = self.t.iter().map(|t| t - offset).collect();
            let rt = self.rt.iter().map(|rt| rt - eta).collect();
            return Self::from_rt(t, rt);
        }
        if offset >= self.t[n - 1] {
            return Self::flat(self.forward_rate(offset));
        }

        let first = self.t.partition_point(|&knot| knot <= offset);
        let eta = self.rt(offset);
        let t = self.t[first..].iter().map(|t| t - offset).collect();
        let rt = self.rt[first..].iter().map(|rt| rt - eta).collect();
        Self::from_rt(t, rt)
    }

    /// Replaces the zero rate of knot `index` in place.
    pub(crate) fn set_rate(&mut self, index: usize, rate: f64) -> CurveResult<()> {
        self.check_index(index)?;
        if !rate.is_finite() {
            return Err(CurveError::NonFinite {
                what: "zero rate",
                index,
            });
        }
        self.r[index] = rate;
        self.rt[index] = rate * self.t[index];
        Ok(())
    }
}

impl Curve for IsdaCurve {
    fn knot_times(&self) -> &[f64] {
        &self.t
    }

    fn rt(&self, t: f64) -> f64 {
        IsdaCurve::rt(self, t)
    }
}

impl TryFrom<CurveRepr> for IsdaCurve {
    type Error = CurveError;

    fn try_from(repr: CurveRepr) -> CurveResult<Self> {
        Self::from_rt(repr.t, repr.rt)
    }
}

impl From<IsdaCurve> for CurveRepr {
    fn from(curve: IsdaCurve) -> Self {
        Self {
            t: curve.t,
            rt: curve.rt,
        }
    }
}
