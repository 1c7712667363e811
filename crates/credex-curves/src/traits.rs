//! Core trait for ISDA term structures.
//!
//! Both yield and credit curves in the ISDA model are described by the same
//! quantity: `rt(t)`, the integrated rate from the valuation time to `t`.
//! The leg integrals only ever need `rt` at integration points, together with
//! the knot times where `rt` changes slope.

/// A term structure described by its integrated rate `rt(t)`.
///
/// # Example
///
/// ```rust
/// use credex_curves::{Curve, IsdaCurve};
///
/// fn risky_discount<Y: Curve, C: Curve>(yc: &Y, cc: &C, t: f64) -> f64 {
///     (-(yc.rt(t) + cc.rt(t))).exp()
/// }
///
/// let yc = IsdaCurve::flat(0.02).unwrap();
/// let cc = IsdaCurve::flat(0.01).unwrap();
/// assert!((risky_discount(&yc, &cc, 5.0) - (-0.15_f64).exp()).abs() < 1e-15);
/// ```
pub trait Curve: Send + Sync {
    /// Returns the knot times, strictly ascending.
    fn knot_times(&self) -> &[f64];

    /// Returns `rt(t)`, the zero rate times `t`.
    ///
    /// Equals `-ln(DF(t))` for a yield curve and `-ln(Q(t))` for a credit
    /// curve.
    fn rt(&self, t: f64) -> f64;

    /// Returns `exp(-rt(t))`.
    fn discount_factor(&self, t: f64) -> f64 {
        (-self.rt(t)).exp()
    }
}
