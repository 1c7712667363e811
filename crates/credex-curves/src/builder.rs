//! Calibration-only curve builder.
//!
//! Curves are immutable values. A calibration loop, however, evaluates its
//! objective hundreds of times while changing one node at a time, and
//! allocating a fresh curve per evaluation is wasteful. [`IsdaCurveBuilder`]
//! owns a single working curve, exposes in-place node replacement, and hands
//! back the immutable curve once calibration is finished.
//!
//! The builder is a plain owned value with `&mut self` mutation, so it can
//! never be shared with a concurrent pricer.

use crate::error::CurveResult;
use crate::isda_curve::IsdaCurve;

pub(crate) mod sealed {
    use crate::isda_curve::IsdaCurve;

    /// Grants the builder write access to a curve's knots.
    pub trait Sealed {
        fn isda_curve_mut(&mut self) -> &mut IsdaCurve;
    }
}

/// A curve type whose nodes can be replaced by [`IsdaCurveBuilder`].
///
/// Implemented for [`IsdaCurve`], [`IsdaYieldCurve`](crate::IsdaYieldCurve)
/// and [`IsdaCreditCurve`](crate::IsdaCreditCurve). The trait is sealed.
pub trait NodeCurve: sealed::Sealed + Clone {}

impl<T: sealed::Sealed + Clone> NodeCurve for T {}

impl sealed::Sealed for IsdaCurve {
    fn isda_curve_mut(&mut self) -> &mut IsdaCurve {
        self
    }
}

/// Owns a working curve during calibration.
///
/// # Example
///
/// ```rust
/// use credex_curves::{IsdaCreditCurve, IsdaCurveBuilder};
///
/// let seed = IsdaCreditCurve::new(vec![1.0, 3.0, 5.0], vec![0.01; 3]).unwrap();
/// let mut builder = IsdaCurveBuilder::new(seed);
///
/// builder.replace_node(1, 0.015).unwrap();
/// assert_eq!(builder.curve().average_hazard_rate(3.0), 0.015);
///
/// let calibrated: IsdaCreditCurve = builder.build();
/// assert_eq!(calibrated.zero_rates(), &[0.01, 0.015, 0.01]);
/// ```
#[derive(Debug, Clone)]
pub struct IsdaCurveBuilder<C: NodeCurve = IsdaCurve> {
    curve: C,
}

impl<C: NodeCurve> IsdaCurveBuilder<C> {
    /// Starts from a seed curve.
    #[must_use]
    pub fn new(seed: C) -> Self {
        Self { curve: seed }
    }

    /// Replaces the zero rate of node `index` in place.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range or `rate` is not finite.
    pub fn replace_node(&mut self, index: usize, rate: f64) -> CurveResult<()> {
        self.curve.isda_curve_mut().set_rate(index, rate)
    }

    /// The current working curve.
    #[must_use]
    pub fn curve(&self) -> &C {
        &self.curve
    }

    /// Finishes calibration and returns the immutable curve.
    #[must_use]
    pub fn build(self) -> C {
        self.curve
    }
}

impl IsdaCurveBuilder<IsdaCurve> {
    /// Starts from knot times and zero rates.
    pub fn from_knots(times: Vec<f64>, rates: Vec<f64>) -> CurveResult<Self> {
        IsdaCurve::new(times, rates).map(Self::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CurveError;
    use approx::assert_relative_eq;

    #[test]
    fn test_replace_node_updates_rt() {
        let mut builder = IsdaCurveBuilder::from_knots(vec![1.0, 2.0, 4.0], vec![0.01; 3]).unwrap();
        builder.replace_node(2, 0.03).unwrap();

        let curve = builder.curve();
        assert_relative_eq!(curve.rt(4.0), 0.12, epsilon = 1e-15);
        // Earlier knots are untouched
        assert_relative_eq!(curve.rt(2.0), 0.02, epsilon = 1e-15);
        assert_relative_eq!(curve.rt(3.0), 0.07, epsilon = 1e-15);
    }

    #[test]
    fn test_replace_node_matches_with_rate() {
        let seed = IsdaCurve::new(vec![0.5, 1.0, 2.0], vec![0.02, 0.025, 0.03]).unwrap();
        let expected = seed.with_rate(0.04, 1).unwrap();

        let mut builder = IsdaCurveBuilder::new(seed);
        builder.replace_node(1, 0.04).unwrap();

        assert_eq!(builder.build(), expected);
    }

    #[test]
    fn test_replace_node_errors() {
        let mut builder = IsdaCurveBuilder::from_knots(vec![1.0], vec![0.01]).unwrap();
        assert_eq!(
            builder.replace_node(1, 0.02),
            Err(CurveError::index_out_of_range(1, 1))
        );
        assert!(builder.replace_node(0, f64::NAN).is_err());
        assert_eq!(builder.curve().zero_rates(), &[0.01]);
    }
}
