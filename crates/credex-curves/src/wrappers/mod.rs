//! Domain-specific curve wrappers.
//!
//! Yield and credit curves share one representation, [`IsdaCurve`], but the
//! pricers take them in a fixed order. These newtypes keep the two apart at
//! the type level and add the vocabulary of each domain:
//!
//! - [`IsdaYieldCurve`]: discount factors and zero rates
//! - [`IsdaCreditCurve`]: survival probabilities and hazard rates
//!
//! Both dereference to [`IsdaCurve`], so every curve query is available.
//!
//! [`IsdaCurve`]: crate::IsdaCurve

mod credit_curve;
mod yield_curve;

pub use credit_curve::IsdaCreditCurve;
pub use yield_curve::IsdaYieldCurve;
