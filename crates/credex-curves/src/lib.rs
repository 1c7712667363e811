//! # Credex Curves
//!
//! ISDA-compliant term structures for the Credex CDS analytics library.
//!
//! This crate provides:
//!
//! - **Curve Trait**: [`Curve`], the `rt(t)` view shared by yield and credit curves
//! - **IsdaCurve**: Piecewise-linear-in-`rt` knots with node sensitivities and rebasing
//! - **Wrappers**: [`IsdaYieldCurve`] and [`IsdaCreditCurve`] with domain vocabulary
//! - **Builder**: [`IsdaCurveBuilder`], the only place where nodes change in place
//! - **Schedule**: Integration points across the knots of two curves
//!
//! ## Quick Start
//!
//! ```rust
//! use credex_curves::prelude::*;
//!
//! let yc = IsdaYieldCurve::new(vec![0.5, 1.0, 5.0, 10.0], vec![0.02, 0.021, 0.024, 0.026]).unwrap();
//! let cc = IsdaCreditCurve::flat(0.01).unwrap();
//!
//! // Risky discount factor at 3Y
//! let b = yc.discount_factor(3.0) * cc.survival_probability(3.0);
//! assert!(b < yc.discount_factor(3.0));
//!
//! // Points at which the leg integrands change exponent
//! let points = curve_integration_points(0.0, 5.0, &yc, &cc).unwrap();
//! assert_eq!(points, vec![0.0, 0.5, 1.0, 5.0]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::float_cmp)]
#![allow(clippy::many_single_char_names)]

pub mod builder;
pub mod error;
pub mod isda_curve;
pub mod schedule;
pub mod traits;
pub mod wrappers;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::builder::{IsdaCurveBuilder, NodeCurve};
    pub use crate::error::{CurveError, CurveResult};
    pub use crate::isda_curve::IsdaCurve;
    pub use crate::schedule::{
        curve_integration_points, integration_points, merge_knots, truncate_inclusive,
    };
    pub use crate::traits::Curve;
    pub use crate::wrappers::{IsdaCreditCurve, IsdaYieldCurve};
}

pub use builder::{IsdaCurveBuilder, NodeCurve};
pub use error::{CurveError, CurveResult};
pub use isda_curve::IsdaCurve;
pub use traits::Curve;
pub use wrappers::{IsdaCreditCurve, IsdaYieldCurve};
