//! Property-based tests for the epsilon family.
//!
//! The pricers rely on these functions being smooth and positive over the
//! whole range of segment exponents that realistic curves produce.

use credex_math::epsilon::{epsilon, epsilon_p, epsilon_pp};
use proptest::prelude::*;

proptest! {
    #[test]
    fn epsilon_is_positive_and_increasing(x in -50.0_f64..50.0, dx in 1e-6_f64..1.0) {
        prop_assert!(epsilon(x) > 0.0);
        prop_assert!(epsilon(x + dx) > epsilon(x));
    }

    #[test]
    fn derivatives_are_positive(x in -50.0_f64..50.0) {
        prop_assert!(epsilon_p(x) > 0.0);
        prop_assert!(epsilon_pp(x) > 0.0);
    }

    #[test]
    fn epsilon_p_matches_central_difference(x in -5.0_f64..5.0) {
        let h = 1e-5;
        let numeric = (epsilon(x + h) - epsilon(x - h)) / (2.0 * h);
        prop_assert!((epsilon_p(x) - numeric).abs() < 1e-7 * (1.0 + numeric.abs()));
    }

    #[test]
    fn epsilon_pp_matches_central_difference(x in -5.0_f64..5.0) {
        let h = 1e-4;
        let numeric = (epsilon_p(x + h) - epsilon_p(x - h)) / (2.0 * h);
        prop_assert!((epsilon_pp(x) - numeric).abs() < 1e-6 * (1.0 + numeric.abs()));
    }

    #[test]
    fn leg_integral_identity(x in 1e-8_f64..30.0) {
        // (1 - e^{-x}) / x = e^{-x} * epsilon(x) = epsilon(-x)
        let lhs = -(-x).exp_m1() / x;
        prop_assert!((epsilon(-x) - lhs).abs() < 1e-13 * lhs.max(1e-300));
    }
}
