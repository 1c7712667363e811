//! Property-based tests for curve invariants.
//!
//! These tests verify properties that must hold for any valid knot set:
//! - Zero rates round-trip exactly at the knots
//! - `rt` is linear between knots and node sensitivities sum to one
//! - Extrapolation continues the last segment
//! - Rebasing preserves discount-factor ratios

use credex_curves::prelude::*;
use proptest::prelude::*;

// =============================================================================
// GENERATORS
// =============================================================================

/// Knot times built from positive increments, with zero rates implied by
/// forward rates in [-1%, 15%] so that long extrapolation stays bounded.
fn knots() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    prop::collection::vec((0.05_f64..3.0, -0.01_f64..0.15), 1..8).prop_map(|pairs| {
        let mut t = 0.0;
        let mut rt = 0.0;
        let mut times = Vec::with_capacity(pairs.len());
        let mut rates = Vec::with_capacity(pairs.len());
        for (dt, fwd) in pairs {
            t += dt;
            rt += fwd * dt;
            times.push(t);
            rates.push(rt / t);
        }
        (times, rates)
    })
}

proptest! {
    #[test]
    fn zero_rate_round_trips_at_knots((times, rates) in knots()) {
        let curve = IsdaCurve::new(times.clone(), rates.clone()).unwrap();
        for (t, r) in times.iter().zip(&rates) {
            prop_assert_eq!(curve.zero_rate(*t), *r);
        }
    }

    #[test]
    fn interpolation_is_linear_in_rt((times, rates) in knots(), frac in 0.01_f64..0.99) {
        let curve = IsdaCurve::new(times.clone(), rates).unwrap();
        for i in 1..times.len() {
            let (t1, t2) = (times[i - 1], times[i]);
            let t = t1 + frac * (t2 - t1);
            let (rt1, rt2) = (curve.rt_values()[i - 1], curve.rt_values()[i]);
            let expected = rt1 + frac * (rt2 - rt1);
            prop_assert!((curve.rt(t) - expected).abs() < 1e-12);

            let sense = curve.node_sensitivity(t);
            prop_assert!((sense.iter().sum::<f64>() - 1.0).abs() < 1e-12);
            for (j, w) in sense.iter().enumerate() {
                if j != i - 1 && j != i {
                    prop_assert_eq!(*w, 0.0);
                }
            }
        }
    }

    #[test]
    fn extrapolation_continues_last_segment((times, rates) in knots(), dt in 0.0_f64..20.0) {
        let curve = IsdaCurve::new(times.clone(), rates).unwrap();
        let last = times[times.len() - 1];
        let fwd = curve.forward_rate(last);
        let expected = curve.rt(last) + fwd * dt;
        prop_assert!((curve.rt(last + dt) - expected).abs() < 1e-11);
    }

    #[test]
    fn rebasing_preserves_discount_ratios(
        (times, rates) in knots(),
        offset_frac in 0.0_f64..1.5,
        t in 0.0_f64..25.0,
    ) {
        let curve = IsdaCurve::new(times.clone(), rates).unwrap();
        let offset = offset_frac * times[times.len() - 1];
        let shifted = curve.with_offset(offset).unwrap();
        let expected = curve.discount_factor(t + offset) / curve.discount_factor(offset);
        prop_assert!((shifted.discount_factor(t) - expected).abs() < 1e-10);
    }

    #[test]
    fn rt_sensitivity_is_exact_derivative((times, rates) in knots(), t in 0.0_f64..25.0) {
        let curve = IsdaCurve::new(times, rates.clone()).unwrap();
        let bump = 1e-6;
        for (i, r) in rates.iter().enumerate() {
            let up = curve.with_rate(r + bump, i).unwrap();
            let down = curve.with_rate(r - bump, i).unwrap();
            let fd = (up.rt(t) - down.rt(t)) / (2.0 * bump);
            let analytic = curve.single_node_rt_sensitivity(t, i).unwrap();
            prop_assert!((analytic - fd).abs() < 1e-6 * (1.0 + analytic.abs()));
        }
    }

    #[test]
    fn integration_points_are_strictly_ascending(
        (ta, _) in knots(),
        (tb, _) in knots(),
        start in 0.0_f64..2.0,
        len in 0.01_f64..10.0,
    ) {
        let end = start + len;
        let points = integration_points(start, end, &ta, &tb).unwrap();
        prop_assert_eq!(points[0], start);
        prop_assert_eq!(points[points.len() - 1], end);
        for w in points.windows(2) {
            prop_assert!(w[1] > w[0]);
        }
        for t in ta.iter().chain(&tb) {
            if *t > start + 1e-10 && *t < end - 1e-10 {
                prop_assert!(points.iter().any(|p| (p - t).abs() <= 1e-10));
            }
        }
    }
}
