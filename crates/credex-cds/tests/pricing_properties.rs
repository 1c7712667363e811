//! Property-based tests for pricing invariants.
//!
//! - The protection leg grows with the hazard rate
//! - A CDS priced at its par spread has zero clean PV
//! - Quoted spread and points upfront convert back and forth
//! - The term-structure pricer agrees with the single-CDS pricer

use credex_cds::prelude::*;
use proptest::prelude::*;

// =============================================================================
// GENERATORS
// =============================================================================

fn yield_curve() -> impl Strategy<Value = IsdaYieldCurve> {
    prop::collection::vec(0.0_f64..0.06, 4).prop_map(|rates| {
        IsdaYieldCurve::new(vec![0.5, 2.0, 5.0, 10.0], rates).unwrap()
    })
}

fn credit_curve() -> impl Strategy<Value = IsdaCreditCurve> {
    prop::collection::vec(0.0005_f64..0.08, 3).prop_map(|hazards| {
        IsdaCreditCurve::new(vec![1.0, 4.0, 8.0], hazards).unwrap()
    })
}

fn formula() -> impl Strategy<Value = AccrualOnDefaultFormula> {
    prop_oneof![
        Just(AccrualOnDefaultFormula::OriginalIsda),
        Just(AccrualOnDefaultFormula::MarkitFix),
        Just(AccrualOnDefaultFormula::Correct),
    ]
}

/// Terms starting up to a quarter in the past with maturity up to 10Y.
fn terms() -> impl Strategy<Value = CdsTerms> {
    (0.0_f64..0.25, 1_u32..40, 0.0_f64..0.8).prop_map(|(age, quarters, recovery)| {
        CdsTerms::new(-age, f64::from(quarters) * 0.25).with_recovery_rate(recovery)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn protection_grows_with_hazard(
        terms in terms(),
        yc in yield_curve(),
        h in 0.001_f64..0.2,
        dh in 0.001_f64..0.05,
    ) {
        let cds = terms.to_analytic().unwrap();
        let pricer = AnalyticCdsPricer::default();
        let low = IsdaCreditCurve::flat(h).unwrap();
        let high = IsdaCreditCurve::flat(h + dh).unwrap();
        let p_low = pricer.protection_leg(&cds, &yc, &low).unwrap();
        let p_high = pricer.protection_leg(&cds, &yc, &high).unwrap();
        prop_assert!(p_high > p_low);
    }

    #[test]
    fn par_spread_prices_to_zero(
        terms in terms(),
        yc in yield_curve(),
        cc in credit_curve(),
        formula in formula(),
    ) {
        let cds = terms.to_analytic().unwrap();
        let pricer = AnalyticCdsPricer::new(formula);
        let spread = pricer.par_spread(&cds, &yc, &cc).unwrap();
        prop_assert!(spread > 0.0);
        let pv = pricer.pv(&cds, &yc, &cc, spread, PriceType::Clean).unwrap();
        prop_assert!(pv.abs() < 1e-14);
    }

    #[test]
    fn quoted_spread_round_trips(
        yc in yield_curve(),
        quarters in 4_u32..40,
        coupon in prop_oneof![Just(0.01), Just(0.05)],
        quoted in 0.0005_f64..0.1,
    ) {
        let cds = CdsTerms::new(-0.1, f64::from(quarters) * 0.25).to_analytic().unwrap();
        let converter = MarketQuoteConverter::default();
        let puf = converter.quoted_spread_to_puf(&cds, coupon, quoted, &yc).unwrap();
        let back = converter.puf_to_quoted_spread(&cds, coupon, puf, &yc).unwrap();
        prop_assert!((back - quoted).abs() < 1e-9);
    }

    #[test]
    fn term_structure_agrees_with_single(
        yc in yield_curve(),
        cc in credit_curve(),
        age in 0.0_f64..0.25,
        steps in prop::collection::vec(1_u32..8, 1..6),
        formula in formula(),
    ) {
        let mut indices = Vec::with_capacity(steps.len());
        let mut k = 0;
        for s in steps {
            k += s;
            indices.push(k);
        }
        let terms = MultiCdsTerms::new(-age, 0.0, indices);
        let multi = terms.to_analytic().unwrap();
        let single = AnalyticCdsPricer::new(formula);
        let spreads = MultiAnalyticCdsPricer::new(formula)
            .par_spreads(&multi, &yc, &cc)
            .unwrap();
        for (i, s) in spreads.iter().enumerate() {
            let cds = terms.terms(i).unwrap().to_analytic().unwrap();
            let expected = single.par_spread(&cds, &yc, &cc).unwrap();
            prop_assert!((s - expected).abs() < 1e-12);
        }
    }
}
