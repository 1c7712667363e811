//! Batch pricing of independent CDS term structures.
//!
//! Each reference entity has its own credit curve and term structure while
//! the yield curve is shared. With the `parallel` feature the entities are
//! priced on the rayon thread pool; otherwise sequentially. Results come
//! back in input order, one `Result` per entity.

use credex_curves::prelude::*;

use crate::analytic::MultiCdsAnalytic;
use crate::error::{CdsError, CdsResult};
use crate::multi_pricer::MultiAnalyticCdsPricer;
use crate::pricer::PriceType;

fn check_lengths(multis: usize, curves: usize) -> CdsResult<()> {
    if multis == curves {
        Ok(())
    } else {
        Err(CdsError::invalid_input(format!(
            "{multis} term structures but {curves} credit curves"
        )))
    }
}

/// Batch term-structure pricer.
///
/// Prices many entities in parallel using rayon.
///
/// # Example
///
/// ```rust
/// use credex_cds::prelude::*;
///
/// let yc = IsdaYieldCurve::flat(0.02).unwrap();
/// let multi = MultiCdsTerms::new(0.0, 0.0, vec![4, 20]).to_analytic().unwrap();
/// let curves = vec![
///     IsdaCreditCurve::flat(0.01).unwrap(),
///     IsdaCreditCurve::flat(0.03).unwrap(),
/// ];
///
/// let batch = BatchCdsPricer::new(&yc, MultiAnalyticCdsPricer::default());
/// let spreads = batch
///     .par_spreads_batch(&[multi.clone(), multi], &curves)
///     .unwrap();
/// assert_eq!(spreads.len(), 2);
/// assert!(spreads[1].as_ref().unwrap()[1] > spreads[0].as_ref().unwrap()[1]);
/// ```
#[cfg(feature = "parallel")]
pub struct BatchCdsPricer<'a> {
    yc: &'a IsdaYieldCurve,
    pricer: MultiAnalyticCdsPricer,
}

#[cfg(feature = "parallel")]
impl<'a> BatchCdsPricer<'a> {
    /// Creates a batch pricer over a shared yield curve.
    pub fn new(yc: &'a IsdaYieldCurve, pricer: MultiAnalyticCdsPricer) -> Self {
        Self { yc, pricer }
    }

    /// Par spreads of every term structure, in parallel.
    ///
    /// # Errors
    ///
    /// Returns an error if `multis` and `credit_curves` differ in length.
    pub fn par_spreads_batch(
        &self,
        multis: &[MultiCdsAnalytic],
        credit_curves: &[IsdaCreditCurve],
    ) -> CdsResult<Vec<CdsResult<Vec<f64>>>> {
        use rayon::prelude::*;

        check_lengths(multis.len(), credit_curves.len())?;
        Ok(multis
            .par_iter()
            .zip(credit_curves.par_iter())
            .map(|(multi, cc)| self.pricer.par_spreads(multi, self.yc, cc))
            .collect())
    }

    /// PVs of every term structure at the given spreads, in parallel.
    ///
    /// # Errors
    ///
    /// Returns an error if the inputs differ in length.
    pub fn pv_batch(
        &self,
        multis: &[MultiCdsAnalytic],
        credit_curves: &[IsdaCreditCurve],
        spreads: &[Vec<f64>],
        price_type: PriceType,
    ) -> CdsResult<Vec<CdsResult<Vec<f64>>>> {
        use rayon::prelude::*;

        check_lengths(multis.len(), credit_curves.len())?;
        check_lengths(multis.len(), spreads.len())?;
        Ok(multis
            .par_iter()
            .zip(credit_curves.par_iter())
            .zip(spreads.par_iter())
            .map(|((multi, cc), s)| self.pricer.pv(multi, self.yc, cc, s, price_type))
            .collect())
    }
}

/// Batch term-structure pricer (non-parallel fallback).
#[cfg(not(feature = "parallel"))]
pub struct BatchCdsPricer<'a> {
    yc: &'a IsdaYieldCurve,
    pricer: MultiAnalyticCdsPricer,
}

#[cfg(not(feature = "parallel"))]
impl<'a> BatchCdsPricer<'a> {
    /// Creates a batch pricer over a shared yield curve.
    pub fn new(yc: &'a IsdaYieldCurve, pricer: MultiAnalyticCdsPricer) -> Self {
        Self { yc, pricer }
    }

    /// Par spreads of every term structure, sequentially.
    ///
    /// # Errors
    ///
    /// Returns an error if `multis` and `credit_curves` differ in length.
    pub fn par_spreads_batch(
        &self,
        multis: &[MultiCdsAnalytic],
        credit_curves: &[IsdaCreditCurve],
    ) -> CdsResult<Vec<CdsResult<Vec<f64>>>> {
        check_lengths(multis.len(), credit_curves.len())?;
        Ok(multis
            .iter()
            .zip(credit_curves.iter())
            .map(|(multi, cc)| self.pricer.par_spreads(multi, self.yc, cc))
            .collect())
    }

    /// PVs of every term structure at the given spreads, sequentially.
    ///
    /// # Errors
    ///
    /// Returns an error if the inputs differ in length.
    pub fn pv_batch(
        &self,
        multis: &[MultiCdsAnalytic],
        credit_curves: &[IsdaCreditCurve],
        spreads: &[Vec<f64>],
        price_type: PriceType,
    ) -> CdsResult<Vec<CdsResult<Vec<f64>>>> {
        check_lengths(multis.len(), credit_curves.len())?;
        check_lengths(multis.len(), spreads.len())?;
        Ok(multis
            .iter()
            .zip(credit_curves.iter())
            .zip(spreads.iter())
            .map(|((multi, cc), s)| self.pricer.pv(multi, self.yc, cc, s, price_type))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terms::MultiCdsTerms;
    use approx::assert_relative_eq;

    fn setup() -> (IsdaYieldCurve, Vec<MultiCdsAnalytic>, Vec<IsdaCreditCurve>) {
        let yc = IsdaYieldCurve::flat(0.02).unwrap();
        let multis = (0..4)
            .map(|i| {
                MultiCdsTerms::new(-0.05, 0.0, vec![2, 8 + i, 20])
                    .to_analytic()
                    .unwrap()
            })
            .collect();
        let curves = [0.005, 0.01, 0.02, 0.04]
            .iter()
            .map(|&h| IsdaCreditCurve::flat(h).unwrap())
            .collect();
        (yc, multis, curves)
    }

    #[test]
    fn test_matches_single_pricing() {
        let (yc, multis, curves) = setup();
        let pricer = MultiAnalyticCdsPricer::default();
        let batch = BatchCdsPricer::new(&yc, pricer);
        let results = batch.par_spreads_batch(&multis, &curves).unwrap();
        assert_eq!(results.len(), multis.len());
        for ((multi, cc), result) in multis.iter().zip(&curves).zip(results) {
            let expected = pricer.par_spreads(multi, &yc, cc).unwrap();
            for (a, b) in result.unwrap().iter().zip(&expected) {
                assert_relative_eq!(*a, *b, epsilon = 1e-15);
            }
        }
    }

    #[test]
    fn test_pv_at_par_is_zero() {
        let (yc, multis, curves) = setup();
        let batch = BatchCdsPricer::new(&yc, MultiAnalyticCdsPricer::default());
        let spreads: Vec<Vec<f64>> = batch
            .par_spreads_batch(&multis, &curves)
            .unwrap()
            .into_iter()
            .map(Result::unwrap)
            .collect();
        let pvs = batch
            .pv_batch(&multis, &curves, &spreads, PriceType::Clean)
            .unwrap();
        for pv in pvs {
            for v in pv.unwrap() {
                assert!(v.abs() < 1e-15);
            }
        }
    }

    #[test]
    fn test_length_mismatch() {
        let (yc, multis, curves) = setup();
        let batch = BatchCdsPricer::new(&yc, MultiAnalyticCdsPricer::default());
        assert!(batch.par_spreads_batch(&multis, &curves[..2]).is_err());
        assert!(batch
            .pv_batch(&multis, &curves, &[vec![0.01; 3]], PriceType::Dirty)
            .is_err());
    }

    #[test]
    fn test_per_entity_errors_are_kept() {
        let (yc, multis, curves) = setup();
        let batch = BatchCdsPricer::new(&yc, MultiAnalyticCdsPricer::default());
        let mut spreads = vec![vec![0.01; 3]; multis.len()];
        spreads[2] = vec![0.01];
        let pvs = batch
            .pv_batch(&multis, &curves, &spreads, PriceType::Dirty)
            .unwrap();
        assert!(pvs[0].is_ok());
        assert!(pvs[2].is_err());
    }
}
