//! Credit curve calibration.
//!
//! Bootstraps an [`IsdaCreditCurve`] from a term structure of CDS quotes.
//! The curve has one knot per instrument, at its protection end, and node
//! `i` is solved so that instrument `i` reprices to its quote while nodes
//! `0..i` stay frozen. Because `rt` is linear between knots, instrument `i`
//! only sees nodes `0..=i`, so each step is a one-dimensional root search.
//!
//! Two strategies implement [`CreditCurveCalibrator`]:
//!
//! - [`SimpleCreditCurveBuilder`]: bracket + Brent on every node
//! - [`FastCreditCurveBuilder`]: Newton with the analytic credit
//!   sensitivity, falling back to bracket + Brent

mod fast;
mod simple;

pub use fast::FastCreditCurveBuilder;
pub use simple::SimpleCreditCurveBuilder;

use credex_curves::prelude::*;
use credex_math::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::analytic::{CdsAnalytic, MultiCdsAnalytic};
use crate::error::{CdsError, CdsResult};
use crate::pricer::{AccrualOnDefaultFormula, AnalyticCdsPricer, PriceType};
use crate::quotes::{CdsQuoteConvention, MarketQuoteConverter};

/// Default root-finding tolerance for calibration.
pub const CALIBRATION_TOLERANCE: f64 = 1e-12;

/// Smallest hazard-rate guess used to start a bracket.
const MIN_GUESS: f64 = 1e-6;

/// Calibration strategy selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationMethod {
    /// Bracket and Brent on every node.
    #[default]
    Simple,
    /// Newton with analytic sensitivities, Brent as fallback.
    Fast,
}

impl std::fmt::Display for CalibrationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Simple => f.write_str("simple"),
            Self::Fast => f.write_str("fast"),
        }
    }
}

/// Calibrates a credit curve to CDS quotes.
///
/// `calibrate` is the only required method; the others reshape their
/// inputs and delegate to it.
pub trait CreditCurveCalibrator {
    /// Calibrates to instruments quoted as a running premium plus points
    /// upfront.
    ///
    /// # Arguments
    ///
    /// * `cds` - Instruments with ascending protection ends and a common
    ///   effective protection start
    /// * `premiums` - Running premium of each instrument
    /// * `points_upfront` - Upfront of each instrument, as a fraction of notional
    /// * `yc` - Yield curve
    ///
    /// # Errors
    ///
    /// Returns an error if the inputs are empty or inconsistent, an
    /// instrument is expired, or a node cannot be solved.
    fn calibrate(
        &self,
        cds: &[CdsAnalytic],
        premiums: &[f64],
        points_upfront: &[f64],
        yc: &IsdaYieldCurve,
    ) -> CdsResult<IsdaCreditCurve>;

    /// The pricer used for objectives and quote conversion.
    fn pricer(&self) -> AnalyticCdsPricer;

    /// Calibrates to par spreads.
    fn calibrate_par_spreads(
        &self,
        cds: &[CdsAnalytic],
        spreads: &[f64],
        yc: &IsdaYieldCurve,
    ) -> CdsResult<IsdaCreditCurve> {
        self.calibrate(cds, spreads, &vec![0.0; spreads.len()], yc)
    }

    /// Calibrates a flat curve to a single instrument.
    fn calibrate_flat(
        &self,
        cds: &CdsAnalytic,
        premium: f64,
        points_upfront: f64,
        yc: &IsdaYieldCurve,
    ) -> CdsResult<IsdaCreditCurve> {
        self.calibrate(
            std::slice::from_ref(cds),
            &[premium],
            &[points_upfront],
            yc,
        )
    }

    /// Calibrates to quotes in any supported convention.
    ///
    /// Quoted spreads are first converted to points upfront through a flat
    /// curve, as the market convention prescribes.
    fn calibrate_from_quotes(
        &self,
        cds: &[CdsAnalytic],
        quotes: &[CdsQuoteConvention],
        yc: &IsdaYieldCurve,
    ) -> CdsResult<IsdaCreditCurve> {
        if cds.len() != quotes.len() {
            return Err(CdsError::invalid_input(format!(
                "{} instruments but {} quotes",
                cds.len(),
                quotes.len()
            )));
        }
        let converter = MarketQuoteConverter::new(self.pricer());
        let mut premiums = Vec::with_capacity(quotes.len());
        let mut pufs = Vec::with_capacity(quotes.len());
        for (c, q) in cds.iter().zip(quotes) {
            let (premium, puf) = converter.premium_and_puf(c, q, yc)?;
            premiums.push(premium);
            pufs.push(puf);
        }
        self.calibrate(cds, &premiums, &pufs, yc)
    }

    /// Calibrates to every maturity of a term structure.
    fn calibrate_multi(
        &self,
        multi: &MultiCdsAnalytic,
        premiums: &[f64],
        points_upfront: &[f64],
        yc: &IsdaYieldCurve,
    ) -> CdsResult<IsdaCreditCurve> {
        self.calibrate(&multi.to_cds_vec()?, premiums, points_upfront, yc)
    }
}

/// Builds the calibrator selected by `method`.
#[must_use]
pub fn calibrator(
    method: CalibrationMethod,
    formula: AccrualOnDefaultFormula,
    solver: SolverConfig,
) -> Box<dyn CreditCurveCalibrator + Send + Sync> {
    match method {
        CalibrationMethod::Simple => {
            Box::new(SimpleCreditCurveBuilder::new(formula).with_solver_config(solver))
        }
        CalibrationMethod::Fast => {
            Box::new(FastCreditCurveBuilder::new(formula).with_solver_config(solver))
        }
    }
}

// =============================================================================
// SHARED MACHINERY
// =============================================================================

/// Checks calibration inputs and returns the knot times.
pub(crate) fn validate_inputs(
    cds: &[CdsAnalytic],
    premiums: &[f64],
    points_upfront: &[f64],
) -> CdsResult<Vec<f64>> {
    if cds.is_empty() {
        return Err(CdsError::invalid_input("no instruments to calibrate"));
    }
    if premiums.len() != cds.len() || points_upfront.len() != cds.len() {
        return Err(CdsError::invalid_input(format!(
            "{} instruments but {} premiums and {} points upfront",
            cds.len(),
            premiums.len(),
            points_upfront.len()
        )));
    }
    if let Some(i) = premiums
        .iter()
        .chain(points_upfront)
        .position(|x| !x.is_finite())
    {
        return Err(CdsError::invalid_input(format!(
            "quote {} is not finite",
            i % cds.len()
        )));
    }
    let start = cds[0].effective_protection_start();
    for (i, c) in cds.iter().enumerate() {
        if (c.effective_protection_start() - start).abs() > 1e-12 {
            return Err(CdsError::invalid_input(format!(
                "instrument {i} starts protection at {} but instrument 0 at {start}",
                c.effective_protection_start()
            )));
        }
        if c.is_expired() {
            return Err(CdsError::expired(c.protection_end()));
        }
    }
    let times: Vec<f64> = cds.iter().map(CdsAnalytic::protection_end).collect();
    if let Some(i) = times.windows(2).position(|w| w[1] <= w[0]) {
        return Err(CdsError::invalid_input(format!(
            "protection ends must be strictly ascending (index {})",
            i + 1
        )));
    }
    Ok(times)
}

/// Credit-triangle guess for the average hazard rate to `t`.
pub(crate) fn hazard_guess(cds: &CdsAnalytic, premium: f64, puf: f64) -> f64 {
    let t = cds.protection_end();
    let guess = (premium + puf / t) / cds.lgd();
    if guess.is_finite() {
        guess.max(MIN_GUESS)
    } else {
        MIN_GUESS
    }
}

/// Seed curve: knots at the protection ends, rates at their guesses.
pub(crate) fn seed_curve(
    times: Vec<f64>,
    cds: &[CdsAnalytic],
    premiums: &[f64],
    points_upfront: &[f64],
) -> CdsResult<(IsdaCurveBuilder<IsdaCreditCurve>, Vec<f64>)> {
    let guesses: Vec<f64> = cds
        .iter()
        .zip(premiums.iter().zip(points_upfront))
        .map(|(c, (p, u))| hazard_guess(c, *p, *u))
        .collect();
    let seed = IsdaCreditCurve::new(times, guesses.clone())?;
    Ok((IsdaCurveBuilder::new(seed), guesses))
}

/// Clean PV of one instrument minus its upfront, as a function of node `index`.
pub(crate) struct NodeObjective<'a> {
    pub builder: &'a mut IsdaCurveBuilder<IsdaCreditCurve>,
    pub pricer: &'a AnalyticCdsPricer,
    pub yc: &'a IsdaYieldCurve,
    pub cds: &'a CdsAnalytic,
    pub index: usize,
    pub premium: f64,
    pub puf: f64,
    error: Option<CdsError>,
}

impl<'a> NodeObjective<'a> {
    pub(crate) fn new(
        builder: &'a mut IsdaCurveBuilder<IsdaCreditCurve>,
        pricer: &'a AnalyticCdsPricer,
        yc: &'a IsdaYieldCurve,
        cds: &'a CdsAnalytic,
        index: usize,
        quote: (f64, f64),
    ) -> Self {
        Self {
            builder,
            pricer,
            yc,
            cds,
            index,
            premium: quote.0,
            puf: quote.1,
            error: None,
        }
    }

    fn try_value(&mut self, h: f64) -> CdsResult<f64> {
        self.builder.replace_node(self.index, h)?;
        let pv = self.pricer.pv(
            self.cds,
            self.yc,
            self.builder.curve(),
            self.premium,
            PriceType::Clean,
        )?;
        Ok(pv - self.puf)
    }

    fn try_value_and_slope(&mut self, h: f64) -> CdsResult<(f64, f64)> {
        let value = self.try_value(h)?;
        let slope = self.pricer.pv_credit_sensitivity(
            self.cds,
            self.yc,
            self.builder.curve(),
            self.premium,
            self.index,
        )?;
        Ok((value, slope))
    }

    /// Objective value; a pricing error is recorded and reported as NaN so
    /// that the solver stops.
    pub(crate) fn value(&mut self, h: f64) -> f64 {
        match self.try_value(h) {
            Ok(v) => v,
            Err(e) => {
                self.error.get_or_insert(e);
                f64::NAN
            }
        }
    }

    /// Objective value and its derivative with respect to node `index`.
    pub(crate) fn value_and_slope(&mut self, h: f64) -> (f64, f64) {
        match self.try_value_and_slope(h) {
            Ok(v) => v,
            Err(e) => {
                self.error.get_or_insert(e);
                (f64::NAN, f64::NAN)
            }
        }
    }

    /// Converts a solver failure into the error to report.
    ///
    /// A recorded pricing error takes precedence over the solver's own.
    pub(crate) fn fail(&mut self, source: MathError) -> CdsError {
        self.error
            .take()
            .unwrap_or_else(|| CdsError::calibration_failed(self.index, source))
    }

    /// Discards any recorded error, e.g. before a fallback solve.
    pub(crate) fn reset(&mut self) {
        self.error = None;
    }
}

/// Brackets from the guess and solves with Brent.
pub(crate) fn bracket_and_solve(
    objective: &mut NodeObjective<'_>,
    guess: f64,
    bracket: &BracketConfig,
    solver: &SolverConfig,
) -> CdsResult<SolverResult> {
    let (a, b) = bracket_root(|h| objective.value(h), 0.8 * guess, 1.25 * guess, bracket)
        .map_err(|e| objective.fail(e))?;
    trace!(index = objective.index, lower = a, upper = b, "bracketed hazard rate");
    brent(|h| objective.value(h), a, b, solver).map_err(|e| objective.fail(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terms::CdsTerms;

    fn ladder(maturities: &[f64]) -> Vec<CdsAnalytic> {
        maturities
            .iter()
            .map(|&m| CdsTerms::new(0.0, m).to_analytic().unwrap())
            .collect()
    }

    #[test]
    fn test_validation() {
        let cds = ladder(&[1.0, 3.0, 5.0]);
        assert!(validate_inputs(&[], &[], &[]).is_err());
        assert!(validate_inputs(&cds, &[0.01; 2], &[0.0; 3]).is_err());
        assert!(validate_inputs(&cds, &[0.01, f64::NAN, 0.01], &[0.0; 3]).is_err());

        let reversed: Vec<_> = cds.iter().rev().cloned().collect();
        assert!(validate_inputs(&reversed, &[0.01; 3], &[0.0; 3]).is_err());

        let mut shifted = cds.clone();
        shifted[1] = CdsTerms::new(0.0, 3.0).with_step_in(0.1).to_analytic().unwrap();
        assert!(validate_inputs(&shifted, &[0.01; 3], &[0.0; 3]).is_err());

        let times = validate_inputs(&cds, &[0.01; 3], &[0.0; 3]).unwrap();
        assert_eq!(times, vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn test_expired_instrument_rejected() {
        let expired = CdsTerms::new(-2.0, -1.0).to_analytic().unwrap();
        assert!(matches!(
            validate_inputs(&[expired], &[0.01], &[0.0]),
            Err(CdsError::Expired { .. })
        ));
    }

    #[test]
    fn test_guess() {
        let cds = CdsTerms::new(0.0, 5.0).to_analytic().unwrap();
        assert!((hazard_guess(&cds, 0.006, 0.0) - 0.01).abs() < 1e-12);
        assert!((hazard_guess(&cds, 0.01, 0.03) - 0.016 / 0.6).abs() < 1e-12);
        assert_eq!(hazard_guess(&cds, 0.01, -0.5), MIN_GUESS);
    }
}
