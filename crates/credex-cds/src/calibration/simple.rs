//! Bracket-and-Brent bootstrap.

use credex_curves::prelude::*;
use credex_math::prelude::*;
use tracing::debug;

use super::{
    bracket_and_solve, seed_curve, validate_inputs, CreditCurveCalibrator, NodeObjective,
    CALIBRATION_TOLERANCE,
};
use crate::analytic::CdsAnalytic;
use crate::error::CdsResult;
use crate::pricer::{AccrualOnDefaultFormula, AnalyticCdsPricer};

/// Bootstraps a credit curve by bracketing and Brent's method.
///
/// Each node starts from the credit-triangle guess, the bracket
/// `[0.8 g, 1.25 g]` is expanded within `[0, inf)` until the objective
/// changes sign, and Brent's method finds the root. Failing to bracket is
/// a hard error.
///
/// # Example
///
/// ```rust
/// use credex_cds::prelude::*;
///
/// let yc = IsdaYieldCurve::flat(0.02).unwrap();
/// let cds: Vec<CdsAnalytic> = [1.0, 3.0, 5.0]
///     .iter()
///     .map(|&m| CdsTerms::new(0.0, m).to_analytic().unwrap())
///     .collect();
///
/// let builder = SimpleCreditCurveBuilder::default();
/// let cc = builder
///     .calibrate_par_spreads(&cds, &[0.004, 0.006, 0.008], &yc)
///     .unwrap();
///
/// let pricer = AnalyticCdsPricer::default();
/// let spread = pricer.par_spread(&cds[1], &yc, &cc).unwrap();
/// assert!((spread - 0.006).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimpleCreditCurveBuilder {
    pricer: AnalyticCdsPricer,
    solver: SolverConfig,
    bracket: BracketConfig,
}

impl Default for SimpleCreditCurveBuilder {
    fn default() -> Self {
        Self::new(AccrualOnDefaultFormula::default())
    }
}

impl SimpleCreditCurveBuilder {
    /// Creates a builder pricing with the given accrual-on-default formula.
    #[must_use]
    pub fn new(formula: AccrualOnDefaultFormula) -> Self {
        Self {
            pricer: AnalyticCdsPricer::new(formula),
            solver: SolverConfig::default().with_tolerance(CALIBRATION_TOLERANCE),
            bracket: BracketConfig::non_negative(),
        }
    }

    /// Sets the Brent solver configuration.
    #[must_use]
    pub fn with_solver_config(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    /// Sets the bracketing configuration.
    #[must_use]
    pub fn with_bracket_config(mut self, bracket: BracketConfig) -> Self {
        self.bracket = bracket;
        self
    }
}

impl CreditCurveCalibrator for SimpleCreditCurveBuilder {
    fn calibrate(
        &self,
        cds: &[CdsAnalytic],
        premiums: &[f64],
        points_upfront: &[f64],
        yc: &IsdaYieldCurve,
    ) -> CdsResult<IsdaCreditCurve> {
        let times = validate_inputs(cds, premiums, points_upfront)?;
        let (mut builder, guesses) = seed_curve(times, cds, premiums, points_upfront)?;

        for (i, instrument) in cds.iter().enumerate() {
            let quote = (premiums[i], points_upfront[i]);
            let mut objective =
                NodeObjective::new(&mut builder, &self.pricer, yc, instrument, i, quote);
            let result = bracket_and_solve(&mut objective, guesses[i], &self.bracket, &self.solver)?;
            builder.replace_node(i, result.root)?;
            debug!(
                index = i,
                hazard_rate = result.root,
                iterations = result.iterations,
                "calibrated credit curve node"
            );
        }
        Ok(builder.build())
    }

    fn pricer(&self) -> AnalyticCdsPricer {
        self.pricer
    }
}
