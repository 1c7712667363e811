//! Newton bootstrap with analytic credit sensitivities.

use credex_curves::prelude::*;
use credex_math::prelude::*;
use tracing::{debug, trace};

use super::{
    bracket_and_solve, seed_curve, validate_inputs, CreditCurveCalibrator, NodeObjective,
    CALIBRATION_TOLERANCE,
};
use crate::analytic::CdsAnalytic;
use crate::error::CdsResult;
use crate::pricer::{AccrualOnDefaultFormula, AnalyticCdsPricer};

/// Bootstraps a credit curve with Newton's method.
///
/// The derivative of each objective is the analytic PV sensitivity to the
/// node being solved, so a well-seeded node converges in a few steps. When
/// Newton fails or ends on a negative hazard rate the node is re-solved by
/// bracketing and Brent's method, exactly as [`SimpleCreditCurveBuilder`]
/// would.
///
/// [`SimpleCreditCurveBuilder`]: super::SimpleCreditCurveBuilder
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FastCreditCurveBuilder {
    pricer: AnalyticCdsPricer,
    solver: SolverConfig,
    bracket: BracketConfig,
}

impl Default for FastCreditCurveBuilder {
    fn default() -> Self {
        Self::new(AccrualOnDefaultFormula::default())
    }
}

impl FastCreditCurveBuilder {
    /// Creates a builder pricing with the given accrual-on-default formula.
    #[must_use]
    pub fn new(formula: AccrualOnDefaultFormula) -> Self {
        Self {
            pricer: AnalyticCdsPricer::new(formula),
            solver: SolverConfig::default().with_tolerance(CALIBRATION_TOLERANCE),
            bracket: BracketConfig::non_negative(),
        }
    }

    /// Sets the solver configuration used by Newton and the fallback.
    #[must_use]
    pub fn with_solver_config(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    fn solve_node(&self, objective: &mut NodeObjective<'_>, guess: f64) -> CdsResult<SolverResult> {
        let newton = newton_raphson_fdf(|h| objective.value_and_slope(h), guess, &self.solver);
        match newton {
            Ok(result) if result.root >= 0.0 => return Ok(result),
            Ok(result) => trace!(
                index = objective.index,
                root = result.root,
                "newton left the admissible range, falling back to brent"
            ),
            Err(error) => trace!(
                index = objective.index,
                %error,
                "newton failed, falling back to brent"
            ),
        }
        objective.reset();
        bracket_and_solve(objective, guess, &self.bracket, &self.solver)
    }
}

impl CreditCurveCalibrator for FastCreditCurveBuilder {
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
            let result = self.solve_node(&mut objective, guesses[i])?;
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
