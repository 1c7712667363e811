//! Newton-Raphson root-finding algorithm.

use crate::error::{MathError, MathResult};
use crate::solvers::{SolverConfig, SolverResult};

/// Smallest derivative magnitude accepted for a Newton step.
const MIN_DERIVATIVE: f64 = 1e-15;

/// Newton-Raphson root-finding algorithm.
///
/// Uses the iteration `x_{n+1} = x_n - f(x_n) / f'(x_n)`. Convergence is
/// quadratic near a simple root, but the iteration can diverge from a poor
/// starting point; callers should pair it with a bracketing fallback.
///
/// # Arguments
///
/// * `f` - The function for which to find a root
/// * `df` - The derivative of the function
/// * `initial_guess` - Starting point for the iteration
/// * `config` - Solver configuration
///
/// # Example
///
/// ```rust
/// use credex_math::solvers::{newton_raphson, SolverConfig};
///
/// // Find root of x^2 - 2 (i.e., sqrt(2))
/// let f = |x: f64| x * x - 2.0;
/// let df = |x: f64| 2.0 * x;
///
/// let result = newton_raphson(f, df, 1.5, &SolverConfig::default()).unwrap();
/// assert!((result.root - std::f64::consts::SQRT_2).abs() < 1e-10);
/// ```
pub fn newton_raphson<F, DF>(
    mut f: F,
    mut df: DF,
    initial_guess: f64,
    config: &SolverConfig,
) -> MathResult<SolverResult>
where
    F: FnMut(f64) -> f64,
    DF: FnMut(f64) -> f64,
{
    newton_raphson_fdf(|x| (f(x), df(x)), initial_guess, config)
}

/// Newton-Raphson driven by one closure returning `(f(x), f'(x))`.
///
/// Calibration objectives compute a price and its analytic sensitivity from
/// the same curve state, so evaluating both together avoids a second pass
/// and lets the closure hold the only mutable borrow of that state.
///
/// # Errors
///
/// - [`MathError::DivisionByZero`] if the derivative vanishes
/// - [`MathError::NonFinite`] if the iterate leaves the finite range
/// - [`MathError::ConvergenceFailed`] if the budget is exhausted
///
/// # Example
///
/// ```rust
/// use credex_math::solvers::{newton_raphson_fdf, SolverConfig};
///
/// // Survival probability of 90% at 2Y
/// let fdf = |h: f64| {
///     let q = (-2.0 * h).exp();
///     (q - 0.9, -2.0 * q)
/// };
///
/// let result = newton_raphson_fdf(fdf, 0.01, &SolverConfig::default()).unwrap();
/// assert!((result.root + 0.9_f64.ln() / 2.0).abs() < 1e-12);
/// ```
pub fn newton_raphson_fdf<FDF>(
    mut fdf: FDF,
    initial_guess: f64,
    config: &SolverConfig,
) -> MathResult<SolverResult>
where
    FDF: FnMut(f64) -> (f64, f64),
{
    let mut x = initial_guess;
    let mut fx = f64::NAN;

    for iteration in 0..config.max_iterations {
        let (value, slope) = fdf(x);
        fx = value;

        if !fx.is_finite() {
            return Err(MathError::non_finite("newton objective"));
        }
        if fx.abs() < config.tolerance {
            return Ok(SolverResult {
                root: x,
                iterations: iteration,
                residual: fx,
            });
        }
        if slope.abs() < MIN_DERIVATIVE || !slope.is_finite() {
            return Err(MathError::DivisionByZero { value: slope });
        }

        let step = fx / slope;
        x -= step;

        if !x.is_finite() {
            return Err(MathError::non_finite("newton step"));
        }
        if step.abs() < config.tolerance {
            let (residual, _) = fdf(x);
            return Ok(SolverResult {
                root: x,
                iterations: iteration + 1,
                residual,
            });
        }
    }

    Err(MathError::convergence_failed(config.max_iterations, fx.abs()))
}
