//! Brent's root-finding algorithm.

use crate::error::{MathError, MathResult};
use crate::solvers::{SolverConfig, SolverResult};

/// Brent's root-finding algorithm.
///
/// Combines bisection with secant steps and inverse quadratic interpolation,
/// falling back to bisection whenever an interpolated step would leave the
/// bracket or shrink it too slowly. Convergence is guaranteed once the root
/// is bracketed.
///
/// Requires `f(a) * f(b) <= 0`. An endpoint where `f` is exactly zero is
/// returned immediately.
///
/// # Arguments
///
/// * `f` - The function for which to find a root
/// * `a` - One end of the bracket
/// * `b` - The other end of the bracket
/// * `config` - Solver configuration
///
/// # Returns
///
/// The root and iteration statistics, or an error if the bracket is invalid
/// or the iteration budget is exhausted.
///
/// # Example
///
/// ```rust
/// use credex_math::solvers::{brent, SolverConfig};
///
/// // Hazard rate giving a 1Y survival probability of 99%
/// let f = |h: f64| (-h).exp() - 0.99;
///
/// let result = brent(f, 0.0, 0.1, &SolverConfig::default()).unwrap();
/// assert!((result.root + 0.99_f64.ln()).abs() < 1e-10);
/// ```
pub fn brent<F>(mut f: F, a: f64, b: f64, config: &SolverConfig) -> MathResult<SolverResult>
where
    F: FnMut(f64) -> f64,
{
    let (mut a, mut b) = (a, b);
    let mut fa = f(a);
    let mut fb = f(b);

    if !fa.is_finite() || !fb.is_finite() {
        return Err(MathError::non_finite("brent bracket evaluation"));
    }
    if fa == 0.0 {
        return Ok(SolverResult {
            root: a,
            iterations: 0,
            residual: 0.0,
        });
    }
    if fb == 0.0 {
        return Ok(SolverResult {
            root: b,
            iterations: 0,
            residual: 0.0,
        });
    }
    if fa.signum() == fb.signum() {
        return Err(MathError::InvalidBracket { a, b, fa, fb });
    }

    // c is the contrapoint: f(b) and f(c) always have opposite signs
    let mut c = a;
    let mut fc = fa;
    let mut step = b - a;
    let mut prev_step = step;

    for iteration in 1..=config.max_iterations {
        if fb.signum() == fc.signum() {
            c = a;
            fc = fa;
            step = b - a;
            prev_step = step;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }

        let tol = 2.0 * f64::EPSILON * b.abs() + 0.5 * config.tolerance;
        let half = 0.5 * (c - b);

        if half.abs() <= tol || fb.abs() < config.tolerance {
            return Ok(SolverResult {
                root: b,
                iterations: iteration,
                residual: fb,
            });
        }

        if prev_step.abs() >= tol && fa.abs() > fb.abs() {
            let s = fb / fa;
            let (mut p, mut q) = if a == c {
                // Secant
                (2.0 * half * s, 1.0 - s)
            } else {
                // Inverse quadratic interpolation
                let qa = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * half * qa * (qa - r) - (b - a) * (r - 1.0)),
                    (qa - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();

            let bound_interp = 3.0 * half * q - (tol * q).abs();
            let bound_prev = (prev_step * q).abs();
            if 2.0 * p < bound_interp.min(bound_prev) {
                prev_step = step;
                step = p / q;
            } else {
                step = half;
                prev_step = half;
            }
        } else {
            step = half;
            prev_step = half;
        }

        a = b;
        fa = fb;
        b += if step.abs() > tol {
            step
        } else {
            tol.copysign(half)
        };
        fb = f(b);

        if !fb.is_finite() {
            return Err(MathError::non_finite("brent iteration"));
        }
    }

    Err(MathError::convergence_failed(
        config.max_iterations,
        fb.abs(),
    ))
}
