//! Root-finding algorithms.
//!
//! This module provides the numerical solvers used by credit-curve calibration:
//!
//! - [`bracket_root`]: Expands an initial interval until the function changes sign
//! - [`brent`]: Robust method combining bisection, secant, and inverse quadratic
//! - [`newton_raphson`]: Fast quadratic convergence when derivative is available
//! - [`newton_raphson_fdf`]: Newton-Raphson driven by a single closure returning
//!   both value and derivative
//!
//! # Choosing a Solver
//!
//! | Solver | Speed | Reliability | Requires |
//! |--------|-------|-------------|----------|
//! | Newton-Raphson | Fastest (quadratic) | May diverge | Derivative |
//! | Brent | Fast (superlinear) | Guaranteed | Bracket |
//!
//! All solvers accept `FnMut` objectives so that a calibration loop can reuse
//! one working curve between evaluations instead of allocating a new one.
//!
//! # Example: Flat Hazard Rate
//!
//! ```rust
//! use credex_math::solvers::{bracket_root, brent, BracketConfig, SolverConfig};
//!
//! // Survival probability to 5Y observed at 95%
//! let mut f = |h: f64| (-h * 5.0).exp() - 0.95;
//!
//! let (a, b) = bracket_root(&mut f, 0.008, 0.0125, &BracketConfig::non_negative()).unwrap();
//! let result = brent(&mut f, a, b, &SolverConfig::default()).unwrap();
//! assert!((result.root - (-(0.95_f64).ln() / 5.0)).abs() < 1e-10);
//! ```

mod bracket;
mod brent;
mod newton;

pub use bracket::{bracket_root, BracketConfig};
pub use brent::brent;
pub use newton::{newton_raphson, newton_raphson_fdf};

/// Default tolerance for root-finding algorithms.
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Default maximum iterations for root-finding algorithms.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Configuration for root-finding algorithms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Tolerance for convergence.
    pub tolerance: f64,
    /// Maximum number of iterations.
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl SolverConfig {
    /// Creates a new solver configuration.
    #[must_use]
    pub fn new(tolerance: f64, max_iterations: u32) -> Self {
        Self {
            tolerance,
            max_iterations,
        }
    }

    /// Sets the tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the maximum iterations.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Result of a root-finding iteration.
#[derive(Debug, Clone, Copy)]
pub struct SolverResult {
    /// The root found.
    pub root: f64,
    /// Number of iterations used.
    pub iterations: u32,
    /// Final residual (function value at root).
    pub residual: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_solver_config() {
        let config = SolverConfig::default()
            .with_tolerance(1e-8)
            .with_max_iterations(50);

        assert!((config.tolerance - 1e-8).abs() < f64::EPSILON);
        assert_eq!(config.max_iterations, 50);
    }

    /// Risky annuity of a flat-hazard, flat-rate quarterly premium leg.
    fn annuity(hazard: f64, rate: f64, years: u32) -> f64 {
        (1..=4 * years)
            .map(|k| {
                let t = f64::from(k) * 0.25;
                0.25 * (-(hazard + rate) * t).exp()
            })
            .sum()
    }

    /// Protection value of a flat-hazard, flat-rate CDS.
    fn protection(hazard: f64, rate: f64, years: u32, lgd: f64) -> f64 {
        let t = f64::from(years);
        lgd * hazard / (hazard + rate) * (1.0 - (-(hazard + rate) * t).exp())
    }

    #[test]
    fn test_newton_and_brent_agree_on_hazard_rate() {
        let spread = 0.012;
        let f = |h: f64| protection(h, 0.03, 5, 0.6) - spread * annuity(h, 0.03, 5);
        let df = |h: f64| {
            let bump = 1e-7;
            (f(h + bump) - f(h - bump)) / (2.0 * bump)
        };
        let config = SolverConfig::default().with_tolerance(1e-14);

        let newton_result = newton_raphson(f, df, spread / 0.6, &config).unwrap();
        let mut g = f;
        let (a, b) = bracket_root(&mut g, 0.016, 0.025, &BracketConfig::non_negative()).unwrap();
        let brent_result = brent(&mut g, a, b, &config).unwrap();

        assert_relative_eq!(newton_result.root, brent_result.root, epsilon = 1e-10);
        // Credit triangle is a close first guess
        assert!((newton_result.root - spread / 0.6).abs() < 1e-3);
    }

    #[test]
    fn test_solver_convergence_speed() {
        let f = |x: f64| x * x - 2.0;
        let df = |x: f64| 2.0 * x;
        let config = SolverConfig::default();

        let newton_result = newton_raphson(f, df, 1.5, &config).unwrap();
        let brent_result = brent(f, 1.0, 2.0, &config).unwrap();

        assert!(newton_result.iterations <= brent_result.iterations);
    }
}
