//! Root bracketing by geometric expansion.

use tracing::trace;

use crate::error::{MathError, MathResult};

/// Settings for [`bracket_root`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BracketConfig {
    /// Growth factor applied to the interval width at each expansion.
    pub ratio: f64,
    /// Maximum number of expansions.
    pub max_steps: u32,
    /// Lowest admissible abscissa.
    pub lower_limit: f64,
    /// Highest admissible abscissa.
    pub upper_limit: f64,
}

impl Default for BracketConfig {
    fn default() -> Self {
        Self {
            ratio: 1.6,
            max_steps: 50,
            lower_limit: f64::NEG_INFINITY,
            upper_limit: f64::INFINITY,
        }
    }
}

impl BracketConfig {
    /// Expansion restricted to `[0, inf)`, as used for hazard rates.
    #[must_use]
    pub fn non_negative() -> Self {
        Self {
            lower_limit: 0.0,
            ..Self::default()
        }
    }

    /// Sets the admissible range.
    #[must_use]
    pub fn with_limits(mut self, lower: f64, upper: f64) -> Self {
        self.lower_limit = lower;
        self.upper_limit = upper;
        self
    }
}

/// Expands `[lower, upper]` until `f` changes sign across it.
///
/// At each step the end with the smaller `|f|` is pushed outwards by `ratio`
/// times the current width, clamped to the configured limits. An endpoint
/// where `f` is exactly zero counts as a bracket.
///
/// # Returns
///
/// The bracketing pair `(a, b)` with `a < b`.
///
/// # Errors
///
/// - [`MathError::InvalidInput`] if `lower >= upper` or either lies outside the limits
/// - [`MathError::BracketNotFound`] if no sign change is found within `max_steps`
pub fn bracket_root<F>(
    mut f: F,
    lower: f64,
    upper: f64,
    config: &BracketConfig,
) -> MathResult<(f64, f64)>
where
    F: FnMut(f64) -> f64,
{
    if lower.is_nan() || upper.is_nan() || lower >= upper {
        return Err(MathError::invalid_input(format!(
            "bracket start must satisfy lower < upper, got [{lower}, {upper}]"
        )));
    }
    if lower < config.lower_limit || upper > config.upper_limit {
        return Err(MathError::invalid_input(format!(
            "bracket start [{lower}, {upper}] outside limits [{}, {}]",
            config.lower_limit, config.upper_limit
        )));
    }

    let (mut x1, mut x2) = (lower, upper);
    let mut f1 = f(x1);
    let mut f2 = f(x2);

    for step in 0..config.max_steps {
        if !f1.is_finite() || !f2.is_finite() {
            return Err(MathError::non_finite("bracket expansion"));
        }
        if f1 == 0.0 || f2 == 0.0 || f1.signum() != f2.signum() {
            trace!(step, x1, x2, "root bracketed");
            return Ok((x1, x2));
        }

        let width = x2 - x1;
        if f1.abs() < f2.abs() {
            x1 = (x1 - config.ratio * width).max(config.lower_limit);
            f1 = f(x1);
        } else {
            x2 = (x2 + config.ratio * width).min(config.upper_limit);
            f2 = f(x2);
        }
    }

    if f1 == 0.0 || f2 == 0.0 || f1.signum() != f2.signum() {
        return Ok((x1, x2));
    }
    Err(MathError::bracket_not_found(x1, x2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_bracketed() {
        let f = |x: f64| x - 0.5;

        let (a, b) = bracket_root(f, 0.0, 1.0, &BracketConfig::default()).unwrap();

        assert_eq!((a, b), (0.0, 1.0));
    }

    #[test]
    fn test_expands_upwards() {
        let f = |x: f64| x - 10.0;

        let (a, b) = bracket_root(f, 0.8, 1.25, &BracketConfig::non_negative()).unwrap();

        assert!(a <= 10.0 && b >= 10.0);
    }

    #[test]
    fn test_clamped_at_zero() {
        // Root sits exactly on the lower limit
        let f = |x: f64| x;

        let (a, b) = bracket_root(f, 0.8, 1.25, &BracketConfig::non_negative()).unwrap();

        assert_eq!(a, 0.0);
        assert!(b >= 1.25);
    }

    #[test]
    fn test_no_root_within_limits() {
        // Strictly positive on [0, inf)
        let f = |x: f64| x + 1.0;

        let result = bracket_root(f, 0.8, 1.25, &BracketConfig::non_negative());

        assert!(matches!(result, Err(MathError::BracketNotFound { .. })));
    }

    #[test]
    fn test_invalid_start() {
        let f = |x: f64| x;

        assert!(bracket_root(f, 1.0, 1.0, &BracketConfig::default()).is_err());
        assert!(bracket_root(f, -1.0, 1.0, &BracketConfig::non_negative()).is_err());
    }
}
