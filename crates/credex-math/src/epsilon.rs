//! The epsilon function family.
//!
//! Every leg integral of the ISDA model reduces, on a segment where the
//! combined hazard and interest exponent is linear, to expressions of the form
//! `(1 - e^{-x}) / x`. Evaluated directly these lose all precision as `x -> 0`,
//! which happens whenever forward and hazard rates are nearly flat.
//!
//! # Mathematical Background
//!
//! ```text
//! epsilon(x)    = (e^x - 1) / x                      = sum x^n / (n+1)!
//! epsilon_p(x)  = d/dx epsilon(x)                    = sum n x^(n-1) / (n+1)!
//! epsilon_pp(x) = d^2/dx^2 epsilon(x)                = sum n(n-1) x^(n-2) / (n+1)!
//! ```
//!
//! Below a fixed switch point each function is evaluated from a truncated
//! Taylor series, above it from the closed form written with `expm1`.

/// Switch point between the closed form and the Taylor series of [`epsilon`].
///
/// The pricers use the same constant on the combined exponent of a segment,
/// so that prices match the reference model.
pub const EPSILON_SWITCH: f64 = 1e-5;

/// Switch point for [`epsilon_p`].
const EPSILON_P_SWITCH: f64 = 1e-3;

/// Switch point for [`epsilon_pp`].
const EPSILON_PP_SWITCH: f64 = 1e-2;

/// Returns `(e^x - 1) / x`, with the limit `1` at `x = 0`.
///
/// # Example
///
/// ```rust
/// use credex_math::epsilon::epsilon;
///
/// assert_eq!(epsilon(0.0), 1.0);
/// assert!((epsilon(1.0) - (1.0_f64.exp() - 1.0)).abs() < 1e-15);
/// ```
#[inline]
pub fn epsilon(x: f64) -> f64 {
    if x.abs() > EPSILON_SWITCH {
        return x.exp_m1() / x;
    }
    // 1 + x/2 + x^2/6 + x^3/24 + x^4/120
    1.0 + x * (1.0 / 2.0 + x * (1.0 / 6.0 + x * (1.0 / 24.0 + x / 120.0)))
}

/// Returns the first derivative of [`epsilon`], with the limit `1/2` at `x = 0`.
///
/// Closed form: `((x - 1)(e^x - 1) + x) / x^2`.
#[inline]
pub fn epsilon_p(x: f64) -> f64 {
    if x.abs() > EPSILON_P_SWITCH {
        return ((x - 1.0) * x.exp_m1() + x) / (x * x);
    }
    1.0 / 2.0
        + x * (1.0 / 3.0
            + x * (1.0 / 8.0
                + x * (1.0 / 30.0
                    + x * (1.0 / 144.0 + x * (1.0 / 840.0 + x / 5760.0)))))
}

/// Returns the second derivative of [`epsilon`], with the limit `1/3` at `x = 0`.
///
/// Closed form: `((x^2 - 2x + 2)(e^x - 1) + x^2 - 2x) / x^3`.
#[inline]
pub fn epsilon_pp(x: f64) -> f64 {
    if x.abs() > EPSILON_PP_SWITCH {
        let x2 = x * x;
        return ((x2 - 2.0 * x + 2.0) * x.exp_m1() + x2 - 2.0 * x) / (x2 * x);
    }
    1.0 / 3.0
        + x * (1.0 / 4.0
            + x * (1.0 / 10.0
                + x * (1.0 / 36.0
                    + x * (1.0 / 168.0 + x * (1.0 / 960.0 + x / 6480.0)))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Series evaluated term by term, far enough to be exact in f64.
    fn series(x: f64, derivative: u32) -> f64 {
        let mut sum = 0.0;
        let mut factorial = 1.0;
        for n in 0..30_u32 {
            factorial *= f64::from(n + 1);
            let coeff = match derivative {
                0 => 1.0,
                1 => f64::from(n),
                _ => f64::from(n) * (f64::from(n) - 1.0),
            };
            if coeff == 0.0 {
                continue;
            }
            let power = i32::try_from(n - derivative).unwrap();
            sum += coeff * x.powi(power) / factorial;
        }
        sum
    }

    #[test]
    fn test_limits_at_zero() {
        assert_eq!(epsilon(0.0), 1.0);
        assert_eq!(epsilon_p(0.0), 0.5);
        assert_relative_eq!(epsilon_pp(0.0), 1.0 / 3.0, epsilon = 1e-16);
        assert!(!epsilon(-0.0).is_nan());
    }

    #[test]
    fn test_small_arguments() {
        for x in [1e-20, -1e-20, 1e-10, -1e-10, 1e-6, -1e-6, 9.9e-6, -9.9e-6] {
            assert_relative_eq!(epsilon(x), series(x, 0), max_relative = 1e-12);
            assert_relative_eq!(epsilon_p(x), series(x, 1), max_relative = 1e-12);
            assert_relative_eq!(epsilon_pp(x), series(x, 2), max_relative = 1e-12);
        }
    }

    #[test]
    fn test_across_switch_points() {
        for x in [
            1.1e-5, -1.1e-5, 9e-4, 1.1e-3, -1.1e-3, 9e-3, 1.1e-2, -1.1e-2, 0.3, -0.7,
        ] {
            assert_relative_eq!(epsilon(x), series(x, 0), max_relative = 1e-11);
            assert_relative_eq!(epsilon_p(x), series(x, 1), max_relative = 1e-10);
            assert_relative_eq!(epsilon_pp(x), series(x, 2), max_relative = 1e-9);
        }
    }

    #[test]
    fn test_continuity_at_switch() {
        let below = EPSILON_SWITCH * (1.0 - 1e-9);
        let above = EPSILON_SWITCH * (1.0 + 1e-9);
        assert_relative_eq!(epsilon(below), epsilon(above), max_relative = 1e-12);
        assert_relative_eq!(epsilon(-below), epsilon(-above), max_relative = 1e-12);
    }

    #[test]
    fn test_large_arguments() {
        assert_relative_eq!(epsilon(2.0), (2.0_f64.exp() - 1.0) / 2.0, max_relative = 1e-14);
        assert_relative_eq!(
            epsilon_p(2.0),
            (2.0 * 2.0_f64.exp() - 2.0_f64.exp() + 1.0) / 4.0,
            max_relative = 1e-14
        );
        let e = 3.0_f64.exp();
        assert_relative_eq!(
            epsilon_pp(3.0),
            ((9.0 - 6.0 + 2.0) * e - 2.0) / 27.0,
            max_relative = 1e-13
        );
    }
}
