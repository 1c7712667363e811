//! Integration schedules for the leg integrals.
//!
//! On every interval between consecutive knots of the yield and credit
//! curves the integrand of a leg integral is a single exponential, so the
//! integral is computed exactly by splitting `[start, end]` at the union of
//! both curves' knot times.
//!
//! Points closer than [`POINT_TOLERANCE`] to a point already in the schedule
//! are dropped, so no sub-interval is shorter than that.

use crate::error::{CurveError, CurveResult};
use crate::traits::Curve;

/// Minimum spacing between integration points.
pub const POINT_TOLERANCE: f64 = 1e-10;

fn distinct(a: f64, b: f64) -> bool {
    (a - b).abs() > POINT_TOLERANCE
}

/// Returns the points of a sorted slice lying strictly inside `(lower, upper)`.
fn strictly_inside(lower: f64, upper: f64, points: &[f64]) -> &[f64] {
    let from = points.partition_point(|&p| p <= lower);
    let to = points.partition_point(|&p| p < upper);
    if from >= to {
        &[]
    } else {
        &points[from..to]
    }
}

fn check_interval(start: f64, end: f64) -> CurveResult<()> {
    if !start.is_finite() || !end.is_finite() || end <= start {
        return Err(CurveError::invalid_input(format!(
            "integration interval must satisfy start < end, got [{start}, {end}]"
        )));
    }
    Ok(())
}

/// Appends `p` unless it is within tolerance of the last point.
fn push_distinct(out: &mut Vec<f64>, p: f64) {
    if out.last().map_or(true, |&last| distinct(last, p)) {
        out.push(p);
    }
}

/// Closes a schedule with `end`, replacing a last interior point that is
/// too close to it.
fn close_with(out: &mut Vec<f64>, end: f64) {
    if out.len() > 1 && !distinct(out[out.len() - 1], end) {
        out.pop();
    }
    out.push(end);
}

/// Integration points over `[start, end]` for two sets of knot times.
///
/// Returns `start`, then the sorted union of `set_a` and `set_b` strictly
/// inside the interval, then `end`. Both sets must be sorted ascending.
///
/// # Errors
///
/// Returns an error if `end <= start`.
///
/// # Example
///
/// ```rust
/// use credex_curves::schedule::integration_points;
///
/// let points = integration_points(0.0, 5.0, &[1.0, 3.0, 10.0], &[0.5, 3.0, 5.0]).unwrap();
/// assert_eq!(points, vec![0.0, 0.5, 1.0, 3.0, 5.0]);
/// ```
pub fn integration_points(
    start: f64,
    end: f64,
    set_a: &[f64],
    set_b: &[f64],
) -> CurveResult<Vec<f64>> {
    check_interval(start, end)?;
    let a = strictly_inside(start, end, set_a);
    let b = strictly_inside(start, end, set_b);

    let mut out = Vec::with_capacity(a.len() + b.len() + 2);
    out.push(start);
    let (mut i, mut j) = (0, 0);
    while i < a.len() || j < b.len() {
        let next = if j == b.len() || (i < a.len() && a[i] <= b[j]) {
            i += 1;
            a[i - 1]
        } else {
            j += 1;
            b[j - 1]
        };
        push_distinct(&mut out, next);
    }
    close_with(&mut out, end);
    Ok(out)
}

/// Integration points over `[start, end]` for a yield and a credit curve.
pub fn curve_integration_points<Y: Curve, C: Curve>(
    start: f64,
    end: f64,
    yield_curve: &Y,
    credit_curve: &C,
) -> CurveResult<Vec<f64>> {
    integration_points(
        start,
        end,
        yield_curve.knot_times(),
        credit_curve.knot_times(),
    )
}

/// Restricts a sorted set of points to `[lower, upper]`, adding both bounds.
///
/// Interior points within tolerance of either bound are dropped.
///
/// # Errors
///
/// Returns an error if `upper <= lower`.
pub fn truncate_inclusive(lower: f64, upper: f64, points: &[f64]) -> CurveResult<Vec<f64>> {
    check_interval(lower, upper)?;
    let inside = strictly_inside(lower, upper, points);
    let mut out = Vec::with_capacity(inside.len() + 2);
    out.push(lower);
    for &p in inside {
        push_distinct(&mut out, p);
    }
    close_with(&mut out, upper);
    Ok(out)
}

/// Sorted union of two ascending sets, merging points within tolerance.
///
/// # Example
///
/// ```rust
/// use credex_curves::schedule::merge_knots;
///
/// let merged = merge_knots(&[0.0, 1.0, 2.0], &[1.0 + 1e-12, 1.5, 3.0]);
/// assert_eq!(merged, vec![0.0, 1.0, 1.5, 2.0, 3.0]);
/// ```
#[must_use]
pub fn merge_knots(set_a: &[f64], set_b: &[f64]) -> Vec<f64> {
    let mut all: Vec<f64> = set_a.iter().chain(set_b).copied().collect();
    all.sort_by(f64::total_cmp);
    let mut out = Vec::with_capacity(all.len());
    for p in all {
        push_distinct(&mut out, p);
    }
    out
}
