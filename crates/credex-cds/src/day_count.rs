//! Accrual day counts for time-only schedules.
//!
//! Schedule times are year fractions under ACT/365F measured from the
//! valuation date. Premium accrual, however, is counted in whole days under
//! the contract's own convention, so a time interval is first converted back
//! to a day count and then divided by the convention's year basis.

use serde::{Deserialize, Serialize};

/// Length of one day in schedule time (ACT/365F).
pub const ONE_DAY: f64 = 1.0 / 365.0;

/// Converts a schedule-time interval to a whole number of days.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn days_between(start: f64, end: f64) -> i64 {
    ((end - start) * 365.0).round() as i64
}

/// Day count used for premium accrual.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccrualDayCount {
    /// Actual/360, the standard CDS premium convention.
    #[default]
    #[serde(rename = "ACT/360")]
    Act360,
    /// Actual/365 Fixed.
    #[serde(rename = "ACT/365F")]
    Act365F,
}

impl AccrualDayCount {
    /// Returns the name of the convention.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Act360 => "ACT/360",
            Self::Act365F => "ACT/365F",
        }
    }

    /// Days in the year basis.
    #[must_use]
    pub fn basis(self) -> f64 {
        match self {
            Self::Act360 => 360.0,
            Self::Act365F => 365.0,
        }
    }

    /// Accrual year fraction between two schedule times.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn year_fraction(self, start: f64, end: f64) -> f64 {
        days_between(start, end) as f64 / self.basis()
    }
}

impl std::fmt::Display for AccrualDayCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
