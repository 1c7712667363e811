//! Time-only CDS schedule generation.
//!
//! Builds [`CdsAnalytic`] and [`MultiCdsAnalytic`] from a handful of contract
//! terms expressed as year fractions from the valuation date. The coupon grid
//! runs backward from maturity at a fixed interval, leaving a short front
//! stub. No business-day adjustment is applied; callers with real calendars
//! build the coupons themselves.

use serde::{Deserialize, Serialize};

use crate::analytic::{CdsAnalytic, MultiCdsAnalytic, ProtectionWindow};
use crate::coupon::CdsCoupon;
use crate::day_count::{AccrualDayCount, ONE_DAY};
use crate::error::{CdsError, CdsResult};

/// Grid points closer than this to the accrual start are merged into it.
const STUB_TOLERANCE: f64 = 0.5 * ONE_DAY;

/// Default coupon interval (quarterly).
pub const DEFAULT_COUPON_INTERVAL: f64 = 0.25;

/// Default recovery rate for senior unsecured reference obligations.
pub const DEFAULT_RECOVERY_RATE: f64 = 0.4;

/// Contract conventions shared by single and term-structure schedules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CdsConventions {
    /// Step-in time; protection and accrual count from here.
    pub step_in: f64,
    /// Cash settlement time.
    pub cash_settle: f64,
    /// Coupon interval in years.
    pub coupon_interval: f64,
    /// Expected recovery rate.
    pub recovery_rate: f64,
    /// Whether accrued premium is paid on default.
    pub pay_accrued_on_default: bool,
    /// Whether protection starts at the beginning of the step-in day.
    pub protection_from_start_of_day: bool,
    /// Premium accrual day count.
    pub day_count: AccrualDayCount,
}

impl Default for CdsConventions {
    fn default() -> Self {
        Self {
            step_in: ONE_DAY,
            cash_settle: 3.0 * ONE_DAY,
            coupon_interval: DEFAULT_COUPON_INTERVAL,
            recovery_rate: DEFAULT_RECOVERY_RATE,
            pay_accrued_on_default: true,
            protection_from_start_of_day: true,
            day_count: AccrualDayCount::Act360,
        }
    }
}

impl CdsConventions {
    /// Validates the conventions.
    pub fn validate(&self) -> CdsResult<()> {
        if !self.step_in.is_finite() || !self.cash_settle.is_finite() {
            return Err(CdsError::invalid_input(
                "step-in and cash settlement must be finite",
            ));
        }
        if !self.coupon_interval.is_finite() || self.coupon_interval < ONE_DAY {
            return Err(CdsError::invalid_input(format!(
                "coupon interval must be at least one day, got {}",
                self.coupon_interval
            )));
        }
        if !(0.0..=1.0).contains(&self.recovery_rate) {
            return Err(CdsError::invalid_input(format!(
                "recovery rate must lie in [0, 1], got {}",
                self.recovery_rate
            )));
        }
        Ok(())
    }

    fn shift(&self) -> f64 {
        if self.protection_from_start_of_day {
            ONE_DAY
        } else {
            0.0
        }
    }

    fn effective_protection_start(&self, accrual_start: f64) -> f64 {
        self.step_in.max(accrual_start) - self.shift()
    }

    /// Coupon for the accrual period `[acc_start, acc_end]`.
    ///
    /// The terminal period of a contract accrues one extra day when
    /// protection runs from the start of the day, so that its effective end
    /// lands on maturity.
    fn coupon(&self, acc_start: f64, acc_end: f64, terminal: bool) -> CdsResult<CdsCoupon> {
        let shift = self.shift();
        let accrual_end = if terminal { acc_end + shift } else { acc_end };
        CdsCoupon::new(
            acc_start - shift,
            accrual_end - shift,
            acc_end,
            self.day_count.year_fraction(acc_start, accrual_end),
        )
    }

    fn accrued_yf(&self, first_acc_start: Option<f64>) -> f64 {
        match first_acc_start {
            Some(start) if self.step_in > start => self.day_count.year_fraction(start, self.step_in),
            _ => 0.0,
        }
    }

    /// Accrual boundaries from `accrual_start` to `maturity`, ascending.
    fn grid(&self, accrual_start: f64, maturity: f64) -> Vec<f64> {
        let mut boundaries = vec![maturity];
        let mut k = 1.0;
        loop {
            let b = maturity - k * self.coupon_interval;
            if b <= accrual_start + STUB_TOLERANCE {
                break;
            }
            boundaries.push(b);
            k += 1.0;
        }
        boundaries.push(accrual_start);
        boundaries.reverse();
        boundaries
    }
}

fn check_window(accrual_start: f64, maturity: f64) -> CdsResult<()> {
    if !accrual_start.is_finite() || !maturity.is_finite() {
        return Err(CdsError::invalid_input(
            "accrual start and maturity must be finite",
        ));
    }
    if maturity <= accrual_start + STUB_TOLERANCE {
        return Err(CdsError::invalid_input(format!(
            "maturity {maturity} must be after accrual start {accrual_start}"
        )));
    }
    Ok(())
}

// =============================================================================
// SINGLE CDS
// =============================================================================

/// Terms of a single CDS.
///
/// # Example
///
/// ```rust
/// use credex_cds::prelude::*;
///
/// // Quarterly CDS that started accruing 20 days ago, first coupon in 30 days
/// let maturity = 5.0 + 30.0 / 365.0;
/// let cds = CdsTerms::new(-20.0 / 365.0, maturity).to_analytic().unwrap();
///
/// assert_eq!(cds.num_coupons(), 21);
/// assert_eq!(cds.protection_end(), maturity);
/// assert!((cds.accrued_yf() - 21.0 / 360.0).abs() < 1e-15);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CdsTerms {
    /// Start of the first accrual period.
    pub accrual_start: f64,
    /// Contract maturity.
    pub maturity: f64,
    /// Contract conventions.
    #[serde(default, flatten)]
    pub conventions: CdsConventions,
}

impl CdsTerms {
    /// Standard terms for the given accrual start and maturity.
    #[must_use]
    pub fn new(accrual_start: f64, maturity: f64) -> Self {
        Self {
            accrual_start,
            maturity,
            conventions: CdsConventions::default(),
        }
    }

    /// Sets the step-in time.
    #[must_use]
    pub fn with_step_in(mut self, step_in: f64) -> Self {
        self.conventions.step_in = step_in;
        self
    }

    /// Sets the cash settlement time.
    #[must_use]
    pub fn with_cash_settle(mut self, cash_settle: f64) -> Self {
        self.conventions.cash_settle = cash_settle;
        self
    }

    /// Sets the coupon interval in years.
    #[must_use]
    pub fn with_coupon_interval(mut self, interval: f64) -> Self {
        self.conventions.coupon_interval = interval;
        self
    }

    /// Sets the recovery rate.
    #[must_use]
    pub fn with_recovery_rate(mut self, recovery_rate: f64) -> Self {
        self.conventions.recovery_rate = recovery_rate;
        self
    }

    /// Sets whether accrued premium is paid on default.
    #[must_use]
    pub fn with_pay_accrued_on_default(mut self, pay: bool) -> Self {
        self.conventions.pay_accrued_on_default = pay;
        self
    }

    /// Sets whether protection starts at the beginning of the day.
    #[must_use]
    pub fn with_protection_from_start_of_day(mut self, from_start: bool) -> Self {
        self.conventions.protection_from_start_of_day = from_start;
        self
    }

    /// Sets the premium day count.
    #[must_use]
    pub fn with_day_count(mut self, day_count: AccrualDayCount) -> Self {
        self.conventions.day_count = day_count;
        self
    }

    /// Generates the pricer representation.
    ///
    /// Coupon periods that ended on or before step-in are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the conventions are invalid or maturity is not
    /// after the accrual start.
    pub fn to_analytic(&self) -> CdsResult<CdsAnalytic> {
        let conv = &self.conventions;
        conv.validate()?;
        check_window(self.accrual_start, self.maturity)?;

        let grid = conv.grid(self.accrual_start, self.maturity);
        let last = grid.len() - 2;
        let mut coupons = Vec::with_capacity(grid.len() - 1);
        let mut first_start = None;
        for (i, w) in grid.windows(2).enumerate() {
            if w[1] <= conv.step_in {
                continue;
            }
            first_start.get_or_insert(w[0]);
            coupons.push(conv.coupon(w[0], w[1], i == last)?);
        }

        CdsAnalytic::new(
            conv.recovery_rate,
            conv.pay_accrued_on_default,
            conv.effective_protection_start(self.accrual_start),
            self.maturity,
            conv.cash_settle,
            coupons,
            conv.accrued_yf(first_start),
        )
    }
}

// =============================================================================
// TERM STRUCTURE
// =============================================================================

/// Terms of a CDS term structure on one coupon grid.
///
/// Maturity `i` is `maturity_reference + maturity_indices[i] * coupon_interval`.
///
/// # Example
///
/// ```rust
/// use credex_cds::prelude::*;
///
/// // 1Y, 3Y, 5Y from a common start
/// let terms = MultiCdsTerms::new(0.0, 0.0, vec![4, 12, 20]);
/// let multi = terms.to_analytic().unwrap();
///
/// assert_eq!(multi.num_maturities(), 3);
/// assert_eq!(multi.payment_indices(), &[3, 11, 19]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiCdsTerms {
    /// Start of the first accrual period.
    pub accrual_start: f64,
    /// Maturity with index zero.
    pub maturity_reference: f64,
    /// Maturities in coupon intervals from the reference, strictly ascending.
    pub maturity_indices: Vec<u32>,
    /// Contract conventions.
    #[serde(default, flatten)]
    pub conventions: CdsConventions,
}

impl MultiCdsTerms {
    /// Standard terms for the given maturities.
    #[must_use]
    pub fn new(accrual_start: f64, maturity_reference: f64, maturity_indices: Vec<u32>) -> Self {
        Self {
            accrual_start,
            maturity_reference,
            maturity_indices,
            conventions: CdsConventions::default(),
        }
    }

    /// Replaces the conventions.
    #[must_use]
    pub fn with_conventions(mut self, conventions: CdsConventions) -> Self {
        self.conventions = conventions;
        self
    }

    /// Maturity times.
    #[must_use]
    pub fn maturities(&self) -> Vec<f64> {
        self.maturity_indices
            .iter()
            .map(|&k| self.maturity_reference + f64::from(k) * self.conventions.coupon_interval)
            .collect()
    }

    /// Single-CDS terms for maturity `index`.
    #[must_use]
    pub fn terms(&self, index: usize) -> Option<CdsTerms> {
        self.maturities().get(index).map(|&maturity| CdsTerms {
            accrual_start: self.accrual_start,
            maturity,
            conventions: self.conventions,
        })
    }

    /// Generates the pricer representation.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no maturities, the indices are not
    /// strictly ascending, the conventions are invalid, or the first
    /// maturity is not after the accrual start.
    pub fn to_analytic(&self) -> CdsResult<MultiCdsAnalytic> {
        let conv = &self.conventions;
        conv.validate()?;
        if self.maturity_indices.is_empty() {
            return Err(CdsError::invalid_input("no maturities"));
        }
        if self.maturity_indices.windows(2).any(|w| w[1] <= w[0]) {
            return Err(CdsError::invalid_input(
                "maturity indices must be strictly ascending",
            ));
        }
        let maturities = self.maturities();
        check_window(self.accrual_start, maturities[0])?;
        let longest = maturities[maturities.len() - 1];

        let grid = conv.grid(self.accrual_start, longest);
        let mut standard = Vec::with_capacity(grid.len() - 1);
        let mut first_start = None;
        for w in grid.windows(2) {
            if w[1] <= conv.step_in {
                continue;
            }
            first_start.get_or_insert(w[0]);
            standard.push(conv.coupon(w[0], w[1], false)?);
        }

        let mut terminal = Vec::with_capacity(maturities.len());
        let mut payment_index = Vec::with_capacity(maturities.len());
        for &maturity in &maturities {
            // The grid runs backward from the longest maturity, so every
            // maturity is one of its boundaries.
            let end = grid.partition_point(|&b| b < maturity - STUB_TOLERANCE);
            let start = grid[end.saturating_sub(1)];
            terminal.push(conv.coupon(start, maturity, true)?);
            payment_index.push(
                standard
                    .iter()
                    .take_while(|c| c.payment_time() < maturity - STUB_TOLERANCE)
                    .count(),
            );
        }

        MultiCdsAnalytic::new(
            conv.recovery_rate,
            ProtectionWindow {
                pay_accrued_on_default: conv.pay_accrued_on_default,
                effective_protection_start: conv.effective_protection_start(self.accrual_start),
                cash_settle_time: conv.cash_settle,
                accrued_yf: conv.accrued_yf(first_start),
            },
            maturities,
            standard,
            terminal,
            payment_index,
        )
    }
}
