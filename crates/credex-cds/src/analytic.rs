//! Date-free CDS representations consumed by the pricers.
//!
//! Everything here is measured in years from the valuation date. Calendar
//! logic (business-day rolling, IMM dates, holidays) happens before a CDS
//! reaches this layer; see [`crate::terms`] for a time-only schedule
//! generator.

use serde::{Deserialize, Serialize};

use crate::coupon::CdsCoupon;
use crate::error::{CdsError, CdsResult};

fn check_recovery(recovery_rate: f64) -> CdsResult<()> {
    if !(0.0..=1.0).contains(&recovery_rate) {
        return Err(CdsError::invalid_input(format!(
            "recovery rate must lie in [0, 1], got {recovery_rate}"
        )));
    }
    Ok(())
}

fn check_finite(values: &[(f64, &str)]) -> CdsResult<()> {
    for (value, name) in values {
        if !value.is_finite() {
            return Err(CdsError::invalid_input(format!("{name} must be finite")));
        }
    }
    Ok(())
}

fn check_accrued(accrued_yf: f64) -> CdsResult<()> {
    if accrued_yf < 0.0 {
        return Err(CdsError::invalid_input(format!(
            "accrued year fraction must be non-negative, got {accrued_yf}"
        )));
    }
    Ok(())
}

fn check_coupons_ascending(coupons: &[CdsCoupon]) -> CdsResult<()> {
    for (i, w) in coupons.windows(2).enumerate() {
        if w[1].eff_end() <= w[0].eff_end() {
            return Err(CdsError::invalid_input(format!(
                "coupon {} ends at {} which is not after coupon {i} ending at {}",
                i + 1,
                w[1].eff_end(),
                w[0].eff_end()
            )));
        }
    }
    Ok(())
}

// =============================================================================
// SINGLE CDS
// =============================================================================

/// A single CDS as seen by the pricer.
///
/// # Example
///
/// ```rust
/// use credex_cds::prelude::*;
///
/// let coupons = vec![
///     CdsCoupon::new(0.0, 0.5, 0.5, 0.5).unwrap(),
///     CdsCoupon::new(0.5, 1.0, 1.0, 0.5).unwrap(),
/// ];
/// let cds = CdsAnalytic::new(0.4, true, 0.0, 1.0, 0.0, coupons, 0.0).unwrap();
///
/// assert!((cds.lgd() - 0.6).abs() < 1e-15);
/// assert_eq!(cds.num_coupons(), 2);
/// assert!(!cds.is_expired());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CdsAnalyticRepr", into = "CdsAnalyticRepr")]
pub struct CdsAnalytic {
    lgd: f64,
    pay_accrued_on_default: bool,
    effective_protection_start: f64,
    protection_end: f64,
    cash_settle_time: f64,
    coupons: Vec<CdsCoupon>,
    accrued_yf: f64,
}

impl CdsAnalytic {
    /// Creates a CDS from its premium coupons and protection window.
    ///
    /// # Arguments
    ///
    /// * `recovery_rate` - Expected recovery, in `[0, 1]`
    /// * `pay_accrued_on_default` - Whether accrued premium is paid on default
    /// * `effective_protection_start` - Time from which default is covered
    /// * `protection_end` - Time protection ends
    /// * `cash_settle_time` - Time PVs are expressed at
    /// * `coupons` - Remaining premium periods, ascending
    /// * `accrued_yf` - Accrued premium year fraction at step-in
    ///
    /// # Errors
    ///
    /// Returns an error if the recovery rate is outside `[0, 1]`, any time is
    /// not finite, the accrued year fraction is negative, or the coupons are
    /// not ascending.
    pub fn new(
        recovery_rate: f64,
        pay_accrued_on_default: bool,
        effective_protection_start: f64,
        protection_end: f64,
        cash_settle_time: f64,
        coupons: Vec<CdsCoupon>,
        accrued_yf: f64,
    ) -> CdsResult<Self> {
        check_recovery(recovery_rate)?;
        check_finite(&[
            (effective_protection_start, "effective protection start"),
            (protection_end, "protection end"),
            (cash_settle_time, "cash settlement time"),
            (accrued_yf, "accrued year fraction"),
        ])?;
        check_accrued(accrued_yf)?;
        check_coupons_ascending(&coupons)?;
        Ok(Self {
            lgd: 1.0 - recovery_rate,
            pay_accrued_on_default,
            effective_protection_start,
            protection_end,
            cash_settle_time,
            coupons,
            accrued_yf,
        })
    }

    /// Loss given default, `1 - recovery`.
    #[must_use]
    pub fn lgd(&self) -> f64 {
        self.lgd
    }

    /// Expected recovery rate.
    #[must_use]
    pub fn recovery_rate(&self) -> f64 {
        1.0 - self.lgd
    }

    /// Whether accrued premium is paid on default.
    #[must_use]
    pub fn pay_accrued_on_default(&self) -> bool {
        self.pay_accrued_on_default
    }

    /// Time from which default is covered.
    #[must_use]
    pub fn effective_protection_start(&self) -> f64 {
        self.effective_protection_start
    }

    /// Time protection ends.
    #[must_use]
    pub fn protection_end(&self) -> f64 {
        self.protection_end
    }

    /// Time PVs are expressed at.
    #[must_use]
    pub fn cash_settle_time(&self) -> f64 {
        self.cash_settle_time
    }

    /// The premium coupons.
    #[must_use]
    pub fn coupons(&self) -> &[CdsCoupon] {
        &self.coupons
    }

    /// Number of premium coupons.
    #[must_use]
    pub fn num_coupons(&self) -> usize {
        self.coupons.len()
    }

    /// Coupon `index`, if present.
    #[must_use]
    pub fn coupon(&self, index: usize) -> Option<&CdsCoupon> {
        self.coupons.get(index)
    }

    /// Accrued premium year fraction at step-in.
    #[must_use]
    pub fn accrued_yf(&self) -> f64 {
        self.accrued_yf
    }

    /// Accrued premium for a running coupon.
    #[must_use]
    pub fn accrued_premium(&self, coupon: f64) -> f64 {
        self.accrued_yf * coupon
    }

    /// True when no protection remains.
    ///
    /// A CDS is expired when its protection end is not after both the
    /// valuation date and the effective protection start.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.protection_end <= self.effective_protection_start.max(0.0)
    }

    /// Returns a copy with a different recovery rate.
    pub fn with_recovery_rate(&self, recovery_rate: f64) -> CdsResult<Self> {
        check_recovery(recovery_rate)?;
        Ok(Self {
            lgd: 1.0 - recovery_rate,
            ..self.clone()
        })
    }

    /// Returns the CDS seen from a valuation time `offset` years later.
    ///
    /// Every time is shifted; the accrued year fraction is unchanged.
    #[must_use]
    pub fn with_offset(&self, offset: f64) -> Self {
        Self {
            effective_protection_start: self.effective_protection_start - offset,
            protection_end: self.protection_end - offset,
            cash_settle_time: self.cash_settle_time - offset,
            coupons: self.coupons.iter().map(|c| c.with_offset(offset)).collect(),
            ..self.clone()
        }
    }
}

#[derive(Serialize, Deserialize)]
struct CdsAnalyticRepr {
    recovery_rate: f64,
    pay_accrued_on_default: bool,
    effective_protection_start: f64,
    protection_end: f64,
    cash_settle_time: f64,
    coupons: Vec<CdsCoupon>,
    accrued_yf: f64,
}

impl TryFrom<CdsAnalyticRepr> for CdsAnalytic {
    type Error = CdsError;

    fn try_from(repr: CdsAnalyticRepr) -> CdsResult<Self> {
        Self::new(
            repr.recovery_rate,
            repr.pay_accrued_on_default,
            repr.effective_protection_start,
            repr.protection_end,
            repr.cash_settle_time,
            repr.coupons,
            repr.accrued_yf,
        )
    }
}

impl From<CdsAnalytic> for CdsAnalyticRepr {
    fn from(cds: CdsAnalytic) -> Self {
        Self {
            recovery_rate: cds.recovery_rate(),
            pay_accrued_on_default: cds.pay_accrued_on_default,
            effective_protection_start: cds.effective_protection_start,
            protection_end: cds.protection_end,
            cash_settle_time: cds.cash_settle_time,
            coupons: cds.coupons,
            accrued_yf: cds.accrued_yf,
        }
    }
}

// =============================================================================
// TERM STRUCTURE
// =============================================================================

/// A term structure of CDSs sharing one protection start.
///
/// All maturities share the coupon schedule of the longest one. Maturity `i`
/// pays the first `payment_index(i)` standard coupons followed by its own
/// terminal coupon, which differs from the standard coupon only in its end
/// (protection runs to the maturity itself).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MultiCdsAnalyticRepr", into = "MultiCdsAnalyticRepr")]
pub struct MultiCdsAnalytic {
    lgd: f64,
    pay_accrued_on_default: bool,
    effective_protection_start: f64,
    protection_ends: Vec<f64>,
    cash_settle_time: f64,
    standard_coupons: Vec<CdsCoupon>,
    terminal_coupons: Vec<CdsCoupon>,
    payment_index: Vec<usize>,
    accrued_yf: f64,
}

/// Everything but the recovery rate and coupons of a [`MultiCdsAnalytic`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProtectionWindow {
    /// Whether accrued premium is paid on default.
    pub pay_accrued_on_default: bool,
    /// Time from which default is covered.
    pub effective_protection_start: f64,
    /// Time PVs are expressed at.
    pub cash_settle_time: f64,
    /// Accrued premium year fraction at step-in.
    pub accrued_yf: f64,
}

impl MultiCdsAnalytic {
    /// Creates a term structure.
    ///
    /// # Arguments
    ///
    /// * `recovery_rate` - Expected recovery, in `[0, 1]`
    /// * `window` - Protection start, settlement and accrual settings
    /// * `protection_ends` - Maturities, strictly ascending
    /// * `standard_coupons` - Coupon schedule of the longest maturity
    /// * `terminal_coupons` - Final coupon of each maturity
    /// * `payment_index` - Number of standard coupons preceding each terminal coupon
    ///
    /// # Errors
    ///
    /// Returns an error if the maturities are empty or not ascending, the
    /// per-maturity vectors differ in length, or a payment index is out of
    /// range or decreasing.
    pub fn new(
        recovery_rate: f64,
        window: ProtectionWindow,
        protection_ends: Vec<f64>,
        standard_coupons: Vec<CdsCoupon>,
        terminal_coupons: Vec<CdsCoupon>,
        payment_index: Vec<usize>,
    ) -> CdsResult<Self> {
        check_recovery(recovery_rate)?;
        check_finite(&[
            (window.effective_protection_start, "effective protection start"),
            (window.cash_settle_time, "cash settlement time"),
            (window.accrued_yf, "accrued year fraction"),
        ])?;
        check_accrued(window.accrued_yf)?;
        if protection_ends.is_empty() {
            return Err(CdsError::invalid_input("no maturities"));
        }
        if terminal_coupons.len() != protection_ends.len()
            || payment_index.len() != protection_ends.len()
        {
            return Err(CdsError::invalid_input(format!(
                "{} maturities but {} terminal coupons and {} payment indices",
                protection_ends.len(),
                terminal_coupons.len(),
                payment_index.len()
            )));
        }
        if let Some(i) = protection_ends.iter().position(|t| !t.is_finite()) {
            return Err(CdsError::invalid_input(format!(
                "protection end {i} is not finite"
            )));
        }
        if let Some(i) = protection_ends.windows(2).position(|w| w[1] <= w[0]) {
            return Err(CdsError::invalid_input(format!(
                "protection ends must be strictly ascending (index {})",
                i + 1
            )));
        }
        check_coupons_ascending(&standard_coupons)?;
        if let Some(&idx) = payment_index.iter().find(|&&k| k > standard_coupons.len()) {
            return Err(CdsError::invalid_input(format!(
                "payment index {idx} exceeds {} standard coupons",
                standard_coupons.len()
            )));
        }
        if payment_index.windows(2).any(|w| w[1] < w[0]) {
            return Err(CdsError::invalid_input(
                "payment indices must be non-decreasing",
            ));
        }
        Ok(Self {
            lgd: 1.0 - recovery_rate,
            pay_accrued_on_default: window.pay_accrued_on_default,
            effective_protection_start: window.effective_protection_start,
            protection_ends,
            cash_settle_time: window.cash_settle_time,
            standard_coupons,
            terminal_coupons,
            payment_index,
            accrued_yf: window.accrued_yf,
        })
    }

    /// Loss given default.
    #[must_use]
    pub fn lgd(&self) -> f64 {
        self.lgd
    }

    /// Expected recovery rate.
    #[must_use]
    pub fn recovery_rate(&self) -> f64 {
        1.0 - self.lgd
    }

    /// Whether accrued premium is paid on default.
    #[must_use]
    pub fn pay_accrued_on_default(&self) -> bool {
        self.pay_accrued_on_default
    }

    /// Shared effective protection start.
    #[must_use]
    pub fn effective_protection_start(&self) -> f64 {
        self.effective_protection_start
    }

    /// Number of maturities.
    #[must_use]
    pub fn num_maturities(&self) -> usize {
        self.protection_ends.len()
    }

    /// Protection end of each maturity.
    #[must_use]
    pub fn protection_ends(&self) -> &[f64] {
        &self.protection_ends
    }

    /// Time PVs are expressed at.
    #[must_use]
    pub fn cash_settle_time(&self) -> f64 {
        self.cash_settle_time
    }

    /// Coupon schedule of the longest maturity.
    #[must_use]
    pub fn standard_coupons(&self) -> &[CdsCoupon] {
        &self.standard_coupons
    }

    /// Terminal coupon of each maturity.
    #[must_use]
    pub fn terminal_coupons(&self) -> &[CdsCoupon] {
        &self.terminal_coupons
    }

    /// Number of standard coupons paid before maturity `index`'s terminal coupon.
    #[must_use]
    pub fn payment_index(&self, index: usize) -> Option<usize> {
        self.payment_index.get(index).copied()
    }

    /// Payment indices of all maturities.
    #[must_use]
    pub fn payment_indices(&self) -> &[usize] {
        &self.payment_index
    }

    /// Shared accrued premium year fraction.
    #[must_use]
    pub fn accrued_yf(&self) -> f64 {
        self.accrued_yf
    }

    /// True when maturity `index` has no protection left.
    #[must_use]
    pub fn is_expired(&self, index: usize) -> bool {
        self.protection_ends
            .get(index)
            .map_or(true, |&end| end <= self.effective_protection_start.max(0.0))
    }

    /// Extracts maturity `index` as a single CDS.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range.
    pub fn cds(&self, index: usize) -> CdsResult<CdsAnalytic> {
        let n = self.num_maturities();
        if index >= n {
            return Err(CdsError::invalid_input(format!(
                "maturity index {index} out of range for {n} maturities"
            )));
        }
        let paid = self.payment_index[index];
        let mut coupons = Vec::with_capacity(paid + 1);
        coupons.extend_from_slice(&self.standard_coupons[..paid]);
        coupons.push(self.terminal_coupons[index]);
        CdsAnalytic::new(
            self.recovery_rate(),
            self.pay_accrued_on_default,
            self.effective_protection_start,
            self.protection_ends[index],
            self.cash_settle_time,
            coupons,
            self.accrued_yf,
        )
    }

    /// Extracts every maturity as a single CDS.
    pub fn to_cds_vec(&self) -> CdsResult<Vec<CdsAnalytic>> {
        (0..self.num_maturities()).map(|i| self.cds(i)).collect()
    }

    /// Returns a copy with a different recovery rate.
    pub fn with_recovery_rate(&self, recovery_rate: f64) -> CdsResult<Self> {
        check_recovery(recovery_rate)?;
        Ok(Self {
            lgd: 1.0 - recovery_rate,
            ..self.clone()
        })
    }
}

#[derive(Serialize, Deserialize)]
struct MultiCdsAnalyticRepr {
    recovery_rate: f64,
    pay_accrued_on_default: bool,
    effective_protection_start: f64,
    protection_ends: Vec<f64>,
    cash_settle_time: f64,
    standard_coupons: Vec<CdsCoupon>,
    terminal_coupons: Vec<CdsCoupon>,
    payment_index: Vec<usize>,
    accrued_yf: f64,
}

impl TryFrom<MultiCdsAnalyticRepr> for MultiCdsAnalytic {
    type Error = CdsError;

    fn try_from(repr: MultiCdsAnalyticRepr) -> CdsResult<Self> {
        Self::new(
            repr.recovery_rate,
            ProtectionWindow {
                pay_accrued_on_default: repr.pay_accrued_on_default,
                effective_protection_start: repr.effective_protection_start,
                cash_settle_time: repr.cash_settle_time,
                accrued_yf: repr.accrued_yf,
            },
            repr.protection_ends,
            repr.standard_coupons,
            repr.terminal_coupons,
            repr.payment_index,
        )
    }
}

impl From<MultiCdsAnalytic> for MultiCdsAnalyticRepr {
    fn from(multi: MultiCdsAnalytic) -> Self {
        Self {
            recovery_rate: multi.recovery_rate(),
            pay_accrued_on_default: multi.pay_accrued_on_default,
            effective_protection_start: multi.effective_protection_start,
            protection_ends: multi.protection_ends,
            cash_settle_time: multi.cash_settle_time,
            standard_coupons: multi.standard_coupons,
            terminal_coupons: multi.terminal_coupons,
            payment_index: multi.payment_index,
            accrued_yf: multi.accrued_yf,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn quarterly(n: usize) -> Vec<CdsCoupon> {
        (0..n)
            .map(|i| {
                let s = 0.25 * i as f64;
                CdsCoupon::new(s, s + 0.25, s + 0.25, 0.25).unwrap()
            })
            .collect()
    }

    fn window() -> ProtectionWindow {
        ProtectionWindow {
            pay_accrued_on_default: true,
            effective_protection_start: 0.0,
            cash_settle_time: 0.0,
            accrued_yf: 0.0,
        }
    }

    #[test]
    fn test_validation() {
        assert!(CdsAnalytic::new(1.2, true, 0.0, 1.0, 0.0, quarterly(4), 0.0).is_err());
        assert!(CdsAnalytic::new(0.4, true, 0.0, f64::NAN, 0.0, quarterly(4), 0.0).is_err());
        assert!(CdsAnalytic::new(0.4, true, 0.0, 1.0, 0.0, quarterly(4), -0.1).is_err());

        let mut reversed = quarterly(4);
        reversed.reverse();
        assert!(CdsAnalytic::new(0.4, true, 0.0, 1.0, 0.0, reversed, 0.0).is_err());
    }

    #[test]
    fn test_expiry() {
        let live = CdsAnalytic::new(0.4, true, 0.0, 1.0, 0.0, quarterly(4), 0.0).unwrap();
        assert!(!live.is_expired());
        let matured = CdsAnalytic::new(0.4, true, 0.0, 0.0, 0.0, vec![], 0.0).unwrap();
        assert!(matured.is_expired());
        let shifted = live.with_offset(1.5);
        assert!(shifted.is_expired());
        assert_relative_eq!(shifted.protection_end(), -0.5);
    }

    #[test]
    fn test_recovery() {
        let cds = CdsAnalytic::new(0.4, true, 0.0, 1.0, 0.0, quarterly(4), 0.0).unwrap();
        let cds = cds.with_recovery_rate(0.25).unwrap();
        assert_relative_eq!(cds.lgd(), 0.75);
        assert!(cds.with_recovery_rate(-0.1).is_err());
    }

    #[test]
    fn test_multi_extracts_single() {
        let standard = quarterly(8);
        let terminal = vec![standard[3], standard[7]];
        let multi = MultiCdsAnalytic::new(
            0.4,
            window(),
            vec![1.0, 2.0],
            standard.clone(),
            terminal,
            vec![3, 7],
        )
        .unwrap();

        let first = multi.cds(0).unwrap();
        assert_eq!(first.coupons(), &standard[..4]);
        assert_relative_eq!(first.protection_end(), 1.0);
        let second = multi.cds(1).unwrap();
        assert_eq!(second.coupons(), &standard[..]);
        assert!(multi.cds(2).is_err());
        assert_eq!(multi.to_cds_vec().unwrap().len(), 2);
    }

    #[test]
    fn test_multi_validation() {
        let standard = quarterly(8);
        let terminal = vec![standard[3], standard[7]];
        let build = |ends: Vec<f64>, index: Vec<usize>| {
            MultiCdsAnalytic::new(
                0.4,
                window(),
                ends,
                standard.clone(),
                terminal.clone(),
                index,
            )
        };
        assert!(build(vec![2.0, 1.0], vec![3, 7]).is_err());
        assert!(build(vec![1.0, 2.0], vec![3]).is_err());
        assert!(build(vec![1.0, 2.0], vec![3, 9]).is_err());
        assert!(build(vec![1.0, 2.0], vec![7, 3]).is_err());
        assert!(build(vec![], vec![]).is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let cds = CdsAnalytic::new(0.4, false, 0.0, 1.0, 0.01, quarterly(4), 0.05).unwrap();
        let json = serde_json::to_string(&cds).unwrap();
        let back: CdsAnalytic = serde_json::from_str(&json).unwrap();
        assert_eq!(back.coupons(), cds.coupons());
        assert_relative_eq!(back.lgd(), cds.lgd(), epsilon = 1e-15);
        assert!(!back.pay_accrued_on_default());
    }
}
