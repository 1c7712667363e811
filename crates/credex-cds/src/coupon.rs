//! A single premium period of a CDS, expressed in schedule time.

use serde::{Deserialize, Serialize};

use crate::error::{CdsError, CdsResult};

/// One accrual period of the premium leg.
///
/// Times are year fractions from the valuation date. The effective start and
/// end are the times over which default is observed for this period; they
/// differ from the accrual dates by one day when protection runs from the
/// start of the day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CouponRepr", into = "CouponRepr")]
pub struct CdsCoupon {
    eff_start: f64,
    eff_end: f64,
    payment_time: f64,
    year_fraction: f64,
    yf_ratio: f64,
}

impl CdsCoupon {
    /// Creates a coupon.
    ///
    /// # Arguments
    ///
    /// * `eff_start` - Effective start of the period
    /// * `eff_end` - Effective end of the period
    /// * `payment_time` - Time the coupon is paid
    /// * `year_fraction` - Accrual year fraction under the premium day count
    ///
    /// # Errors
    ///
    /// Returns an error if `eff_end <= eff_start`, the year fraction is
    /// negative, the payment precedes the effective start, or any input is
    /// not finite.
    pub fn new(
        eff_start: f64,
        eff_end: f64,
        payment_time: f64,
        year_fraction: f64,
    ) -> CdsResult<Self> {
        if ![eff_start, eff_end, payment_time, year_fraction]
            .iter()
            .all(|x| x.is_finite())
        {
            return Err(CdsError::invalid_input("coupon times must be finite"));
        }
        if eff_end <= eff_start {
            return Err(CdsError::invalid_input(format!(
                "coupon effective end {eff_end} must be after effective start {eff_start}"
            )));
        }
        if year_fraction < 0.0 {
            return Err(CdsError::invalid_input(format!(
                "coupon year fraction must be non-negative, got {year_fraction}"
            )));
        }
        if payment_time < eff_start {
            return Err(CdsError::invalid_input(format!(
                "coupon payment {payment_time} precedes effective start {eff_start}"
            )));
        }
        Ok(Self {
            eff_start,
            eff_end,
            payment_time,
            year_fraction,
            yf_ratio: year_fraction / (eff_end - eff_start),
        })
    }

    /// Effective start of the period.
    #[must_use]
    pub fn eff_start(&self) -> f64 {
        self.eff_start
    }

    /// Effective end of the period.
    #[must_use]
    pub fn eff_end(&self) -> f64 {
        self.eff_end
    }

    /// Payment time.
    #[must_use]
    pub fn payment_time(&self) -> f64 {
        self.payment_time
    }

    /// Accrual year fraction.
    #[must_use]
    pub fn year_fraction(&self) -> f64 {
        self.year_fraction
    }

    /// Ratio of accrual year fraction to the effective period length.
    ///
    /// Converts time elapsed within the period into accrued premium.
    #[must_use]
    pub fn yf_ratio(&self) -> f64 {
        self.yf_ratio
    }

    /// Returns the coupon seen from a valuation time `offset` years later.
    ///
    /// The year fraction and ratio are unchanged.
    #[must_use]
    pub fn with_offset(&self, offset: f64) -> Self {
        Self {
            eff_start: self.eff_start - offset,
            eff_end: self.eff_end - offset,
            payment_time: self.payment_time - offset,
            ..*self
        }
    }
}

/// Serialized form; the ratio is recomputed on the way in.
#[derive(Serialize, Deserialize)]
struct CouponRepr {
    eff_start: f64,
    eff_end: f64,
    payment_time: f64,
    year_fraction: f64,
}

impl TryFrom<CouponRepr> for CdsCoupon {
    type Error = CdsError;

    fn try_from(repr: CouponRepr) -> CdsResult<Self> {
        Self::new(
            repr.eff_start,
            repr.eff_end,
            repr.payment_time,
            repr.year_fraction,
        )
    }
}

impl From<CdsCoupon> for CouponRepr {
    fn from(coupon: CdsCoupon) -> Self {
        Self {
            eff_start: coupon.eff_start,
            eff_end: coupon.eff_end,
            payment_time: coupon.payment_time,
            year_fraction: coupon.year_fraction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ratio() {
        let c = CdsCoupon::new(0.0, 0.25, 0.25, 0.25 * 365.0 / 360.0).unwrap();
        assert_relative_eq!(c.yf_ratio(), 365.0 / 360.0, epsilon = 1e-14);
    }

    #[test]
    fn test_validation() {
        assert!(CdsCoupon::new(0.25, 0.25, 0.3, 0.25).is_err());
        assert!(CdsCoupon::new(0.25, 0.5, 0.5, -0.1).is_err());
        assert!(CdsCoupon::new(0.25, 0.5, 0.2, 0.25).is_err());
        assert!(CdsCoupon::new(0.25, f64::NAN, 0.5, 0.25).is_err());
        // Periods may start before the valuation date
        assert!(CdsCoupon::new(-0.1, 0.15, 0.15, 0.25).is_ok());
    }

    #[test]
    fn test_offset() {
        let c = CdsCoupon::new(0.0, 0.25, 0.26, 0.25).unwrap();
        let shifted = c.with_offset(0.1);
        assert_relative_eq!(shifted.eff_start(), -0.1);
        assert_relative_eq!(shifted.payment_time(), 0.16);
        assert_eq!(shifted.year_fraction(), c.year_fraction());
        assert_eq!(shifted.yf_ratio(), c.yf_ratio());
    }

    #[test]
    fn test_serde_revalidates() {
        let c = CdsCoupon::new(0.0, 0.25, 0.25, 0.25).unwrap();
        let json = serde_json::to_string(&c).unwrap();
        assert!(!json.contains("yf_ratio"));
        let back: CdsCoupon = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);

        let bad = r#"{"eff_start":0.5,"eff_end":0.25,"payment_time":0.5,"year_fraction":0.25}"#;
        assert!(serde_json::from_str::<CdsCoupon>(bad).is_err());
    }
}
