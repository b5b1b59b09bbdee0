//! Rupee amounts using decimal arithmetic.
//!
//! The backend sends prices as plain JSON numbers (`1299`, `649.5`). They are
//! held as [`Decimal`] so cart totals do not accumulate float error.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// An amount in Indian rupees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(serialize_with = "rust_decimal::serde::float::serialize")] Decimal);

impl Price {
    /// Zero rupees.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from whole rupees.
    #[must_use]
    pub fn from_rupees(rupees: i64) -> Self {
        Self(Decimal::from(rupees))
    }

    /// The underlying amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Round to whole rupees, halves away from zero.
    #[must_use]
    pub fn rounded(self) -> Self {
        Self(self.0.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Subtract, clamping at zero.
    #[must_use]
    pub fn saturating_sub(self, other: Self) -> Self {
        Self((self.0 - other.0).max(Decimal::ZERO))
    }

    /// `self - other`, or `None` on overflow.
    #[must_use]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Multiply by a quantity.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Largest whole rupee amount not above this price.
    #[must_use]
    pub fn floor(self) -> i64 {
        self.0.floor().to_i64().unwrap_or_default()
    }

    /// Smallest whole rupee amount not below this price.
    #[must_use]
    pub fn ceil(self) -> i64 {
        self.0.ceil().to_i64().unwrap_or_default()
    }

    /// Amount in paise, as payment gateways expect. Negative amounts give 0.
    #[must_use]
    pub fn to_paise(self) -> u64 {
        (self.0 * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u64()
            .unwrap_or_default()
    }

    /// Format for display with Indian digit grouping (e.g. `₹1,29,999`).
    ///
    /// Whole amounts print without decimals, fractional ones with two.
    #[must_use]
    pub fn display(&self) -> String {
        let negative = self.0.is_sign_negative() && !self.0.is_zero();
        let abs = self.0.abs();
        let whole = abs.trunc();
        let fraction = abs - whole;

        let digits = whole.to_string();
        let mut out = String::with_capacity(digits.len() + 8);
        if negative {
            out.push('-');
        }
        out.push('₹');
        out.push_str(&group_indian(&digits));

        if !fraction.is_zero() {
            let cents = (fraction * Decimal::ONE_HUNDRED)
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_u32()
                .unwrap_or_default();
            out.push_str(&format!(".{cents:02}"));
        }
        out
    }
}

/// Insert separators: last three digits, then pairs (`12,34,567`).
fn group_indian(digits: &str) -> String {
    let len = digits.len();
    if len <= 3 {
        return digits.to_owned();
    }
    let (head, tail) = digits.split_at(len - 3);
    let mut grouped = String::with_capacity(len + len / 2);
    let offset = head.len() % 2;
    for (i, c) in head.chars().enumerate() {
        if i > 0 && (i + 2 - offset) % 2 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped.push(',');
    grouped.push_str(tail);
    grouped
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self {
        self.times(rhs)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn price(s: &str) -> Price {
        Price::new(s.parse().unwrap())
    }

    #[test]
    fn test_display_indian_grouping() {
        assert_eq!(price("0").display(), "₹0");
        assert_eq!(price("999").display(), "₹999");
        assert_eq!(price("1299").display(), "₹1,299");
        assert_eq!(price("129999").display(), "₹1,29,999");
        assert_eq!(price("1234567").display(), "₹12,34,567");
        assert_eq!(price("12345678").display(), "₹1,23,45,678");
    }

    #[test]
    fn test_display_fraction() {
        assert_eq!(price("649.5").display(), "₹649.50");
        assert_eq!(price("1000.05").display(), "₹1,000.05");
    }

    #[test]
    fn test_rounded_half_up() {
        assert_eq!(price("10.5").rounded(), price("11"));
        assert_eq!(price("10.49").rounded(), price("10"));
        assert_eq!(price("0.5").rounded(), price("1"));
    }

    #[test]
    fn test_saturating_sub_clamps() {
        assert_eq!(price("100").saturating_sub(price("150")), Price::ZERO);
        assert_eq!(price("150").saturating_sub(price("100")), price("50"));
    }

    #[test]
    fn test_to_paise() {
        assert_eq!(price("1299").to_paise(), 129_900);
        assert_eq!(price("649.5").to_paise(), 64_950);
        assert_eq!(price("-5").to_paise(), 0);
    }

    #[test]
    fn test_deserialize_from_number() {
        let p: Price = serde_json::from_str("1299").unwrap();
        assert_eq!(p, price("1299"));

        let p: Price = serde_json::from_str("649.5").unwrap();
        assert_eq!(p, price("649.5"));
    }

    #[test]
    fn test_serialize_as_number() {
        assert_eq!(serde_json::to_string(&price("1299")).unwrap(), "1299.0");
    }

    #[test]
    fn test_sum_and_times() {
        let total: Price = [price("100"), price("250.5")].into_iter().sum();
        assert_eq!(total, price("350.5"));
        assert_eq!(price("99") * 3, price("297"));
    }

    #[test]
    fn test_floor_ceil() {
        assert_eq!(price("499.2").floor(), 499);
        assert_eq!(price("499.2").ceil(), 500);
    }
}
