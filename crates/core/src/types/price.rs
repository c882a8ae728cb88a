//! Type-safe price representation using decimal arithmetic.
//!
//! QKart prices are plain numbers in a single currency, so unlike a
//! multi-currency store there is no currency code: a [`Price`] is a
//! non-negative decimal amount rendered with a dollar sign.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monetary amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero dollars.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of dollars.
    #[must_use]
    pub fn from_dollars(dollars: i64) -> Self {
        Self(Decimal::from(dollars))
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Subtract another price, returning `None` if the result would be negative.
    #[must_use]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        let remaining = self.0.checked_sub(other.0)?;
        (remaining >= Decimal::ZERO).then_some(Self(remaining))
    }
}

impl fmt::Display for Price {
    /// Formats as `$<amount>` without trailing zeros, e.g. `$100` or `$12.5`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0.normalize())
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, qty: u32) -> Self::Output {
        Self(self.0 * Decimal::from(qty))
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

    #[test]
    fn test_display_drops_trailing_zeros() {
        assert_eq!(Price::from_dollars(100).to_string(), "$100");
        assert_eq!(Price::new(Decimal::new(1250, 2)).to_string(), "$12.5");
    }

    #[test]
    fn test_deserialize_from_json_number() {
        let price: Price = serde_json::from_str("100").unwrap();
        assert_eq!(price, Price::from_dollars(100));
    }

    #[test]
    fn test_line_arithmetic() {
        let total: Price = [Price::from_dollars(100) * 3, Price::from_dollars(50) * 1]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_dollars(350));
    }

    #[test]
    fn test_checked_sub_rejects_negative() {
        let balance = Price::from_dollars(5000);
        assert_eq!(
            balance.checked_sub(Price::from_dollars(350)),
            Some(Price::from_dollars(4650))
        );
        assert_eq!(Price::from_dollars(10).checked_sub(Price::from_dollars(11)), None);
    }
}
