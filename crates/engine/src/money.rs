use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};

/// Signed money amount represented as **integer minor units** (cents).
///
/// Every monetary value in the engine (debit, credit, amount, closing
/// balance, charges) uses this type, so balance replays are exact integer
/// arithmetic. Rounding happens once, when wire input is coerced (see
/// [`crate::coerce`]).
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// let amount = Money::new(12_34);
/// assert_eq!(amount.minor(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
///
/// A single amount never exceeds [`Money::MAX`] in magnitude, so a balance
/// only overflows after thousands of maximal entries. Balance replays use the
/// checked operations and report that case instead of wrapping.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);
    /// Largest accepted magnitude of one amount (10^13 units).
    pub const MAX: Money = Money(1_000_000_000_000_000);

    /// Creates a new amount from integer minor units.
    #[must_use]
    pub const fn new(minor: i64) -> Self {
        Self(minor)
    }

    /// Returns the raw value in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Whether the magnitude is at most [`Money::MAX`].
    #[must_use]
    pub const fn is_within_limit(self) -> bool {
        self.0.unsigned_abs() <= Self::MAX.0.unsigned_abs()
    }

    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    #[must_use]
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    #[must_use]
    pub fn checked_neg(self) -> Option<Money> {
        self.0.checked_neg().map(Money)
    }

    /// Multiplies a per-unit price by a (possibly fractional) quantity,
    /// rounding half away from zero to the nearest minor unit.
    #[must_use]
    pub fn times_quantity(self, quantity: f64) -> Money {
        let product = (self.0 as f64 * quantity).round();
        if product.is_finite() {
            Money(product as i64)
        } else {
            Money::ZERO
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_two_decimals() {
        assert_eq!(Money::new(0).to_string(), "0.00");
        assert_eq!(Money::new(1).to_string(), "0.01");
        assert_eq!(Money::new(1050).to_string(), "10.50");
        assert_eq!(Money::new(-1050).to_string(), "-10.50");
    }

    #[test]
    fn times_quantity_rounds_to_minor_units() {
        assert_eq!(Money::new(250).times_quantity(3.0), Money::new(750));
        assert_eq!(Money::new(333).times_quantity(0.5), Money::new(167));
        assert_eq!(Money::new(100).times_quantity(f64::NAN), Money::ZERO);
    }

    #[test]
    fn checked_ops_detect_overflow() {
        let big = Money::new(i64::MAX - 1);
        assert_eq!(big.checked_add(Money::new(1)), Some(Money::new(i64::MAX)));
        assert_eq!(big.checked_add(Money::new(2)), None);
        assert_eq!(Money::new(i64::MIN).checked_sub(Money::new(1)), None);
        assert_eq!(Money::new(i64::MIN).checked_neg(), None);
    }

    #[test]
    fn limit_is_symmetric() {
        assert!(Money::MAX.is_within_limit());
        assert!((-Money::MAX).is_within_limit());
        assert!(!Money::new(Money::MAX.minor() + 1).is_within_limit());
        assert!(!Money::new(i64::MIN).is_within_limit());
    }

    #[test]
    fn sums_amounts() {
        let total: Money = [Money::new(100), Money::new(-30), Money::new(5)]
            .into_iter()
            .sum();
        assert_eq!(total, Money::new(75));
    }
}
