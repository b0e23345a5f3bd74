//! Prices

use std::ops::Deref;

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

/// Errors raised when converting a decimal amount into a [`Price`].
#[derive(Debug, Error, PartialEq)]
pub enum PriceError {
    /// Prices cannot be negative.
    #[error("price {0} is negative")]
    Negative(Decimal),

    /// The amount does not fit in minor units.
    #[error("price {0} is out of range")]
    OutOfRange(Decimal),
}

/// Represents a price in centavos/cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price {
    value: u64,
}

impl Price {
    /// Zero price.
    pub const ZERO: Price = Price { value: 0 };

    /// Creates a new Price from minor units.
    pub const fn new(value: u64) -> Self {
        Price { value }
    }

    /// Creates a price from a major-unit decimal amount (e.g. `49.9`), rounded to the minor unit.
    ///
    /// # Errors
    ///
    /// Returns a [`PriceError`] if the amount is negative or too large.
    pub fn from_decimal(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }

        let minor = amount
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or(PriceError::OutOfRange(amount))?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u64()
            .ok_or(PriceError::OutOfRange(amount))?;

        Ok(Price::new(minor))
    }

    /// Price multiplied by a quantity, saturating at the maximum.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Price::new(self.value.saturating_mul(u64::from(quantity)))
    }

    /// Convert to money in the given currency.
    pub fn to_money(self, currency: &'static Currency) -> Money<'static, Currency> {
        to_money(self.value, currency)
    }
}

impl Deref for Price {
    type Target = u64;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

/// Build money from unsigned minor units, saturating at `i64::MAX`.
pub fn to_money(minor: u64, currency: &'static Currency) -> Money<'static, Currency> {
    Money::from_minor(i64::try_from(minor).unwrap_or(i64::MAX), currency)
}

/// Read money back into unsigned minor units, flooring negatives at zero.
pub fn minor_units(money: &Money<'_, Currency>) -> u64 {
    u64::try_from(money.to_minor_units()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use rust_decimal::prelude::FromPrimitive;
    use rusty_money::iso;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn new_price() {
        let price = Price::new(1000);

        assert_eq!(price.value, 1000);
    }

    #[test]
    fn price_derefs_to_u64() {
        let price = Price { value: 100 };

        assert_eq!(*price, 100);
    }

    #[test]
    fn from_decimal_rounds_to_minor_units() -> TestResult {
        let amount = Decimal::from_f64(49.9).ok_or("not representable")?;

        assert_eq!(Price::from_decimal(amount)?, Price::new(4990));
        assert_eq!(Price::from_decimal(Decimal::new(12345, 3))?, Price::new(1235));

        Ok(())
    }

    #[test]
    fn from_decimal_rejects_negative_amounts() {
        let result = Price::from_decimal(Decimal::new(-1, 0));

        assert_eq!(result, Err(PriceError::Negative(Decimal::new(-1, 0))));
    }

    #[test]
    fn times_saturates() {
        assert_eq!(Price::new(250).times(4), Price::new(1000));
        assert_eq!(Price::new(u64::MAX).times(2), Price::new(u64::MAX));
    }

    #[test]
    fn to_money_uses_currency() {
        let money = Price::new(1990).to_money(iso::MZN);

        assert_eq!(money, Money::from_minor(1990, iso::MZN));
        assert_eq!(minor_units(&money), 1990);
    }
}
