//! Amount - Non-negative decimal value held by or moved out of an account
//!
//! Balances and withdrawal amounts can never be negative; the constructor
//! enforces it so the rest of the workspace does not have to.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when building an amount
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Amount cannot be negative: {0}")]
    NegativeAmount(Decimal),

    #[error("Invalid amount: {0}")]
    Invalid(String),
}

/// A non-negative decimal amount.
///
/// # Example
/// ```
/// use coffer_core::Amount;
/// use rust_decimal::Decimal;
///
/// let deposit = Amount::new(Decimal::new(1000, 0)).unwrap();
/// let payout = Amount::from_units(10);
/// assert_eq!(deposit.checked_sub(&payout), Some(Amount::from_units(990)));
///
/// assert!(Amount::new(Decimal::new(-1, 0)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new Amount, rejecting negative values.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value.is_sign_negative() && !value.is_zero() {
            Err(AmountError::NegativeAmount(value))
        } else {
            Ok(Self(value))
        }
    }

    /// Whole units, the common case for deposits and withdrawals.
    pub fn from_units(units: u64) -> Self {
        Self(Decimal::from(units))
    }

    #[inline]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns None on decimal overflow
    pub fn checked_add(&self, other: &Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// Returns None if the result would be negative
    pub fn checked_sub(&self, other: &Amount) -> Option<Amount> {
        if other.0 > self.0 {
            return None;
        }
        self.0.checked_sub(other.0).map(Amount)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value =
            Decimal::from_str(s.trim()).map_err(|_| AmountError::Invalid(s.to_string()))?;
        Self::new(value)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl Default for Amount {
    fn default() -> Self {
        Self::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_rejected() {
        let result = Amount::new(Decimal::new(-5, 0));
        assert!(matches!(result, Err(AmountError::NegativeAmount(_))));
    }

    #[test]
    fn test_negative_zero_is_zero() {
        let amount = Amount::new(Decimal::new(-0, 2)).unwrap();
        assert!(amount.is_zero());
    }

    #[test]
    fn test_checked_sub_never_goes_negative() {
        let balance = Amount::from_units(10);
        assert!(balance.checked_sub(&Amount::from_units(11)).is_none());
        assert_eq!(
            balance.checked_sub(&Amount::from_units(10)),
            Some(Amount::ZERO)
        );
    }

    #[test]
    fn test_parse() {
        let amount: Amount = " 12.50 ".parse().unwrap();
        assert_eq!(amount.value(), Decimal::new(1250, 2));

        assert!(matches!("-3".parse::<Amount>(), Err(AmountError::NegativeAmount(_))));
        assert!(matches!("ten".parse::<Amount>(), Err(AmountError::Invalid(_))));
    }

    #[test]
    fn test_serialized_as_string() {
        let json = serde_json::to_string(&Amount::from_units(30000)).unwrap();
        assert_eq!(json, "\"30000\"");

        let rejected: Result<Amount, _> = serde_json::from_str("\"-1\"");
        assert!(rejected.is_err());
    }
}
