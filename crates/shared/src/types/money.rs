//! Money type with decimal precision and currency.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! This type wraps `rust_decimal::Decimal` for arbitrary precision.
//!
//! Raw strings coming from a form are turned into `Money` only through
//! [`Money::parse`]; nothing downstream ever sees the original text.

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest scale representable by `Decimal`.
const MAX_SCALE: u32 = 28;

/// Three-letter currency code (ISO 4217 shaped), always uppercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode([u8; 3]);

/// A currency code that is not exactly three ASCII letters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid currency code: {0:?}")]
pub struct InvalidCurrencyCode(pub String);

impl CurrencyCode {
    /// Parses and normalizes a currency code.
    pub fn new(code: &str) -> Result<Self, InvalidCurrencyCode> {
        let trimmed = code.trim();
        match trimmed.as_bytes() {
            [a, b, c] if trimmed.bytes().all(|byte| byte.is_ascii_alphabetic()) => Ok(Self([
                a.to_ascii_uppercase(),
                b.to_ascii_uppercase(),
                c.to_ascii_uppercase(),
            ])),
            _ => Err(InvalidCurrencyCode(code.to_string())),
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{}", char::from(byte))?;
        }
        Ok(())
    }
}

impl FromStr for CurrencyCode {
    type Err = InvalidCurrencyCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = InvalidCurrencyCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.to_string()
    }
}

/// Rounding rule applied when an amount or rate must lose precision.
///
/// The rule is chosen once (configuration) and applied consistently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Round half away from zero (2.5 -> 3, 2.25 -> 2.3).
    #[default]
    HalfUp,
    /// Banker's rounding, round half to even (2.5 -> 2, 3.5 -> 4).
    HalfEven,
}

impl RoundingMode {
    /// Returns the matching `rust_decimal` strategy.
    #[must_use]
    pub const fn strategy(self) -> RoundingStrategy {
        match self {
            Self::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            Self::HalfEven => RoundingStrategy::MidpointNearestEven,
        }
    }

    /// Rounds `value` to `decimal_places` using this mode.
    #[must_use]
    pub fn round(self, value: Decimal, decimal_places: u32) -> Decimal {
        value.round_dp_with_strategy(decimal_places, self.strategy())
    }
}

/// Reasons an amount string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountParseError {
    /// Not a plain decimal number.
    #[error("'{0}' is not a valid amount")]
    Malformed(String),

    /// Amounts must be non-negative.
    #[error("'{0}' is negative")]
    Negative(String),

    /// More fractional digits than the currency allows.
    #[error("'{value}' has {found} decimal places, at most {max} allowed")]
    TooManyDecimalPlaces {
        /// The offending input.
        value: String,
        /// Allowed decimal places.
        max: u32,
        /// Decimal places present in the input.
        found: u32,
    },

    /// Does not fit in a 96-bit decimal.
    #[error("'{0}' is too large")]
    Overflow(String),
}

/// Errors from arithmetic between two `Money` values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// Operands are in different currencies.
    #[error("Cannot combine {left} with {right} without conversion")]
    CurrencyMismatch {
        /// Currency of the left operand.
        left: CurrencyCode,
        /// Currency of the right operand.
        right: CurrencyCode,
    },

    /// Result does not fit in a decimal.
    #[error("Money arithmetic overflowed")]
    Overflow,
}

/// Represents a monetary amount with currency.
///
/// Uses `Decimal` internally to avoid floating-point precision errors.
/// There is deliberately no `Add`/`Sub` impl: combining two amounts goes
/// through [`Money::checked_add`] / [`Money::checked_sub`], which refuse
/// to mix currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// The decimal amount.
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    /// Currency code (e.g., "USD", "AED").
    pub currency: CurrencyCode,
}

impl Money {
    /// Creates a new Money instance.
    #[must_use]
    pub const fn new(amount: Decimal, currency: CurrencyCode) -> Self {
        Self { amount, currency }
    }

    /// Creates a zero amount in the specified currency.
    #[must_use]
    pub const fn zero(currency: CurrencyCode) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }

    /// Parses a non-negative amount as typed into a form.
    ///
    /// Accepts `123` or `123.45` (surrounding whitespace ignored). A blank
    /// field is zero. Signs, exponents, thousands separators, and a bare
    /// leading or trailing `.` are rejected, as is any input with more than
    /// `decimal_places` fractional digits. `decimal_places` is capped at 28,
    /// the largest scale a `Decimal` can hold.
    pub fn parse(
        input: &str,
        currency: CurrencyCode,
        decimal_places: u32,
    ) -> Result<Self, AmountParseError> {
        let value = input.trim();
        if value.is_empty() {
            return Ok(Self::zero(currency));
        }
        if value.starts_with('-') {
            return Err(AmountParseError::Negative(value.to_string()));
        }

        let (whole, fraction) = match value.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (value, None),
        };
        let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(whole) || fraction.is_some_and(|f| !all_digits(f)) {
            return Err(AmountParseError::Malformed(value.to_string()));
        }

        let max = decimal_places.min(MAX_SCALE);
        let found = fraction.map_or(0, |f| u32::try_from(f.len()).unwrap_or(u32::MAX));
        if found > max {
            return Err(AmountParseError::TooManyDecimalPlaces {
                value: value.to_string(),
                max,
                found,
            });
        }

        let amount = Decimal::from_str_exact(value)
            .map_err(|_| AmountParseError::Overflow(value.to_string()))?;
        Ok(Self { amount, currency })
    }

    /// Adds two amounts of the same currency.
    pub fn checked_add(&self, other: &Self) -> Result<Self, MoneyError> {
        self.ensure_same_currency(other)?;
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or(MoneyError::Overflow)?;
        Ok(Self::new(amount, self.currency))
    }

    /// Subtracts `other` from `self`; both must share a currency.
    pub fn checked_sub(&self, other: &Self) -> Result<Self, MoneyError> {
        self.ensure_same_currency(other)?;
        let amount = self
            .amount
            .checked_sub(other.amount)
            .ok_or(MoneyError::Overflow)?;
        Ok(Self::new(amount, self.currency))
    }

    /// Rounds the amount to `decimal_places` with the given mode.
    #[must_use]
    pub fn round(&self, decimal_places: u32, mode: RoundingMode) -> Self {
        Self::new(mode.round(self.amount, decimal_places), self.currency)
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns true if the amount is strictly greater than zero.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    fn ensure_same_currency(&self, other: &Self) -> Result<(), MoneyError> {
        if self.currency == other.currency {
            Ok(())
        } else {
            Err(MoneyError::CurrencyMismatch {
                left: self.currency,
                right: other.currency,
            })
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}
