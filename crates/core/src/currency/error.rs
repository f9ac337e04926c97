//! Currency engine error types.

use rust_decimal::Decimal;
use tally_shared::AppError;
use tally_shared::types::CurrencyCode;
use thiserror::Error;

/// Errors that can occur during currency registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurrencyError {
    // ========== Lookup Errors ==========
    /// Currency is not in the registry.
    #[error("Unknown currency: {0}")]
    UnknownCurrency(CurrencyCode),

    /// Currency is already in the registry.
    #[error("Currency {0} is already registered")]
    DuplicateCurrency(CurrencyCode),

    // ========== Rate Errors ==========
    /// Exchange rate must be positive (and exactly 1 for the base).
    #[error("Invalid exchange rate {rate} for {code}")]
    InvalidRate {
        /// The currency being rated.
        code: CurrencyCode,
        /// The rejected rate.
        rate: Decimal,
    },

    /// The base currency's rate is fixed at 1.
    #[error("Cannot change the rate of base currency {0}")]
    CannotRerateBase(CurrencyCode),

    /// Re-basing produced an unrepresentable rate; registry unchanged.
    #[error("Re-basing to {base} failed: rate for {currency} is not representable")]
    RebaseFailed {
        /// The requested new base.
        base: CurrencyCode,
        /// The currency whose rate could not be computed.
        currency: CurrencyCode,
    },

    // ========== Registry Shape Errors ==========
    /// No currency is marked as base.
    #[error("Registry has no base currency")]
    NoBaseCurrency,

    /// More than one currency is marked as base.
    #[error("Registry has more than one base currency: {first} and {second}")]
    MultipleBaseCurrencies {
        /// The base already present.
        first: CurrencyCode,
        /// The second currency claiming to be base.
        second: CurrencyCode,
    },

    /// The base currency cannot be removed.
    #[error("Cannot remove base currency {0}")]
    CannotRemoveBase(CurrencyCode),

    // ========== Conversion Errors ==========
    /// Amount is not denominated in the source currency.
    #[error("Amount is in {found}, expected {expected}")]
    CurrencyMismatch {
        /// The currency the caller said it was converting from.
        expected: CurrencyCode,
        /// The amount's actual currency.
        found: CurrencyCode,
    },

    /// Decimal arithmetic overflowed during conversion.
    #[error("Conversion from {from} to {to} overflowed")]
    ConversionOverflow {
        /// Source currency.
        from: CurrencyCode,
        /// Target currency.
        to: CurrencyCode,
    },
}

impl CurrencyError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownCurrency(_) => "UNKNOWN_CURRENCY",
            Self::DuplicateCurrency(_) => "DUPLICATE_CURRENCY",
            Self::InvalidRate { .. } => "INVALID_RATE",
            Self::CannotRerateBase(_) => "CANNOT_RERATE_BASE",
            Self::RebaseFailed { .. } => "REBASE_FAILED",
            Self::NoBaseCurrency => "NO_BASE_CURRENCY",
            Self::MultipleBaseCurrencies { .. } => "MULTIPLE_BASE_CURRENCIES",
            Self::CannotRemoveBase(_) => "CANNOT_REMOVE_BASE",
            Self::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
            Self::ConversionOverflow { .. } => "CONVERSION_OVERFLOW",
        }
    }
}

impl From<CurrencyError> for AppError {
    fn from(err: CurrencyError) -> Self {
        let message = err.to_string();
        match err {
            CurrencyError::UnknownCurrency(_) => Self::NotFound(message),
            CurrencyError::CannotRerateBase(_)
            | CurrencyError::CannotRemoveBase(_)
            | CurrencyError::RebaseFailed { .. }
            | CurrencyError::ConversionOverflow { .. } => Self::BusinessRule(message),
            CurrencyError::DuplicateCurrency(_)
            | CurrencyError::InvalidRate { .. }
            | CurrencyError::NoBaseCurrency
            | CurrencyError::MultipleBaseCurrencies { .. }
            | CurrencyError::CurrencyMismatch { .. } => Self::Validation(message),
        }
    }
}
