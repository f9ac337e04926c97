//! Ledger error types for journal validation and posting.
//!
//! All of these are local, recoverable validation errors: the caller shows
//! the message and lets the user correct the entry.

use tally_shared::AppError;
use tally_shared::types::{AmountParseError, CurrencyCode, Money, MoneyError};
use thiserror::Error;

use crate::currency::CurrencyError;

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ========== Shape Errors ==========
    /// Journal entry must touch at least two accounts.
    #[error("Journal entry must have at least 2 lines, got {count}")]
    InsufficientLines {
        /// Number of lines supplied.
        count: usize,
    },

    /// Line has no account reference.
    #[error("Line {line} has no account")]
    MissingAccount {
        /// Zero-based line index.
        line: usize,
    },

    // ========== Amount Errors ==========
    /// Debit or credit failed to parse.
    #[error("Line {line} has an invalid amount: {source}")]
    InvalidAmount {
        /// Zero-based line index.
        line: usize,
        /// Why the amount was rejected.
        #[source]
        source: AmountParseError,
    },

    /// Line is denominated in a different currency than the entry.
    #[error("Line {line} is in {found}, entry is in {expected}")]
    CurrencyMismatch {
        /// Zero-based line index.
        line: usize,
        /// The entry currency.
        expected: CurrencyCode,
        /// The line currency.
        found: CurrencyCode,
    },

    /// Line has both a debit and a credit (only under the reject policy).
    #[error("Line {line} has both a debit and a credit")]
    MixedLine {
        /// Zero-based line index.
        line: usize,
    },

    /// Totals overflowed.
    #[error("Amount arithmetic failed: {0}")]
    Money(#[from] MoneyError),

    // ========== Balance Errors ==========
    /// Debits do not equal credits (or both are zero).
    #[error("Journal entry is not balanced: difference {difference}")]
    Unbalanced {
        /// Debit total minus credit total.
        difference: Money,
    },

    // ========== State Errors ==========
    /// Entry is already posted.
    #[error("Journal entry is already posted")]
    AlreadyPosted,

    // ========== Currency Errors ==========
    /// Currency lookup or conversion failed.
    #[error(transparent)]
    Currency(#[from] CurrencyError),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientLines { .. } => "INSUFFICIENT_LINES",
            Self::MissingAccount { .. } => "MISSING_ACCOUNT",
            Self::InvalidAmount { .. } => "INVALID_AMOUNT",
            Self::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
            Self::MixedLine { .. } => "MIXED_LINE",
            Self::Money(_) => "AMOUNT_OVERFLOW",
            Self::Unbalanced { .. } => "UNBALANCED",
            Self::AlreadyPosted => "ALREADY_POSTED",
            Self::Currency(err) => err.error_code(),
        }
    }

    /// Returns the offending line, if the error is about one line.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::MissingAccount { line }
            | Self::InvalidAmount { line, .. }
            | Self::CurrencyMismatch { line, .. }
            | Self::MixedLine { line } => Some(*line),
            _ => None,
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err {
            LedgerError::Currency(inner) => inner.into(),
            LedgerError::Unbalanced { .. }
            | LedgerError::MixedLine { .. }
            | LedgerError::AlreadyPosted => Self::BusinessRule(message),
            LedgerError::InsufficientLines { .. }
            | LedgerError::MissingAccount { .. }
            | LedgerError::InvalidAmount { .. }
            | LedgerError::CurrencyMismatch { .. }
            | LedgerError::Money(_) => Self::Validation(message),
        }
    }
}
