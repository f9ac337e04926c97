//! Journal balance validation and posting.
//!
//! This module implements:
//! - Journal entry and line types as submitted by forms
//! - Exact-decimal balance validation
//! - Posting balanced drafts into immutable entries
//! - Multi-currency validation through a currency registry

pub mod error;
pub mod service;
pub mod types;
pub mod validation;

#[cfg(test)]
mod validation_props;

pub use error::LedgerError;
pub use types::{
    EntryStatus, JournalEntry, JournalLine, PostedJournalEntry, PostedLine, ReferenceType,
    ValidationResult, ValidationWarning,
};
pub use validation::JournalValidator;
