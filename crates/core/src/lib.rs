//! Core bookkeeping logic for Tally.
//!
//! This crate contains pure computations with no I/O: callers own all state
//! and pass it in by reference.
//!
//! # Modules
//!
//! - `ledger` - Journal balance validation and posting
//! - `currency` - Currency registry, re-basing and conversion

pub mod currency;
pub mod ledger;
