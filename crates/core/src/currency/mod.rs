//! Multi-currency handling and exchange rates.
//!
//! - `registry` - Currencies anchored to one base, re-basing, conversion
//! - `conversion` - Rounding-aware conversion arithmetic
//! - `types` - Currency records and rate settings
//! - `error` - Error types for currency operations

pub mod conversion;
pub mod error;
pub mod registry;
pub mod types;

#[cfg(test)]
mod props;

pub use conversion::{allocate_rounded, convert_amount, rebase_rate};
pub use error::CurrencyError;
pub use registry::CurrencyRegistry;
pub use types::{Currency, RateSettings};
