//! Currency domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::config::{CurrencyConfig, CurrencySeed};
use tally_shared::types::{CurrencyCode, RoundingMode};

/// A currency known to a registry.
///
/// `exchange_rate` is expressed as units of base per one unit of this
/// currency. The registry guarantees the base currency's rate is exactly 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    /// Currency code.
    pub code: CurrencyCode,
    /// Display name (e.g., "UAE Dirham").
    pub name: String,
    /// Display symbol (e.g., "$").
    pub symbol: String,
    /// Units of base per one unit of this currency.
    #[serde(with = "rust_decimal::serde::str")]
    pub exchange_rate: Decimal,
    /// Whether this is the registry's base currency.
    pub is_base_currency: bool,
    /// Minor-unit precision used when rounding converted amounts.
    pub decimal_places: u32,
}

impl Currency {
    /// Creates a non-base currency.
    #[must_use]
    pub fn new(
        code: CurrencyCode,
        name: impl Into<String>,
        symbol: impl Into<String>,
        exchange_rate: Decimal,
        decimal_places: u32,
    ) -> Self {
        Self {
            code,
            name: name.into(),
            symbol: symbol.into(),
            exchange_rate,
            is_base_currency: false,
            decimal_places,
        }
    }

    /// Creates a base currency (rate 1).
    #[must_use]
    pub fn base(
        code: CurrencyCode,
        name: impl Into<String>,
        symbol: impl Into<String>,
        decimal_places: u32,
    ) -> Self {
        Self {
            is_base_currency: true,
            ..Self::new(code, name, symbol, Decimal::ONE, decimal_places)
        }
    }
}

impl From<CurrencySeed> for Currency {
    fn from(seed: CurrencySeed) -> Self {
        Self {
            code: seed.code,
            name: seed.name,
            symbol: seed.symbol,
            exchange_rate: seed.exchange_rate,
            is_base_currency: seed.is_base_currency,
            decimal_places: seed.decimal_places,
        }
    }
}

/// Rounding behaviour of a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateSettings {
    /// Rounding mode for converted amounts and re-based rates.
    pub rounding: RoundingMode,
    /// Significant digits kept on rates computed by re-basing.
    pub rate_precision: u32,
}

impl Default for RateSettings {
    fn default() -> Self {
        Self {
            rounding: RoundingMode::HalfUp,
            rate_precision: 20,
        }
    }
}

impl From<&CurrencyConfig> for RateSettings {
    fn from(config: &CurrencyConfig) -> Self {
        Self {
            rounding: config.rounding,
            rate_precision: config.rate_precision,
        }
    }
}
