//! Application configuration management.
//!
//! Layers, later wins:
//! 1. `config/default.toml`
//! 2. `config/{RUN_MODE}.toml`
//! 3. `TALLY__<SECTION>__<KEY>` environment variables

use config::{Config, ConfigError, Environment, File, FileFormat};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::types::{CurrencyCode, RoundingMode};

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Logging configuration.
    pub log: LogConfig,
    /// Journal validation configuration.
    pub ledger: LedgerConfig,
    /// Currency registry configuration.
    pub currency: CurrencyConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "tally=info".to_string(),
            json: false,
        }
    }
}

/// How a journal line carrying both a debit and a credit is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MixedLinePolicy {
    /// Accept the line and report a warning.
    #[default]
    Warn,
    /// Reject the entry.
    Reject,
}

/// Journal validation configuration.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Treatment of lines with both sides nonzero.
    pub mixed_line_policy: MixedLinePolicy,
}

/// Currency registry configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CurrencyConfig {
    /// Rounding applied to conversions and re-based rates.
    pub rounding: RoundingMode,
    /// Significant digits kept on rates computed by re-basing.
    pub rate_precision: u32,
    /// Initial registry snapshot.
    pub currencies: Vec<CurrencySeed>,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            rounding: RoundingMode::default(),
            rate_precision: default_rate_precision(),
            currencies: Vec::new(),
        }
    }
}

fn default_rate_precision() -> u32 {
    20
}

/// One currency in the configured registry snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrencySeed {
    /// Currency code.
    pub code: CurrencyCode,
    /// Display name.
    pub name: String,
    /// Display symbol.
    #[serde(default)]
    pub symbol: String,
    /// Units of base per one unit of this currency.
    #[serde(with = "rust_decimal::serde::str")]
    pub exchange_rate: Decimal,
    /// Whether this is the base currency.
    #[serde(default)]
    pub is_base_currency: bool,
    /// Minor-unit precision.
    #[serde(default = "default_decimal_places")]
    pub decimal_places: u32,
}

fn default_decimal_places() -> u32 {
    2
}

impl AppConfig {
    /// Loads configuration from config files and environment.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(Environment::with_prefix("TALLY").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Parses configuration from an inline TOML document (no env overrides).
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid TOML or does not match
    /// the configuration schema.
    pub fn from_toml_str(document: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(document, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}
