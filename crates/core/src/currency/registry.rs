//! Currency registry anchored to a single base currency.
//!
//! The registry owns every `Currency` and maintains two invariants:
//! exactly one currency is base, and its rate is exactly 1. Mutations take
//! `&mut self`; callers that share a registry across threads wrap it in a
//! lock and hold it for the duration of `set_rate` / `set_base_currency`.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tally_shared::config::CurrencyConfig;
use tally_shared::types::{CurrencyCode, Money};
use tracing::{debug, info};

use super::conversion::{convert_amount, rebase_rate};
use super::error::CurrencyError;
use super::types::{Currency, RateSettings};

/// Set of currencies with exchange rates relative to one base currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyRegistry {
    currencies: BTreeMap<CurrencyCode, Currency>,
    base: CurrencyCode,
    settings: RateSettings,
}

impl CurrencyRegistry {
    /// Builds a registry from a snapshot of currencies.
    ///
    /// # Errors
    ///
    /// - `DuplicateCurrency` if a code appears twice
    /// - `MultipleBaseCurrencies` / `NoBaseCurrency` unless exactly one is base
    /// - `InvalidRate` if the base rate is not 1 or another rate is not positive
    pub fn from_currencies<I>(currencies: I, settings: RateSettings) -> Result<Self, CurrencyError>
    where
        I: IntoIterator<Item = Currency>,
    {
        let mut map = BTreeMap::new();
        let mut base: Option<CurrencyCode> = None;

        for mut currency in currencies {
            let code = currency.code;
            if map.contains_key(&code) {
                return Err(CurrencyError::DuplicateCurrency(code));
            }

            if currency.is_base_currency {
                if let Some(first) = base {
                    return Err(CurrencyError::MultipleBaseCurrencies {
                        first,
                        second: code,
                    });
                }
                if currency.exchange_rate != Decimal::ONE {
                    return Err(CurrencyError::InvalidRate {
                        code,
                        rate: currency.exchange_rate,
                    });
                }
                currency.exchange_rate = Decimal::ONE;
                base = Some(code);
            } else if currency.exchange_rate <= Decimal::ZERO {
                return Err(CurrencyError::InvalidRate {
                    code,
                    rate: currency.exchange_rate,
                });
            }

            map.insert(code, currency);
        }

        let base = base.ok_or(CurrencyError::NoBaseCurrency)?;
        Ok(Self {
            currencies: map,
            base,
            settings,
        })
    }

    /// Builds a registry from the configured snapshot.
    pub fn from_config(config: &CurrencyConfig) -> Result<Self, CurrencyError> {
        let registry = Self::from_currencies(
            config.currencies.iter().cloned().map(Currency::from),
            RateSettings::from(config),
        )?;
        info!(
            base = %registry.base,
            currencies = registry.len(),
            "Currency registry loaded"
        );
        Ok(registry)
    }

    /// Returns the rounding settings.
    #[must_use]
    pub const fn settings(&self) -> RateSettings {
        self.settings
    }

    /// Returns the base currency code.
    #[must_use]
    pub const fn base_code(&self) -> CurrencyCode {
        self.base
    }

    /// Returns the base currency.
    #[must_use]
    pub fn base_currency(&self) -> &Currency {
        &self.currencies[&self.base]
    }

    /// Looks up a currency.
    pub fn get(&self, code: CurrencyCode) -> Result<&Currency, CurrencyError> {
        self.currencies
            .get(&code)
            .ok_or(CurrencyError::UnknownCurrency(code))
    }

    /// Returns true if the code is registered.
    #[must_use]
    pub fn contains(&self, code: CurrencyCode) -> bool {
        self.currencies.contains_key(&code)
    }

    /// Number of registered currencies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.currencies.len()
    }

    /// Returns true if no currencies are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.currencies.is_empty()
    }

    /// Iterates currencies in code order.
    pub fn iter(&self) -> impl Iterator<Item = &Currency> {
        self.currencies.values()
    }

    /// Returns the rate of `code` relative to base (exactly 1 for base).
    pub fn get_rate(&self, code: CurrencyCode) -> Result<Decimal, CurrencyError> {
        let currency = self.get(code)?;
        if currency.is_base_currency {
            Ok(Decimal::ONE)
        } else {
            Ok(currency.exchange_rate)
        }
    }

    /// Units of `to` per one unit of `from`.
    pub fn cross_rate(&self, from: CurrencyCode, to: CurrencyCode) -> Result<Decimal, CurrencyError> {
        let from_rate = self.get_rate(from)?;
        let to_rate = self.get_rate(to)?;
        from_rate
            .checked_div(to_rate)
            .ok_or(CurrencyError::ConversionOverflow { from, to })
    }

    /// Updates a non-base currency's rate.
    ///
    /// # Errors
    ///
    /// - `UnknownCurrency` if `code` is not registered
    /// - `CannotRerateBase` if `code` is the base currency
    /// - `InvalidRate` if `new_rate` is not positive
    pub fn set_rate(&mut self, code: CurrencyCode, new_rate: Decimal) -> Result<(), CurrencyError> {
        if !self.contains(code) {
            return Err(CurrencyError::UnknownCurrency(code));
        }
        if code == self.base {
            return Err(CurrencyError::CannotRerateBase(code));
        }
        if new_rate <= Decimal::ZERO {
            return Err(CurrencyError::InvalidRate {
                code,
                rate: new_rate,
            });
        }

        let currency = self
            .currencies
            .get_mut(&code)
            .ok_or(CurrencyError::UnknownCurrency(code))?;
        let old_rate = std::mem::replace(&mut currency.exchange_rate, new_rate);

        info!(
            currency = %code,
            old_rate = %old_rate,
            new_rate = %new_rate,
            "Exchange rate updated"
        );
        Ok(())
    }

    /// Makes `code` the base currency and rescales every other rate.
    ///
    /// The new rate table is computed in full before anything is replaced,
    /// so on `RebaseFailed` the registry is exactly as it was.
    ///
    /// # Errors
    ///
    /// - `UnknownCurrency` if `code` is not registered
    /// - `RebaseFailed` if any rescaled rate overflows or is not positive
    pub fn set_base_currency(&mut self, code: CurrencyCode) -> Result<(), CurrencyError> {
        let new_base_old_rate = self.get_rate(code)?;
        if code == self.base {
            return Ok(());
        }

        let RateSettings {
            rounding,
            rate_precision,
        } = self.settings;

        let mut rebased = BTreeMap::new();
        for (currency_code, currency) in &self.currencies {
            let mut next = currency.clone();
            if *currency_code == code {
                next.exchange_rate = Decimal::ONE;
                next.is_base_currency = true;
            } else {
                let old_rate = if *currency_code == self.base {
                    Decimal::ONE
                } else {
                    currency.exchange_rate
                };
                next.exchange_rate =
                    rebase_rate(old_rate, new_base_old_rate, rate_precision, rounding).ok_or(
                        CurrencyError::RebaseFailed {
                            base: code,
                            currency: *currency_code,
                        },
                    )?;
                next.is_base_currency = false;
            }
            rebased.insert(*currency_code, next);
        }

        let old_base = std::mem::replace(&mut self.base, code);
        self.currencies = rebased;

        info!(
            old_base = %old_base,
            new_base = %code,
            scale = %new_base_old_rate,
            "Base currency changed"
        );
        Ok(())
    }

    /// Registers a new non-base currency.
    ///
    /// # Errors
    ///
    /// - `DuplicateCurrency` if the code is taken
    /// - `MultipleBaseCurrencies` if the currency claims to be base
    /// - `InvalidRate` if its rate is not positive
    pub fn add_currency(&mut self, currency: Currency) -> Result<(), CurrencyError> {
        let code = currency.code;
        if self.contains(code) {
            return Err(CurrencyError::DuplicateCurrency(code));
        }
        if currency.is_base_currency {
            return Err(CurrencyError::MultipleBaseCurrencies {
                first: self.base,
                second: code,
            });
        }
        if currency.exchange_rate <= Decimal::ZERO {
            return Err(CurrencyError::InvalidRate {
                code,
                rate: currency.exchange_rate,
            });
        }

        info!(currency = %code, rate = %currency.exchange_rate, "Currency added");
        self.currencies.insert(code, currency);
        Ok(())
    }

    /// Removes a non-base currency and returns it.
    pub fn remove_currency(&mut self, code: CurrencyCode) -> Result<Currency, CurrencyError> {
        if code == self.base {
            return Err(CurrencyError::CannotRemoveBase(code));
        }
        let removed = self
            .currencies
            .remove(&code)
            .ok_or(CurrencyError::UnknownCurrency(code))?;

        info!(currency = %code, "Currency removed");
        Ok(removed)
    }

    /// Converts `amount` from `from` into `to`.
    ///
    /// Computes `amount * rate(from) / rate(to)` and rounds to the target's
    /// decimal places with the registry's rounding mode. Converting a
    /// currency to itself returns the amount untouched.
    ///
    /// # Errors
    ///
    /// - `UnknownCurrency` if either code is not registered
    /// - `CurrencyMismatch` if `amount` is not denominated in `from`
    /// - `ConversionOverflow` if the arithmetic overflows
    pub fn convert(
        &self,
        amount: &Money,
        from: CurrencyCode,
        to: CurrencyCode,
    ) -> Result<Money, CurrencyError> {
        let from_rate = self.get_rate(from)?;
        let target = self.get(to)?;
        let to_rate = self.get_rate(to)?;

        if amount.currency != from {
            return Err(CurrencyError::CurrencyMismatch {
                expected: from,
                found: amount.currency,
            });
        }
        if from == to {
            return Ok(*amount);
        }

        let value = convert_amount(
            amount.amount,
            from_rate,
            to_rate,
            target.decimal_places,
            self.settings.rounding,
        )
        .ok_or(CurrencyError::ConversionOverflow { from, to })?;

        debug!(
            from = %from,
            to = %to,
            amount = %amount.amount,
            converted = %value,
            "Amount converted"
        );
        Ok(Money::new(value, to))
    }

    /// Converts `amount` from its own currency into `to`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::convert`], minus the currency mismatch.
    pub fn convert_to(&self, amount: &Money, to: CurrencyCode) -> Result<Money, CurrencyError> {
        self.convert(amount, amount.currency, to)
    }
}
