//! Posting and multi-currency validation.
//!
//! Posting is the only way to obtain a `PostedJournalEntry`. Entries whose
//! lines span several currencies are converted into the entry currency
//! through a `CurrencyRegistry`, one currency group at a time, before the
//! balance check.

use tally_shared::types::{CurrencyCode, Money};
use tracing::info;

use super::error::LedgerError;
use super::types::{EntryStatus, JournalEntry, PostedJournalEntry, ValidationResult};
use super::validation::{ConvertedGroup, Evaluation, JournalValidator, ensure_balanced, parse_line};
use crate::currency::{CurrencyError, CurrencyRegistry, allocate_rounded};

impl JournalValidator {
    /// Posts a balanced draft entry.
    ///
    /// # Errors
    ///
    /// - `AlreadyPosted` if the entry status is `Posted`
    /// - any error from [`Self::require_balanced`]
    pub fn post(&self, entry: JournalEntry) -> Result<PostedJournalEntry, LedgerError> {
        ensure_draft(&entry)?;
        let evaluation = self.evaluate_single(&entry)?;
        finish_posting(entry, evaluation)
    }

    /// Validates an entry whose lines may be in different currencies.
    ///
    /// Each line is parsed in its own currency at that currency's decimal
    /// places. Lines are grouped by currency; each group's debits and credits
    /// are converted as totals and then split back over the lines. Totals are
    /// sums of the converted lines.
    ///
    /// # Errors
    ///
    /// Same as [`Self::validate`], plus `Currency` when a line or entry
    /// currency is not registered or a conversion overflows.
    pub fn validate_multi_currency(
        &self,
        entry: &JournalEntry,
        registry: &CurrencyRegistry,
    ) -> Result<ValidationResult, LedgerError> {
        self.evaluate_converted(entry, registry)
            .map(|evaluation| evaluation.result)
    }

    /// Posts a multi-currency entry with amounts converted into the entry
    /// currency.
    ///
    /// # Errors
    ///
    /// `AlreadyPosted`, any error from [`Self::validate_multi_currency`], or
    /// `Unbalanced` when the converted totals differ.
    pub fn post_with_registry(
        &self,
        entry: JournalEntry,
        registry: &CurrencyRegistry,
    ) -> Result<PostedJournalEntry, LedgerError> {
        ensure_draft(&entry)?;
        let evaluation = self.evaluate_converted(&entry, registry)?;
        finish_posting(entry, evaluation)
    }

    fn evaluate_converted(
        &self,
        entry: &JournalEntry,
        registry: &CurrencyRegistry,
    ) -> Result<Evaluation, LedgerError> {
        registry.get(entry.currency)?;

        self.evaluate(
            entry,
            |index, line| {
                let currency = line.currency.unwrap_or(entry.currency);
                let decimal_places = line_decimal_places(entry, currency, registry)?;
                parse_line(index, line, currency, decimal_places)
            },
            |currency, amounts| {
                if currency == entry.currency {
                    Ok(ConvertedGroup::identity(amounts))
                } else {
                    convert_group(registry, currency, entry.currency, amounts)
                }
            },
        )
    }
}

/// Lines in the entry currency use the entry's precision; others use the
/// registry's.
fn line_decimal_places(
    entry: &JournalEntry,
    currency: CurrencyCode,
    registry: &CurrencyRegistry,
) -> Result<u32, LedgerError> {
    if currency == entry.currency {
        Ok(entry.decimal_places)
    } else {
        Ok(registry.get(currency)?.decimal_places)
    }
}

/// Converts one side of a currency group.
///
/// The group sum is converted once and rounded once; that total is then
/// split back over the lines, so lines that balance in their own currency
/// still balance after conversion.
fn convert_group(
    registry: &CurrencyRegistry,
    from: CurrencyCode,
    to: CurrencyCode,
    amounts: &[Money],
) -> Result<ConvertedGroup, LedgerError> {
    let mut sum = Money::zero(from);
    for amount in amounts {
        sum = sum.checked_add(amount)?;
    }
    let total = registry.convert(&sum, from, to)?;

    let from_rate = registry.get_rate(from)?;
    let to_rate = registry.get_rate(to)?;
    let exact = amounts
        .iter()
        .map(|amount| {
            amount
                .amount
                .checked_mul(from_rate)
                .and_then(|value| value.checked_div(to_rate))
                .ok_or(CurrencyError::ConversionOverflow { from, to })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let decimal_places = registry.get(to)?.decimal_places;
    let amounts = allocate_rounded(&exact, total.amount, decimal_places)
        .into_iter()
        .map(|value| Money::new(value, to))
        .collect();

    Ok(ConvertedGroup {
        amounts,
        rate: registry.cross_rate(from, to)?,
    })
}

fn ensure_draft(entry: &JournalEntry) -> Result<(), LedgerError> {
    if entry.status == EntryStatus::Posted {
        return Err(LedgerError::AlreadyPosted);
    }
    Ok(())
}

fn finish_posting(
    entry: JournalEntry,
    evaluation: Evaluation,
) -> Result<PostedJournalEntry, LedgerError> {
    ensure_balanced(&evaluation.result)?;
    let posted = PostedJournalEntry::new(entry, evaluation.lines, evaluation.result);

    info!(
        entry_id = %posted.id(),
        date = %posted.date(),
        lines = posted.lines().len(),
        total = %posted.totals().debit_total,
        "Journal entry posted"
    );
    Ok(posted)
}
