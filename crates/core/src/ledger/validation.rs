//! Journal balance validation.
//!
//! Parses each line's debit/credit text into exact decimals, sums them
//! without any floating-point step, and decides whether the entry balances.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tally_shared::config::{LedgerConfig, MixedLinePolicy};
use tally_shared::types::{CurrencyCode, Money};
use tracing::{debug, warn};

use super::error::LedgerError;
use super::types::{JournalEntry, JournalLine, PostedLine, ValidationResult, ValidationWarning};

/// Validates proposed journal entries.
///
/// Holds no state besides configuration; validation never mutates anything
/// and can run in parallel over distinct entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct JournalValidator {
    config: LedgerConfig,
}

/// A line's amounts as typed, in the line's own currency.
#[derive(Debug, Clone)]
pub(crate) struct ParsedLine {
    pub(crate) account_reference: String,
    pub(crate) debit: Money,
    pub(crate) credit: Money,
}

/// One side of a currency group expressed in the entry currency.
pub(crate) struct ConvertedGroup {
    /// Converted amounts, in the order they were given.
    pub(crate) amounts: Vec<Money>,
    /// Units of entry currency per unit of the group currency.
    pub(crate) rate: Decimal,
}

impl ConvertedGroup {
    /// Amounts already in the entry currency.
    pub(crate) fn identity(amounts: &[Money]) -> Self {
        Self {
            amounts: amounts.to_vec(),
            rate: Decimal::ONE,
        }
    }
}

/// Parsed lines together with their totals.
pub(crate) struct Evaluation {
    pub(crate) lines: Vec<PostedLine>,
    pub(crate) result: ValidationResult,
}

impl JournalValidator {
    /// Creates a validator with the given configuration.
    #[must_use]
    pub const fn new(config: LedgerConfig) -> Self {
        Self { config }
    }

    /// Returns the validator configuration.
    #[must_use]
    pub const fn config(&self) -> LedgerConfig {
        self.config
    }

    /// Validates an entry and computes its totals.
    ///
    /// Every line must be in the entry currency and its amounts may carry at
    /// most `entry.decimal_places` fractional digits. An unbalanced entry is
    /// not an error here; check `balanced` on the result.
    ///
    /// # Errors
    ///
    /// - `InsufficientLines` if the entry has fewer than two lines
    /// - `MissingAccount` if a line has a blank account reference
    /// - `InvalidAmount` if a debit or credit does not parse
    /// - `CurrencyMismatch` if a line is in a different currency
    /// - `MixedLine` if a line has both sides and the policy is `reject`
    pub fn validate(&self, entry: &JournalEntry) -> Result<ValidationResult, LedgerError> {
        self.evaluate_single(entry)
            .map(|evaluation| evaluation.result)
    }

    /// Returns the entry unchanged if it balances.
    ///
    /// # Errors
    ///
    /// Any error from [`Self::validate`], or `Unbalanced` with the signed
    /// difference when debits and credits differ or are both zero.
    pub fn require_balanced(&self, entry: JournalEntry) -> Result<JournalEntry, LedgerError> {
        let result = self.validate(&entry)?;
        ensure_balanced(&result)?;
        Ok(entry)
    }

    /// Evaluates an entry whose lines must all be in the entry currency.
    pub(crate) fn evaluate_single(&self, entry: &JournalEntry) -> Result<Evaluation, LedgerError> {
        self.evaluate(
            entry,
            |index, line| {
                if let Some(found) = line.currency.filter(|c| *c != entry.currency) {
                    return Err(LedgerError::CurrencyMismatch {
                        line: index,
                        expected: entry.currency,
                        found,
                    });
                }
                parse_line(index, line, entry.currency, entry.decimal_places)
            },
            |_, amounts| Ok(ConvertedGroup::identity(amounts)),
        )
    }

    /// Shared driver.
    ///
    /// Checks the line count, parses every line, flags mixed lines on the
    /// amounts as typed, then converts each currency group one side at a
    /// time. Totals are the sums of the converted lines.
    pub(crate) fn evaluate<F, G>(
        &self,
        entry: &JournalEntry,
        mut resolve: F,
        mut convert: G,
    ) -> Result<Evaluation, LedgerError>
    where
        F: FnMut(usize, &JournalLine) -> Result<ParsedLine, LedgerError>,
        G: FnMut(CurrencyCode, &[Money]) -> Result<ConvertedGroup, LedgerError>,
    {
        if entry.lines.len() < 2 {
            return Err(LedgerError::InsufficientLines {
                count: entry.lines.len(),
            });
        }

        let parsed = entry
            .lines
            .iter()
            .enumerate()
            .map(|(index, line)| resolve(index, line))
            .collect::<Result<Vec<_>, _>>()?;
        let warnings = self.check_mixed_lines(&parsed)?;

        let mut groups: BTreeMap<CurrencyCode, Vec<usize>> = BTreeMap::new();
        for (index, line) in parsed.iter().enumerate() {
            groups.entry(line.debit.currency).or_default().push(index);
        }

        let zero = Money::zero(entry.currency);
        let mut debits = vec![zero; parsed.len()];
        let mut credits = vec![zero; parsed.len()];
        let mut rates = vec![Decimal::ONE; parsed.len()];

        for (currency, indexes) in &groups {
            let side: Vec<Money> = indexes.iter().map(|i| parsed[*i].debit).collect();
            let converted = convert(*currency, &side)?;
            for (i, amount) in indexes.iter().zip(converted.amounts) {
                debits[*i] = amount;
                rates[*i] = converted.rate;
            }

            let side: Vec<Money> = indexes.iter().map(|i| parsed[*i].credit).collect();
            let converted = convert(*currency, &side)?;
            for (i, amount) in indexes.iter().zip(converted.amounts) {
                credits[*i] = amount;
            }
        }

        let lines: Vec<PostedLine> = parsed
            .into_iter()
            .enumerate()
            .map(|(i, line)| PostedLine {
                account_reference: line.account_reference,
                debit: debits[i],
                credit: credits[i],
                source_debit: line.debit,
                source_credit: line.credit,
                exchange_rate: rates[i],
            })
            .collect();

        let result = summarize(entry.currency, &lines, warnings)?;
        debug!(
            lines = lines.len(),
            currencies = groups.len(),
            debit_total = %result.debit_total,
            credit_total = %result.credit_total,
            balanced = result.balanced,
            "Journal entry validated"
        );

        Ok(Evaluation { lines, result })
    }

    /// Applies the mixed-line policy to amounts in their own currency.
    fn check_mixed_lines(&self, lines: &[ParsedLine]) -> Result<Vec<ValidationWarning>, LedgerError> {
        let mut warnings = Vec::new();
        for (index, line) in lines.iter().enumerate() {
            if line.debit.is_zero() || line.credit.is_zero() {
                continue;
            }
            match self.config.mixed_line_policy {
                MixedLinePolicy::Reject => return Err(LedgerError::MixedLine { line: index }),
                MixedLinePolicy::Warn => {
                    warn!(
                        line = index,
                        account = %line.account_reference,
                        "Journal line has both a debit and a credit"
                    );
                    warnings.push(ValidationWarning::MixedLine { line: index });
                }
            }
        }
        Ok(warnings)
    }
}

fn summarize(
    currency: CurrencyCode,
    lines: &[PostedLine],
    warnings: Vec<ValidationWarning>,
) -> Result<ValidationResult, LedgerError> {
    let mut debit_total = Money::zero(currency);
    let mut credit_total = Money::zero(currency);
    for line in lines {
        debit_total = debit_total.checked_add(&line.debit)?;
        credit_total = credit_total.checked_add(&line.credit)?;
    }

    let difference = debit_total.checked_sub(&credit_total)?;
    let balanced = difference.is_zero() && debit_total.is_positive();

    Ok(ValidationResult {
        debit_total,
        credit_total,
        balanced,
        difference,
        warnings,
    })
}

/// Fails with `Unbalanced` unless the result is balanced.
pub(crate) fn ensure_balanced(result: &ValidationResult) -> Result<(), LedgerError> {
    if result.balanced {
        Ok(())
    } else {
        Err(LedgerError::Unbalanced {
            difference: result.difference,
        })
    }
}

/// Parses one line's account and amounts in `currency`.
pub(crate) fn parse_line(
    index: usize,
    line: &JournalLine,
    currency: CurrencyCode,
    decimal_places: u32,
) -> Result<ParsedLine, LedgerError> {
    let account_reference = line.account_reference.trim();
    if account_reference.is_empty() {
        return Err(LedgerError::MissingAccount { line: index });
    }

    let parse = |text: &str| {
        Money::parse(text, currency, decimal_places)
            .map_err(|source| LedgerError::InvalidAmount { line: index, source })
    };

    Ok(ParsedLine {
        account_reference: account_reference.to_string(),
        debit: parse(&line.debit)?,
        credit: parse(&line.credit)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use tally_shared::types::AmountParseError;

    fn usd() -> CurrencyCode {
        CurrencyCode::new("USD").unwrap()
    }

    fn entry(lines: Vec<JournalLine>) -> JournalEntry {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        JournalEntry {
            lines,
            ..JournalEntry::draft(date, usd(), 2)
        }
    }

    fn validator() -> JournalValidator {
        JournalValidator::default()
    }

    #[test]
    fn test_balanced_entry() {
        let entry = entry(vec![
            JournalLine::new("1000", "100.00", "0"),
            JournalLine::new("4000", "0", "100.00"),
        ]);
        let result = validator().validate(&entry).unwrap();

        assert!(result.balanced);
        assert_eq!(result.debit_total, Money::new(dec!(100.00), usd()));
        assert_eq!(result.credit_total, Money::new(dec!(100.00), usd()));
        assert_eq!(result.difference.amount, Decimal::ZERO);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_unbalanced_by_one_cent() {
        let entry = entry(vec![
            JournalLine::new("1000", "100.00", "0"),
            JournalLine::new("4000", "0", "99.99"),
        ]);
        let result = validator().validate(&entry).unwrap();

        assert!(!result.balanced);
        assert_eq!(result.difference.amount, dec!(0.01));
    }

    #[test]
    fn test_exact_summation_has_no_drift() {
        // 0.1 + 0.2 must equal 0.3 exactly.
        let entry = entry(vec![
            JournalLine::debit("1000", "0.10"),
            JournalLine::debit("1010", "0.20"),
            JournalLine::credit("4000", "0.30"),
        ]);
        let result = validator().validate(&entry).unwrap();
        assert!(result.balanced);
        assert_eq!(result.debit_total.amount, dec!(0.30));
    }

    #[rstest]
    #[case(vec![])]
    #[case(vec![JournalLine::debit("1000", "10")])]
    fn test_insufficient_lines(#[case] lines: Vec<JournalLine>) {
        let count = lines.len();
        assert_eq!(
            validator().validate(&entry(lines)),
            Err(LedgerError::InsufficientLines { count })
        );
    }

    #[test]
    fn test_all_zero_entry_is_valid_but_unbalanced() {
        let entry = entry(vec![
            JournalLine::new("1000", "0", "0"),
            JournalLine::new("4000", "", ""),
        ]);
        let result = validator().validate(&entry).unwrap();
        assert!(!result.balanced);
        assert!(result.difference.is_zero());
        assert!(result.debit_total.is_zero());
    }

    #[test]
    fn test_zero_line_contributes_nothing() {
        let entry = entry(vec![
            JournalLine::debit("1000", "25.00"),
            JournalLine::new("1500", "0.00", "0.00"),
            JournalLine::credit("4000", "25.00"),
        ]);
        let result = validator().validate(&entry).unwrap();
        assert!(result.balanced);
        assert!(result.warnings.is_empty());
    }

    #[rstest]
    #[case("abc", "")]
    #[case("-5.00", "")]
    #[case("", "1.005")]
    #[case("1,000", "")]
    fn test_invalid_amount_names_line(#[case] debit: &str, #[case] credit: &str) {
        let entry = entry(vec![
            JournalLine::debit("1000", "10.00"),
            JournalLine::new("4000", debit, credit),
        ]);
        let err = validator().validate(&entry).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount { line: 1, .. }));
        assert_eq!(err.line(), Some(1));
    }

    #[test]
    fn test_precision_follows_entry_decimal_places() {
        let mut entry = entry(vec![
            JournalLine::debit("1000", "10.5"),
            JournalLine::credit("4000", "10.5"),
        ]);
        entry.decimal_places = 0;
        assert_eq!(
            validator().validate(&entry),
            Err(LedgerError::InvalidAmount {
                line: 0,
                source: AmountParseError::TooManyDecimalPlaces {
                    value: "10.5".to_string(),
                    max: 0,
                    found: 1,
                },
            })
        );
    }

    #[test]
    fn test_missing_account() {
        let entry = entry(vec![
            JournalLine::debit("1000", "10.00"),
            JournalLine::credit("  ", "10.00"),
        ]);
        assert_eq!(
            validator().validate(&entry),
            Err(LedgerError::MissingAccount { line: 1 })
        );
    }

    #[test]
    fn test_line_in_other_currency_rejected() {
        let eur = CurrencyCode::new("EUR").unwrap();
        let entry = entry(vec![
            JournalLine::debit("1000", "10.00").in_currency(usd()),
            JournalLine::credit("4000", "10.00").in_currency(eur),
        ]);
        assert_eq!(
            validator().validate(&entry),
            Err(LedgerError::CurrencyMismatch {
                line: 1,
                expected: usd(),
                found: eur,
            })
        );
    }

    #[test]
    fn test_mixed_line_warns_by_default() {
        let entry = entry(vec![
            JournalLine::new("1000", "60.00", "10.00"),
            JournalLine::credit("4000", "50.00"),
        ]);
        let result = validator().validate(&entry).unwrap();
        assert!(result.balanced);
        assert_eq!(result.warnings, vec![ValidationWarning::MixedLine { line: 0 }]);
    }

    #[test]
    fn test_mixed_line_rejected_by_policy() {
        let validator = JournalValidator::new(LedgerConfig {
            mixed_line_policy: MixedLinePolicy::Reject,
        });
        let entry = entry(vec![
            JournalLine::new("1000", "60.00", "10.00"),
            JournalLine::credit("4000", "50.00"),
        ]);
        assert_eq!(
            validator.validate(&entry),
            Err(LedgerError::MixedLine { line: 0 })
        );
    }

    #[test]
    fn test_require_balanced_returns_entry_unchanged() {
        let entry = entry(vec![
            JournalLine::debit("1000", "100.00"),
            JournalLine::credit("4000", "100.00"),
        ]);
        let returned = validator().require_balanced(entry.clone()).unwrap();
        assert_eq!(returned, entry);
    }

    #[test]
    fn test_require_balanced_reports_difference() {
        let entry = entry(vec![
            JournalLine::debit("1000", "100.00"),
            JournalLine::credit("4000", "99.99"),
        ]);
        assert_eq!(
            validator().require_balanced(entry),
            Err(LedgerError::Unbalanced {
                difference: Money::new(dec!(0.01), usd()),
            })
        );
    }

    #[test]
    fn test_require_balanced_rejects_zero_entry() {
        let entry = entry(vec![
            JournalLine::debit("1000", "0"),
            JournalLine::credit("4000", "0"),
        ]);
        assert!(matches!(
            validator().require_balanced(entry),
            Err(LedgerError::Unbalanced { .. })
        ));
    }

    #[test]
    fn test_difference_is_signed() {
        let entry = entry(vec![
            JournalLine::debit("1000", "40.00"),
            JournalLine::credit("4000", "50.00"),
        ]);
        let result = validator().validate(&entry).unwrap();
        assert_eq!(result.difference.amount, dec!(-10.00));
    }
}
