//! Property-based tests for journal validation.
//!
//! - Equal positive totals always balance with zero difference
//! - Summation is exact for any number of lines
//! - Difference is always debit total minus credit total

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_shared::types::CurrencyCode;

use super::error::LedgerError;
use super::types::{JournalEntry, JournalLine};
use super::validation::JournalValidator;

/// Strategy to generate amounts from 0.01 to 1,000,000.00 as form text.
fn amount_cents() -> impl Strategy<Value = i64> {
    1i64..100_000_000i64
}

fn text(cents: i64) -> String {
    Decimal::new(cents, 2).to_string()
}

fn entry(lines: Vec<JournalLine>) -> JournalEntry {
    let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    JournalEntry {
        lines,
        ..JournalEntry::draft(date, CurrencyCode::new("USD").unwrap(), 2)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Debits split over several lines balance against one credit of the sum.
    #[test]
    fn prop_split_debits_balance(debits in prop::collection::vec(amount_cents(), 1..20)) {
        let total: i64 = debits.iter().sum();
        let mut lines: Vec<JournalLine> = debits
            .iter()
            .enumerate()
            .map(|(i, cents)| JournalLine::debit(format!("1{i:03}"), text(*cents)))
            .collect();
        lines.push(JournalLine::credit("4000", text(total)));

        let result = JournalValidator::default().validate(&entry(lines)).unwrap();

        prop_assert!(result.balanced);
        prop_assert!(result.difference.is_zero());
        prop_assert_eq!(result.debit_total.amount, Decimal::new(total, 2));
    }

    /// Adding 0.10 any number of times never drifts.
    #[test]
    fn prop_repeated_dimes_sum_exactly(count in 1usize..500) {
        let mut lines = vec![JournalLine::debit("1000", "0.10"); count];
        lines.push(JournalLine::credit("4000", text(i64::try_from(count).unwrap() * 10)));

        let result = JournalValidator::default().validate(&entry(lines)).unwrap();
        prop_assert!(result.balanced);
    }

    /// Difference is debit total minus credit total, and balance follows it.
    #[test]
    fn prop_difference_is_signed_gap(debit in amount_cents(), credit in amount_cents()) {
        let lines = vec![
            JournalLine::debit("1000", text(debit)),
            JournalLine::credit("4000", text(credit)),
        ];
        let result = JournalValidator::default().validate(&entry(lines)).unwrap();

        prop_assert_eq!(result.difference.amount, Decimal::new(debit - credit, 2));
        prop_assert_eq!(result.balanced, debit == credit);
    }

    /// Unbalanced entries are refused with the same difference.
    #[test]
    fn prop_require_balanced_matches_validate(debit in amount_cents(), credit in amount_cents()) {
        let entry = entry(vec![
            JournalLine::debit("1000", text(debit)),
            JournalLine::credit("4000", text(credit)),
        ]);
        let validator = JournalValidator::default();
        let result = validator.validate(&entry).unwrap();

        match validator.require_balanced(entry.clone()) {
            Ok(returned) => {
                prop_assert!(result.balanced);
                prop_assert_eq!(returned, entry);
            }
            Err(LedgerError::Unbalanced { difference }) => {
                prop_assert!(!result.balanced);
                prop_assert_eq!(difference, result.difference);
            }
            Err(other) => prop_assert!(false, "unexpected error {other}"),
        }
    }

    /// Fewer than two lines never validate.
    #[test]
    fn prop_short_entries_rejected(cents in amount_cents(), with_line in any::<bool>()) {
        let lines = if with_line {
            vec![JournalLine::debit("1000", text(cents))]
        } else {
            Vec::new()
        };
        let count = lines.len();

        prop_assert_eq!(
            JournalValidator::default().validate(&entry(lines)),
            Err(LedgerError::InsufficientLines { count })
        );
    }
}
