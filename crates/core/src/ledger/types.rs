//! Journal entry domain types.
//!
//! A `JournalEntry` is what the form layer hands in: lines still carry the
//! debit/credit text exactly as typed. Validation turns that text into
//! `Money`; a `PostedJournalEntry` holds only parsed amounts and cannot be
//! changed once created.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{CurrencyCode, JournalEntryId, Money};

/// Journal entry lifecycle status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Entry is being drafted and can be modified.
    #[default]
    Draft,
    /// Entry has been posted to the ledger (immutable).
    Posted,
}

impl EntryStatus {
    /// Returns true if the entry can be modified.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft)
    }
}

/// Source document type that produced the entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    /// Manual journal entry.
    #[default]
    Manual,
    /// Sales invoice.
    Invoice,
    /// Vendor bill.
    Bill,
    /// Payment (incoming or outgoing).
    Payment,
    /// Employee expense claim.
    ExpenseClaim,
    /// Bank reconciliation adjustment.
    BankReconciliation,
    /// Period-end or correcting adjustment.
    Adjustment,
    /// Opening balance entry.
    OpeningBalance,
}

/// One proposed journal line, as submitted by the form layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    /// Opaque account identifier from the account directory.
    pub account_reference: String,
    /// Debit amount text (blank means zero).
    #[serde(default)]
    pub debit: String,
    /// Credit amount text (blank means zero).
    #[serde(default)]
    pub credit: String,
    /// Line currency when it differs from the entry's.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<CurrencyCode>,
}

impl JournalLine {
    /// Creates a line with both sides given as text.
    #[must_use]
    pub fn new(
        account_reference: impl Into<String>,
        debit: impl Into<String>,
        credit: impl Into<String>,
    ) -> Self {
        Self {
            account_reference: account_reference.into(),
            debit: debit.into(),
            credit: credit.into(),
            currency: None,
        }
    }

    /// Creates a debit-only line.
    #[must_use]
    pub fn debit(account_reference: impl Into<String>, amount: impl Into<String>) -> Self {
        Self::new(account_reference, amount, "")
    }

    /// Creates a credit-only line.
    #[must_use]
    pub fn credit(account_reference: impl Into<String>, amount: impl Into<String>) -> Self {
        Self::new(account_reference, "", amount)
    }

    /// Denominates this line in `currency` instead of the entry currency.
    #[must_use]
    pub fn in_currency(mut self, currency: CurrencyCode) -> Self {
        self.currency = Some(currency);
        self
    }
}

/// A proposed journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Accounting date.
    pub date: NaiveDate,
    /// Source document type.
    #[serde(default)]
    pub reference_type: ReferenceType,
    /// Source document number (e.g., invoice number).
    #[serde(default)]
    pub reference_number: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Entry (and reporting) currency.
    pub currency: CurrencyCode,
    /// Decimal places allowed in line amounts.
    pub decimal_places: u32,
    /// Lifecycle status.
    #[serde(default)]
    pub status: EntryStatus,
    /// Lines in display order.
    pub lines: Vec<JournalLine>,
}

impl JournalEntry {
    /// Starts an empty draft entry.
    #[must_use]
    pub fn draft(date: NaiveDate, currency: CurrencyCode, decimal_places: u32) -> Self {
        Self {
            date,
            reference_type: ReferenceType::default(),
            reference_number: String::new(),
            description: String::new(),
            currency,
            decimal_places,
            status: EntryStatus::Draft,
            lines: Vec::new(),
        }
    }

    /// Sets the source document reference.
    #[must_use]
    pub fn with_reference(
        mut self,
        reference_type: ReferenceType,
        reference_number: impl Into<String>,
    ) -> Self {
        self.reference_type = reference_type;
        self.reference_number = reference_number.into();
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Appends a line.
    #[must_use]
    pub fn with_line(mut self, line: JournalLine) -> Self {
        self.lines.push(line);
        self
    }
}

/// Non-fatal findings reported alongside totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationWarning {
    /// Line has both a debit and a credit.
    MixedLine {
        /// Zero-based line index.
        line: usize,
    },
}

/// Totals and verdict for a proposed entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// Sum of all debits.
    pub debit_total: Money,
    /// Sum of all credits.
    pub credit_total: Money,
    /// Debits equal credits and are greater than zero.
    pub balanced: bool,
    /// Debit total minus credit total.
    pub difference: Money,
    /// Non-fatal findings.
    pub warnings: Vec<ValidationWarning>,
}

/// A journal line after parsing.
///
/// `debit` and `credit` are in the entry currency. The amounts as typed,
/// in the line's own currency, are kept next to them along with the rate
/// used to convert them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostedLine {
    /// Opaque account identifier.
    pub account_reference: String,
    /// Debit amount in the entry currency.
    pub debit: Money,
    /// Credit amount in the entry currency.
    pub credit: Money,
    /// Debit amount as entered.
    pub source_debit: Money,
    /// Credit amount as entered.
    pub source_credit: Money,
    /// Units of entry currency per unit of the line currency (1 when equal).
    #[serde(with = "rust_decimal::serde::str")]
    pub exchange_rate: Decimal,
}

impl PostedLine {
    /// Currency the line was entered in.
    #[must_use]
    pub fn source_currency(&self) -> CurrencyCode {
        self.source_debit.currency
    }
}

/// A journal entry that passed balance validation and was posted.
///
/// Fields are private and there are no mutators; corrections are made with
/// a new entry, never by editing this one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostedJournalEntry {
    id: JournalEntryId,
    date: NaiveDate,
    reference_type: ReferenceType,
    reference_number: String,
    description: String,
    currency: CurrencyCode,
    lines: Vec<PostedLine>,
    totals: ValidationResult,
}

impl PostedJournalEntry {
    pub(crate) fn new(entry: JournalEntry, lines: Vec<PostedLine>, totals: ValidationResult) -> Self {
        Self {
            id: JournalEntryId::new(),
            date: entry.date,
            reference_type: entry.reference_type,
            reference_number: entry.reference_number,
            description: entry.description,
            currency: entry.currency,
            lines,
            totals,
        }
    }

    /// Identifier assigned at posting.
    #[must_use]
    pub const fn id(&self) -> JournalEntryId {
        self.id
    }

    /// Accounting date.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Source document type.
    #[must_use]
    pub const fn reference_type(&self) -> ReferenceType {
        self.reference_type
    }

    /// Source document number.
    #[must_use]
    pub fn reference_number(&self) -> &str {
        &self.reference_number
    }

    /// Description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Entry currency; every posted amount is in it.
    #[must_use]
    pub const fn currency(&self) -> CurrencyCode {
        self.currency
    }

    /// Always `Posted`.
    #[must_use]
    pub const fn status(&self) -> EntryStatus {
        EntryStatus::Posted
    }

    /// Parsed lines.
    #[must_use]
    pub fn lines(&self) -> &[PostedLine] {
        &self.lines
    }

    /// Totals computed at posting.
    #[must_use]
    pub const fn totals(&self) -> &ValidationResult {
        &self.totals
    }
}
