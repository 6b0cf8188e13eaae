//! Journal line to export row mapping.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::normalize::zero_pad_digits;
use super::types::{DefaultBuckets, JournalLine, SourceKind};

/// Canonical minimum width of account codes.
pub const ACCOUNT_WIDTH: usize = 6;
/// Canonical minimum width of cost center ids.
pub const COST_CENTER_WIDTH: usize = 4;

/// Where a row's account code came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountSource {
    /// The journal line's own code.
    Line,
    /// The default bucket for the line's ledger; the original code was blank.
    DefaultBucket(String),
}

/// A journal line mapped to export fields. Values are raw, not yet formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// 1-based position among the exported lines.
    pub line: usize,
    /// Movement date.
    pub date: NaiveDate,
    /// Zero-padded account code.
    pub account: String,
    /// Origin of `account`.
    pub account_source: AccountSource,
    /// Zero-padded cost center.
    pub cost_center: String,
    /// Debit side.
    pub debit: Decimal,
    /// Credit side.
    pub credit: Decimal,
    /// Raw description.
    pub description: String,
    /// Source ledger.
    pub source_kind: SourceKind,
}

impl Row {
    /// The non-zero side of the row.
    #[must_use]
    pub fn value(&self) -> Decimal {
        if self.debit.is_zero() {
            self.credit
        } else {
            self.debit
        }
    }
}

/// Builds export rows from journal lines.
#[derive(Debug, Clone)]
pub struct RecordBuilder<'a> {
    buckets: &'a DefaultBuckets,
}

impl<'a> RecordBuilder<'a> {
    /// Creates a builder using the given default buckets.
    #[must_use]
    pub const fn new(buckets: &'a DefaultBuckets) -> Self {
        Self { buckets }
    }

    /// Maps one journal line.
    ///
    /// Entry lines populate the debit side and expense lines the credit side
    /// with the line's amount. A blank account code is replaced by the
    /// ledger's default bucket; flagging that is the validator's job.
    #[must_use]
    pub fn build(&self, line: usize, journal: &JournalLine) -> Row {
        let (raw_account, account_source) = if journal.account_code.trim().is_empty() {
            let bucket = self.buckets.for_kind(journal.source_kind);
            (bucket, AccountSource::DefaultBucket(bucket.to_string()))
        } else {
            (journal.account_code.as_str(), AccountSource::Line)
        };

        let amount = if journal.debit.is_zero() {
            journal.credit
        } else {
            journal.debit
        };
        let (debit, credit) = match journal.source_kind {
            SourceKind::Entry => (amount, Decimal::ZERO),
            SourceKind::Expense => (Decimal::ZERO, amount),
        };

        Row {
            line,
            date: journal.date,
            account: zero_pad_digits(raw_account, ACCOUNT_WIDTH),
            account_source,
            cost_center: zero_pad_digits(&journal.cost_center_id, COST_CENTER_WIDTH),
            debit,
            credit,
            description: journal.description.clone(),
            source_kind: journal.source_kind,
        }
    }

    /// Maps a sequence of journal lines, numbering them from 1.
    pub fn build_all<'l>(&self, lines: impl IntoIterator<Item = &'l JournalLine>) -> Vec<Row> {
        lines
            .into_iter()
            .enumerate()
            .map(|(idx, journal)| self.build(idx + 1, journal))
            .collect()
    }
}
