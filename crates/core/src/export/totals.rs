//! Running totals over exported rows.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::record::Row;

/// Sums reported in the footer.
///
/// Debit and credit are not reconciled here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Sum of row debits.
    pub sum_debit: Decimal,
    /// Sum of row credits.
    pub sum_credit: Decimal,
    /// Number of rows.
    pub count: usize,
}

impl Totals {
    /// Adds one row.
    #[must_use]
    pub fn add(self, row: &Row) -> Self {
        Self {
            sum_debit: self.sum_debit + row.debit,
            sum_credit: self.sum_credit + row.credit,
            count: self.count + 1,
        }
    }

    /// Debit minus credit.
    #[must_use]
    pub fn net(&self) -> Decimal {
        self.sum_debit - self.sum_credit
    }
}

/// Folds rows into totals in a single pass.
#[must_use]
pub fn accumulate(rows: &[Row]) -> Totals {
    rows.iter().fold(Totals::default(), Totals::add)
}
