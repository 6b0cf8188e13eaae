//! Export input and configuration types.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use folio_shared::ExportSettings;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::ExportError;
use super::normalize::format_date_br;

/// Ledger a journal line was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Entry ledger (populates the debit side).
    Entry,
    /// Expense ledger (populates the credit side).
    Expense,
}

/// One accounting movement as supplied by the journal collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalLine {
    /// Movement date.
    pub date: NaiveDate,
    /// Free-form account code; digits are extracted on export.
    #[serde(default)]
    pub account_code: String,
    /// Opaque cost center identifier.
    #[serde(default)]
    pub cost_center_id: String,
    /// Debit amount, zero if this is not a debit line.
    #[serde(default)]
    pub debit: Decimal,
    /// Credit amount, zero if this is not a credit line.
    #[serde(default)]
    pub credit: Decimal,
    /// Free text description.
    #[serde(default)]
    pub description: String,
    /// Source ledger.
    pub source_kind: SourceKind,
}

/// Organization context used for header substitution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizationProfile {
    /// Legal name.
    pub legal_name: String,
    /// Trade name, if different from the legal name.
    #[serde(default)]
    pub trade_name: Option<String>,
    /// Tax id (CNPJ/CPF).
    pub tax_id: String,
    /// State registration.
    #[serde(default)]
    pub state_registration: Option<String>,
    /// Municipal registration.
    #[serde(default)]
    pub municipal_registration: Option<String>,
    /// Postal address.
    #[serde(default)]
    pub address: String,
}

impl OrganizationProfile {
    /// Trade name, falling back to the legal name when unset or blank.
    #[must_use]
    pub fn trade_name_or_legal(&self) -> &str {
        self.trade_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.legal_name)
    }

    /// State and municipal registrations joined with ` / `, skipping blanks.
    #[must_use]
    pub fn registration(&self) -> String {
        [&self.state_registration, &self.municipal_registration]
            .into_iter()
            .flatten()
            .map(|r| r.trim())
            .filter(|r| !r.is_empty())
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

/// Nature tag of a chart of accounts entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountNature {
    /// Debit-natured account.
    Debit,
    /// Credit-natured account.
    Credit,
}

impl fmt::Display for AccountNature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debit => write!(f, "DEBIT"),
            Self::Credit => write!(f, "CREDIT"),
        }
    }
}

/// Chart of accounts entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartAccount {
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Debit/credit nature.
    pub nature: AccountNature,
}

/// Built-in layout selected when no column specs exist for a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    /// Account, debit, credit, description, date, cost center.
    #[default]
    Ledger,
    /// Date, account, cost center, value, description.
    Basic,
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ledger => write!(f, "ledger"),
            Self::Basic => write!(f, "basic"),
        }
    }
}

impl FromStr for LayoutKind {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ledger" => Ok(Self::Ledger),
            "basic" => Ok(Self::Basic),
            other => Err(ExportError::InvalidLayoutKind(other.to_string())),
        }
    }
}

/// Inclusive date range used to filter journal lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    /// First day included.
    pub start: NaiveDate,
    /// Last day included.
    pub end: NaiveDate,
}

impl Period {
    /// Creates a new period.
    #[must_use]
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Returns true if `date` falls within `[start, end]`.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Returns true if the start date is after the end date.
    #[must_use]
    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} A {}",
            format_date_br(self.start),
            format_date_br(self.end)
        )
    }
}

/// Accounts substituted when a journal line has a blank account code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultBuckets {
    /// Used for entry lines.
    pub entry: String,
    /// Used for expense lines.
    pub expense: String,
}

impl DefaultBuckets {
    /// Returns the bucket for a source ledger.
    #[must_use]
    pub fn for_kind(&self, kind: SourceKind) -> &str {
        match kind {
            SourceKind::Entry => &self.entry,
            SourceKind::Expense => &self.expense,
        }
    }
}

impl Default for DefaultBuckets {
    fn default() -> Self {
        Self {
            entry: "1.1.1".to_string(),
            expense: "3.1.1".to_string(),
        }
    }
}

/// Per-invocation export options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    /// Fallback layout for sections without column specs.
    pub layout_kind: LayoutKind,
    /// Optional inclusive period filter; `None` exports every line.
    pub period: Option<Period>,
    /// Pad every cell to its width instead of joining with `delimiter`.
    pub fixed_width: bool,
    /// Render decimals with `,`.
    pub decimal_comma: bool,
    /// Cell separator for delimited output.
    pub delimiter: String,
    /// Accounts used for blank account codes.
    pub default_buckets: DefaultBuckets,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            layout_kind: LayoutKind::Ledger,
            period: None,
            fixed_width: true,
            decimal_comma: true,
            delimiter: "|".to_string(),
            default_buckets: DefaultBuckets::default(),
        }
    }
}

impl ExportConfig {
    /// Builds an export config from application settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured layout kind is unknown.
    pub fn from_settings(settings: &ExportSettings) -> Result<Self, ExportError> {
        Ok(Self {
            layout_kind: settings.layout_kind.parse()?,
            period: None,
            fixed_width: settings.fixed_width,
            decimal_comma: settings.decimal_comma,
            delimiter: settings.delimiter.clone(),
            default_buckets: DefaultBuckets {
                entry: settings.entry_default_account.clone(),
                expense: settings.expense_default_account.clone(),
            },
        })
    }

    /// Sets the layout kind.
    #[must_use]
    pub fn with_layout_kind(mut self, layout_kind: LayoutKind) -> Self {
        self.layout_kind = layout_kind;
        self
    }

    /// Sets the period filter.
    #[must_use]
    pub fn with_period(mut self, period: Option<Period>) -> Self {
        self.period = period;
        self
    }

    /// Sets fixed-width mode.
    #[must_use]
    pub fn with_fixed_width(mut self, fixed_width: bool) -> Self {
        self.fixed_width = fixed_width;
        self
    }

    /// Sets decimal comma mode.
    #[must_use]
    pub fn with_decimal_comma(mut self, decimal_comma: bool) -> Self {
        self.decimal_comma = decimal_comma;
        self
    }

    /// Sets the delimiter for delimited output.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Returns true if `date` passes the period filter.
    #[must_use]
    pub fn includes(&self, date: NaiveDate) -> bool {
        self.period.as_ref().is_none_or(|p| p.contains(date))
    }
}
