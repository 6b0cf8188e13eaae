//! Structural validation of exported rows and layouts.
//!
//! Problems are collected as data. A non-empty list does not stop rendering
//! but blocks release of the artifact.

use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

use super::record::{AccountSource, Row};
use super::schema::{Section, UnknownColumn};

/// Kind of structural defect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationErrorKind {
    /// The account is blank after zero-padding.
    #[error("missing account code")]
    MissingAccount,

    /// The line had no account code and a default bucket was substituted.
    #[error("missing account code, default bucket {bucket} applied")]
    DefaultAccountApplied {
        /// Bucket that was used.
        bucket: String,
    },

    /// A column spec names no known value source.
    #[error("unknown column '{column_name}' in {section} row {row_ord}")]
    UnknownColumn {
        /// Section of the column.
        section: Section,
        /// Row of the column.
        row_ord: i32,
        /// Stored column name.
        column_name: String,
    },

    /// The period filter starts after it ends.
    #[error("period start {start} is after end {end}")]
    InvertedPeriod {
        /// Period start.
        start: NaiveDate,
        /// Period end.
        end: NaiveDate,
    },
}

/// A defect found while building the export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// 1-based body line, `None` for layout or configuration problems.
    pub line: Option<usize>,
    /// What is wrong.
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    /// Creates an error for a body line.
    #[must_use]
    pub const fn at_line(line: usize, kind: ValidationErrorKind) -> Self {
        Self {
            line: Some(line),
            kind,
        }
    }

    /// Creates an error not tied to a body line.
    #[must_use]
    pub const fn layout(kind: ValidationErrorKind) -> Self {
        Self { line: None, kind }
    }

    /// Human readable message.
    #[must_use]
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {line}: {}", self.kind),
            None => write!(f, "layout: {}", self.kind),
        }
    }
}

impl From<UnknownColumn> for ValidationError {
    fn from(column: UnknownColumn) -> Self {
        Self::layout(ValidationErrorKind::UnknownColumn {
            section: column.section,
            row_ord: column.row_ord,
            column_name: column.column_name,
        })
    }
}

/// Checks one row. At most one error is reported per row.
#[must_use]
pub fn validate_row(row: &Row) -> Option<ValidationError> {
    if row.account.trim().is_empty() {
        return Some(ValidationError::at_line(
            row.line,
            ValidationErrorKind::MissingAccount,
        ));
    }
    match &row.account_source {
        AccountSource::DefaultBucket(bucket) => Some(ValidationError::at_line(
            row.line,
            ValidationErrorKind::DefaultAccountApplied {
                bucket: bucket.clone(),
            },
        )),
        AccountSource::Line => None,
    }
}

/// Checks every row, in row order.
#[must_use]
pub fn validate_rows(rows: &[Row]) -> Vec<ValidationError> {
    rows.iter().filter_map(validate_row).collect()
}
