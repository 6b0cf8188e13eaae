//! Schema-driven ledger export.
//!
//! This module turns journal lines into a fixed-width or delimited text
//! artifact:
//! - Value normalization and cell formatting
//! - Column spec parsing and section layouts
//! - Journal line to row mapping
//! - Section rendering (stored specs or built-in layouts)
//! - Footer totals
//! - Structural validation
//! - Integrity signature over header and body
//! - Export orchestration

pub mod error;
pub mod normalize;
pub mod record;
pub mod render;
pub mod schema;
pub mod service;
pub mod signer;
pub mod totals;
pub mod types;
pub mod validation;

#[cfg(test)]
mod service_props;


pub use error::{ExportError, SignatureError};
pub use normalize::{format_decimal, normalize_text, zero_pad_digits};
pub use record::{AccountSource, RecordBuilder, Row};
pub use render::{FallbackRenderer, RenderContext, SectionRenderer, SpecRenderer};
pub use schema::{ColumnKind, ColumnSpec, Section};
pub use service::{ExportInput, ExportOutcome, ExportService};
pub use signer::{KeyPair, SignatureAlgorithm, SignatureBlock, verify_signature};
pub use totals::Totals;
pub use types::{
    AccountNature, ChartAccount, DefaultBuckets, ExportConfig, JournalLine, LayoutKind,
    OrganizationProfile, Period, SourceKind,
};
pub use validation::{ValidationError, ValidationErrorKind};
