//! JSON input bundle supplied by the hosting system.

use std::path::Path;

use anyhow::Context;
use folio_core::export::{ChartAccount, ColumnSpec, JournalLine, OrganizationProfile};
use folio_shared::types::OrganizationId;
use serde::Deserialize;

/// Snapshot of everything one export reads.
#[derive(Debug, Deserialize)]
pub struct ExportBundle {
    /// Organization being exported.
    pub organization_id: OrganizationId,
    /// Organization profile.
    pub profile: OrganizationProfile,
    /// Chart of accounts.
    #[serde(default)]
    pub chart_accounts: Vec<ChartAccount>,
    /// Journal lines from both ledgers.
    #[serde(default)]
    pub journal_lines: Vec<JournalLine>,
    /// Stored column specs; empty means built-in layouts.
    #[serde(default)]
    pub column_specs: Vec<ColumnSpec>,
}

impl ExportBundle {
    /// Reads a bundle from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading bundle {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing bundle {}", path.display()))
    }
}
