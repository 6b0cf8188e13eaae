//! Export orchestration.

use folio_shared::types::{ExportId, OrganizationId};
use tracing::{debug, info};

use super::error::ExportError;
use super::record::{RecordBuilder, Row};
use super::render::{RenderContext, select_renderer};
use super::schema::{ColumnSpec, Section};
use super::signer::{self, KeyPair, SignatureBlock};
use super::totals::{Totals, accumulate};
use super::types::{ChartAccount, ExportConfig, JournalLine, LayoutKind, OrganizationProfile};
use super::validation::{ValidationError, ValidationErrorKind, validate_rows};
use crate::storage::artifact_key;

/// Read-only snapshot for one export invocation.
#[derive(Debug, Clone, Copy)]
pub struct ExportInput<'a> {
    /// Organization being exported.
    pub organization_id: OrganizationId,
    /// Organization profile.
    pub profile: &'a OrganizationProfile,
    /// Chart of accounts.
    pub chart_accounts: &'a [ChartAccount],
    /// Journal lines from both ledgers.
    pub journal_lines: &'a [JournalLine],
    /// Stored column specs, possibly empty.
    pub column_specs: &'a [ColumnSpec],
    /// Export options.
    pub config: &'a ExportConfig,
}

/// Result of an export invocation. Owned by the caller.
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    /// Correlation id for logs.
    pub export_id: ExportId,
    /// Organization exported.
    pub organization_id: OrganizationId,
    /// Layout kind used for fallback sections.
    pub layout_kind: LayoutKind,
    /// Full artifact text.
    pub artifact: String,
    /// Exact bytes that were signed (header and body).
    pub signed_payload: String,
    /// Body totals.
    pub totals: Totals,
    /// Integrity signature.
    pub signature: SignatureBlock,
    /// Structural defects; non-empty blocks release.
    pub errors: Vec<ValidationError>,
}

impl ExportOutcome {
    /// Returns true if the artifact may be downloaded or persisted.
    #[must_use]
    pub fn is_releasable(&self) -> bool {
        self.errors.is_empty()
    }

    /// The artifact for on-screen preview, errors or not.
    #[must_use]
    pub fn preview(&self) -> &str {
        &self.artifact
    }

    /// The artifact for download or persistence.
    ///
    /// # Errors
    ///
    /// Returns `ReleaseBlocked` while validation errors exist.
    pub fn release(&self) -> Result<&str, ExportError> {
        if self.is_releasable() {
            Ok(&self.artifact)
        } else {
            Err(ExportError::ReleaseBlocked {
                count: self.errors.len(),
            })
        }
    }

    /// File name of the released artifact.
    #[must_use]
    pub fn file_name(&self) -> String {
        artifact_key(self.layout_kind, self.organization_id)
    }
}

/// Service that runs exports.
pub struct ExportService;

impl ExportService {
    /// Runs one export.
    ///
    /// Never fails: structural problems are returned in
    /// [`ExportOutcome::errors`] and signing problems degrade to a digest.
    pub async fn export(input: &ExportInput<'_>, key_pair: Option<&KeyPair>) -> ExportOutcome {
        let export_id = ExportId::new();
        let config = input.config;
        info!(
            %export_id,
            organization_id = %input.organization_id,
            layout_kind = %config.layout_kind,
            journal_lines = input.journal_lines.len(),
            column_specs = input.column_specs.len(),
            "Starting export"
        );

        let mut errors = Vec::new();
        if let Some(period) = config.period
            && period.is_inverted()
        {
            errors.push(ValidationError::layout(ValidationErrorKind::InvertedPeriod {
                start: period.start,
                end: period.end,
            }));
        }

        let rows = Self::build_rows(input);

        let (header_renderer, header_unknown) =
            select_renderer(input.column_specs, Section::Header);
        let (body_renderer, body_unknown) = select_renderer(input.column_specs, Section::Body);
        let (footer_renderer, footer_unknown) =
            select_renderer(input.column_specs, Section::Footer);
        errors.extend(
            header_unknown
                .into_iter()
                .chain(body_unknown)
                .chain(footer_unknown)
                .map(ValidationError::from),
        );

        let ctx = RenderContext::new(config, input.profile, input.chart_accounts, &rows);

        let header = header_renderer.render(&ctx);
        let (body, row_errors) =
            rayon::join(|| body_renderer.render(&ctx), || validate_rows(&rows));
        errors.extend(row_errors);

        let totals = accumulate(&rows);

        let signed_payload = header
            .iter()
            .chain(body.iter())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n");
        let signature = signer::sign(signed_payload.as_bytes(), key_pair).await;

        let footer = footer_renderer.render(&ctx.with_footer(&totals, &signature));

        let artifact = Self::assemble(&header, &body, &footer, &signature);

        info!(
            %export_id,
            lines = totals.count,
            errors = errors.len(),
            algorithm = %signature.algorithm,
            "Export finished"
        );

        ExportOutcome {
            export_id,
            organization_id: input.organization_id,
            layout_kind: config.layout_kind,
            artifact,
            signed_payload,
            totals,
            signature,
            errors,
        }
    }

    /// Filters lines by period and maps them to rows numbered from 1.
    fn build_rows(input: &ExportInput<'_>) -> Vec<Row> {
        let config = input.config;
        let builder = RecordBuilder::new(&config.default_buckets);
        let rows = builder.build_all(
            input
                .journal_lines
                .iter()
                .filter(|line| config.includes(line.date)),
        );
        debug!(
            kept = rows.len(),
            dropped = input.journal_lines.len() - rows.len(),
            "Applied period filter"
        );
        rows
    }

    /// Joins sections and the signature trailer.
    fn assemble(
        header: &[String],
        body: &[String],
        footer: &[String],
        signature: &SignatureBlock,
    ) -> String {
        let mut lines: Vec<String> =
            Vec::with_capacity(header.len() + body.len() + footer.len() + 2);
        lines.extend_from_slice(header);
        lines.extend_from_slice(body);
        lines.extend_from_slice(footer);
        lines.push(format!(
            "SIGNATURE {} {}",
            signature.algorithm, signature.hex_value
        ));
        if signature.is_asymmetric()
            && let Some(public_key) = &signature.public_key
        {
            lines.push(format!("PUBLIC_KEY {public_key}"));
        }
        lines.join("\n")
    }
}
