//! Property-based tests for the export pipeline.
//!
//! - Width invariant of fixed-width output in every section
//! - Column count of delimited output
//! - Zero-padding of account codes
//! - Totals over arbitrary rows
//! - Export idempotence

use chrono::NaiveDate;
use folio_shared::types::OrganizationId;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::normalize::{clamp_width, zero_pad_digits};
use super::record::RecordBuilder;
use super::render::{RenderContext, render_section};
use super::schema::{ColumnSpec, Section};
use super::service::{ExportInput, ExportService};
use super::signer::digest_block;
use super::totals::accumulate;
use super::types::{
    DefaultBuckets, ExportConfig, JournalLine, OrganizationProfile, Period, SourceKind,
};

/// Strategy to generate non-negative amounts (0.00 to 99,999,999.99).
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn source_kind() -> impl Strategy<Value = SourceKind> {
    prop_oneof![Just(SourceKind::Entry), Just(SourceKind::Expense)]
}

/// Strategy to generate journal lines with free-form text fields.
fn journal_line() -> impl Strategy<Value = JournalLine> {
    (
        1u32..=28,
        "[0-9A-Za-z.|\\- \t\n\r]{0,12}",
        "[0-9A-Z]{0,6}",
        amount(),
        "\\PC{0,60}",
        source_kind(),
    )
        .prop_map(|(day, account, cost_center, value, description, kind)| {
            let (debit, credit) = match kind {
                SourceKind::Entry => (value, Decimal::ZERO),
                SourceKind::Expense => (Decimal::ZERO, value),
            };
            JournalLine {
                date: NaiveDate::from_ymd_opt(2024, 2, day).unwrap(),
                account_code: account,
                cost_center_id: cost_center,
                debit,
                credit,
                description,
                source_kind: kind,
            }
        })
}

fn column_name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("ACCOUNT"),
        Just("COST_CENTER"),
        Just("DEBIT"),
        Just("CREDIT"),
        Just("VALUE"),
        Just("DESCRIPTION"),
        Just("DATE"),
        Just("NAME"),
        Just("TRADE_NAME"),
        Just("TAX_ID"),
        Just("REGISTRATION"),
        Just("ADDRESS"),
        Just("PERIOD"),
        Just("COUNT"),
        Just("SIGNATURE"),
        Just("ALGORITHM"),
        Just("LABEL"),
        Just("CONST:ABCDEFGHIJ"),
        Just("CONST:A\tB\nC"),
        Just("UNKNOWN"),
    ]
    .prop_map(|name| name.to_string())
}

fn any_section() -> impl Strategy<Value = Section> {
    prop_oneof![
        Just(Section::Header),
        Just(Section::Body),
        Just(Section::Footer),
    ]
}

/// Strategy to generate one row of column specs for `section`, widths
/// possibly invalid.
fn row_specs(section: Section) -> impl Strategy<Value = Vec<ColumnSpec>> {
    prop::collection::vec((column_name(), -3i32..40), 1..8).prop_map(move |cells| {
        cells
            .into_iter()
            .zip(1..)
            .map(|((column_name, width), ord)| ColumnSpec {
                section,
                row_ord: 1,
                ord,
                column_name,
                width,
                format: None,
                label: Some("LABEL\r\nTEXT".to_string()),
            })
            .collect()
    })
}

/// Strategy to generate profiles with free-form identifiers.
fn profile_with_noise() -> impl Strategy<Value = OrganizationProfile> {
    (
        "[0-9./|\\-\t\n]{0,20}",
        prop::option::of("[0-9 \n]{0,12}"),
        prop::option::of("\\PC{0,20}"),
    )
        .prop_map(|(tax_id, state_registration, trade_name)| OrganizationProfile {
            tax_id,
            state_registration,
            trade_name,
            ..profile()
        })
}

fn profile() -> OrganizationProfile {
    OrganizationProfile {
        legal_name: "Ação & Cia Ltda".to_string(),
        tax_id: "00.000.000/0001-00".to_string(),
        address: "Rua Um, 1".to_string(),
        ..OrganizationProfile::default()
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every fixed-width line of a spec-driven section is exactly as wide
    /// as the sum of its clamped column widths.
    #[test]
    fn prop_fixed_width_lines_match_declared_widths(
        lines in prop::collection::vec(journal_line(), 0..10),
        (section, specs) in any_section().prop_flat_map(|s| (Just(s), row_specs(s))),
        profile in profile_with_noise(),
        decimal_comma in any::<bool>(),
    ) {
        let config = ExportConfig::default().with_decimal_comma(decimal_comma);
        let buckets = DefaultBuckets::default();
        let rows = RecordBuilder::new(&buckets).build_all(&lines);
        let totals = accumulate(&rows);
        let signature = digest_block(b"payload");
        let ctx = RenderContext::new(&config, &profile, &[], &rows)
            .with_footer(&totals, &signature);

        let expected: usize = specs.iter().map(|s| clamp_width(s.width)).sum();
        let rendered = render_section(&specs, section, &ctx);

        let expected_lines = if section == Section::Body { rows.len() } else { 1 };
        prop_assert_eq!(rendered.len(), expected_lines);
        for line in rendered {
            prop_assert!(!line.contains(['\n', '\r']));
            prop_assert_eq!(line.chars().count(), expected);
        }
    }

    /// Delimited lines of a spec-driven section keep one field per column.
    #[test]
    fn prop_delimited_lines_keep_column_count(
        lines in prop::collection::vec(journal_line(), 0..10),
        (section, specs) in any_section().prop_flat_map(|s| (Just(s), row_specs(s))),
        profile in profile_with_noise(),
        delimiter in prop_oneof![Just("|"), Just(";"), Just("\t")],
    ) {
        let config = ExportConfig::default()
            .with_fixed_width(false)
            .with_delimiter(delimiter);
        let buckets = DefaultBuckets::default();
        let rows = RecordBuilder::new(&buckets).build_all(&lines);
        let totals = accumulate(&rows);
        let signature = digest_block(b"payload");
        let ctx = RenderContext::new(&config, &profile, &[], &rows)
            .with_footer(&totals, &signature);

        for line in render_section(&specs, section, &ctx) {
            prop_assert!(!line.contains('\n'));
            prop_assert_eq!(line.split(delimiter).count(), specs.len());
        }
    }

    /// Built-in fixed-width body lines all share one width.
    #[test]
    fn prop_fallback_lines_share_width(
        lines in prop::collection::vec(journal_line(), 1..10),
    ) {
        let config = ExportConfig::default();
        let buckets = DefaultBuckets::default();
        let rows = RecordBuilder::new(&buckets).build_all(&lines);
        let profile = profile();
        let ctx = RenderContext::new(&config, &profile, &[], &rows);

        let rendered = render_section(&[], Section::Body, &ctx);
        prop_assert_eq!(rendered.len(), rows.len());
        let width = rendered[0].chars().count();
        prop_assert!(rendered.iter().all(|l| l.chars().count() == width));
    }

    /// Padded codes are at least `width` long and end with the digits after
    /// the last letter.
    #[test]
    fn prop_zero_pad_keeps_trailing_digits(
        prefix in "[A-Z]{0,3}[-.]?",
        digits in "[0-9]{1,10}",
        width in 1usize..12,
    ) {
        let code = format!("{prefix}{digits}");
        let padded = zero_pad_digits(&code, width);

        prop_assert!(padded.len() >= width);
        prop_assert!(padded.ends_with(&digits));
        prop_assert!(padded.chars().all(|c| c.is_ascii_digit()));
    }

    /// Codes without digits pass through unchanged.
    #[test]
    fn prop_zero_pad_without_digits_is_identity(code in "[A-Za-z .-]{0,10}", width in 1usize..12) {
        prop_assert_eq!(zero_pad_digits(&code, width), code);
    }

    /// Totals equal the per-side sums and the row count.
    #[test]
    fn prop_totals_match_sums(lines in prop::collection::vec(journal_line(), 0..30)) {
        let buckets = DefaultBuckets::default();
        let rows = RecordBuilder::new(&buckets).build_all(&lines);
        let totals = accumulate(&rows);

        let debit: Decimal = rows.iter().map(|r| r.debit).sum();
        let credit: Decimal = rows.iter().map(|r| r.credit).sum();
        prop_assert_eq!(totals.sum_debit, debit);
        prop_assert_eq!(totals.sum_credit, credit);
        prop_assert_eq!(totals.count, lines.len());
    }

    /// Two exports over identical inputs produce identical artifacts.
    #[test]
    fn prop_export_is_idempotent(
        lines in prop::collection::vec(journal_line(), 0..10),
        start_day in 1u32..=28,
        span in 0u32..28,
        fixed_width in any::<bool>(),
    ) {
        let start = NaiveDate::from_ymd_opt(2024, 2, start_day).unwrap();
        let end = start + chrono::Days::new(u64::from(span));
        let config = ExportConfig::default()
            .with_fixed_width(fixed_width)
            .with_period(Some(Period::new(start, end)));
        let profile = profile();
        let input = ExportInput {
            organization_id: OrganizationId::new(),
            profile: &profile,
            chart_accounts: &[],
            journal_lines: &lines,
            column_specs: &[],
            config: &config,
        };

        let rt = runtime();
        let first = rt.block_on(ExportService::export(&input, None));
        let second = rt.block_on(ExportService::export(&input, None));

        prop_assert_eq!(&first.artifact, &second.artifact);
        prop_assert_eq!(&first.errors, &second.errors);
        prop_assert!(first.totals.count <= lines.len());
    }
}
