//! Section rendering.
//!
//! Each section is rendered by one [`SectionRenderer`], chosen once: a
//! [`SpecRenderer`] when the organization stored column specs for the
//! section, a [`FallbackRenderer`] otherwise. Both produce cells through
//! [`render_line`], which bounds every value to its width before padding.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::normalize::{
    format_date_br, format_decimal, normalize_text, pad_cell, strip_controls, truncate,
};
use super::record::Row;
use super::schema::{
    ColumnKind, ColumnSpec, LayoutCell, LayoutRow, Section, UnknownColumn, compile_section,
};
use super::signer::SignatureBlock;
use super::totals::Totals;
use super::types::{ChartAccount, ExportConfig, LayoutKind, OrganizationProfile};

/// Label width of built-in label/value lines.
const LABEL_WIDTH: usize = 20;
/// Value width of built-in header lines.
const HEADER_VALUE_WIDTH: usize = 60;
/// Built-in widths of body and footer cells.
const CODE_WIDTH: usize = 20;
const AMOUNT_WIDTH: usize = 15;
const DESCRIPTION_WIDTH: usize = 40;
const DATE_WIDTH: usize = 10;
const NATURE_WIDTH: usize = 10;

/// A value ready to be formatted into a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    /// Free text, normalized on output.
    Text(String),
    /// Code or literal, emitted as is apart from control characters.
    Verbatim(String),
    /// Amount with two decimals.
    Amount(Decimal),
    /// `DD/MM/YYYY` date.
    Date(NaiveDate),
    /// Integer count.
    Count(usize),
}

impl CellValue {
    /// Formats the value bounded to `width` characters.
    #[must_use]
    pub fn format(&self, width: usize, config: &ExportConfig) -> String {
        match self {
            Self::Text(s) => normalize_text(s, width),
            Self::Verbatim(s) => truncate(&strip_controls(s), width),
            Self::Amount(n) => truncate(&format_decimal(*n, config.decimal_comma), width),
            Self::Date(d) => truncate(&format_date_br(*d), width),
            Self::Count(n) => truncate(&n.to_string(), width),
        }
    }
}

/// Everything a section may draw values from.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Export options.
    pub config: &'a ExportConfig,
    /// Organization profile.
    pub profile: &'a OrganizationProfile,
    /// Chart of accounts.
    pub chart_accounts: &'a [ChartAccount],
    /// Body rows.
    pub rows: &'a [Row],
    /// Totals, once computed.
    pub totals: Option<&'a Totals>,
    /// Signature, once computed.
    pub signature: Option<&'a SignatureBlock>,
}

impl<'a> RenderContext<'a> {
    /// Creates a context without totals or signature.
    #[must_use]
    pub const fn new(
        config: &'a ExportConfig,
        profile: &'a OrganizationProfile,
        chart_accounts: &'a [ChartAccount],
        rows: &'a [Row],
    ) -> Self {
        Self {
            config,
            profile,
            chart_accounts,
            rows,
            totals: None,
            signature: None,
        }
    }

    /// Adds totals and signature for footer rendering.
    #[must_use]
    pub const fn with_footer(self, totals: &'a Totals, signature: &'a SignatureBlock) -> Self {
        Self {
            totals: Some(totals),
            signature: Some(signature),
            ..self
        }
    }

    /// Resolves a column against a row, or against the section-wide
    /// context when `row` is `None`.
    #[must_use]
    pub fn resolve(&self, cell: &LayoutCell, row: Option<&Row>) -> Option<CellValue> {
        let kind = cell.kind.as_ref()?;
        match kind {
            ColumnKind::Account => row.map(|r| CellValue::Verbatim(r.account.clone())),
            ColumnKind::CostCenter => row.map(|r| CellValue::Verbatim(r.cost_center.clone())),
            ColumnKind::Debit => row
                .map(|r| r.debit)
                .or_else(|| self.totals.map(|t| t.sum_debit))
                .map(CellValue::Amount),
            ColumnKind::Credit => row
                .map(|r| r.credit)
                .or_else(|| self.totals.map(|t| t.sum_credit))
                .map(CellValue::Amount),
            ColumnKind::Value => row
                .map(Row::value)
                .or_else(|| self.totals.map(Totals::net))
                .map(CellValue::Amount),
            ColumnKind::Count => row
                .map(|r| r.line)
                .or_else(|| self.totals.map(|t| t.count))
                .map(CellValue::Count),
            ColumnKind::Description => row.map(|r| CellValue::Text(r.description.clone())),
            ColumnKind::Date => row.map(|r| CellValue::Date(r.date)),
            ColumnKind::Name => Some(CellValue::Text(self.profile.legal_name.clone())),
            ColumnKind::TradeName => Some(CellValue::Text(
                self.profile.trade_name_or_legal().to_string(),
            )),
            ColumnKind::TaxId => Some(CellValue::Verbatim(self.profile.tax_id.clone())),
            ColumnKind::Registration => Some(CellValue::Verbatim(self.profile.registration())),
            ColumnKind::Address => Some(CellValue::Text(self.profile.address.clone())),
            ColumnKind::Period => Some(self.period_value()),
            ColumnKind::Signature => self
                .signature
                .map(|s| CellValue::Verbatim(s.hex_value.clone())),
            ColumnKind::Algorithm => self
                .signature
                .map(|s| CellValue::Verbatim(s.algorithm.to_string())),
            ColumnKind::Label => cell.label.clone().map(CellValue::Verbatim),
            ColumnKind::Const(literal) => Some(CellValue::Verbatim(literal.clone())),
        }
    }

    fn period_value(&self) -> CellValue {
        CellValue::Verbatim(
            self.config
                .period
                .map_or_else(|| "ALL".to_string(), |p| p.to_string()),
        )
    }
}

/// Formats one physical line. Missing values render as blank cells.
///
/// In delimited mode occurrences of the delimiter inside a value are
/// replaced with spaces so every line keeps its column count.
#[must_use]
pub fn render_line(cells: &[(Option<CellValue>, usize)], config: &ExportConfig) -> String {
    let rendered: Vec<String> = cells
        .iter()
        .map(|(value, width)| {
            let text = value
                .as_ref()
                .map(|v| v.format(*width, config))
                .unwrap_or_default();
            if config.fixed_width || config.delimiter.is_empty() {
                pad_cell(&text, *width, config.fixed_width)
            } else {
                text.replace(config.delimiter.as_str(), " ")
            }
        })
        .collect();

    if config.fixed_width {
        rendered.concat()
    } else {
        rendered.join(&config.delimiter)
    }
}

/// Renders one output section into physical lines.
pub trait SectionRenderer: Send + Sync {
    /// Renders the section.
    fn render(&self, ctx: &RenderContext<'_>) -> Vec<String>;
}

/// Renders a section from stored column specs.
#[derive(Debug, Clone)]
pub struct SpecRenderer {
    section: Section,
    rows: Vec<LayoutRow>,
}

impl SpecRenderer {
    /// Creates a renderer for already compiled rows.
    #[must_use]
    pub fn new(section: Section, rows: Vec<LayoutRow>) -> Self {
        Self { section, rows }
    }

    fn render_row(
        &self,
        layout: &LayoutRow,
        ctx: &RenderContext<'_>,
        row: Option<&Row>,
    ) -> String {
        let cells: Vec<(Option<CellValue>, usize)> = layout
            .cells
            .iter()
            .map(|cell| (ctx.resolve(cell, row), cell.width))
            .collect();
        render_line(&cells, ctx.config)
    }
}

impl SectionRenderer for SpecRenderer {
    fn render(&self, ctx: &RenderContext<'_>) -> Vec<String> {
        match self.section {
            Section::Body => ctx
                .rows
                .iter()
                .flat_map(|row| {
                    self.rows
                        .iter()
                        .map(move |layout| self.render_row(layout, ctx, Some(row)))
                })
                .collect(),
            Section::Header | Section::Footer => self
                .rows
                .iter()
                .map(|layout| self.render_row(layout, ctx, None))
                .collect(),
        }
    }
}

/// Renders a section with the built-in layout.
#[derive(Debug, Clone, Copy)]
pub struct FallbackRenderer {
    section: Section,
}

impl FallbackRenderer {
    /// Creates a built-in renderer for `section`.
    #[must_use]
    pub const fn new(section: Section) -> Self {
        Self { section }
    }

    fn label_line(label: &str, value: CellValue, width: usize, ctx: &RenderContext<'_>) -> String {
        render_line(
            &[
                (Some(CellValue::Verbatim(label.to_string())), LABEL_WIDTH),
                (Some(value), width),
            ],
            ctx.config,
        )
    }

    fn header(ctx: &RenderContext<'_>) -> Vec<String> {
        let profile = ctx.profile;
        let mut lines = vec![
            Self::label_line(
                "NAME",
                CellValue::Text(profile.legal_name.clone()),
                HEADER_VALUE_WIDTH,
                ctx,
            ),
            Self::label_line(
                "TAX ID",
                CellValue::Verbatim(profile.tax_id.clone()),
                HEADER_VALUE_WIDTH,
                ctx,
            ),
            Self::label_line(
                "REGISTRATION",
                CellValue::Verbatim(profile.registration()),
                HEADER_VALUE_WIDTH,
                ctx,
            ),
            Self::label_line(
                "ADDRESS",
                CellValue::Text(profile.address.clone()),
                HEADER_VALUE_WIDTH,
                ctx,
            ),
            Self::label_line("PERIOD", ctx.period_value(), HEADER_VALUE_WIDTH, ctx),
            render_line(
                &[(
                    Some(CellValue::Verbatim("CHART OF ACCOUNTS".to_string())),
                    LABEL_WIDTH,
                )],
                ctx.config,
            ),
        ];

        lines.extend(ctx.chart_accounts.iter().map(|account| {
            render_line(
                &[
                    (Some(CellValue::Verbatim(account.code.clone())), CODE_WIDTH),
                    (Some(CellValue::Text(account.name.clone())), HEADER_VALUE_WIDTH),
                    (
                        Some(CellValue::Verbatim(account.nature.to_string())),
                        NATURE_WIDTH,
                    ),
                ],
                ctx.config,
            )
        }));
        lines
    }

    fn body_line(row: &Row, ctx: &RenderContext<'_>) -> String {
        let account = (Some(CellValue::Verbatim(row.account.clone())), CODE_WIDTH);
        let cost_center = (Some(CellValue::Verbatim(row.cost_center.clone())), CODE_WIDTH);
        let description = (
            Some(CellValue::Text(row.description.clone())),
            DESCRIPTION_WIDTH,
        );
        let date = (Some(CellValue::Date(row.date)), DATE_WIDTH);

        let cells = match ctx.config.layout_kind {
            LayoutKind::Ledger => vec![
                account,
                (Some(CellValue::Amount(row.debit)), AMOUNT_WIDTH),
                (Some(CellValue::Amount(row.credit)), AMOUNT_WIDTH),
                description,
                date,
                cost_center,
            ],
            LayoutKind::Basic => vec![
                date,
                account,
                cost_center,
                (Some(CellValue::Amount(row.value())), AMOUNT_WIDTH),
                description,
            ],
        };
        render_line(&cells, ctx.config)
    }

    fn footer(ctx: &RenderContext<'_>) -> Vec<String> {
        let totals = ctx.totals.copied().unwrap_or_default();
        vec![
            Self::label_line(
                "TOTAL DEBIT",
                CellValue::Amount(totals.sum_debit),
                AMOUNT_WIDTH,
                ctx,
            ),
            Self::label_line(
                "TOTAL CREDIT",
                CellValue::Amount(totals.sum_credit),
                AMOUNT_WIDTH,
                ctx,
            ),
            Self::label_line(
                "LINE COUNT",
                CellValue::Count(totals.count),
                AMOUNT_WIDTH,
                ctx,
            ),
        ]
    }
}

impl SectionRenderer for FallbackRenderer {
    fn render(&self, ctx: &RenderContext<'_>) -> Vec<String> {
        match self.section {
            Section::Header => Self::header(ctx),
            Section::Body => ctx.rows.iter().map(|row| Self::body_line(row, ctx)).collect(),
            Section::Footer => Self::footer(ctx),
        }
    }
}

/// Chooses the renderer for `section`, returning any unknown columns found
/// in its specs.
#[must_use]
pub fn select_renderer(
    specs: &[ColumnSpec],
    section: Section,
) -> (Box<dyn SectionRenderer>, Vec<UnknownColumn>) {
    let (rows, unknown) = compile_section(specs, section);
    if rows.is_empty() {
        (Box::new(FallbackRenderer::new(section)), unknown)
    } else {
        (Box::new(SpecRenderer::new(section, rows)), unknown)
    }
}

/// Renders `section` with whichever renderer applies.
#[must_use]
pub fn render_section(
    specs: &[ColumnSpec],
    section: Section,
    ctx: &RenderContext<'_>,
) -> Vec<String> {
    select_renderer(specs, section).0.render(ctx)
}
