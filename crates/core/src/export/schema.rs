//! Layout schema: column specs and their grouping into rows.
//!
//! Column semantics are parsed once into [`ColumnKind`] so rendering is an
//! exhaustive match instead of string comparison.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::normalize::clamp_width;

/// Prefix in `ColumnSpec::format` marking a fixed literal cell.
pub const CONST_PREFIX: &str = "CONST:";

/// Output section a column spec belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    /// Organization and chart of accounts block.
    Header,
    /// One block per journal line.
    Body,
    /// Totals block.
    Footer,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header => write!(f, "header"),
            Self::Body => write!(f, "body"),
            Self::Footer => write!(f, "footer"),
        }
    }
}

/// One cell of a schema-defined row, as stored by the organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Section this cell belongs to.
    pub section: Section,
    /// Row grouping within the section, ascending.
    pub row_ord: i32,
    /// Position within the row, ascending.
    pub ord: i32,
    /// Symbolic source of the value.
    pub column_name: String,
    /// Width in characters, clamped to `1..=MAX_COLUMN_WIDTH`.
    pub width: i32,
    /// Optional format; `CONST:<literal>` makes the cell a fixed literal.
    #[serde(default)]
    pub format: Option<String>,
    /// Display label for `LABEL` cells.
    #[serde(default)]
    pub label: Option<String>,
}

/// Semantic source of a cell value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnKind {
    /// Zero-padded account code.
    Account,
    /// Zero-padded cost center.
    CostCenter,
    /// Row debit, or total debit in the footer.
    Debit,
    /// Row credit, or total credit in the footer.
    Credit,
    /// Non-zero side of the row, or net total in the footer.
    Value,
    /// Normalized description.
    Description,
    /// Movement date.
    Date,
    /// Organization legal name.
    Name,
    /// Trade name, or the legal name when none is set.
    TradeName,
    /// Organization tax id.
    TaxId,
    /// State/municipal registration.
    Registration,
    /// Organization address.
    Address,
    /// Selected period.
    Period,
    /// Line count in the footer, line number in the body.
    Count,
    /// Signature hex value.
    Signature,
    /// Signature algorithm.
    Algorithm,
    /// The column's own label.
    Label,
    /// Fixed literal.
    Const(String),
}

impl ColumnKind {
    /// Parses a stored column name and format.
    ///
    /// A `CONST:` prefix on either the format or the column name wins over
    /// the name. Returns `None` for names that map to no known source.
    #[must_use]
    pub fn parse(column_name: &str, format: Option<&str>) -> Option<Self> {
        if let Some(literal) = format.and_then(|f| f.strip_prefix(CONST_PREFIX)) {
            return Some(Self::Const(literal.to_string()));
        }
        if let Some(literal) = column_name.strip_prefix(CONST_PREFIX) {
            return Some(Self::Const(literal.to_string()));
        }

        let kind = match column_name.trim().to_ascii_uppercase().as_str() {
            "ACCOUNT" | "CONTA" => Self::Account,
            "COST_CENTER" | "CENTRO_CUSTO" | "CC" => Self::CostCenter,
            "DEBIT" | "DEBITO" => Self::Debit,
            "CREDIT" | "CREDITO" => Self::Credit,
            "VALUE" | "VALOR" => Self::Value,
            "DESCRIPTION" | "HISTORICO" => Self::Description,
            "DATE" | "DATA" => Self::Date,
            "NAME" | "NOME" => Self::Name,
            "TRADE_NAME" | "NOME_FANTASIA" => Self::TradeName,
            "TAX_ID" | "CNPJ" | "CPF" => Self::TaxId,
            "REGISTRATION" => Self::Registration,
            "ADDRESS" => Self::Address,
            "PERIOD" => Self::Period,
            "COUNT" => Self::Count,
            "SIGNATURE" => Self::Signature,
            "ALGORITHM" => Self::Algorithm,
            "LABEL" => Self::Label,
            "CONST" => Self::Const(format.unwrap_or_default().to_string()),
            _ => return None,
        };
        Some(kind)
    }
}

/// A parsed cell ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutCell {
    /// Value source; `None` when the stored column name was not recognized.
    pub kind: Option<ColumnKind>,
    /// Clamped width.
    pub width: usize,
    /// Label text for `LABEL` cells.
    pub label: Option<String>,
}

/// A parsed physical row of a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutRow {
    /// Row grouping value from the specs.
    pub row_ord: i32,
    /// Cells in output order.
    pub cells: Vec<LayoutCell>,
}

/// A column name that could not be mapped to a value source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownColumn {
    /// Section of the offending spec.
    pub section: Section,
    /// Row of the offending spec.
    pub row_ord: i32,
    /// The stored column name.
    pub column_name: String,
}

/// Groups the specs of `section` into rows ordered by `row_ord`, then by
/// `ord` within each row. Ties keep their input order.
///
/// An empty result means the section uses its built-in layout.
#[must_use]
pub fn rows_for_section(specs: &[ColumnSpec], section: Section) -> Vec<Vec<&ColumnSpec>> {
    let mut selected: Vec<&ColumnSpec> = specs.iter().filter(|s| s.section == section).collect();
    selected.sort_by_key(|s| (s.row_ord, s.ord));

    let mut rows: Vec<Vec<&ColumnSpec>> = Vec::new();
    for spec in selected {
        match rows.last_mut() {
            Some(row) if row[0].row_ord == spec.row_ord => row.push(spec),
            _ => rows.push(vec![spec]),
        }
    }
    rows
}

/// Parses the rows of `section` into layout rows, reporting unknown columns.
#[must_use]
pub fn compile_section(
    specs: &[ColumnSpec],
    section: Section,
) -> (Vec<LayoutRow>, Vec<UnknownColumn>) {
    let mut unknown = Vec::new();
    let rows = rows_for_section(specs, section)
        .into_iter()
        .map(|row| {
            let row_ord = row[0].row_ord;
            let cells = row
                .into_iter()
                .map(|spec| {
                    let kind = ColumnKind::parse(&spec.column_name, spec.format.as_deref());
                    if kind.is_none() {
                        unknown.push(UnknownColumn {
                            section,
                            row_ord,
                            column_name: spec.column_name.clone(),
                        });
                    }
                    LayoutCell {
                        kind,
                        width: clamp_width(spec.width),
                        label: spec.label.clone(),
                    }
                })
                .collect();
            LayoutRow { row_ord, cells }
        })
        .collect();
    (rows, unknown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::normalize::MAX_COLUMN_WIDTH;

    fn spec(section: Section, row_ord: i32, ord: i32, name: &str) -> ColumnSpec {
        ColumnSpec {
            section,
            row_ord,
            ord,
            column_name: name.to_string(),
            width: 10,
            format: None,
            label: None,
        }
    }

    #[test]
    fn test_rows_grouped_and_sorted() {
        let specs = vec![
            spec(Section::Body, 2, 1, "DATE"),
            spec(Section::Header, 1, 1, "NAME"),
            spec(Section::Body, 1, 2, "DEBIT"),
            spec(Section::Body, 1, 1, "ACCOUNT"),
            spec(Section::Body, 2, 0, "LABEL"),
        ];

        let rows = rows_for_section(&specs, Section::Body);
        let names: Vec<Vec<&str>> = rows
            .iter()
            .map(|r| r.iter().map(|s| s.column_name.as_str()).collect())
            .collect();
        assert_eq!(names, vec![vec!["ACCOUNT", "DEBIT"], vec!["LABEL", "DATE"]]);
    }

    #[test]
    fn test_empty_section_signals_fallback() {
        let specs = vec![spec(Section::Header, 1, 1, "NAME")];
        assert!(rows_for_section(&specs, Section::Footer).is_empty());
        assert!(rows_for_section(&[], Section::Body).is_empty());
    }

    #[test]
    fn test_parse_column_kinds() {
        assert_eq!(ColumnKind::parse("account", None), Some(ColumnKind::Account));
        assert_eq!(ColumnKind::parse(" CNPJ ", None), Some(ColumnKind::TaxId));
        assert_eq!(ColumnKind::parse("historico", None), Some(ColumnKind::Description));
        assert_eq!(ColumnKind::parse("nome_fantasia", None), Some(ColumnKind::TradeName));
        assert_eq!(
            ColumnKind::parse("DEBIT", Some("CONST:0000")),
            Some(ColumnKind::Const("0000".to_string()))
        );
        assert_eq!(
            ColumnKind::parse("CONST:|I200|", None),
            Some(ColumnKind::Const("|I200|".to_string()))
        );
        assert_eq!(
            ColumnKind::parse("CONST", Some("X")),
            Some(ColumnKind::Const("X".to_string()))
        );
        assert_eq!(ColumnKind::parse("BALANCE", None), None);
    }

    #[test]
    fn test_compile_reports_unknown_and_clamps() {
        let mut bad_width = spec(Section::Footer, 1, 2, "DEBIT");
        bad_width.width = -3;
        let specs = vec![spec(Section::Footer, 1, 1, "BALANCE"), bad_width];

        let (rows, unknown) = compile_section(&specs, Section::Footer);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cells[0].kind, None);
        assert_eq!(rows[0].cells[1].width, 1);

        let mut huge = spec(Section::Header, 1, 1, "NAME");
        huge.width = i32::MAX;
        let (rows, _) = compile_section(&[huge], Section::Header);
        assert_eq!(rows[0].cells[0].width, MAX_COLUMN_WIDTH);
        assert_eq!(
            unknown,
            vec![UnknownColumn {
                section: Section::Footer,
                row_ord: 1,
                column_name: "BALANCE".to_string(),
            }]
        );
    }
}
