//! Value normalization and cell formatting.
//!
//! Everything here is a pure string/number transformation. Widths are in
//! characters, not bytes.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Largest width a stored column spec may declare.
pub const MAX_COLUMN_WIDTH: usize = 1024;

/// Strips diacritics, drops characters outside `[A-Za-z0-9 _.-]`, collapses
/// whitespace, upper-cases and truncates to `width`.
#[must_use]
pub fn normalize_text(s: &str, width: usize) -> String {
    let filtered: String = s
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '.' | '-'))
        .collect();

    let collapsed = filtered.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate(&collapsed.to_ascii_uppercase(), width)
}

/// Extracts the numeric part of a code and left-pads it with `'0'` to `width`.
///
/// Digits after the last alphabetic character are kept (all digits when the
/// code has no letters), so `"1.1.1"` becomes `"000111"` and `"12-AB-34"`
/// becomes `"000034"`. A code with no digits there is returned unchanged.
/// Longer codes are never truncated.
#[must_use]
pub fn zero_pad_digits(s: &str, width: usize) -> String {
    let tail = s
        .rfind(char::is_alphabetic)
        .map_or(s, |idx| &s[idx..]);
    let digits: String = tail.chars().filter(char::is_ascii_digit).collect();

    if digits.is_empty() {
        return s.to_string();
    }
    format!("{digits:0>width$}")
}

/// Formats an amount with exactly two fraction digits.
#[must_use]
pub fn format_decimal(n: Decimal, decimal_comma: bool) -> String {
    let mut rounded = n.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    let text = rounded.to_string();
    if decimal_comma {
        text.replace('.', ",")
    } else {
        text
    }
}

/// Renders a date as `DD/MM/YYYY`.
#[must_use]
pub fn format_date_br(d: NaiveDate) -> String {
    d.format("%d/%m/%Y").to_string()
}

/// Right-pads `s` with spaces to `width` in fixed-width mode.
///
/// Does not truncate; callers bound the value to `width` first.
#[must_use]
pub fn pad_cell(s: &str, width: usize, fixed_width: bool) -> String {
    if fixed_width {
        format!("{s:<width$}")
    } else {
        s.to_string()
    }
}

/// Replaces control characters with spaces so a value stays on one line.
#[must_use]
pub fn strip_controls(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

/// Keeps at most `width` characters.
#[must_use]
pub fn truncate(s: &str, width: usize) -> String {
    s.chars().take(width).collect()
}

/// Clamps a declared width from external spec data to
/// `1..=MAX_COLUMN_WIDTH`.
#[must_use]
pub fn clamp_width(width: i32) -> usize {
    usize::try_from(width)
        .unwrap_or(0)
        .clamp(1, MAX_COLUMN_WIDTH)
}
