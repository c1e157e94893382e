//! Display formatting of field values

use crate::money::{commaify, to_dollars_cents};
use crate::value::{FieldType, FieldValue};

/// Default padding width for `_dollars` fields
pub const DEFAULT_WIDTH: usize = 8;

/// Lines a multi-line field is expected to hold
pub const MAX_LINES: usize = 3;

const DOLLARS_SUFFIX: &str = "_dollars";
const CENTS_SUFFIX: &str = "_cents";

/// Field-specific inputs to formatting
#[derive(Debug, Clone, Copy)]
pub struct FormatContext<'a> {
    /// Declared type of the field
    pub field_type: FieldType,
    /// Sibling `_cents` value of a `_dollars` field
    pub cents: Option<&'a FieldValue>,
    /// Padding width for `_dollars` fields
    pub width: usize,
}

impl Default for FormatContext<'_> {
    fn default() -> Self {
        Self {
            field_type: FieldType::Text,
            cents: None,
            width: DEFAULT_WIDTH,
        }
    }
}

/// What gets drawn for one field
#[derive(Debug, Clone, PartialEq)]
pub enum FormattedValue {
    /// Nothing is drawn
    Skip,
    /// One line of text
    Single(String),
    /// Several lines, first line topmost
    MultiLine(Vec<String>),
}

impl FormattedValue {
    /// All lines to draw, empty for [`FormattedValue::Skip`]
    pub fn lines(&self) -> Vec<&str> {
        match self {
            Self::Skip => Vec::new(),
            Self::Single(line) => vec![line.as_str()],
            Self::MultiLine(lines) => lines.iter().map(String::as_str).collect(),
        }
    }

    /// Whether a multi-line value exceeds [`MAX_LINES`]
    pub fn has_too_many_lines(&self) -> bool {
        matches!(self, Self::MultiLine(lines) if lines.len() > MAX_LINES)
    }
}

/// Field value formatting
pub struct ValueFormatter;

impl ValueFormatter {
    /// Format a value for the field with the given readable name
    pub fn format(readable: &str, value: &FieldValue, ctx: &FormatContext<'_>) -> FormattedValue {
        format_value(readable, value, ctx)
    }

    /// Sibling `_cents` name of a `_dollars` field
    pub fn cents_key(readable: &str) -> Option<String> {
        readable
            .strip_suffix(DOLLARS_SUFFIX)
            .map(|stem| format!("{stem}{CENTS_SUFFIX}"))
    }
}

/// Format a value for the field with the given readable name
///
/// # Examples
/// ```
/// use form_values::{format_value, FieldValue, FormatContext, FormattedValue};
///
/// let cents = FieldValue::Numeric(51.0);
/// let ctx = FormatContext { cents: Some(&cents), ..Default::default() };
/// assert_eq!(
///     format_value("10a_mark_to_market_dollars", &FieldValue::Numeric(1234.0), &ctx),
///     FormattedValue::Single("   1,235".to_string()),
/// );
/// ```
pub fn format_value(readable: &str, value: &FieldValue, ctx: &FormatContext<'_>) -> FormattedValue {
    if ctx.field_type == FieldType::Button {
        return if value.is_truthy() {
            FormattedValue::Single("X".to_string())
        } else {
            FormattedValue::Skip
        };
    }

    // The cents only decide the carry into the dollars field
    if readable.ends_with(CENTS_SUFFIX) {
        return FormattedValue::Skip;
    }

    if readable.ends_with(DOLLARS_SUFFIX) {
        let text = match value.as_f64() {
            Some(dollars) => {
                let cents = ctx.cents.and_then(FieldValue::as_f64).unwrap_or(0.0).abs();
                let sign = if dollars < 0.0 { -1.0 } else { 1.0 };
                let (rounded, _) = to_dollars_cents(dollars + sign * cents / 100.0);
                commaify(&rounded.to_string())
            }
            None => value.display_text(),
        };
        return FormattedValue::Single(pad_left(&text, ctx.width));
    }

    let text = value.display_text();
    if text.is_empty() {
        return FormattedValue::Skip;
    }
    if text.contains('\n') {
        return FormattedValue::MultiLine(text.split('\n').map(str::to_string).collect());
    }
    FormattedValue::Single(commaify(&text))
}

fn pad_left(text: &str, width: usize) -> String {
    format!("{text:>width$}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text_ctx() -> FormatContext<'static> {
        FormatContext::default()
    }

    fn single(s: &str) -> FormattedValue {
        FormattedValue::Single(s.to_string())
    }

    #[test]
    fn test_button_marks() {
        let ctx = FormatContext {
            field_type: FieldType::Button,
            ..Default::default()
        };
        assert_eq!(format_value("is_individual", &FieldValue::Checked(true), &ctx), single("X"));
        assert_eq!(
            format_value("is_individual", &FieldValue::Checked(false), &ctx),
            FormattedValue::Skip
        );
        assert_eq!(format_value("is_individual", &FieldValue::from("yes"), &ctx), single("X"));
    }

    #[test]
    fn test_dollars_round_up_with_cents() {
        let cents = FieldValue::Numeric(51.0);
        let ctx = FormatContext {
            cents: Some(&cents),
            ..Default::default()
        };
        assert_eq!(
            format_value("10a_mark_to_market_dollars", &FieldValue::Numeric(1234.0), &ctx),
            single("   1,235")
        );
    }

    #[test]
    fn test_dollars_exact_half_rounds_up() {
        let cents = FieldValue::Numeric(50.0);
        let ctx = FormatContext {
            cents: Some(&cents),
            ..Default::default()
        };
        assert_eq!(format_value("x_dollars", &FieldValue::Numeric(9.0), &ctx), single("      10"));
    }

    #[test]
    fn test_dollars_missing_cents_defaults_to_zero() {
        assert_eq!(
            format_value("x_dollars", &FieldValue::Numeric(1234.0), &text_ctx()),
            single("   1,234")
        );
    }

    #[test]
    fn test_dollars_below_half_keeps_dollars() {
        let cents = FieldValue::Numeric(49.0);
        let ctx = FormatContext {
            cents: Some(&cents),
            ..Default::default()
        };
        assert_eq!(format_value("x_dollars", &FieldValue::Numeric(7.0), &ctx), single("       7"));
    }

    #[test]
    fn test_negative_dollars_round_away_from_zero() {
        let cents = FieldValue::Numeric(60.0);
        let ctx = FormatContext {
            cents: Some(&cents),
            ..Default::default()
        };
        assert_eq!(format_value("x_dollars", &FieldValue::Numeric(-5.0), &ctx), single("      -6"));
    }

    #[test]
    fn test_dollars_custom_width_and_overflow() {
        let ctx = FormatContext {
            width: 4,
            ..Default::default()
        };
        assert_eq!(format_value("x_dollars", &FieldValue::Numeric(5.0), &ctx), single("   5"));
        assert_eq!(
            format_value("x_dollars", &FieldValue::Numeric(1234567.0), &ctx),
            single("1,234,567")
        );
    }

    #[test]
    fn test_dollars_non_numeric_text_is_padded() {
        assert_eq!(
            format_value("x_dollars", &FieldValue::from("N/A"), &text_ctx()),
            single("     N/A")
        );
    }

    #[test]
    fn test_cents_render_empty() {
        assert_eq!(
            format_value("x_cents", &FieldValue::Numeric(51.0), &text_ctx()),
            FormattedValue::Skip
        );
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(format_value("reference_id_number", &FieldValue::from("XQ.1234"), &text_ctx()), single("XQ.1234"));
        assert_eq!(format_value("shares", &FieldValue::from("250000"), &text_ctx()), single("250,000"));
        assert_eq!(format_value("calendar_year", &FieldValue::Numeric(24.0), &text_ctx()), single("24"));
        assert_eq!(format_value("empty", &FieldValue::from(""), &text_ctx()), FormattedValue::Skip);
    }

    #[test]
    fn test_multi_line() {
        let formatted = format_value(
            "address_entity",
            &FieldValue::from("1 Main St\nSuite 2\nSpringfield"),
            &text_ctx(),
        );
        assert_eq!(formatted.lines(), vec!["1 Main St", "Suite 2", "Springfield"]);
        assert!(!formatted.has_too_many_lines());

        let long = format_value("address_entity", &FieldValue::from("a\nb\nc\nd"), &text_ctx());
        assert!(long.has_too_many_lines());
    }

    #[test]
    fn test_cents_key() {
        assert_eq!(ValueFormatter::cents_key("4b_dollars").as_deref(), Some("4b_cents"));
        assert_eq!(ValueFormatter::cents_key("name"), None);
    }
}
