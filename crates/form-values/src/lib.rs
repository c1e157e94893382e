//! Form Values - typed field values and their display formatting
//!
//! This crate provides:
//! - Field values keyed by readable field name (text, checkbox, number, date)
//! - Display formatting for form widgets (buttons, dollars/cents, multi-line)
//! - Dollar/cent arithmetic with round-half-up to whole dollars
//! - Hyphenated fixed-width line wrapping
//!
//! # Example
//!
//! ```ignore
//! use form_values::{format_value, FieldValue, FormatContext};
//!
//! let formatted = format_value("shares", &FieldValue::from("250000"), &FormatContext::default());
//! // FormattedValue::Single("250,000")
//! ```

mod formatter;
mod linebreak;
mod money;
mod value;

pub use formatter::{
    format_value, FormatContext, FormattedValue, ValueFormatter, DEFAULT_WIDTH, MAX_LINES,
};
pub use linebreak::wrap_hyphenated;
pub use money::{
    add_keyed_amount, commaify, from_dollars_cents, subtract_dollars_cents, sum_fields,
    to_dollars_cents,
};
pub use value::{values_from_json, FieldType, FieldValue, FieldValues};

use thiserror::Error;

/// Errors that can occur while reading field values
#[derive(Debug, Error)]
pub enum ValueError {
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Invalid value for field '{field}': {detail}")]
    InvalidField { field: String, detail: String },

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type for value operations
pub type Result<T> = std::result::Result<T, ValueError>;
