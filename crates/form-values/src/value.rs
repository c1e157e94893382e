//! Field types and typed field values

use crate::{Result, ValueError};
use chrono::NaiveDate;
use serde::de::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Values keyed by readable field name
pub type FieldValues = BTreeMap<String, FieldValue>;

/// Kind of an interactive form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FieldType {
    /// `/Tx` text field
    #[default]
    Text,
    /// `/Btn` checkbox or radio button
    Button,
}

impl FieldType {
    /// Parse a keyfile / PDF type tag, with or without the leading slash
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim_start_matches('/') {
            "Tx" => Some(Self::Text),
            "Btn" => Some(Self::Button),
            _ => None,
        }
    }

    /// Tag as written in keyfiles
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Text => "/Tx",
            Self::Button => "/Btn",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One value to draw into a field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Checked(bool),
    Numeric(f64),
    /// Rendered as `YYYY-MM-DD`
    Date(NaiveDate),
}

impl FieldValue {
    /// Convert one JSON value
    ///
    /// `null` yields `None`. Strings that are exactly `YYYY-MM-DD` become
    /// dates; arrays and objects are rejected.
    pub fn from_json(value: &Value) -> Result<Option<Self>> {
        match value {
            Value::Null => Ok(None),
            Value::Bool(b) => Ok(Some(Self::Checked(*b))),
            Value::Number(n) => n
                .as_f64()
                .map(|n| Some(Self::Numeric(n)))
                .ok_or_else(|| ValueError::InvalidValue(n.to_string())),
            Value::String(s) => Ok(Some(match parse_iso_date(s) {
                Some(date) => Self::Date(date),
                None => Self::Text(s.clone()),
            })),
            other => Err(ValueError::InvalidValue(other.to_string())),
        }
    }

    /// Whether a button with this value should be marked
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Text(s) => !s.is_empty(),
            Self::Checked(b) => *b,
            Self::Numeric(n) => *n != 0.0,
            Self::Date(_) => true,
        }
    }

    /// Numeric reading of the value
    ///
    /// Text is accepted when it parses as a number once thousands
    /// separators and surrounding whitespace are removed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Numeric(n) => Some(*n),
            Self::Text(s) => {
                let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
                cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
            }
            Self::Checked(_) | Self::Date(_) => None,
        }
    }

    /// Plain display text before any field-specific formatting
    pub fn display_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Checked(true) => "X".to_string(),
            Self::Checked(false) => String::new(),
            Self::Numeric(n) => render_number(*n),
            Self::Date(date) => date.to_string(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Checked(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Numeric(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Numeric(value as f64)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        match FieldValue::from_json(&value) {
            Ok(Some(field_value)) => Ok(field_value),
            Ok(None) => Err(serde::de::Error::custom("null is not a field value")),
            Err(e) => Err(serde::de::Error::custom(e)),
        }
    }
}

/// Build `FieldValues` from a flat JSON object, skipping `null` entries
pub fn values_from_json(object: &serde_json::Map<String, Value>) -> Result<FieldValues> {
    let mut values = FieldValues::new();
    for (key, value) in object {
        let parsed = FieldValue::from_json(value).map_err(|e| match e {
            ValueError::InvalidValue(detail) => ValueError::InvalidField {
                field: key.clone(),
                detail,
            },
            other => other,
        })?;
        if let Some(parsed) = parsed {
            values.insert(key.clone(), parsed);
        }
    }
    Ok(values)
}

fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    if s.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Integral values print without a fractional part
fn render_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
