//! Rendering directives that travel alongside the field values
//!
//! Value files may carry directives inline as underscore keys and a
//! `BUTTONS` list; [`FillRequest::from_json`] separates them from the values.

use crate::{FillError, Result};
use form_values::{values_from_json, FieldValues, DEFAULT_WIDTH};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;

const BUTTONS_KEY: &str = "BUTTONS";

/// Signature image placed on one page
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Signature {
    pub path: PathBuf,
    /// 1-indexed page
    pub page: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Free text drawn at an absolute position
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExtraAnnotation {
    pub size: f32,
    pub x: f64,
    pub y: f64,
    pub string: String,
}

/// Requested state of a grouped button, e.g. `("filing_status_single", "Yes")`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "(String, String)")]
pub struct ButtonState {
    /// Readable name of the parent field
    pub field: String,
    /// Appearance state name without the leading slash
    pub state: String,
}

impl ButtonState {
    pub fn new(field: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            state: state.into(),
        }
    }
}

impl From<(String, String)> for ButtonState {
    fn from((field, state): (String, String)) -> Self {
        Self { field, state }
    }
}

/// Everything that shapes rendering besides the field values
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderDirectives {
    /// Padding width for `_dollars` fields
    pub width: usize,
    pub signature: Option<Signature>,
    /// 1-indexed page -> annotations
    pub extra_annotations: BTreeMap<usize, Vec<ExtraAnnotation>>,
    /// Mark the IRA distribution line as a rollover
    pub rollover_flag: bool,
    pub buttons: Vec<ButtonState>,
}

impl Default for RenderDirectives {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            signature: None,
            extra_annotations: BTreeMap::new(),
            rollover_flag: false,
            buttons: Vec::new(),
        }
    }
}

/// Field values and directives read from one value file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FillRequest {
    pub values: FieldValues,
    pub directives: RenderDirectives,
}

impl FillRequest {
    /// Parse a flat value file
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Split a flat JSON object into values and directives
    ///
    /// Recognized directive keys are `_width`, `_signature_page`,
    /// `_signature_path`, `_signature_x`, `_signature_y`, `_signature_width`,
    /// `_signature_height`, `_extra_annots`, `_rollover_flag` and `BUTTONS`.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut object) = value else {
            return Err(FillError::Directive(
                "value file must be a JSON object".to_string(),
            ));
        };

        let mut directives = RenderDirectives::default();

        if let Some(buttons) = object.remove(BUTTONS_KEY) {
            directives.buttons = serde_json::from_value(buttons)
                .map_err(|e| FillError::Directive(format!("BUTTONS: {e}")))?;
        }

        let directive_keys: Vec<String> = object
            .keys()
            .filter(|key| key.starts_with('_'))
            .cloned()
            .collect();
        let mut raw = Map::new();
        for key in directive_keys {
            if let Some(value) = object.remove(&key) {
                raw.insert(key, value);
            }
        }

        if let Some(width) = raw.remove("_width") {
            directives.width = width
                .as_u64()
                .map(|w| w as usize)
                .ok_or_else(|| FillError::Directive(format!("_width: expected a count, got {width}")))?;
        }

        directives.signature = take_signature(&mut raw)?;

        if let Some(extras) = raw.remove("_extra_annots") {
            directives.extra_annotations = parse_extra_annotations(extras)?;
        }

        // Presence alone sets the flag, whatever the value
        if raw.remove("_rollover_flag").is_some() {
            directives.rollover_flag = true;
        }

        if let Some(unknown) = raw.keys().next() {
            return Err(FillError::Directive(format!("unknown directive '{unknown}'")));
        }

        Ok(Self {
            values: values_from_json(&object)?,
            directives,
        })
    }
}

fn take_signature(raw: &mut Map<String, Value>) -> Result<Option<Signature>> {
    const KEYS: [&str; 6] = ["page", "path", "x", "y", "width", "height"];

    let mut fields = Map::new();
    for key in KEYS {
        if let Some(value) = raw.remove(&format!("_signature_{key}")) {
            fields.insert(key.to_string(), value);
        }
    }

    if fields.is_empty() {
        return Ok(None);
    }
    if let Some(missing) = KEYS.iter().find(|key| !fields.contains_key(**key)) {
        return Err(FillError::Directive(format!("_signature_{missing} is required")));
    }

    serde_json::from_value(Value::Object(fields))
        .map(Some)
        .map_err(|e| FillError::Directive(format!("signature: {e}")))
}

fn parse_extra_annotations(value: Value) -> Result<BTreeMap<usize, Vec<ExtraAnnotation>>> {
    let by_page: BTreeMap<String, Vec<ExtraAnnotation>> = serde_json::from_value(value)
        .map_err(|e| FillError::Directive(format!("_extra_annots: {e}")))?;

    by_page
        .into_iter()
        .map(|(page, annotations)| {
            let page = page
                .parse::<usize>()
                .ok()
                .filter(|&page| page > 0)
                .ok_or_else(|| {
                    FillError::Directive(format!("_extra_annots: invalid page '{page}'"))
                })?;
            Ok((page, annotations))
        })
        .collect()
}
