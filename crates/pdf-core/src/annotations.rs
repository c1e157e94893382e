//! Widget annotation walking
//!
//! Reads the raw annotation dictionaries of a page and exposes the pieces a
//! form filler needs: field name, field type, parent field, rectangle and
//! appearance states. No interpretation of field semantics happens here.

use crate::{PdfError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId};

/// Parent field of a widget that carries no name of its own
#[derive(Debug, Clone, PartialEq)]
pub struct ParentField {
    /// Object id of the parent field dictionary
    pub id: ObjectId,
    /// Decoded `/T`
    pub name: Option<String>,
    /// `/FT` name without the leading slash (e.g. "Btn")
    pub field_type: Option<String>,
    /// Current `/V`, as text
    pub value: Option<String>,
}

/// One `/Subtype /Widget` annotation of a page
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetAnnotation {
    /// Object id, `None` when the annotation is inlined in `/Annots`
    pub object_id: Option<ObjectId>,
    /// Decoded `/T`
    pub name: Option<String>,
    /// `/FT` name without the leading slash
    pub field_type: Option<String>,
    /// Parent field, if `/Parent` is present
    pub parent: Option<ParentField>,
    /// `/Rect` as written, coordinates are not normalized
    pub rect: Option<[f64; 4]>,
    /// Current `/AS`
    pub appearance_state: Option<String>,
    /// State names declared under `/AP /D`, or `/AP /N` when there is no `/D`
    pub appearance_states: Vec<String>,
}

/// Decode a PDF text string
///
/// UTF-16BE (with BOM) and UTF-8 (with BOM) are decoded; anything else is
/// read byte-per-char, which matches PDFDocEncoding for printable ASCII and
/// Latin-1.
pub fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8_lossy(rest).into_owned();
    }
    bytes.iter().map(|&b| b as char).collect()
}

/// Follow a reference chain to the direct object
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Result<&'a Object> {
    let mut current = obj;
    // Bounded so a reference cycle cannot spin forever
    for _ in 0..8 {
        match current {
            Object::Reference(id) => current = doc.get_object(*id)?,
            _ => return Ok(current),
        }
    }
    Err(PdfError::ParseError("Reference chain too deep".to_string()))
}

pub(crate) fn as_number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

fn text_entry(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<String> {
    match resolve(doc, dict.get(key).ok()?).ok()? {
        Object::String(bytes, _) => Some(decode_text_string(bytes)),
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    }
}

fn name_entry(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<String> {
    let obj = resolve(doc, dict.get(key).ok()?).ok()?;
    obj.as_name()
        .ok()
        .map(|name| String::from_utf8_lossy(name).into_owned())
}

fn rect_entry(doc: &Document, dict: &Dictionary) -> Option<[f64; 4]> {
    let obj = resolve(doc, dict.get(b"Rect").ok()?).ok()?;
    let values: Vec<f64> = obj
        .as_array()
        .ok()?
        .iter()
        .filter_map(|item| resolve(doc, item).ok().and_then(as_number))
        .collect();
    match values.as_slice() {
        [x0, y0, x1, y1] => Some([*x0, *y0, *x1, *y1]),
        _ => None,
    }
}

fn declared_states(doc: &Document, dict: &Dictionary) -> Vec<String> {
    let Some(ap) = dict
        .get(b"AP")
        .ok()
        .and_then(|obj| resolve(doc, obj).ok())
        .and_then(|obj| obj.as_dict().ok())
    else {
        return Vec::new();
    };

    let states = ap
        .get(b"D")
        .or_else(|_| ap.get(b"N"))
        .ok()
        .and_then(|obj| resolve(doc, obj).ok())
        .and_then(|obj| obj.as_dict().ok());

    match states {
        Some(states) => states
            .iter()
            .map(|(key, _)| String::from_utf8_lossy(key).into_owned())
            .collect(),
        None => Vec::new(),
    }
}

fn parent_field(doc: &Document, dict: &Dictionary) -> Option<ParentField> {
    let id = dict.get(b"Parent").ok()?.as_reference().ok()?;
    let parent = doc.get_dictionary(id).ok()?;
    Some(ParentField {
        id,
        name: text_entry(doc, parent, b"T"),
        field_type: name_entry(doc, parent, b"FT"),
        value: text_entry(doc, parent, b"V"),
    })
}

/// Collect the widget annotations of one page, in `/Annots` order
pub(crate) fn page_widgets(doc: &Document, page_id: ObjectId) -> Result<Vec<WidgetAnnotation>> {
    let page = doc.get_dictionary(page_id)?;

    let annots = match page.get(b"Annots") {
        Ok(obj) => resolve(doc, obj)?,
        Err(_) => return Ok(Vec::new()),
    };
    let annots = annots
        .as_array()
        .map_err(|_| PdfError::ParseError("/Annots is not an array".to_string()))?;

    let mut widgets = Vec::new();
    for entry in annots {
        let object_id = entry.as_reference().ok();
        // Dangling references in /Annots are common in hand-edited templates
        let Ok(dict) = resolve(doc, entry).and_then(|obj| {
            obj.as_dict()
                .map_err(|_| PdfError::ParseError("Annotation is not a dictionary".to_string()))
        }) else {
            continue;
        };

        if name_entry(doc, dict, b"Subtype").as_deref() != Some("Widget") {
            continue;
        }

        widgets.push(WidgetAnnotation {
            object_id,
            name: text_entry(doc, dict, b"T"),
            field_type: name_entry(doc, dict, b"FT"),
            parent: parent_field(doc, dict),
            rect: rect_entry(doc, dict),
            appearance_state: name_entry(doc, dict, b"AS"),
            appearance_states: declared_states(doc, dict),
        });
    }

    Ok(widgets)
}
