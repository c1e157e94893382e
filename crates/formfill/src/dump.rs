//! Field listing for keyfile authoring

use crate::{FillError, Result};
use form_values::FieldType;
use pdf_core::PdfDocument;
use std::fmt;
use std::path::Path;

/// How a widget exposes its field
#[derive(Debug, Clone, PartialEq)]
pub enum DumpKind {
    /// Widget with its own `/T`; `/FT` without the slash
    Field { field_type: Option<String> },
    /// Unnamed kid with an appearance state, i.e. a radio option
    GroupedButton { states: Vec<String> },
    /// Unnamed kid without appearance state, named by its parent
    InheritedText { value: Option<String> },
}

/// One widget of a template
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDump {
    /// 1-indexed page
    pub page: usize,
    /// 1-indexed position among the page's listed widgets
    pub ordinal: usize,
    /// Internal field name, as a keyfile refers to it
    pub name: String,
    pub kind: DumpKind,
}

impl FieldDump {
    pub fn field_type(&self) -> FieldType {
        match &self.kind {
            DumpKind::Field { field_type } => field_type
                .as_deref()
                .and_then(FieldType::from_tag)
                .unwrap_or(FieldType::Text),
            DumpKind::GroupedButton { .. } => FieldType::Button,
            DumpKind::InheritedText { .. } => FieldType::Text,
        }
    }

    /// A keyfile line with a readable name derived from the internal name
    ///
    /// Names without any ASCII letter or digit get a positional stub.
    pub fn keyfile_line(&self) -> String {
        let mut readable = readable_stub(&self.name);
        if readable.is_empty() {
            readable = format!("field_p{}_{}", self.page, self.ordinal);
        }
        format!("{} {} {}", readable, self.name, self.field_type().tag())
    }
}

impl fmt::Display for FieldDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DumpKind::Field { field_type } => write!(
                f,
                "[p{}] {} /{}",
                self.page,
                self.name,
                field_type.as_deref().unwrap_or("?")
            ),
            DumpKind::GroupedButton { states } => {
                write!(f, "[p{}] {} Button [{}]", self.page, self.name, states.join(", "))
            }
            DumpKind::InheritedText { value } => write!(
                f,
                "[p{}] {} Text = {}",
                self.page,
                self.name,
                value.as_deref().unwrap_or("")
            ),
        }
    }
}

/// List every named widget of a template
pub fn dump_fields<P: AsRef<Path>>(template_path: P) -> Result<Vec<FieldDump>> {
    let path = template_path.as_ref();
    let document = PdfDocument::open(path).map_err(|source| FillError::TemplateLoad {
        path: path.to_path_buf(),
        source,
    })?;
    dump_document(&document)
}

/// List every named widget of an opened template
pub fn dump_document(document: &PdfDocument) -> Result<Vec<FieldDump>> {
    let mut dumps = Vec::new();

    for page in 1..=document.page_count() {
        let mut ordinal = 0;
        for widget in document.widgets(page)? {
            if let Some(name) = widget.name {
                ordinal += 1;
                dumps.push(FieldDump {
                    page,
                    ordinal,
                    name,
                    kind: DumpKind::Field {
                        field_type: widget.field_type,
                    },
                });
                continue;
            }

            let Some(parent) = widget.parent else {
                continue;
            };
            let Some(name) = parent.name else {
                continue;
            };
            let kind = if widget.appearance_state.is_some() {
                DumpKind::GroupedButton {
                    states: widget.appearance_states,
                }
            } else {
                DumpKind::InheritedText {
                    value: parent.value,
                }
            };
            ordinal += 1;
            dumps.push(FieldDump {
                page,
                ordinal,
                name,
                kind,
            });
        }
    }

    Ok(dumps)
}

fn readable_stub(name: &str) -> String {
    let mut stub = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            stub.push(c.to_ascii_lowercase());
        } else if !stub.ends_with('_') {
            stub.push('_');
        }
    }
    stub.trim_matches('_').to_string()
}
