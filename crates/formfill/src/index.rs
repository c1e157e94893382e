//! Per-page index of a template's named widgets

use crate::{FillError, Result};
use form_values::FieldType;
use lopdf::ObjectId;
use pdf_core::PdfDocument;
use std::path::Path;

/// Widget rectangle as written in the template
///
/// Corners may come in any order; use the accessors for normalized values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn min_x(&self) -> f64 {
        self.x0.min(self.x1)
    }

    pub fn min_y(&self) -> f64 {
        self.y0.min(self.y1)
    }

    pub fn width(&self) -> f64 {
        (self.x1 - self.x0).abs()
    }

    pub fn height(&self) -> f64 {
        (self.y1 - self.y0).abs()
    }
}

impl From<[f64; 4]> for Rect {
    fn from([x0, y0, x1, y1]: [f64; 4]) -> Self {
        Self::new(x0, y0, x1, y1)
    }
}

/// A widget that can be addressed through a keyfile
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetAnnotation {
    /// Field name from `/T`, or the parent's `/T` for unnamed kids
    pub internal_id: String,
    pub field_type: FieldType,
    pub rect: Rect,
    /// Zero-based page index
    pub page_index: usize,
    /// Parent field of an unnamed kid widget
    pub parent_id: Option<ObjectId>,
}

/// Widgets of every template page, in page and `/Annots` order
#[derive(Debug, Clone, Default)]
pub struct TemplateAnnotationIndex {
    pages: Vec<Vec<WidgetAnnotation>>,
}

impl TemplateAnnotationIndex {
    /// Open a template and index its widgets
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let document = PdfDocument::open(path).map_err(|source| FillError::TemplateLoad {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_document(&document)
    }

    /// Index the widgets of an already opened template
    ///
    /// Widgets without any usable name or without a `/Rect` are skipped.
    pub fn from_document(document: &PdfDocument) -> Result<Self> {
        let mut pages = Vec::with_capacity(document.page_count());

        for page in 1..=document.page_count() {
            let mut widgets = Vec::new();
            for raw in document.widgets(page)? {
                let Some(rect) = raw.rect else {
                    tracing::debug!("Skipping widget without /Rect on page {page}");
                    continue;
                };
                if let Some(widget) = index_widget(raw, rect.into(), page - 1) {
                    widgets.push(widget);
                }
            }
            tracing::debug!("Indexed {} widgets on page {page}", widgets.len());
            pages.push(widgets);
        }

        Ok(Self { pages })
    }

    pub fn pages(&self) -> &[Vec<WidgetAnnotation>] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All widgets across pages
    pub fn widgets(&self) -> impl Iterator<Item = &WidgetAnnotation> {
        self.pages.iter().flatten()
    }
}

fn declares_button(field_type: Option<&str>) -> bool {
    field_type == Some("Btn")
}

fn index_widget(
    raw: pdf_core::WidgetAnnotation,
    rect: Rect,
    page_index: usize,
) -> Option<WidgetAnnotation> {
    let button = declares_button(raw.field_type.as_deref());

    if let Some(name) = raw.name {
        return Some(WidgetAnnotation {
            internal_id: name,
            field_type: if button { FieldType::Button } else { FieldType::Text },
            rect,
            page_index,
            parent_id: None,
        });
    }

    let parent = raw.parent?;
    Some(WidgetAnnotation {
        internal_id: parent.name?,
        field_type: if button { FieldType::Button } else { FieldType::Text },
        rect,
        page_index,
        parent_id: Some(parent.id),
    })
}
