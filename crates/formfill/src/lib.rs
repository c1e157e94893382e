//! Formfill - fill PDF form templates from readable field values
//!
//! This crate provides:
//! - Keyfile parsing (readable name -> PDF field name -> field type)
//! - Widget annotation indexing of a template
//! - Overlay rendering of formatted values at widget positions
//! - Merging the overlay onto the template pages
//! - Grouped radio-button resolution on the merged document
//!
//! # Example
//!
//! ```ignore
//! use formfill::{fill, FillRequest, TemplateRef};
//!
//! let request = FillRequest::from_json(&std::fs::read_to_string("data.json")?)?;
//! let template = TemplateRef::new("templates/f8621.pdf", "keyfiles/f8621.keys");
//! let outcome = fill(&template, &request.values, &request.directives)?;
//! std::fs::write("filled.pdf", &outcome.bytes)?;
//! ```

pub mod buttons;
pub mod catalog;
pub mod directives;
pub mod dump;
pub mod index;
pub mod keyfile;
pub mod merge;
pub mod overlay;
mod pipeline;

pub use buttons::apply_grouped_buttons;
pub use catalog::FieldCatalog;
pub use directives::{ButtonState, ExtraAnnotation, FillRequest, RenderDirectives, Signature};
pub use dump::{dump_document, dump_fields, DumpKind, FieldDump};
pub use index::{Rect, TemplateAnnotationIndex, WidgetAnnotation};
pub use keyfile::{Keyfile, KeyfileEntry};
pub use merge::{DocumentMerger, MergedDocument};
pub use overlay::{DrawOp, OverlayPage, OverlayRenderer, RenderedOverlay};
pub use pipeline::{fill, write_fillable_pdf, FillOutcome, TemplateRef};

pub use form_values::{FieldType, FieldValue, FieldValues};

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a fill
#[derive(Debug, Error)]
pub enum FillError {
    #[error("Failed to load template {}: {source}", .path.display())]
    TemplateLoad {
        path: PathBuf,
        #[source]
        source: pdf_core::PdfError,
    },

    #[error("Malformed keyfile line {line}: '{content}'")]
    MalformedKeyfile { line: usize, content: String },

    #[error("Unknown field '{0}': not present in keyfile")]
    UnknownField(String),

    #[error("Failed to read keyfile {}: {source}", .path.display())]
    KeyfileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid directive: {0}")]
    Directive(String),

    #[error("Signature image error: {0}")]
    SignatureImage(String),

    #[error("PDF error: {0}")]
    Pdf(#[from] pdf_core::PdfError),

    #[error("Value error: {0}")]
    Value(#[from] form_values::ValueError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for fill operations
pub type Result<T> = std::result::Result<T, FillError>;

/// Problems that do not stop a fill
#[derive(Debug, Clone, PartialEq)]
pub enum FillWarning {
    /// A requested button state is not among the widget's appearance states
    UnmatchedButtonState { field: String, state: String },
    /// Overlay and template disagree on page count; extra pages were dropped
    PageCountMismatch { overlay: usize, template: usize },
    /// A multi-line value has more lines than the field holds
    TooManyLines { field: String, lines: usize },
    /// Text has characters Courier cannot show; they print as `?`
    UnencodableText { field: String },
}

impl fmt::Display for FillWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnmatchedButtonState { field, state } => {
                write!(f, "button state '{state}' not available for '{field}'")
            }
            Self::PageCountMismatch { overlay, template } => write!(
                f,
                "overlay has {overlay} pages but template has {template}; extra pages dropped"
            ),
            Self::TooManyLines { field, lines } => {
                write!(f, "'{field}' has {lines} lines, more than the field holds")
            }
            Self::UnencodableText { field } => {
                write!(f, "'{field}' contains characters Courier cannot render")
            }
        }
    }
}
