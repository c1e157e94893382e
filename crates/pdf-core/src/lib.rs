//! PDF Core - Low-level PDF manipulation
//!
//! This crate provides functionality for:
//! - Opening and saving PDF documents
//! - Walking widget annotations and their parent fields
//! - Appending overlay text in the standard Courier font
//! - Inserting images (JPEG, PNG) on top of existing page content
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::PdfDocument;
//!
//! let mut doc = PdfDocument::open("template.pdf")?;
//! doc.insert_text("Hello, World!", 1, 100.0, 700.0, 12.0)?;
//! doc.save("output.pdf")?;
//! ```

mod annotations;
mod document;
mod font;
mod image;
mod text;

pub use annotations::{decode_text_string, ParentField, WidgetAnnotation};
pub use document::PdfDocument;
pub use font::StandardFont;
pub use image::{detect_format, ImageFormat, ImageXObject};
pub use text::{generate_text_operators, TextRenderContext};

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to open PDF: {0}")]
    OpenError(String),

    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("PDF parsing error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;
