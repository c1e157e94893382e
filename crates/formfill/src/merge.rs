//! Writing a rendered overlay onto the template pages

use crate::overlay::{DrawOp, RenderedOverlay};
use crate::{FillError, FillWarning, Result};
use pdf_core::PdfDocument;
use std::path::Path;

/// Template document with the overlay applied
#[derive(Debug)]
pub struct MergedDocument {
    document: PdfDocument,
    warnings: Vec<FillWarning>,
}

impl MergedDocument {
    pub fn document(&self) -> &PdfDocument {
        &self.document
    }

    /// Mutable access for post-merge passes such as grouped buttons
    pub fn document_mut(&mut self) -> &mut PdfDocument {
        &mut self.document
    }

    pub fn page_count(&self) -> usize {
        self.document.page_count()
    }

    /// Warnings raised while merging
    pub fn warnings(&self) -> &[FillWarning] {
        &self.warnings
    }

    /// Serialize the merged document
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        Ok(self.document.to_bytes()?)
    }

    /// Write the merged document to a file
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        Ok(self.document.save(path)?)
    }
}

/// Pairs overlay pages with template pages
pub struct DocumentMerger;

impl DocumentMerger {
    /// Open a template and merge the overlay onto it
    pub fn merge<P: AsRef<Path>>(overlay: &RenderedOverlay, template_path: P) -> Result<MergedDocument> {
        let path = template_path.as_ref();
        let document = PdfDocument::open(path).map_err(|source| FillError::TemplateLoad {
            path: path.to_path_buf(),
            source,
        })?;
        Self::merge_into(overlay, document)
    }

    /// Merge the overlay onto an opened template
    ///
    /// Overlay page `i` lands on template page `i`. When the counts differ
    /// the document keeps only the pages both sides have.
    pub fn merge_into(overlay: &RenderedOverlay, mut document: PdfDocument) -> Result<MergedDocument> {
        let template_pages = document.page_count();
        let overlay_pages = overlay.page_count();
        let mut warnings = Vec::new();

        if template_pages != overlay_pages {
            let warning = FillWarning::PageCountMismatch {
                overlay: overlay_pages,
                template: template_pages,
            };
            tracing::warn!("{warning}");
            warnings.push(warning);
            document.truncate_pages(template_pages.min(overlay_pages));
        }

        for (index, page) in overlay.pages.iter().take(template_pages).enumerate() {
            let page_number = index + 1;
            for op in &page.ops {
                match op {
                    DrawOp::Text {
                        text,
                        x,
                        y,
                        font_size,
                    } => document.insert_text(text, page_number, *x, *y, *font_size)?,
                    DrawOp::Image {
                        data,
                        x,
                        y,
                        width,
                        height,
                    } => document.insert_image(data, page_number, *x, *y, *width, *height)?,
                }
            }
        }

        Ok(MergedDocument { document, warnings })
    }
}
