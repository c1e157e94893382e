//! End-to-end fill of one template

use crate::buttons::apply_grouped_buttons;
use crate::catalog::FieldCatalog;
use crate::directives::RenderDirectives;
use crate::index::TemplateAnnotationIndex;
use crate::keyfile::Keyfile;
use crate::merge::DocumentMerger;
use crate::overlay::OverlayRenderer;
use crate::{FillError, FillWarning, Result};
use form_values::FieldValues;
use pdf_core::PdfDocument;
use std::path::{Path, PathBuf};

/// A fillable template and the keyfile describing its fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRef {
    pub template: PathBuf,
    pub keyfile: PathBuf,
}

impl TemplateRef {
    pub fn new(template: impl Into<PathBuf>, keyfile: impl Into<PathBuf>) -> Self {
        Self {
            template: template.into(),
            keyfile: keyfile.into(),
        }
    }
}

/// Filled PDF and the non-fatal problems met on the way
#[derive(Debug, Clone)]
pub struct FillOutcome {
    pub bytes: Vec<u8>,
    pub warnings: Vec<FillWarning>,
}

/// Fill a template with values
///
/// Unknown field names are rejected before anything is rendered. The
/// template is only read; the result is returned as bytes.
pub fn fill(
    template_ref: &TemplateRef,
    values: &FieldValues,
    directives: &RenderDirectives,
) -> Result<FillOutcome> {
    let keyfile = Keyfile::load(&template_ref.keyfile)?;
    let catalog = FieldCatalog::new(keyfile, values)?;

    let document = PdfDocument::open(&template_ref.template).map_err(|source| {
        FillError::TemplateLoad {
            path: template_ref.template.clone(),
            source,
        }
    })?;
    let index = TemplateAnnotationIndex::from_document(&document)?;

    let overlay = OverlayRenderer::new(&catalog, directives).render(&index)?;
    let mut warnings = overlay.warnings.clone();

    let mut merged = DocumentMerger::merge_into(&overlay, document)?;
    warnings.extend_from_slice(merged.warnings());
    warnings.extend(apply_grouped_buttons(
        merged.document_mut(),
        &directives.buttons,
        catalog.keyfile(),
    )?);

    let bytes = merged.to_bytes()?;
    tracing::info!(
        "Filled {} ({} values, {} pages, {} warnings)",
        template_ref.template.display(),
        values.len(),
        merged.page_count(),
        warnings.len()
    );

    Ok(FillOutcome { bytes, warnings })
}

/// Fill a template and write the result to `output_path`
///
/// Nothing is written when the fill fails.
pub fn write_fillable_pdf<P: AsRef<Path>>(
    template_ref: &TemplateRef,
    values: &FieldValues,
    directives: &RenderDirectives,
    output_path: P,
) -> Result<Vec<FillWarning>> {
    let outcome = fill(template_ref, values, directives)?;
    std::fs::write(output_path.as_ref(), &outcome.bytes)?;
    tracing::info!("Wrote {}", output_path.as_ref().display());
    Ok(outcome.warnings)
}
