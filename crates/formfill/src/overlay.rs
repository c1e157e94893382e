//! Overlay rendering
//!
//! Turns indexed widgets and their values into per-page draw operations.
//! Nothing is written to a PDF here; see [`crate::merge`].

use crate::catalog::FieldCatalog;
use crate::directives::RenderDirectives;
use crate::index::{Rect, TemplateAnnotationIndex, WidgetAnnotation};
use crate::{FillError, FillWarning, Result};
use form_values::{format_value, FieldType, FormatContext, FormattedValue, ValueFormatter};
use pdf_core::{ImageXObject, StandardFont};

/// Fraction of the widget size left as inner padding
pub const PAD_RATIO: f64 = 0.04;
/// Extra lift above the padded bottom edge, in points
pub const BASELINE_NUDGE: f64 = 2.0;
pub const FONT_SIZE: f32 = 12.0;
pub const MULTI_LINE_FONT_SIZE: f32 = 9.0;
pub const LINE_SPACING: f64 = 9.0;

/// Field next to which "Rollover" is written when requested
pub const ROLLOVER_FIELD: &str = "ira_pension_annuity_dollars";
pub const ROLLOVER_TEXT: &str = "Rollover";
pub const ROLLOVER_POSITION: (f64, f64) = (420.0, 712.0);
pub const ROLLOVER_FONT_SIZE: f32 = 8.0;

/// One drawing operation in PDF user space (origin bottom-left)
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        text: String,
        x: f64,
        y: f64,
        font_size: f32,
    },
    Image {
        data: Vec<u8>,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}

/// Draw operations for one page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayPage {
    pub ops: Vec<DrawOp>,
}

impl OverlayPage {
    fn text(&mut self, text: impl Into<String>, x: f64, y: f64, font_size: f32) {
        self.ops.push(DrawOp::Text {
            text: text.into(),
            x,
            y,
            font_size,
        });
    }

    /// Text operations only, as `(text, x, y, font_size)`
    pub fn texts(&self) -> impl Iterator<Item = (&str, f64, f64, f32)> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text {
                text,
                x,
                y,
                font_size,
            } => Some((text.as_str(), *x, *y, *font_size)),
            DrawOp::Image { .. } => None,
        })
    }
}

/// Overlay for a whole template, one entry per template page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedOverlay {
    pub pages: Vec<OverlayPage>,
    pub warnings: Vec<FillWarning>,
}

impl RenderedOverlay {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Anchor point for a widget's text
pub fn text_origin(rect: &Rect) -> (f64, f64) {
    let pad_x = (PAD_RATIO * rect.width()).trunc();
    let pad_y = (PAD_RATIO * rect.height()).trunc();
    (rect.min_x() + pad_x, rect.min_y() + pad_y + BASELINE_NUDGE)
}

/// Lays out field values over template widgets
pub struct OverlayRenderer<'a> {
    catalog: &'a FieldCatalog<'a>,
    directives: &'a RenderDirectives,
    font: StandardFont,
}

impl<'a> OverlayRenderer<'a> {
    pub fn new(catalog: &'a FieldCatalog<'a>, directives: &'a RenderDirectives) -> Self {
        Self {
            catalog,
            directives,
            font: StandardFont::default(),
        }
    }

    /// Render one overlay page per indexed template page
    pub fn render(&self, index: &TemplateAnnotationIndex) -> Result<RenderedOverlay> {
        let signature = self.load_signature()?;
        let mut overlay = RenderedOverlay::default();

        for (page_index, widgets) in index.pages().iter().enumerate() {
            let page_number = page_index + 1;
            let mut page = OverlayPage::default();

            if let (Some(signature), Some(data)) = (&self.directives.signature, &signature) {
                if signature.page == page_number {
                    page.ops.push(DrawOp::Image {
                        data: data.clone(),
                        x: signature.x,
                        y: signature.y,
                        width: signature.width,
                        height: signature.height,
                    });
                }
            }

            for extra in self
                .directives
                .extra_annotations
                .get(&page_number)
                .into_iter()
                .flatten()
            {
                if !self.font.can_encode(&extra.string) {
                    self.warn(
                        &mut overlay,
                        FillWarning::UnencodableText {
                            field: format!("extra annotation on page {page_number}"),
                        },
                    );
                }
                page.text(extra.string.clone(), extra.x, extra.y, extra.size);
            }

            for widget in widgets {
                self.render_widget(widget, &mut page, &mut overlay);
            }

            tracing::debug!("Page {page_number}: {} draw operations", page.ops.len());
            overlay.pages.push(page);
        }

        Ok(overlay)
    }

    fn render_widget(
        &self,
        widget: &WidgetAnnotation,
        page: &mut OverlayPage,
        overlay: &mut RenderedOverlay,
    ) {
        let Some(entry) = self.catalog.resolve(&widget.internal_id) else {
            return;
        };
        let readable = entry.readable.as_str();
        let Some(value) = self.catalog.value(readable) else {
            return;
        };

        let field_type = if widget.field_type == FieldType::Button
            || entry.field_type == FieldType::Button
        {
            FieldType::Button
        } else {
            FieldType::Text
        };
        let cents_key = ValueFormatter::cents_key(readable);
        let ctx = FormatContext {
            field_type,
            cents: cents_key.as_deref().and_then(|key| self.catalog.value(key)),
            width: self.directives.width,
        };
        let formatted = format_value(readable, value, &ctx);

        if readable == ROLLOVER_FIELD && self.directives.rollover_flag {
            let (x, y) = ROLLOVER_POSITION;
            page.text(ROLLOVER_TEXT, x, y, ROLLOVER_FONT_SIZE);
        }

        let (x, bottom) = text_origin(&widget.rect);
        let lines = formatted.lines();
        if lines.iter().any(|line| !self.font.can_encode(line)) {
            self.warn(
                overlay,
                FillWarning::UnencodableText {
                    field: readable.to_string(),
                },
            );
        }

        match &formatted {
            FormattedValue::Skip => {}
            FormattedValue::Single(text) => {
                tracing::debug!("Drawing '{readable}' at ({x}, {bottom})");
                page.text(text.clone(), x, bottom, FONT_SIZE);
            }
            FormattedValue::MultiLine(all) => {
                if formatted.has_too_many_lines() {
                    self.warn(
                        overlay,
                        FillWarning::TooManyLines {
                            field: readable.to_string(),
                            lines: all.len(),
                        },
                    );
                }
                let count = all.len();
                for (i, line) in all.iter().enumerate() {
                    let y = bottom + (count - i) as f64 * LINE_SPACING;
                    page.text(line.clone(), x, y, MULTI_LINE_FONT_SIZE);
                }
            }
        }
    }

    fn load_signature(&self) -> Result<Option<Vec<u8>>> {
        let Some(signature) = &self.directives.signature else {
            return Ok(None);
        };

        let data = std::fs::read(&signature.path).map_err(|e| {
            FillError::SignatureImage(format!("{}: {e}", signature.path.display()))
        })?;
        ImageXObject::decode(&data).map_err(|e| {
            FillError::SignatureImage(format!("{}: {e}", signature.path.display()))
        })?;
        Ok(Some(data))
    }

    fn warn(&self, overlay: &mut RenderedOverlay, warning: FillWarning) {
        tracing::warn!("{warning}");
        overlay.warnings.push(warning);
    }
}
