//! Grouped button resolution
//!
//! Radio groups are a parent field whose kid widgets carry no name of their
//! own. Selecting an option means setting the parent's `/V` to one of the
//! appearance state names the kids declare.

use crate::directives::ButtonState;
use crate::keyfile::Keyfile;
use crate::{FillWarning, Result};
use pdf_core::PdfDocument;

/// Set parent `/V` values for the requested button states
///
/// Requests whose state no kid widget declares are left untouched and
/// returned as [`FillWarning::UnmatchedButtonState`].
pub fn apply_grouped_buttons(
    document: &mut PdfDocument,
    buttons: &[ButtonState],
    keyfile: &Keyfile,
) -> Result<Vec<FillWarning>> {
    if buttons.is_empty() {
        return Ok(Vec::new());
    }

    let mut matched = vec![false; buttons.len()];

    for page in 1..=document.page_count() {
        for widget in document.widgets(page)? {
            if widget.name.is_some() || widget.appearance_state.is_none() {
                continue;
            }
            let Some(parent) = widget.parent else {
                continue;
            };
            let Some(readable) = parent.name.as_deref().and_then(|n| keyfile.readable_name(n)) else {
                continue;
            };

            for (i, button) in buttons.iter().enumerate() {
                if button.field != readable || !widget.appearance_states.contains(&button.state) {
                    continue;
                }
                tracing::debug!("Setting '{readable}' to /{}", button.state);
                document.set_field_value(parent.id, &button.state)?;
                matched[i] = true;
            }
        }
    }

    let warnings: Vec<FillWarning> = buttons
        .iter()
        .zip(&matched)
        .filter(|(_, &hit)| !hit)
        .map(|(button, _)| FillWarning::UnmatchedButtonState {
            field: button.field.clone(),
            state: button.state.clone(),
        })
        .collect();
    for warning in &warnings {
        tracing::warn!("{warning}");
    }

    Ok(warnings)
}
