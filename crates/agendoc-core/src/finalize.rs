//! Document finalization
//!
//! Prunes the text styles nothing asked for and gives every unstyled
//! paragraph the global default style.

use agendoc_ooxml::{Document, StyleType, NORMAL_STYLE};
use tracing::debug;

use crate::config::FieldConfig;
use crate::DEFAULT_STYLE_NAME;

/// Remove every paragraph and character style that is neither referenced
/// by the configuration nor the global default
///
/// Table and numbering styles are never touched. Returns the names of the
/// removed styles.
pub fn finalize(document: &mut Document, config: &FieldConfig) -> Vec<String> {
    let keep = config.style_names();

    let removed = document.styles.retain(|style| {
        !style.style_type.is_text()
            || style.name == DEFAULT_STYLE_NAME
            || keep.contains(style.name.as_str())
    });

    let names: Vec<String> = removed.into_iter().map(|s| s.name).collect();
    debug!("Removed {} unused styles: {:?}", names.len(), names);
    names
}

/// Give the global default style to every paragraph that has no style or
/// the built-in `Normal` style
///
/// Registers the default style first if it is missing. Returns the number of
/// paragraphs changed.
pub fn normalize_defaults(document: &mut Document) -> usize {
    document
        .styles
        .ensure(DEFAULT_STYLE_NAME, StyleType::Paragraph);

    let mut changed = 0;
    for paragraph in &mut document.paragraphs {
        let needs_default = match paragraph.style.as_deref() {
            None => true,
            Some(name) => name == NORMAL_STYLE,
        };
        if needs_default {
            paragraph.style = Some(DEFAULT_STYLE_NAME.to_string());
            changed += 1;
        }
    }
    changed
}
