//! Style resolution
//!
//! Turns a field name into the style it renders with, falling back to
//! [`DEFAULT_STYLE_NAME`] and a type that depends on where the field appears.

use agendoc_ooxml::{Document, StyleType};
use tracing::debug;

use crate::config::{FieldConfig, FieldStyle, StyleKind};
use crate::DEFAULT_STYLE_NAME;

/// Where a field is being rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderContext {
    /// The field gets a paragraph of its own; defaults to a paragraph style
    Standalone,
    /// The field is one half of a `time · place` line; defaults to a
    /// character style
    CombinedHalf,
}

impl RenderContext {
    /// Style kind used when the configuration names none
    pub fn default_kind(self) -> StyleKind {
        match self {
            RenderContext::Standalone => StyleKind::Paragraph,
            RenderContext::CombinedHalf => StyleKind::Character,
        }
    }
}

/// The effective style of a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStyle {
    pub name: String,
    pub style_type: StyleKind,
}

/// Resolve the style of a single field name
pub fn resolve(field: &str, config: &FieldConfig, context: RenderContext) -> ResolvedStyle {
    resolve_any(&[field], config, context)
}

/// Resolve the style of a field known under several tag names
///
/// The first name with a configuration entry wins. Each key of that entry
/// falls back to its default on its own.
pub fn resolve_any(names: &[&str], config: &FieldConfig, context: RenderContext) -> ResolvedStyle {
    let entry = names.iter().find_map(|name| config.get(name));
    let resolved = from_entry(entry, context);
    debug!(
        "Resolved {:?} to {:?} ({:?})",
        names, resolved.name, resolved.style_type
    );
    resolved
}

fn from_entry(entry: Option<&FieldStyle>, context: RenderContext) -> ResolvedStyle {
    let name = entry
        .and_then(|e| e.style_name.clone())
        .unwrap_or_else(|| DEFAULT_STYLE_NAME.to_string());
    let style_type = entry
        .and_then(|e| e.style_type)
        .unwrap_or(context.default_kind());
    ResolvedStyle { name, style_type }
}

/// Make sure the document's registry has a style called `name`
///
/// A missing style is created with the given type and a 12pt font. An
/// existing one is left as it is. Returns the name, for chaining into a
/// paragraph or run.
pub fn ensure_registered(document: &mut Document, name: &str, style_type: StyleKind) -> String {
    if !document.styles.contains(name) {
        debug!("Registering style {:?} as {:?}", name, style_type);
    }
    document.styles.ensure(name, StyleType::from(style_type)).name.clone()
}
