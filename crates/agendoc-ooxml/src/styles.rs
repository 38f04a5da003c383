//! Style registry (word/styles.xml)
//!
//! [`StyleSheet`] is the set of named styles a document carries. Styles are
//! keyed by their display name; each one also gets a unique OOXML
//! `w:styleId` derived from that name, which is what paragraphs and runs
//! reference in `word/document.xml`.
//!
//! Registration through [`StyleSheet::ensure`] is idempotent: a name is
//! registered at most once and later requests reuse the existing entry.

use std::collections::HashSet;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{OoxmlError, Result};
use crate::escape_xml;

/// Font size, in points, given to styles created on demand
pub const DEFAULT_FONT_SIZE_PT: u32 = 12;

/// Display name of the built-in default paragraph style
pub const NORMAL_STYLE: &str = "Normal";

/// Type of style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleType {
    /// Paragraph style
    Paragraph,
    /// Character (run) style
    Character,
    /// Table style
    Table,
    /// Numbering style
    Numbering,
}

impl StyleType {
    /// Value of the `w:type` attribute
    pub fn as_ooxml(self) -> &'static str {
        match self {
            StyleType::Paragraph => "paragraph",
            StyleType::Character => "character",
            StyleType::Table => "table",
            StyleType::Numbering => "numbering",
        }
    }

    fn from_ooxml(value: &str) -> Self {
        match value {
            "character" => StyleType::Character,
            "table" => StyleType::Table,
            "numbering" => StyleType::Numbering,
            _ => StyleType::Paragraph,
        }
    }

    /// Whether this style formats text directly (paragraph or character),
    /// as opposed to the structural table and numbering kinds
    pub fn is_text(self) -> bool {
        matches!(self, StyleType::Paragraph | StyleType::Character)
    }
}

/// A style definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Style {
    /// Style ID (used in document references)
    pub id: String,
    /// Display name
    pub name: String,
    /// Style type
    pub style_type: StyleType,
    /// Base style ID (for inheritance)
    pub based_on: Option<String>,
    /// Font size in half-points (`w:sz`)
    pub font_size_half_points: Option<u32>,
    /// Whether this is the default style of its type
    pub is_default: bool,
    /// Whether this style was created by the user rather than shipped
    pub custom: bool,
}

impl Style {
    /// Font size in points, if set
    pub fn font_size_pt(&self) -> Option<u32> {
        self.font_size_half_points.map(|hp| hp / 2)
    }

    fn builtin(id: &str, name: &str, style_type: StyleType) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            style_type,
            based_on: None,
            font_size_half_points: None,
            is_default: false,
            custom: false,
        }
    }

    fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    fn based_on(mut self, id: &str) -> Self {
        self.based_on = Some(id.to_string());
        self
    }

    fn sized(mut self, half_points: u32) -> Self {
        self.font_size_half_points = Some(half_points);
        self
    }
}

/// Ordered collection of styles, keyed by display name
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    styles: Vec<Style>,
}

impl StyleSheet {
    /// Create an empty stylesheet
    pub fn new() -> Self {
        Self::default()
    }

    /// Stylesheet of a blank word-processing document
    ///
    /// Mirrors the styles a fresh default template ships with, so that a
    /// cleanup pass over a new document has the same built-ins to prune.
    pub fn builtin() -> Self {
        let styles = vec![
            Style::builtin("Normal", NORMAL_STYLE, StyleType::Paragraph)
                .as_default()
                .sized(22),
            Style::builtin(
                "DefaultParagraphFont",
                "Default Paragraph Font",
                StyleType::Character,
            )
            .as_default(),
            Style::builtin("Title", "Title", StyleType::Paragraph)
                .based_on("Normal")
                .sized(56),
            Style::builtin("Heading1", "Heading 1", StyleType::Paragraph)
                .based_on("Normal")
                .sized(32),
            Style::builtin("Heading2", "Heading 2", StyleType::Paragraph)
                .based_on("Normal")
                .sized(26),
            Style::builtin("ListParagraph", "List Paragraph", StyleType::Paragraph)
                .based_on("Normal"),
            Style::builtin("TableNormal", "Table Normal", StyleType::Table).as_default(),
            Style::builtin("NoList", "No List", StyleType::Numbering).as_default(),
        ];
        Self { styles }
    }

    /// Parse styles from XML bytes
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut stylesheet = StyleSheet::default();
        let mut buf = Vec::new();
        let mut current: Option<StyleBuilder> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    let name = e.local_name();
                    match name.as_ref() {
                        b"style" => {
                            current = Some(StyleBuilder {
                                style_type: get_attr(e, b"w:type")
                                    .map(|t| StyleType::from_ooxml(&t)),
                                id: get_attr(e, b"w:styleId"),
                                is_default: get_attr(e, b"w:default").as_deref() == Some("1"),
                                custom: get_attr(e, b"w:customStyle").as_deref() == Some("1"),
                                ..StyleBuilder::default()
                            });
                        }
                        b"name" => {
                            if let Some(builder) = current.as_mut() {
                                builder.name = get_attr(e, b"w:val");
                            }
                        }
                        b"basedOn" => {
                            if let Some(builder) = current.as_mut() {
                                builder.based_on = get_attr(e, b"w:val");
                            }
                        }
                        b"sz" => {
                            if let Some(builder) = current.as_mut() {
                                builder.font_size =
                                    get_attr(e, b"w:val").and_then(|v| v.parse().ok());
                            }
                        }
                        _ => {}
                    }
                }
                Ok(Event::End(ref e)) => {
                    if e.local_name().as_ref() == b"style" {
                        if let Some(style) = current.take().and_then(StyleBuilder::build) {
                            if !stylesheet.contains(&style.name) {
                                stylesheet.styles.push(style);
                            }
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(stylesheet)
    }

    /// Get a style by display name
    pub fn get(&self, name: &str) -> Option<&Style> {
        self.styles.iter().find(|s| s.name == name)
    }

    /// Get a style by style ID
    pub fn get_by_id(&self, id: &str) -> Option<&Style> {
        self.styles.iter().find(|s| s.id == id)
    }

    /// Check whether a style with this display name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Register a style unless one with the same name already exists
    ///
    /// New styles are custom, based on nothing, and sized
    /// [`DEFAULT_FONT_SIZE_PT`]. An existing entry is returned unchanged, even
    /// if it was registered with a different type.
    pub fn ensure(&mut self, name: &str, style_type: StyleType) -> &Style {
        let index = match self.styles.iter().position(|s| s.name == name) {
            Some(index) => index,
            None => {
                let id = self.unique_id_for(name);
                self.styles.push(Style {
                    id,
                    name: name.to_string(),
                    style_type,
                    based_on: None,
                    font_size_half_points: Some(DEFAULT_FONT_SIZE_PT * 2),
                    is_default: false,
                    custom: true,
                });
                self.styles.len() - 1
            }
        };
        &self.styles[index]
    }

    /// Remove a style by display name
    pub fn remove(&mut self, name: &str) -> Option<Style> {
        let index = self.styles.iter().position(|s| s.name == name)?;
        Some(self.styles.remove(index))
    }

    /// Keep only the styles matching the predicate, returning the removed ones
    pub fn retain<F>(&mut self, mut keep: F) -> Vec<Style>
    where
        F: FnMut(&Style) -> bool,
    {
        let (kept, removed): (Vec<Style>, Vec<Style>) =
            self.styles.drain(..).partition(|s| keep(s));
        self.styles = kept;
        removed
    }

    /// All styles, in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Style> {
        self.styles.iter()
    }

    /// Styles of one type
    pub fn of_type(&self, style_type: StyleType) -> impl Iterator<Item = &Style> {
        self.styles.iter().filter(move |s| s.style_type == style_type)
    }

    /// Number of registered styles
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Check if no styles are registered
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Derive a style ID from a display name
    ///
    /// Whitespace is dropped (`"Heading 1"` becomes `"Heading1"`); a numeric
    /// suffix keeps the ID unique when two names collapse to the same one.
    fn unique_id_for(&self, name: &str) -> String {
        let base: String = name.chars().filter(|c| !c.is_whitespace()).collect();
        let base = if base.is_empty() {
            "Style".to_string()
        } else {
            base
        };

        let taken: HashSet<&str> = self.styles.iter().map(|s| s.id.as_str()).collect();
        if !taken.contains(base.as_str()) {
            return base;
        }
        let mut n = 1;
        loop {
            let candidate = format!("{}{}", base, n);
            if !taken.contains(candidate.as_str()) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Serialize to a `word/styles.xml` part
    pub fn to_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#);
        xml.push('\n');
        xml.push_str("<w:docDefaults><w:rPrDefault><w:rPr>");
        xml.push_str(&format!(
            "<w:sz w:val=\"{}\"/><w:szCs w:val=\"{}\"/>",
            DEFAULT_FONT_SIZE_PT * 2,
            DEFAULT_FONT_SIZE_PT * 2
        ));
        xml.push_str("</w:rPr></w:rPrDefault><w:pPrDefault/></w:docDefaults>\n");

        for style in &self.styles {
            xml.push_str(&format!(
                "<w:style w:type=\"{}\"",
                style.style_type.as_ooxml()
            ));
            if style.is_default {
                xml.push_str(" w:default=\"1\"");
            }
            if style.custom {
                xml.push_str(" w:customStyle=\"1\"");
            }
            xml.push_str(&format!(" w:styleId=\"{}\">", escape_xml(&style.id)));
            xml.push_str(&format!("<w:name w:val=\"{}\"/>", escape_xml(&style.name)));
            if let Some(ref base) = style.based_on {
                xml.push_str(&format!("<w:basedOn w:val=\"{}\"/>", escape_xml(base)));
            }
            if style.custom {
                xml.push_str("<w:qFormat/>");
            }
            if let Some(size) = style.font_size_half_points {
                xml.push_str(&format!(
                    "<w:rPr><w:sz w:val=\"{}\"/><w:szCs w:val=\"{}\"/></w:rPr>",
                    size, size
                ));
            }
            xml.push_str("</w:style>\n");
        }

        xml.push_str("</w:styles>");
        xml
    }
}

#[derive(Default)]
struct StyleBuilder {
    id: Option<String>,
    name: Option<String>,
    style_type: Option<StyleType>,
    based_on: Option<String>,
    font_size: Option<u32>,
    is_default: bool,
    custom: bool,
}

impl StyleBuilder {
    fn build(self) -> Option<Style> {
        let id = self.id?;
        Some(Style {
            name: self.name.unwrap_or_else(|| id.clone()),
            id,
            style_type: self.style_type.unwrap_or(StyleType::Paragraph),
            based_on: self.based_on,
            font_size_half_points: self.font_size,
            is_default: self.is_default,
            custom: self.custom,
        })
    }
}

pub(crate) fn get_attr(e: &BytesStart, name: &[u8]) -> Option<String> {
    e.attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.as_ref() == name)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}
