//! Relationship parts (`_rels/*.rels`)
//!
//! A package declares its parts through relationship files mapping `rId`
//! identifiers to targets. The writer builds two of them: the package-level
//! `_rels/.rels` and the document-level `word/_rels/document.xml.rels`.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{OoxmlError, Result};
use crate::escape_xml;

/// OOXML namespace for relationships
pub const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Common relationship type URIs
impl Relationships {
    /// Main document part
    pub const TYPE_OFFICE_DOCUMENT: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    /// Styles part
    pub const TYPE_STYLES: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
    /// Core properties (title, creator, dates)
    pub const TYPE_CORE_PROPERTIES: &'static str =
        "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
    /// Extended properties (application name)
    pub const TYPE_EXTENDED_PROPERTIES: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
}

/// A single relationship entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship ID (`rId1`, `rId2`, ...)
    pub id: String,
    /// The relationship type URI
    pub rel_type: String,
    /// Target part, relative to the source part
    pub target: String,
}

/// Ordered set of relationships for one source part
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    entries: Vec<Relationship>,
}

impl Relationships {
    /// Create an empty relationship set
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse relationships from XML bytes
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut entries = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    if e.local_name().as_ref() == b"Relationship" {
                        let mut id = None;
                        let mut target = None;
                        let mut rel_type = None;

                        for attr in e.attributes().filter_map(|a| a.ok()) {
                            let value = attr.unescape_value().ok().map(|s| s.to_string());
                            match attr.key.as_ref() {
                                b"Id" => id = value,
                                b"Target" => target = value,
                                b"Type" => rel_type = value,
                                _ => {}
                            }
                        }

                        if let (Some(id), Some(target)) = (id, target) {
                            entries.push(Relationship {
                                id,
                                rel_type: rel_type.unwrap_or_default(),
                                target,
                            });
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(Self { entries })
    }

    /// Add a relationship and return its generated ID
    pub fn add(&mut self, target: impl Into<String>, rel_type: impl Into<String>) -> String {
        let id = format!("rId{}", self.entries.len() + 1);
        self.entries.push(Relationship {
            id: id.clone(),
            rel_type: rel_type.into(),
            target: target.into(),
        });
        id
    }

    /// Find the target of the first relationship of a type
    pub fn target_of_type(&self, rel_type: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|r| r.rel_type == rel_type)
            .map(|r| r.target.as_str())
    }

    /// Number of relationships
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no relationships
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize to a `.rels` part
    pub fn to_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<Relationships xmlns="{}">"#, RELATIONSHIPS_NS));
        xml.push('\n');

        for rel in &self.entries {
            xml.push_str(&format!(
                "  <Relationship Id=\"{}\" Type=\"{}\" Target=\"{}\"/>\n",
                escape_xml(&rel.id),
                escape_xml(&rel.rel_type),
                escape_xml(&rel.target)
            ));
        }

        xml.push_str("</Relationships>");
        xml
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_generates_sequential_ids() {
        let mut rels = Relationships::new();
        assert_eq!(rels.add("styles.xml", Relationships::TYPE_STYLES), "rId1");
        assert_eq!(
            rels.add("docProps/core.xml", Relationships::TYPE_CORE_PROPERTIES),
            "rId2"
        );
        assert_eq!(rels.len(), 2);
    }

    #[test]
    fn test_roundtrip_through_xml() {
        let mut rels = Relationships::new();
        rels.add("word/document.xml", Relationships::TYPE_OFFICE_DOCUMENT);
        rels.add("styles.xml", Relationships::TYPE_STYLES);

        let parsed = Relationships::parse(rels.to_xml().as_bytes()).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(
            parsed.target_of_type(Relationships::TYPE_STYLES),
            Some("styles.xml")
        );
    }

    #[test]
    fn test_parse_skips_incomplete_entries() {
        let xml = br#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
            <Relationship Id="rId1" Type="t"/>
            <Relationship Id="rId2" Type="t" Target="a.xml"/>
        </Relationships>"#;

        let parsed = Relationships::parse(xml).unwrap();
        assert_eq!(parsed.len(), 1);
        assert!(!parsed.is_empty());
    }
}
