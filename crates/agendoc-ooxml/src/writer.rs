//! DOCX Writer
//!
//! Serializes a [`Document`] into a complete DOCX package: body, styles,
//! relationships, content types and document properties.
//!
//! # Example
//!
//! ```
//! use agendoc_ooxml::{Document, DocxWriter, StyleType};
//!
//! let mut doc = Document::new();
//! doc.styles.ensure("Agenda-General-Parrafo", StyleType::Paragraph);
//! let para = doc.add_paragraph();
//! para.style = Some("Agenda-General-Parrafo".to_string());
//! para.add_run("Gala");
//!
//! let bytes = DocxWriter::new().generate(&doc)?;
//! assert!(!bytes.is_empty());
//! # Ok::<(), agendoc_ooxml::OoxmlError>(())
//! ```

use std::path::Path;

use crate::archive::{OoxmlArchive, CONTENT_TYPES_PART, DOCUMENT_PART, STYLES_PART};
use crate::document::{Document, Paragraph, Run};
use crate::error::{OoxmlError, Result};
use crate::escape_xml;
use crate::relationships::Relationships;
use crate::styles::StyleSheet;

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
  <Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
  <Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
  <Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>
</Types>"#;

/// DOCX writer for [`Document`]s
///
/// Every style a paragraph or run references must be registered in the
/// document's style sheet.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxWriter;

impl DocxWriter {
    pub fn new() -> Self {
        Self
    }

    /// Assemble the package for a document
    pub fn build_archive(&self, doc: &Document) -> Result<OoxmlArchive> {
        let mut archive = OoxmlArchive::new();

        let mut package_rels = Relationships::new();
        package_rels.add(DOCUMENT_PART, Relationships::TYPE_OFFICE_DOCUMENT);
        package_rels.add("docProps/core.xml", Relationships::TYPE_CORE_PROPERTIES);
        package_rels.add("docProps/app.xml", Relationships::TYPE_EXTENDED_PROPERTIES);

        let mut document_rels = Relationships::new();
        document_rels.add("styles.xml", Relationships::TYPE_STYLES);

        archive.set_string(CONTENT_TYPES_PART, CONTENT_TYPES_XML);
        archive.set_string("_rels/.rels", package_rels.to_xml());
        archive.set_string("word/_rels/document.xml.rels", document_rels.to_xml());
        archive.set_string(DOCUMENT_PART, self.generate_document_xml(doc)?);
        archive.set_string(STYLES_PART, doc.styles.to_xml());
        archive.set_string("docProps/core.xml", core_properties_xml(doc));
        archive.set_string("docProps/app.xml", self.app_properties_xml());

        Ok(archive)
    }

    /// Generate a DOCX file as bytes
    pub fn generate(&self, doc: &Document) -> Result<Vec<u8>> {
        self.build_archive(doc)?.to_bytes()
    }

    /// Generate a DOCX file and write it to `path`
    pub fn write_to_file<P: AsRef<Path>>(&self, doc: &Document, path: P) -> Result<()> {
        self.build_archive(doc)?.write_to_file(path)
    }

    /// Generate the complete document.xml content
    fn generate_document_xml(&self, doc: &Document) -> Result<String> {
        let mut output = String::new();
        output.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        output.push('\n');
        output.push_str(
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
        );
        output.push('\n');
        output.push_str("<w:body>\n");

        for paragraph in &doc.paragraphs {
            self.generate_paragraph(&mut output, paragraph, &doc.styles)?;
        }

        // A4 page with 1-inch margins
        output.push_str(
            "<w:sectPr><w:pgSz w:w=\"11906\" w:h=\"16838\"/>\
             <w:pgMar w:top=\"1440\" w:right=\"1440\" w:bottom=\"1440\" w:left=\"1440\" \
             w:header=\"708\" w:footer=\"708\" w:gutter=\"0\"/></w:sectPr>\n",
        );
        output.push_str("</w:body>\n");
        output.push_str("</w:document>");
        Ok(output)
    }

    fn generate_paragraph(
        &self,
        output: &mut String,
        paragraph: &Paragraph,
        styles: &StyleSheet,
    ) -> Result<()> {
        output.push_str("<w:p>");
        if let Some(id) = self.style_id(paragraph.style.as_deref(), styles)? {
            output.push_str(&format!(
                "<w:pPr><w:pStyle w:val=\"{}\"/></w:pPr>",
                escape_xml(id)
            ));
        }
        for run in &paragraph.runs {
            self.generate_run(output, run, styles)?;
        }
        output.push_str("</w:p>\n");
        Ok(())
    }

    fn generate_run(&self, output: &mut String, run: &Run, styles: &StyleSheet) -> Result<()> {
        output.push_str("<w:r>");
        if let Some(id) = self.style_id(run.style.as_deref(), styles)? {
            output.push_str(&format!(
                "<w:rPr><w:rStyle w:val=\"{}\"/></w:rPr>",
                escape_xml(id)
            ));
        }
        output.push_str(&format!(
            "<w:t xml:space=\"preserve\">{}</w:t>",
            escape_xml(&run.text)
        ));
        output.push_str("</w:r>");
        Ok(())
    }

    /// Map a style name to its ID
    fn style_id<'a>(&self, name: Option<&str>, styles: &'a StyleSheet) -> Result<Option<&'a str>> {
        let Some(name) = name else {
            return Ok(None);
        };
        match styles.get(name) {
            Some(style) => Ok(Some(style.id.as_str())),
            None => Err(OoxmlError::StyleNotFound(name.to_string())),
        }
    }

    fn app_properties_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>{}</Application></Properties>"#,
            escape_xml(&format!("agendoc {}", crate::VERSION))
        )
    }
}

/// docProps/core.xml with the document title, if any
fn core_properties_xml(doc: &Document) -> String {
    let mut core_xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
    );
    if let Some(ref title) = doc.title {
        core_xml.push_str(&format!("<dc:title>{}</dc:title>", escape_xml(title)));
    }
    core_xml.push_str("</cp:coreProperties>");
    core_xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::styles::StyleType;

    fn sample_document() -> Document {
        let mut doc = Document::new();
        doc.styles.ensure("Agenda Titulo", StyleType::Paragraph);
        doc.styles.ensure("Hora", StyleType::Character);

        let title = doc.add_paragraph();
        title.style = Some("Agenda Titulo".to_string());
        title.add_run("Gala <2024>");

        let when = doc.add_paragraph();
        when.add_styled_run("10:00", "Hora");
        when.add_run(" · ");
        when.add_run("Hall A");
        doc
    }

    #[test]
    fn test_document_xml_uses_style_ids() {
        let doc = sample_document();
        let xml = DocxWriter::new().generate_document_xml(&doc).unwrap();

        assert!(xml.contains(r#"<w:pStyle w:val="AgendaTitulo"/>"#));
        assert!(xml.contains(r#"<w:rStyle w:val="Hora"/>"#));
        assert!(xml.contains("Gala &lt;2024&gt;"));
        assert!(xml.contains(r#"<w:t xml:space="preserve"> · </w:t>"#));
    }

    #[test]
    fn test_rejects_unknown_style() {
        let mut doc = Document::new();
        doc.add_paragraph().style = Some("Missing".to_string());

        match DocxWriter::new().generate(&doc) {
            Err(OoxmlError::StyleNotFound(name)) => assert_eq!(name, "Missing"),
            other => panic!("expected StyleNotFound, got {:?}", other.map(|b| b.len())),
        }
    }

    #[test]
    fn test_package_parts() {
        let mut doc = sample_document();
        doc.title = Some("Agenda".to_string());
        let archive = DocxWriter::new().build_archive(&doc).unwrap();

        for part in [
            CONTENT_TYPES_PART,
            "_rels/.rels",
            "word/_rels/document.xml.rels",
            DOCUMENT_PART,
            STYLES_PART,
            "docProps/core.xml",
            "docProps/app.xml",
        ] {
            assert!(archive.contains(part), "missing part {}", part);
        }

        let core = archive.get_string("docProps/core.xml").unwrap();
        assert!(core.contains("<dc:title>Agenda</dc:title>"));
    }

    #[test]
    fn test_app_properties_name() {
        let expected = format!("<Application>agendoc {}</Application>", crate::VERSION);
        assert!(DocxWriter::new().app_properties_xml().contains(&expected));
    }
}
