//! Conversion pipeline
//!
//! sanitize → validate → parse → render → finalize → write, with the
//! sanitized scratch copy removed on every path.

use std::path::{Path, PathBuf};

use agendoc_ooxml::{Document, DocxWriter, StyleType};
use tracing::{debug, error, info};

use crate::config::FieldConfig;
use crate::error::{ConvertError, Result};
use crate::finalize::{finalize, normalize_defaults};
use crate::sanitize::{sanitize, SanitizedCopy};
use crate::schema::{EventNode, MAIN_EVENT_TAG};
use crate::walker::{TreeWalker, WalkStats};
use crate::DEFAULT_STYLE_NAME;

/// A finalized document and what went into it
#[derive(Debug, Clone)]
pub struct AgendaDocument {
    pub document: Document,
    pub stats: WalkStats,
    /// Styles pruned by the finalizer
    pub removed_styles: Vec<String>,
}

/// Outcome of a successful conversion
#[derive(Debug, Clone)]
pub struct ConversionReport {
    pub output_path: PathBuf,
    pub stats: WalkStats,
    /// Styles defined in the written document
    pub styles: Vec<String>,
}

/// Converts agenda XML files to DOCX with one configuration
#[derive(Debug, Clone)]
pub struct Converter {
    config: FieldConfig,
    writer: DocxWriter,
}

impl Converter {
    pub fn new(config: FieldConfig) -> Self {
        Self {
            config,
            writer: DocxWriter::new(),
        }
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Convert `xml_path` and save it as `output_folder/output_file_name`
    ///
    /// The file name is used as given. The output folder must exist.
    pub fn convert(
        &self,
        xml_path: &Path,
        output_folder: &Path,
        output_file_name: &str,
    ) -> Result<ConversionReport> {
        info!("Converting {}", xml_path.display());

        let scratch = SanitizedCopy::create(xml_path)?;
        if !scratch.validate() {
            error!(
                "{} is not well-formed XML after sanitization",
                xml_path.display()
            );
            return Err(ConvertError::MalformedXml(format!(
                "{} could not be parsed",
                xml_path.display()
            )));
        }

        let built = self.build_sanitized(scratch.content())?;

        let output_path = output_folder.join(output_file_name);
        self.writer.write_to_file(&built.document, &output_path)?;
        info!(
            "Wrote {} ({} paragraphs)",
            output_path.display(),
            built.stats.paragraphs
        );

        Ok(ConversionReport {
            output_path,
            stats: built.stats,
            styles: built
                .document
                .styles
                .iter()
                .map(|s| s.name.clone())
                .collect(),
        })
    }

    /// Build and finalize the document for raw agenda XML, in memory
    pub fn build_document(&self, xml: &str) -> Result<AgendaDocument> {
        self.build_sanitized(&sanitize(xml))
    }

    fn build_sanitized(&self, xml: &str) -> Result<AgendaDocument> {
        let root = EventNode::parse(xml)?;

        let mut document = Document::new();
        document
            .styles
            .ensure(DEFAULT_STYLE_NAME, StyleType::Paragraph);
        document.title = root
            .child(MAIN_EVENT_TAG)
            .and_then(|event| event.child_content("Evento-Principal-Titulo"))
            .map(str::to_string);

        let stats = TreeWalker::new(&self.config).walk(&root, &mut document);

        let removed_styles = finalize(&mut document, &self.config);
        let normalized = normalize_defaults(&mut document);
        debug!("Applied default style to {} paragraphs", normalized);

        Ok(AgendaDocument {
            document,
            stats,
            removed_styles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FieldStyle, StyleKind};

    #[test]
    fn test_build_single_title() {
        let converter = Converter::new(FieldConfig::new());
        let built = converter
            .build_document(
                "<Agenda><Evento-Principal>\
                   <Evento-Principal-Titulo>Gala</Evento-Principal-Titulo>\
                 </Evento-Principal></Agenda>",
            )
            .unwrap();

        let doc = &built.document;
        assert_eq!(doc.paragraphs.len(), 1);
        assert_eq!(doc.paragraphs[0].plain_text(), "Gala");
        assert_eq!(doc.paragraphs[0].style.as_deref(), Some(DEFAULT_STYLE_NAME));
        assert_eq!(doc.title.as_deref(), Some("Gala"));
        assert_eq!(built.stats.main_events, 1);
    }

    #[test]
    fn test_build_sanitizes_input() {
        let converter = Converter::new(FieldConfig::new());
        let built = converter
            .build_document(
                "<Agenda><Evento-Principal>\
                   <Evento-Principal-Titulo>Tom & Jerry</Evento-Principal-Titulo>\
                 </Evento-Principal></Agenda>",
            )
            .unwrap();

        assert_eq!(built.document.plain_text(), "Tom i Jerry");
    }

    #[test]
    fn test_build_rejects_malformed() {
        let converter = Converter::new(FieldConfig::new());
        let err = converter
            .build_document("<Agenda><Evento-Principal></Agenda>")
            .unwrap_err();
        assert!(err.is_input_rejected());
    }

    #[test]
    fn test_build_prunes_unused_styles() {
        let mut config = FieldConfig::new();
        config.insert(
            "Evento-Principal-Titulo",
            FieldStyle::new("Titol", StyleKind::Paragraph),
        );
        config.insert("actividad-hora", FieldStyle::new("Hora", StyleKind::Character));

        let built = Converter::new(config)
            .build_document("<Agenda/>")
            .unwrap();

        // Configured styles are only registered when a field uses them
        let names: Vec<_> = built.document.styles.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Table Normal", "No List", DEFAULT_STYLE_NAME]);
        assert!(built.removed_styles.contains(&"Normal".to_string()));
    }
}
