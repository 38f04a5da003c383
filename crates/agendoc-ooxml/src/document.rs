//! Document content model
//!
//! [`Document`] is what a conversion builds: a style registry plus an ordered
//! list of paragraphs made of runs. Paragraph and run styles are referenced
//! by display name; the writer maps them to style IDs when serializing, and
//! [`Document::from_archive`] maps IDs back to names when reading a package.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::archive::{OoxmlArchive, STYLES_PART};
use crate::error::{OoxmlError, Result};
use crate::relationships::Relationships;
use crate::styles::{get_attr, StyleSheet};

/// A word-processing document under construction
#[derive(Debug, Clone)]
pub struct Document {
    /// Style registry
    pub styles: StyleSheet,
    /// Body paragraphs, in output order
    pub paragraphs: Vec<Paragraph>,
    /// Title written to the core properties
    pub title: Option<String>,
}

/// A paragraph with its style and runs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    /// Paragraph style name, `None` when unset
    pub style: Option<String>,
    /// Text runs
    pub runs: Vec<Run>,
}

/// A text run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    /// The text content
    pub text: String,
    /// Character style name, `None` when unset
    pub style: Option<String>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a blank document seeded with the built-in styles
    pub fn new() -> Self {
        Self::with_styles(StyleSheet::builtin())
    }

    /// Create a document with a given style registry
    pub fn with_styles(styles: StyleSheet) -> Self {
        Self {
            styles,
            paragraphs: Vec::new(),
            title: None,
        }
    }

    /// Append an empty paragraph and return it
    pub fn add_paragraph(&mut self) -> &mut Paragraph {
        self.paragraphs.push(Paragraph::default());
        let last = self.paragraphs.len() - 1;
        &mut self.paragraphs[last]
    }

    /// Plain text of the whole document, one line per paragraph
    pub fn plain_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Read a document back from a DOCX package
    ///
    /// The styles part is located through the document relationships when
    /// present. Style IDs found in the body are mapped back to display names;
    /// unknown IDs are kept as-is.
    pub fn from_archive(archive: &OoxmlArchive) -> Result<Self> {
        let styles_part = archive
            .get("word/_rels/document.xml.rels")
            .map(Relationships::parse)
            .transpose()?
            .and_then(|rels| {
                rels.target_of_type(Relationships::TYPE_STYLES)
                    .map(|target| format!("word/{}", target.trim_start_matches('/')))
            })
            .unwrap_or_else(|| STYLES_PART.to_string());

        let styles = match archive.get(&styles_part) {
            Some(xml) => StyleSheet::parse(xml)?,
            None => StyleSheet::new(),
        };

        let mut document = Self::with_styles(styles);
        document.paragraphs = parse_body(archive.document_xml()?)?;

        for paragraph in &mut document.paragraphs {
            if let Some(ref mut id) = paragraph.style {
                if let Some(style) = document.styles.get_by_id(id) {
                    *id = style.name.clone();
                }
            }
            for run in &mut paragraph.runs {
                if let Some(ref mut id) = run.style {
                    if let Some(style) = document.styles.get_by_id(id) {
                        *id = style.name.clone();
                    }
                }
            }
        }

        Ok(document)
    }
}

impl Paragraph {
    /// Append an unstyled run
    pub fn add_run(&mut self, text: impl Into<String>) -> &mut Run {
        self.runs.push(Run {
            text: text.into(),
            style: None,
        });
        let last = self.runs.len() - 1;
        &mut self.runs[last]
    }

    /// Append a run with a character style
    pub fn add_styled_run(&mut self, text: impl Into<String>, style: impl Into<String>) {
        self.add_run(text).style = Some(style.into());
    }

    /// Concatenated text of all runs
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Check if this paragraph has no visible text
    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|r| r.text.is_empty())
    }
}

/// Parse the paragraphs of a `word/document.xml` body
fn parse_body(xml: &[u8]) -> Result<Vec<Paragraph>> {
    let mut reader = Reader::from_reader(xml);
    // Runs such as " · " depend on their surrounding spaces
    reader.config_mut().trim_text(false);

    let mut paragraphs = Vec::new();
    let mut buf = Vec::new();
    let mut in_body = false;
    let mut saw_body = false;
    let mut in_text = false;
    let mut current_para: Option<Paragraph> = None;
    let mut current_run: Option<Run> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"body" => {
                    in_body = true;
                    saw_body = true;
                }
                b"p" if in_body => current_para = Some(Paragraph::default()),
                b"r" if current_para.is_some() => {
                    current_run = Some(Run {
                        text: String::new(),
                        style: None,
                    })
                }
                b"t" if current_run.is_some() => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"body" => saw_body = true,
                b"pStyle" => {
                    if let Some(para) = current_para.as_mut() {
                        para.style = get_attr(e, b"w:val");
                    }
                }
                b"rStyle" => {
                    if let Some(run) = current_run.as_mut() {
                        run.style = get_attr(e, b"w:val");
                    }
                }
                b"p" if in_body => paragraphs.push(Paragraph::default()),
                _ => {}
            },
            Ok(Event::Text(ref t)) if in_text => {
                if let Some(run) = current_run.as_mut() {
                    let text = t.unescape().unwrap_or_default();
                    run.text.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"r" => {
                    if let (Some(run), Some(para)) = (current_run.take(), current_para.as_mut()) {
                        para.runs.push(run);
                    }
                }
                b"p" => {
                    if let Some(para) = current_para.take() {
                        paragraphs.push(para);
                    }
                }
                b"body" => in_body = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(OoxmlError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    if !saw_body {
        return Err(OoxmlError::InvalidStructure(
            "document part has no body".to_string(),
        ));
    }
    Ok(paragraphs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_paragraph_and_runs() {
        let mut doc = Document::new();
        let para = doc.add_paragraph();
        para.style = Some("Agenda-General-Parrafo".to_string());
        para.add_run("10:00");
        para.add_run(" · ");
        para.add_styled_run("Hall A", "Lugar");

        assert_eq!(doc.paragraphs.len(), 1);
        assert_eq!(doc.paragraphs[0].plain_text(), "10:00 · Hall A");
        assert_eq!(doc.paragraphs[0].runs[2].style.as_deref(), Some("Lugar"));
    }

    #[test]
    fn test_parse_body_keeps_spaces_and_styles() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:body>
<w:p><w:pPr><w:pStyle w:val="Titulo"/></w:pPr><w:r><w:t>Gala &amp; Cena</w:t></w:r></w:p>
<w:p><w:r><w:rPr><w:rStyle w:val="Hora"/></w:rPr><w:t>10:00</w:t></w:r><w:r><w:t xml:space="preserve"> · </w:t></w:r></w:p>
<w:p/>
</w:body>
</w:document>"#;

        let paragraphs = parse_body(xml.as_bytes()).unwrap();
        assert_eq!(paragraphs.len(), 3);
        assert_eq!(paragraphs[0].style.as_deref(), Some("Titulo"));
        assert_eq!(paragraphs[0].plain_text(), "Gala & Cena");
        assert_eq!(paragraphs[1].runs[0].style.as_deref(), Some("Hora"));
        assert_eq!(paragraphs[1].runs[1].text, " · ");
        assert!(paragraphs[2].is_empty());
    }

    #[test]
    fn test_parse_body_rejects_missing_body() {
        let xml = br#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"/>"#;
        assert!(matches!(
            parse_body(xml),
            Err(OoxmlError::InvalidStructure(_))
        ));
    }
}
