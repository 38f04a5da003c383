//! # agendoc-ooxml
//!
//! OOXML (Office Open XML) document model and DOCX generation for agendoc.
//!
//! This crate provides:
//! - A document model of styled paragraphs and runs
//! - A style registry with idempotent registration
//! - A DOCX package writer, and a reader for verifying its output
//!
//! ## Example: Reading a Document Back
//!
//! ```no_run
//! use agendoc_ooxml::{Document, OoxmlArchive};
//!
//! let archive = OoxmlArchive::open("agenda.docx")?;
//! let document = Document::from_archive(&archive)?;
//!
//! for paragraph in &document.paragraphs {
//!     println!("{:?}: {}", paragraph.style, paragraph.plain_text());
//! }
//! # Ok::<(), agendoc_ooxml::OoxmlError>(())
//! ```

pub mod archive;
pub mod document;
pub mod error;
pub mod relationships;
pub mod styles;
pub mod writer;

pub use archive::OoxmlArchive;
pub use document::{Document, Paragraph, Run};
pub use error::{OoxmlError, Result};
pub use relationships::Relationships;
pub use styles::{Style, StyleSheet, StyleType, DEFAULT_FONT_SIZE_PT, NORMAL_STYLE};
pub use writer::DocxWriter;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Escape special XML characters
pub(crate) fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("Tom & Jerry"), "Tom &amp; Jerry");
        assert_eq!(escape_xml("<tag>"), "&lt;tag&gt;");
        assert_eq!(escape_xml("\"quoted\""), "&quot;quoted&quot;");
    }
}
