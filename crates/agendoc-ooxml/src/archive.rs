//! Archive handling for DOCX packages
//!
//! A DOCX file is a ZIP archive of XML parts. [`OoxmlArchive`] holds every
//! part in memory so the writer can assemble a package and tests can read
//! one back.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;

use zip::read::ZipArchive;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

use crate::error::{OoxmlError, Result};

/// Part name of the main document body
pub const DOCUMENT_PART: &str = "word/document.xml";
/// Part name of the style definitions
pub const STYLES_PART: &str = "word/styles.xml";
/// Part name of the package content types
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// An unpacked OOXML package
#[derive(Debug, Default)]
pub struct OoxmlArchive {
    /// All parts in the package, keyed by part name
    files: HashMap<String, Vec<u8>>,
}

impl OoxmlArchive {
    /// Create an empty package
    pub fn new() -> Self {
        Self::default()
    }

    /// Open and unpack a DOCX file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Unpack from any reader that implements Read + Seek
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut files = HashMap::new();

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            let name = entry.name().to_string();
            if name.ends_with('/') {
                continue;
            }

            let mut contents = Vec::new();
            entry.read_to_end(&mut contents)?;
            files.insert(name, contents);
        }

        Ok(Self { files })
    }

    /// Get a part's contents by name
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(|v| v.as_slice())
    }

    /// Get a part's contents as a string
    pub fn get_string(&self, path: &str) -> Option<String> {
        self.files
            .get(path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Get the main document body (word/document.xml)
    pub fn document_xml(&self) -> Result<&[u8]> {
        self.get(DOCUMENT_PART)
            .ok_or_else(|| OoxmlError::MissingFile(DOCUMENT_PART.to_string()))
    }

    /// Get the style definitions (word/styles.xml)
    pub fn styles_xml(&self) -> Result<&[u8]> {
        self.get(STYLES_PART)
            .ok_or_else(|| OoxmlError::MissingFile(STYLES_PART.to_string()))
    }

    /// Check if a part exists
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// List all part names, sorted
    pub fn file_list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.files.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Set a part's contents from a string
    pub fn set_string(&mut self, path: impl Into<String>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into().into_bytes());
    }

    /// Write the package to a file, replacing any existing file
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_to(file)
    }

    /// Write the package to any writer
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        // [Content_Types].xml goes first
        let mut paths = self.file_list();
        if let Some(pos) = paths.iter().position(|p| *p == CONTENT_TYPES_PART) {
            let ct = paths.remove(pos);
            paths.insert(0, ct);
        }

        for path in paths {
            zip.start_file(path, options)?;
            zip.write_all(&self.files[path])?;
        }

        zip.finish()?;
        Ok(())
    }

    /// Serialize the package to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = std::io::Cursor::new(Vec::new());
        self.write_to(&mut buffer)?;
        Ok(buffer.into_inner())
    }
}
