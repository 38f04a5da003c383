//! Errors raised while assembling or reading a DOCX package

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OoxmlError {
    /// The ZIP container could not be written or read
    #[error("zip container: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),

    /// A part holds XML the reader cannot parse
    #[error("malformed part XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The package lacks a part the reader needs
    #[error("package has no part named {0}")]
    MissingFile(String),

    /// A paragraph or run references a style the registry does not hold
    #[error("style {0:?} is referenced but not defined")]
    StyleNotFound(String),

    #[error("unexpected package layout: {0}")]
    InvalidStructure(String),
}

/// Result type for OOXML operations
pub type Result<T> = std::result::Result<T, OoxmlError>;
