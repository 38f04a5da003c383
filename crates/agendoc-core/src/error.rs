//! Error types for conversions

use std::path::PathBuf;

use agendoc_ooxml::OoxmlError;
use thiserror::Error;

/// Errors that abort a conversion
#[derive(Error, Debug)]
pub enum ConvertError {
    /// The input file could not be read, or the scratch copy written
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input is not well-formed XML, even after sanitization
    #[error("XML is not well-formed after sanitization: {0}")]
    MalformedXml(String),

    /// The output document could not be generated or saved
    #[error("failed to write document: {0}")]
    Output(#[from] OoxmlError),
}

impl ConvertError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the conversion stopped because the input was rejected,
    /// as opposed to a failure while producing output
    pub fn is_input_rejected(&self) -> bool {
        matches!(self, ConvertError::MalformedXml(_))
    }
}

/// Result type for conversions
pub type Result<T> = std::result::Result<T, ConvertError>;
