//! XML sanitization and validation
//!
//! Agenda exports often contain bare `&` characters ("Tom & Jerry") that
//! make the file ill-formed. Sanitization rewrites every `&` that does not
//! start an `&amp;` entity to the letter `i`, which keeps the text readable
//! in Catalan and Spanish ("Tom i Jerry").
//!
//! The rewrite is lossy: other entities such as `&lt;` or `&#38;` are
//! rewritten too.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::error::{ConvertError, Result};
use crate::schema::EventNode;

/// Suffix appended to the input path to name the scratch copy
pub const SANITIZED_SUFFIX: &str = ".sanitized";

/// Replacement for a bare ampersand
const AMPERSAND_REPLACEMENT: &str = "i";

fn ampersand_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // The regex crate has no lookahead, so match `&amp;` as a whole and keep it
    RE.get_or_init(|| Regex::new(r"&(amp;)?").expect("valid ampersand regex"))
}

/// Replace every `&` not immediately followed by `amp;` with `i`
pub fn sanitize(content: &str) -> String {
    ampersand_regex()
        .replace_all(content, |caps: &regex::Captures| {
            if caps.get(1).is_some() {
                "&amp;"
            } else {
                AMPERSAND_REPLACEMENT
            }
        })
        .into_owned()
}

/// Check that text is well-formed XML with a single root element
pub fn validate_str(content: &str) -> bool {
    match EventNode::parse(content) {
        Ok(_) => true,
        Err(e) => {
            debug!("Validation failed: {}", e);
            false
        }
    }
}

/// Check that a file holds well-formed XML
///
/// Unreadable files and files that are not UTF-8 are reported as invalid.
pub fn validate(path: &Path) -> bool {
    match fs::read_to_string(path) {
        Ok(content) => validate_str(&content),
        Err(e) => {
            warn!("Cannot read {} for validation: {}", path.display(), e);
            false
        }
    }
}

/// A sanitized scratch copy of an input file
///
/// Written next to the input as `<input>.sanitized` and deleted when the
/// value is dropped, whether the conversion finished or not.
#[derive(Debug)]
pub struct SanitizedCopy {
    path: PathBuf,
    content: String,
}

impl SanitizedCopy {
    /// Read `xml_path`, sanitize it and write the scratch copy
    pub fn create(xml_path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(xml_path).map_err(|e| ConvertError::io(xml_path, e))?;
        let content = sanitize(&raw);

        let mut name = xml_path.as_os_str().to_os_string();
        name.push(SANITIZED_SUFFIX);
        let path = PathBuf::from(name);

        fs::write(&path, &content).map_err(|e| ConvertError::io(&path, e))?;
        debug!("Wrote sanitized copy {}", path.display());

        Ok(Self { path, content })
    }

    /// Path of the scratch file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sanitized text
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Validate the scratch file as written to disk
    pub fn validate(&self) -> bool {
        validate(&self.path)
    }
}

impl Drop for SanitizedCopy {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed sanitized copy {}", self.path.display()),
            Err(e) => warn!(
                "Failed to remove sanitized copy {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_bare_ampersand_replaced() {
        assert_eq!(sanitize("Tom & Jerry"), "Tom i Jerry");
        assert_eq!(sanitize("a&b&&c"), "aibiic");
    }

    #[test]
    fn test_amp_entity_kept() {
        assert_eq!(sanitize("Salt &amp; Pepper"), "Salt &amp; Pepper");
        assert_eq!(sanitize("&amp;&amp"), "&amp;iamp");
    }

    #[test]
    fn test_other_entities_rewritten() {
        assert_eq!(sanitize("1 &lt; 2"), "1 ilt; 2");
        assert_eq!(sanitize("&#38;"), "i#38;");
    }

    #[test]
    fn test_sanitize_makes_valid() {
        let raw = "<Agenda><t>Tom & Jerry</t></Agenda>";
        assert!(!validate_str(raw));
        assert!(validate_str(&sanitize(raw)));
    }

    #[test]
    fn test_validate_rejects_broken_structure() {
        assert!(validate_str("<Agenda><t>ok</t></Agenda>"));
        assert!(!validate_str("<Agenda><t>ok</Agenda>"));
        assert!(!validate_str(""));
    }

    #[test]
    fn test_validate_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(!validate(&dir.path().join("absent.xml")));
    }

    #[test]
    fn test_scratch_copy_lifecycle() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("agenda.xml");
        fs::write(&input, "<Agenda><t>A & B</t></Agenda>").unwrap();

        let scratch_path = {
            let copy = SanitizedCopy::create(&input).unwrap();
            assert_eq!(copy.path(), dir.path().join("agenda.xml.sanitized"));
            assert_eq!(
                fs::read_to_string(copy.path()).unwrap(),
                "<Agenda><t>A i B</t></Agenda>"
            );
            assert!(copy.validate());
            copy.path().to_path_buf()
        };

        assert!(!scratch_path.exists());
        // The input itself is untouched
        assert_eq!(
            fs::read_to_string(&input).unwrap(),
            "<Agenda><t>A & B</t></Agenda>"
        );
    }

    #[test]
    fn test_scratch_copy_missing_input() {
        let dir = TempDir::new().unwrap();
        let err = SanitizedCopy::create(&dir.path().join("absent.xml")).unwrap_err();
        assert!(matches!(err, ConvertError::Io { .. }));
    }
}
