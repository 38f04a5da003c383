//! Field-to-style configuration
//!
//! The configuration maps XML field names to the style each field renders
//! with. On disk it is a human-editable JSON object:
//!
//! ```json
//! {
//!   "Evento-Principal-Titulo": { "type": "parrafo", "style": "Agenda-Titulo" },
//!   "Evento-Principal-Hora": { "type": "caracter", "style": "Agenda-Hora" }
//! }
//! ```
//!
//! Either key of an entry may be omitted; the missing half falls back to its
//! default when the style is resolved.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use agendoc_ooxml::StyleType;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::schema;

/// File name of the configuration, resolved against the base directory
pub const CONFIG_FILE_NAME: &str = "styles_config.json";

/// Environment variable overriding the configuration base directory
pub const HOME_ENV: &str = "AGENDOC_HOME";

/// The two kinds of style a field can render with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StyleKind {
    /// The field gets its own paragraph carrying the style
    #[serde(rename = "parrafo")]
    Paragraph,
    /// The field's text becomes a run carrying the style
    #[serde(rename = "caracter")]
    Character,
}

impl From<StyleKind> for StyleType {
    fn from(kind: StyleKind) -> Self {
        match kind {
            StyleKind::Paragraph => StyleType::Paragraph,
            StyleKind::Character => StyleType::Character,
        }
    }
}

/// Style settings for one field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldStyle {
    /// Style name
    #[serde(rename = "style", default, skip_serializing_if = "Option::is_none")]
    pub style_name: Option<String>,
    /// Style kind
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub style_type: Option<StyleKind>,
}

impl FieldStyle {
    /// A fully specified entry
    pub fn new(style_name: impl Into<String>, style_type: StyleKind) -> Self {
        Self {
            style_name: Some(style_name.into()),
            style_type: Some(style_type),
        }
    }
}

/// Mapping from field name to [`FieldStyle`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldConfig {
    fields: BTreeMap<String, FieldStyle>,
}

impl FieldConfig {
    /// An empty configuration; every field resolves to its defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// The starter configuration offered for editing: every known field
    /// mapped to a character style named after the field itself
    pub fn with_field_defaults() -> Self {
        let mut config = Self::new();
        for field in schema::all_field_names() {
            config.insert(field, FieldStyle::new(field, StyleKind::Character));
        }
        config
    }

    /// Parse a configuration from JSON
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Set the style of a field, replacing any previous entry
    pub fn insert(&mut self, field: impl Into<String>, style: FieldStyle) {
        self.fields.insert(field.into(), style);
    }

    /// Style entry of a field
    pub fn get(&self, field: &str) -> Option<&FieldStyle> {
        self.fields.get(field)
    }

    /// Remove a field's entry
    pub fn remove(&mut self, field: &str) -> Option<FieldStyle> {
        self.fields.remove(field)
    }

    /// Entries, ordered by field name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldStyle)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of configured fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if no field is configured
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Every style name the configuration references
    pub fn style_names(&self) -> BTreeSet<&str> {
        self.fields
            .values()
            .filter_map(|f| f.style_name.as_deref())
            .collect()
    }
}

/// Loads and saves the configuration file
///
/// Both operations fail softly: problems are logged and never reach the
/// caller. There is no locking; a save racing a load is undefined.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store backed by an explicit file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store backed by [`CONFIG_FILE_NAME`] in the application base directory
    ///
    /// The base directory is `$AGENDOC_HOME` when set, else the directory of
    /// the running executable (packaged layout), else the working directory.
    pub fn locate() -> Self {
        Self::new(base_dir().join(CONFIG_FILE_NAME))
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the configuration, or an empty one if the file is missing or
    /// does not hold a valid mapping
    pub fn load(&self) -> FieldConfig {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                info!(
                    "No configuration at {} ({}), using defaults",
                    self.path.display(),
                    e
                );
                return FieldConfig::new();
            }
        };

        match FieldConfig::from_json_str(&content) {
            Ok(config) => {
                debug!(
                    "Loaded {} field styles from {}",
                    config.len(),
                    self.path.display()
                );
                config
            }
            Err(e) => {
                warn!(
                    "Ignoring invalid configuration {}: {}",
                    self.path.display(),
                    e
                );
                FieldConfig::new()
            }
        }
    }

    /// Replace the configuration file; returns whether the write succeeded
    pub fn save(&self, config: &FieldConfig) -> bool {
        let json = match config.to_json_string() {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize configuration: {}", e);
                return false;
            }
        };

        match fs::write(&self.path, json) {
            Ok(()) => {
                info!("Configuration saved to {}", self.path.display());
                true
            }
            Err(e) => {
                error!(
                    "Failed to save configuration to {}: {}",
                    self.path.display(),
                    e
                );
                false
            }
        }
    }
}

fn base_dir() -> PathBuf {
    if let Some(home) = std::env::var_os(HOME_ENV) {
        return PathBuf::from(home);
    }
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_on_disk_format() {
        let json = r#"{
            "Evento-Principal-Titulo": {"type": "parrafo", "style": "Titulo"},
            "Evento-Principal-Hora": {"type": "caracter", "style": "Hora"}
        }"#;

        let config = FieldConfig::from_json_str(json).unwrap();
        assert_eq!(config.len(), 2);
        assert_eq!(
            config.get("Evento-Principal-Titulo"),
            Some(&FieldStyle::new("Titulo", StyleKind::Paragraph))
        );
        assert_eq!(
            config.get("Evento-Principal-Hora").unwrap().style_type,
            Some(StyleKind::Character)
        );
    }

    #[test]
    fn test_partial_entry() {
        let json = r#"{"actividad-titulo": {"style": "Act"}}"#;
        let config = FieldConfig::from_json_str(json).unwrap();

        let entry = config.get("actividad-titulo").unwrap();
        assert_eq!(entry.style_name.as_deref(), Some("Act"));
        assert_eq!(entry.style_type, None);
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let json = r#"{"actividad-titulo": {"type": "negrita", "style": "Act"}}"#;
        assert!(FieldConfig::from_json_str(json).is_err());
    }

    #[test]
    fn test_style_names() {
        let mut config = FieldConfig::new();
        config.insert("a", FieldStyle::new("Shared", StyleKind::Paragraph));
        config.insert("b", FieldStyle::new("Shared", StyleKind::Paragraph));
        config.insert(
            "c",
            FieldStyle {
                style_name: None,
                style_type: Some(StyleKind::Character),
            },
        );

        let names: Vec<&str> = config.style_names().into_iter().collect();
        assert_eq!(names, vec!["Shared"]);
    }

    #[test]
    fn test_field_defaults_cover_schema() {
        let config = FieldConfig::with_field_defaults();
        assert_eq!(config.len(), schema::all_field_names().count());
        assert_eq!(
            config.get("actividad-lugar"),
            Some(&FieldStyle::new("actividad-lugar", StyleKind::Character))
        );
    }

    #[test]
    fn test_store_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path().join(CONFIG_FILE_NAME));

        let mut config = FieldConfig::new();
        config.insert(
            "Sub-evento-Titulo",
            FieldStyle::new("Sub Titulo", StyleKind::Paragraph),
        );
        config.insert(
            "Sub-evento-Lugar",
            FieldStyle::new("Lugar", StyleKind::Character),
        );

        assert!(store.save(&config));
        assert_eq!(store.load(), config);
    }

    #[test]
    fn test_store_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path().join("absent.json"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_store_corrupt_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "{ not json").unwrap();

        assert!(ConfigStore::new(&path).load().is_empty());
    }

    #[test]
    fn test_store_save_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path().join("missing-dir").join(CONFIG_FILE_NAME));
        assert!(!store.save(&FieldConfig::new()));
    }
}
