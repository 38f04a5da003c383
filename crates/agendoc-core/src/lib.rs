//! # agendoc-core
//!
//! Converts event-schedule XML ("agendas") into styled DOCX documents.
//!
//! An agenda nests main events, sub-events and activities. Each field of
//! each entity becomes one paragraph, except time and place, which share a
//! line as `10:00 · Hall A`. A [`FieldConfig`] decides which style every
//! field gets; fields it does not mention use [`DEFAULT_STYLE_NAME`].
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use agendoc_core::{ConfigStore, Converter};
//!
//! let config = ConfigStore::locate().load();
//! let report = Converter::new(config).convert(
//!     Path::new("agenda.xml"),
//!     Path::new("out"),
//!     "agenda.docx",
//! )?;
//! println!("{} paragraphs", report.stats.paragraphs);
//! # Ok::<(), agendoc_core::ConvertError>(())
//! ```

pub mod config;
pub mod convert;
pub mod error;
pub mod finalize;
pub mod render;
pub mod resolver;
pub mod sanitize;
pub mod schema;
pub mod walker;

pub use config::{ConfigStore, FieldConfig, FieldStyle, StyleKind, CONFIG_FILE_NAME};
pub use convert::{AgendaDocument, ConversionReport, Converter};
pub use error::{ConvertError, Result};
pub use finalize::{finalize, normalize_defaults};
pub use render::{render_combined, render_field, COMBINED_SEPARATOR};
pub use resolver::{ensure_registered, resolve, resolve_any, RenderContext, ResolvedStyle};
pub use sanitize::{sanitize, validate, validate_str, SanitizedCopy};
pub use schema::{EntityKind, EventNode};
pub use walker::{walk, ProcessedFields, TreeWalker, WalkStats};

/// Paragraph style every document ends up with, and the fallback for
/// unmapped fields
pub const DEFAULT_STYLE_NAME: &str = "Agenda-General-Parrafo";

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
