//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use agendoc_core::resolver::{resolve_any, RenderContext};
use agendoc_core::schema::{EntityKind, Slot};
use agendoc_core::{
    ConfigStore, ConversionReport, Converter, FieldConfig, SanitizedCopy, StyleKind,
};

use crate::worker::{ConversionJob, Status, Worker};

/// Extension of the generated documents
pub const DOCX_EXTENSION: &str = ".docx";

#[derive(Parser)]
#[command(name = "agendoc")]
#[command(author, version, about = "Event-schedule XML to styled DOCX", long_about = None)]
struct Cli {
    /// Log debug details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an agenda XML file to DOCX
    Convert {
        /// Input agenda XML file
        input: PathBuf,

        /// Output folder (must exist)
        #[arg(short, long)]
        output: PathBuf,

        /// Output file name; ".docx" is appended when missing
        #[arg(short, long)]
        name: Option<String>,

        /// Style configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Check that an agenda XML file is well-formed after sanitization
    Check {
        /// Input agenda XML file
        input: PathBuf,
    },

    /// List the recognized fields and the style each one resolves to
    Fields {
        /// Style configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Write a starter style configuration
    InitConfig {
        /// Style configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Convert {
            input,
            output,
            name,
            config,
        } => {
            convert_command(&input, &output, name.as_deref(), config.as_deref())?;
        }
        Commands::Check { input } => {
            if !check_command(&input)? {
                anyhow::bail!("{} is not well-formed XML", input.display());
            }
        }
        Commands::Fields { config } => {
            fields_command(config.as_deref());
        }
        Commands::InitConfig { config, force } => {
            init_config_command(config.as_deref(), force)?;
        }
    }

    Ok(())
}

/// Log to stderr; `RUST_LOG` directives are honoured on top of the default
/// level
fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    // A subscriber may already be set when running inside tests
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn config_store(path: Option<&Path>) -> ConfigStore {
    match path {
        Some(path) => ConfigStore::new(path),
        None => ConfigStore::locate(),
    }
}

/// Output file name for a conversion: the given name, or the input's stem,
/// with ".docx" appended when it does not already end in it
pub fn output_file_name(name: Option<&str>, input: &Path) -> String {
    let base = match name {
        Some(name) => name.to_string(),
        None => input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "agenda".to_string()),
    };
    if base.to_ascii_lowercase().ends_with(DOCX_EXTENSION) {
        base
    } else {
        format!("{}{}", base, DOCX_EXTENSION)
    }
}

/// Execute the convert command
pub fn convert_command(
    input: &Path,
    output_folder: &Path,
    name: Option<&str>,
    config_path: Option<&Path>,
) -> Result<ConversionReport> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    if !output_folder.is_dir() {
        anyhow::bail!("Output folder not found: {}", output_folder.display());
    }
    if matches!(name, Some(n) if n.trim().is_empty()) {
        anyhow::bail!("Output file name is empty");
    }

    let store = config_store(config_path);
    let config = store.load();
    debug!(
        "Using {} field styles from {}",
        config.len(),
        store.path().display()
    );

    let job = ConversionJob {
        input: input.to_path_buf(),
        output_folder: output_folder.to_path_buf(),
        file_name: output_file_name(name, input),
    };

    let worker = Worker::spawn(Converter::new(config), job)?;
    let report = worker.wait(|status| match status {
        Status::Started { input } => println!("Processing {}...", input.display()),
        Status::Finished(report) => println!("Completed: {}", report.output_path.display()),
        Status::Failed(e) if e.is_input_rejected() => {
            println!("Error: the XML file is not well-formed after sanitization")
        }
        Status::Failed(e) => println!("Error: {}", e),
    })?;

    println!(
        "  {} main events, {} sub-events, {} activities, {} paragraphs",
        report.stats.main_events,
        report.stats.sub_events,
        report.stats.activities,
        report.stats.paragraphs
    );
    Ok(report)
}

/// Execute the check command; returns whether the file is well-formed
pub fn check_command(input: &Path) -> Result<bool> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let scratch = SanitizedCopy::create(input)
        .with_context(|| format!("Failed to sanitize {}", input.display()))?;
    let valid = scratch.validate();

    if valid {
        println!("OK: {} is well-formed", input.display());
    } else {
        println!(
            "FAIL: {} is not well-formed after sanitization",
            input.display()
        );
    }
    Ok(valid)
}

/// A recognized field and the style it resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRow {
    pub entity: EntityKind,
    pub field: &'static str,
    pub style: String,
    pub style_type: StyleKind,
    /// Whether the configuration has an entry for any spelling of this field
    pub configured: bool,
}

/// Effective style of every recognized field, in schema order
pub fn field_rows(config: &FieldConfig) -> Vec<FieldRow> {
    let mut rows = Vec::new();
    for kind in [EntityKind::MainEvent, EntityKind::SubEvent, EntityKind::Activity] {
        for slot in kind.schema().slots {
            let fields = match *slot {
                Slot::Single(field) => vec![(field, RenderContext::Standalone)],
                Slot::TimePlace { time, place } => vec![
                    (time, RenderContext::CombinedHalf),
                    (place, RenderContext::CombinedHalf),
                ],
            };
            for (field, context) in fields {
                // Every spelling of a field renders with the same style
                let resolved = resolve_any(field.names, config, context);
                let configured = field.names.iter().any(|name| config.get(name).is_some());
                for &name in field.names {
                    rows.push(FieldRow {
                        entity: kind,
                        field: name,
                        style: resolved.name.clone(),
                        style_type: resolved.style_type,
                        configured,
                    });
                }
            }
        }
    }
    rows
}

/// Execute the fields command
pub fn fields_command(config_path: Option<&Path>) -> Vec<FieldRow> {
    let store = config_store(config_path);
    let config = store.load();
    println!("Configuration: {}", store.path().display());
    println!();

    let rows = field_rows(&config);
    let width = rows.iter().map(|r| r.field.len()).max().unwrap_or(0);
    for row in &rows {
        let kind = match row.style_type {
            StyleKind::Paragraph => "parrafo",
            StyleKind::Character => "caracter",
        };
        let marker = if row.configured { "" } else { "  (default)" };
        println!(
            "{:width$}  {:8}  {}{}",
            row.field,
            kind,
            row.style,
            marker,
            width = width
        );
    }
    rows
}

/// Execute the init-config command; returns the path written
pub fn init_config_command(config_path: Option<&Path>, force: bool) -> Result<PathBuf> {
    let store = config_store(config_path);
    if store.path().exists() && !force {
        anyhow::bail!(
            "Configuration already exists: {} (use --force to overwrite)",
            store.path().display()
        );
    }

    if !store.save(&FieldConfig::with_field_defaults()) {
        anyhow::bail!(
            "Failed to write configuration: {}",
            store.path().display()
        );
    }
    info!("Starter configuration written");
    println!("Configuration written to {}", store.path().display());
    Ok(store.path().to_path_buf())
}
