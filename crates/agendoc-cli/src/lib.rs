//! agendoc CLI - Command-line interface library
//!
//! This library provides the CLI functionality for agendoc:
//! - Convert: render an agenda XML file to a styled DOCX
//! - Check: verify an agenda file is well-formed after sanitization
//! - Fields / InitConfig: inspect and bootstrap the style configuration
//!
//! # Binary Usage
//!
//! ```bash
//! # Convert, writing out/programa.docx
//! agendoc convert agenda.xml --output out --name programa
//!
//! # Check an export before converting it
//! agendoc check agenda.xml
//!
//! # Write a starter configuration, then see what each field resolves to
//! agendoc init-config --config styles_config.json
//! agendoc fields --config styles_config.json
//! ```

pub mod app;
pub mod crash;
pub mod worker;

pub use app::{
    check_command, convert_command, field_rows, fields_command, init_config_command,
    output_file_name, run_cli, FieldRow,
};
pub use worker::{ConversionJob, Status, Worker};
