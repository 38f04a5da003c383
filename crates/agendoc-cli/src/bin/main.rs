//! agendoc CLI binary entry point
//!
//! This is a thin wrapper around the library's `run_cli()` that records
//! fatal errors and panics in the crash log.

use std::process::ExitCode;

use agendoc_cli::{crash, run_cli};

fn main() -> ExitCode {
    crash::install_panic_hook();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            crash::record(&format!("Unhandled error: {:#}", e));
            ExitCode::FAILURE
        }
    }
}
