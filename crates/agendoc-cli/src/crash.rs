//! Persistent crash log
//!
//! Errors that end the process, and panics on any thread, are appended to
//! `agendoc_log.txt` in the user's home directory so they survive a
//! terminal or launcher closing.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::panic;
use std::path::{Path, PathBuf};

/// File name of the crash log
pub const CRASH_LOG_NAME: &str = "agendoc_log.txt";

/// Location of the crash log: the home directory, or the temp directory
/// when no home is known
pub fn crash_log_path() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
        .join(CRASH_LOG_NAME)
}

/// Append one timestamped entry to the log at `path`
pub fn append_entry(path: &Path, message: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(
        file,
        "[{}] {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        message
    )
}

/// Record a fatal error in the crash log, ignoring failures to write it
pub fn record(message: &str) {
    let path = crash_log_path();
    if let Err(e) = append_entry(&path, message) {
        eprintln!("Could not write crash log {}: {}", path.display(), e);
    }
}

/// Log panics to the crash log before the default hook reports them
pub fn install_panic_hook() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let thread = std::thread::current();
        record(&format!(
            "Panic on thread '{}': {}",
            thread.name().unwrap_or("<unnamed>"),
            info
        ));
        default_hook(info);
    }));
}
