//! Background conversion
//!
//! A conversion runs on its own thread and reports progress over a channel,
//! so the front end stays responsive while a large agenda is processed.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use agendoc_core::{ConversionReport, ConvertError, Converter};
use anyhow::{anyhow, Context, Result};
use tracing::debug;

/// Progress reported by a conversion worker
#[derive(Debug)]
pub enum Status {
    Started { input: PathBuf },
    Finished(ConversionReport),
    Failed(ConvertError),
}

/// What to convert and where to put it
#[derive(Debug, Clone)]
pub struct ConversionJob {
    pub input: PathBuf,
    pub output_folder: PathBuf,
    pub file_name: String,
}

/// Handle to a running conversion
pub struct Worker {
    handle: JoinHandle<()>,
    status: Receiver<Status>,
}

impl Worker {
    /// Start converting `job` on a new thread
    pub fn spawn(converter: Converter, job: ConversionJob) -> Result<Self> {
        let (tx, rx) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("agendoc-convert".to_string())
            .spawn(move || {
                let _ = tx.send(Status::Started {
                    input: job.input.clone(),
                });
                let status = match converter.convert(&job.input, &job.output_folder, &job.file_name)
                {
                    Ok(report) => Status::Finished(report),
                    Err(e) => Status::Failed(e),
                };
                // Nobody listening any more is not an error for the worker
                let _ = tx.send(status);
            })
            .context("Failed to start conversion thread")?;

        Ok(Self { handle, status: rx })
    }

    /// Block until the conversion ends, passing every status to `on_status`
    ///
    /// A panic on the worker thread is reported as an error.
    pub fn wait<F>(self, mut on_status: F) -> Result<ConversionReport>
    where
        F: FnMut(&Status),
    {
        let mut outcome = None;
        for status in self.status.iter() {
            on_status(&status);
            match status {
                Status::Started { .. } => {}
                Status::Finished(report) => outcome = Some(Ok(report)),
                Status::Failed(e) => outcome = Some(Err(e)),
            }
        }

        if self.handle.join().is_err() {
            return Err(anyhow!("Conversion worker panicked"));
        }
        debug!("Conversion worker joined");

        match outcome {
            Some(Ok(report)) => Ok(report),
            Some(Err(e)) => Err(anyhow::Error::new(e).context("Conversion failed")),
            None => Err(anyhow!("Conversion worker exited without a result")),
        }
    }
}
