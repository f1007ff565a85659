//! JSON-lines alert file sink.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use aegis_models::Alert;

use crate::error::AlertResult;

/// Appends one JSON object per line. Sink failures are logged by the caller
/// and never propagate into the main pipeline.
pub struct FileSink {
    file: File,
}

impl FileSink {
    pub fn open(path: &Path) -> AlertResult<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file })
    }

    pub fn write(&mut self, alert: &Alert) -> AlertResult<()> {
        let line = serde_json::to_string(alert)?;
        writeln!(self.file, "{line}")?;
        Ok(())
    }

    pub fn flush(&mut self) -> AlertResult<()> {
        self.file.flush()?;
        Ok(())
    }
}

impl From<std::io::Error> for crate::error::AlertError {
    fn from(err: std::io::Error) -> Self {
        crate::error::AlertError::SinkUnwritable(err.to_string())
    }
}
