use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::models::EnergyRecord;
use crate::sinks::{RecordSink, SinkError};

/// Writes records as a pretty-printed JSON array
///
/// Output goes to a uniquely named temp file in the target directory and is
/// persisted over `path` only once fully written, so a failed run never
/// leaves a truncated file at `path`.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn target_dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }

    fn write_error(&self, source: std::io::Error) -> SinkError {
        SinkError::Write {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl RecordSink for JsonFileSink {
    fn write_records(&mut self, records: &[EnergyRecord]) -> Result<(), SinkError> {
        let json = serde_json::to_vec_pretty(records)?;
        debug!("Serialized {} records ({} bytes)", records.len(), json.len());

        // Dropped (and removed) on any early return
        let mut temp_file =
            NamedTempFile::new_in(self.target_dir()).map_err(|e| self.write_error(e))?;
        temp_file
            .write_all(&json)
            .map_err(|e| self.write_error(e))?;
        temp_file.flush().map_err(|e| self.write_error(e))?;
        temp_file
            .persist(&self.path)
            .map_err(|e| self.write_error(e.error))?;

        info!("JSON saved to {}", self.path.display());
        Ok(())
    }
}
