//! Destinations for extracted records

pub mod json_file;

pub use json_file::JsonFileSink;

use thiserror::Error;

use crate::models::EnergyRecord;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Failed to serialize records: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Receives the full record set once extraction has succeeded
pub trait RecordSink {
    fn write_records(&mut self, records: &[EnergyRecord]) -> Result<(), SinkError>;
}

/// Keeps records in memory, mainly for library callers and tests
#[derive(Debug, Default)]
pub struct MemorySink {
    pub records: Vec<EnergyRecord>,
}

impl RecordSink for MemorySink {
    fn write_records(&mut self, records: &[EnergyRecord]) -> Result<(), SinkError> {
        self.records = records.to_vec();
        Ok(())
    }
}
