use std::path::Path;
use thiserror::Error;
use tracing::{info, instrument};

use crate::importers::{read_workbook, EnergyExtractor, ExtractError, ExtractorConfig};
use crate::sinks::{RecordSink, SinkError};

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Read a workbook, extract its energy records and hand them to `sink`
///
/// The sink is only called after extraction succeeded, so a missing sheet
/// or a too-short grid leaves the destination untouched. Returns the number
/// of records written.
#[instrument(skip(sink, config), fields(sheet = %config.sheet_name))]
pub fn convert(
    workbook_path: &Path,
    sink: &mut dyn RecordSink,
    config: ExtractorConfig,
) -> Result<usize, ConvertError> {
    let workbook = read_workbook(workbook_path)?;
    let records = EnergyExtractor::new(config).extract(&workbook)?;

    sink.write_records(&records)?;

    info!(
        "Converted {} records from {}",
        records.len(),
        workbook_path.display()
    );
    Ok(records.len())
}
