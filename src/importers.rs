//! Spreadsheet import: workbook reading and energy record extraction

pub mod energy_extractor;
pub mod error;
pub mod workbook_reader;

// Re-export commonly used items
pub use energy_extractor::{EnergyExtractor, ExtractorConfig};
pub use error::ExtractError;
pub use workbook_reader::read_workbook;
