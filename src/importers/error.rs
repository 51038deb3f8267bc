use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Failed to open workbook: {0}")]
    WorkbookOpen(String),

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error("Sheet {sheet} does not contain enough rows: found {rows}, need at least {required}")]
    InsufficientData {
        sheet: String,
        rows: usize,
        required: usize,
    },
}
