use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::importers::error::ExtractError;
use crate::models::{CellValue, Grid, RawRow, Workbook};

/// Read every sheet of a spreadsheet file into memory
///
/// The format (xlsx, xls, xlsb, ods) is picked from the file extension.
/// This is synchronous, async callers should use `spawn_blocking`.
///
/// Sheets that cannot be read (chart sheets, corrupt parts) are skipped
/// with a warning; asking the extractor for one then reports
/// [`ExtractError::SheetNotFound`].
pub fn read_workbook(path: impl AsRef<Path>) -> Result<Workbook, ExtractError> {
    let path = path.as_ref();
    info!("Opening workbook: {}", path.display());

    let mut sheets = match open_workbook_auto(path) {
        Ok(wb) => wb,
        Err(e) => return Err(ExtractError::WorkbookOpen(e.to_string())),
    };

    let sheet_names = sheets.sheet_names().to_owned();
    debug!("Found {} sheets: {:?}", sheet_names.len(), sheet_names);

    let mut workbook = Workbook::new();
    for sheet_name in sheet_names {
        match sheets.worksheet_range(&sheet_name) {
            Ok(range) => {
                let grid = grid_from_range(&range);
                debug!("Sheet '{}' has {} rows", sheet_name, grid.len());
                workbook.insert_sheet(sheet_name, grid);
            }
            Err(e) => {
                warn!("Failed to read sheet '{}', skipping: {}", sheet_name, e);
            }
        }
    }

    Ok(workbook)
}

/// Convert a calamine range into a grid
///
/// The grid starts at the first used cell of the sheet: leading empty rows
/// and columns are not part of it, so row 0 / column 0 of the grid is the
/// top-left corner of the used range. Blank rows inside the range are kept.
pub fn grid_from_range(range: &Range<Data>) -> Grid {
    range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect::<RawRow>())
        .collect()
}

/// Map a calamine cell onto the text/number/blank cell model
///
/// Excel date-times stay numeric (their serial value); only text cells take
/// part in date parsing.
pub fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::Error(_) | Data::Empty => CellValue::Empty,
    }
}
