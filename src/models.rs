use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::utils::parse_locale_decimal;

/// A single spreadsheet entry as handed over by the workbook reader
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Empty,
}

impl CellValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Text(s) => serializer.serialize_str(s),
            CellValue::Number(n) => serialize_number(*n, serializer),
            CellValue::Empty => serializer.serialize_none(),
        }
    }
}

/// One spreadsheet row, cells in column order
pub type RawRow = Vec<CellValue>;

/// All rows of one sheet, in file order
pub type Grid = Vec<RawRow>;

/// Sheet name -> grid mapping, in workbook sheet order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<(String, Grid)>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet, replacing any existing sheet with the same name
    pub fn insert_sheet(&mut self, name: impl Into<String>, grid: Grid) {
        let name = name.into();
        match self.sheets.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = grid,
            None => self.sheets.push((name, grid)),
        }
    }

    pub fn with_sheet(mut self, name: impl Into<String>, grid: Grid) -> Self {
        self.insert_sheet(name, grid);
        self
    }

    pub fn sheet(&self, name: &str) -> Option<&Grid> {
        self.sheets.iter().find(|(n, _)| n == name).map(|(_, g)| g)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|(n, _)| n.as_str()).collect()
    }
}

/// Date field of an [`EnergyRecord`]
///
/// `Raw` keeps the source cell untouched when it is not a date in the
/// expected `dd.MM.yyyy HH:mm:ss` shape.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordDate {
    Instant(DateTime<Utc>),
    Raw(CellValue),
}

impl RecordDate {
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            RecordDate::Instant(dt) => Some(*dt),
            RecordDate::Raw(_) => None,
        }
    }

    /// Rebuild from the JSON wire form (ISO-8601 text or a passthrough value)
    fn from_wire(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => match DateTime::parse_from_rfc3339(&s) {
                Ok(dt) => RecordDate::Instant(dt.with_timezone(&Utc)),
                Err(_) => RecordDate::Raw(CellValue::Text(s)),
            },
            other => RecordDate::Raw(cell_from_wire(other)),
        }
    }
}

impl Serialize for RecordDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RecordDate::Instant(dt) => {
                serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            RecordDate::Raw(cell) => cell.serialize(serializer),
        }
    }
}

/// Consumption or generation quantity of an [`EnergyRecord`]
///
/// `Raw` carries the original cell when it held no number (unparsable text,
/// or an empty/missing cell).
#[derive(Debug, Clone, PartialEq)]
pub enum Measurement {
    Value(f64),
    Raw(CellValue),
}

impl Measurement {
    pub fn value(&self) -> Option<f64> {
        match self {
            Measurement::Value(v) => Some(*v),
            Measurement::Raw(_) => None,
        }
    }

    /// Coerce a spreadsheet cell; text accepts a comma decimal mark
    pub fn from_cell(cell: CellValue) -> Self {
        match cell {
            CellValue::Number(n) => Measurement::Value(n),
            CellValue::Text(s) => match parse_locale_decimal(&s) {
                Some(v) => Measurement::Value(v),
                None => Measurement::Raw(CellValue::Text(s)),
            },
            CellValue::Empty => Measurement::Raw(CellValue::Empty),
        }
    }

    fn from_wire(value: serde_json::Value) -> Self {
        Measurement::from_cell(cell_from_wire(value))
    }
}

impl Serialize for Measurement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Measurement::Value(v) => serialize_number(*v, serializer),
            Measurement::Raw(_) => serializer.serialize_none(),
        }
    }
}

/// Normalized energy usage row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireRecord")]
pub struct EnergyRecord {
    pub date: RecordDate,
    pub consumption: Measurement,
    pub generation: Measurement,
}

// Records arrive over HTTP as plain JSON objects; every field is re-parsed.
#[derive(Deserialize)]
struct WireRecord {
    #[serde(default)]
    date: serde_json::Value,
    #[serde(default)]
    consumption: serde_json::Value,
    #[serde(default)]
    generation: serde_json::Value,
}

impl From<WireRecord> for EnergyRecord {
    fn from(wire: WireRecord) -> Self {
        Self {
            date: RecordDate::from_wire(wire.date),
            consumption: Measurement::from_wire(wire.consumption),
            generation: Measurement::from_wire(wire.generation),
        }
    }
}

/// Consumption total for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAggregate {
    pub label: String,
    pub total_consumption: f64,
}

fn cell_from_wire(value: serde_json::Value) -> CellValue {
    match value {
        serde_json::Value::Null => CellValue::Empty,
        serde_json::Value::String(s) => CellValue::Text(s),
        serde_json::Value::Number(n) => n.as_f64().map_or(CellValue::Empty, CellValue::Number),
        other => CellValue::Text(other.to_string()),
    }
}

// Whole numbers are written without a fractional part ("3", not "3.0");
// NaN and infinities have no JSON form and become null.
fn serialize_number<S: Serializer>(value: f64, serializer: S) -> Result<S::Ok, S::Error> {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

    if !value.is_finite() {
        serializer.serialize_none()
    } else if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
        serializer.serialize_i64(value as i64)
    } else {
        serializer.serialize_f64(value)
    }
}
