//! Energy usage extraction
//!
//! Turns the grid of an energy export sheet into [`EnergyRecord`]s.
//!
//! # Expected Sheet Structure:
//! ```text
//! Row 1-4: Metadata / header rows (skipped, never inspected)
//!          counted from the first used row of the sheet
//! Row 5+:  dd.MM.yyyy HH:mm:ss | consumption | generation
//! ```
use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, Offset, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, info, instrument, warn};

use crate::importers::error::ExtractError;
use crate::models::{CellValue, EnergyRecord, Measurement, RecordDate, Workbook};

/// Number of metadata/header rows preceding the data region
pub const DEFAULT_HEADER_ROWS: usize = 4;

pub const DEFAULT_SHEET_NAME: &str = "Energiedaten";

pub const DEFAULT_SOURCE_TIMEZONE: Tz = chrono_tz::Europe::Vienna;

/// chrono equivalent of `dd.MM.yyyy HH:mm:ss`
pub const SOURCE_DATE_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// Positional column schema of the data region
pub mod columns {
    pub const DATE: usize = 0;
    pub const CONSUMPTION: usize = 1;
    pub const GENERATION: usize = 2;
}

fn source_date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[0-9]{2}\.[0-9]{2}\.[0-9]{4} [0-9]{2}:[0-9]{2}:[0-9]{2}$")
            .expect("source date pattern is valid")
    })
}

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub sheet_name: String,
    pub source_timezone: Tz,
    pub header_rows: usize,
}

impl ExtractorConfig {
    pub fn new(sheet_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            source_timezone: DEFAULT_SOURCE_TIMEZONE,
            header_rows: DEFAULT_HEADER_ROWS,
        }
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.source_timezone = timezone;
        self
    }

    pub fn with_header_rows(mut self, header_rows: usize) -> Self {
        self.header_rows = header_rows;
        self
    }

    /// Smallest grid that still holds one data row
    pub fn min_rows(&self) -> usize {
        self.header_rows + 1
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SHEET_NAME)
    }
}

/// Extractor for energy export sheets
#[derive(Debug, Clone, Default)]
pub struct EnergyExtractor {
    config: ExtractorConfig,
}

impl EnergyExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract one record per data row of the configured sheet
    ///
    /// Fails only on structural problems: a missing sheet or a grid without
    /// any data row. Malformed cells never abort the batch, they are kept
    /// as passthrough values.
    #[instrument(skip(self, workbook), fields(sheet = %self.config.sheet_name))]
    pub fn extract(&self, workbook: &Workbook) -> Result<Vec<EnergyRecord>, ExtractError> {
        let sheet_name = &self.config.sheet_name;

        let grid = workbook
            .sheet(sheet_name)
            .ok_or_else(|| ExtractError::SheetNotFound(sheet_name.clone()))?;

        if grid.len() < self.config.min_rows() {
            return Err(ExtractError::InsufficientData {
                sheet: sheet_name.clone(),
                rows: grid.len(),
                required: self.config.min_rows(),
            });
        }

        let data_rows = &grid[self.config.header_rows..];
        debug!(
            "Skipped {} header rows, {} data rows remain",
            self.config.header_rows,
            data_rows.len()
        );

        let records: Vec<EnergyRecord> = data_rows.iter().map(|row| self.parse_row(row)).collect();

        let raw_dates = records
            .iter()
            .filter(|r| matches!(r.date, RecordDate::Raw(_)))
            .count();
        let raw_quantities = records
            .iter()
            .flat_map(|r| [&r.consumption, &r.generation])
            .filter(|m| matches!(m, Measurement::Raw(_)))
            .count();

        if raw_dates > 0 {
            warn!(
                "{} of {} rows have a date that was kept as-is",
                raw_dates,
                records.len()
            );
        }
        if raw_quantities > 0 {
            warn!("{} quantity cells were not numeric", raw_quantities);
        }

        info!(
            "Extracted {} records from sheet {}",
            records.len(),
            sheet_name
        );
        Ok(records)
    }

    /// Apply the positional column schema to one data row
    ///
    /// Extra columns are ignored; missing ones read as empty cells.
    pub fn parse_row(&self, row: &[CellValue]) -> EnergyRecord {
        let cell = |col: usize| row.get(col).cloned().unwrap_or(CellValue::Empty);

        EnergyRecord {
            date: self.parse_date(cell(columns::DATE)),
            consumption: Measurement::from_cell(cell(columns::CONSUMPTION)),
            generation: Measurement::from_cell(cell(columns::GENERATION)),
        }
    }

    /// Parse a date cell as wall-clock time in the source timezone
    pub fn parse_date(&self, cell: CellValue) -> RecordDate {
        let parsed = cell
            .as_text()
            .and_then(|text| parse_local_datetime(text, self.config.source_timezone));

        match parsed {
            Some(instant) => RecordDate::Instant(instant),
            None => RecordDate::Raw(cell),
        }
    }
}

/// Parse `dd.MM.yyyy HH:mm:ss` text in `timezone` and convert it to UTC
///
/// Returns `None` unless the text has exactly that shape and names a real
/// calendar date and time.
///
/// Ambiguous wall-clock times (clocks turned back) resolve to the earlier
/// instant. Times inside a forward gap are read with the offset in force
/// before the transition, which moves them forward by the gap.
pub fn parse_local_datetime(text: &str, timezone: Tz) -> Option<DateTime<Utc>> {
    if !source_date_regex().is_match(text) {
        return None;
    }

    let naive = NaiveDateTime::parse_from_str(text, SOURCE_DATE_FORMAT).ok()?;
    // chrono reads second 60 as a leap second; it has no ISO instant
    if naive.nanosecond() >= 1_000_000_000 {
        return None;
    }

    match timezone.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(a, b) => Some(a.min(b).with_timezone(&Utc)),
        LocalResult::None => {
            let before_gap = naive.checked_sub_signed(Duration::hours(24))?;
            let offset = timezone.offset_from_utc_datetime(&before_gap).fix();
            let utc = naive.checked_sub_signed(Duration::seconds(i64::from(
                offset.local_minus_utc(),
            )))?;
            Some(Utc.from_utc_datetime(&utc))
        }
    }
}
