use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use crate::models::{DailyAggregate, EnergyRecord};

pub const DEFAULT_DISPLAY_TIMEZONE: Tz = chrono_tz::Europe::Vienna;

/// Day label format, e.g. "Jan 19, 2025"
pub const DAY_LABEL_FORMAT: &str = "%b %d, %Y";

/// Bucket label for records without a parseable date
pub const INVALID_DATE_LABEL: &str = "Invalid Date";

/// What daily aggregation does with records whose date was kept raw
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InvalidDatePolicy {
    #[default]
    Drop,
    /// Collect them under [`INVALID_DATE_LABEL`], after all dated days
    Sentinel,
}

impl FromStr for InvalidDatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drop" => Ok(Self::Drop),
            "sentinel" => Ok(Self::Sentinel),
            other => Err(format!(
                "unknown invalid date policy '{other}' (expected 'drop' or 'sentinel')"
            )),
        }
    }
}

// Pagination and sorting for the table view (used by API)
#[derive(Debug, Clone, Deserialize)]
pub struct RecordQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    pub sort_by: Option<SortField>,
    #[serde(default)]
    pub order: SortOrder,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    50
}

impl Default for RecordQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
            sort_by: None,
            order: SortOrder::default(),
        }
    }
}

impl RecordQuery {
    pub fn page(&self) -> u32 {
        self.page.max(1)
    }

    pub fn offset(&self) -> usize {
        ((self.page() - 1) as usize) * self.limit()
    }

    pub fn limit(&self) -> usize {
        self.page_size.clamp(1, 100) as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Date,
    Consumption,
    Generation,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordListResponse {
    pub total_records: usize,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub records: Vec<EnergyRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordCountResponse {
    pub count: usize,
}

/// Read-only views over a loaded record set
#[derive(Clone)]
pub struct ReportService {
    records: Arc<Vec<EnergyRecord>>,
    display_timezone: Tz,
    invalid_date_policy: InvalidDatePolicy,
}

impl ReportService {
    pub fn new(records: Vec<EnergyRecord>) -> Self {
        Self {
            records: Arc::new(records),
            display_timezone: DEFAULT_DISPLAY_TIMEZONE,
            invalid_date_policy: InvalidDatePolicy::default(),
        }
    }

    pub fn with_display_timezone(mut self, timezone: Tz) -> Self {
        self.display_timezone = timezone;
        self
    }

    pub fn with_invalid_date_policy(mut self, policy: InvalidDatePolicy) -> Self {
        self.invalid_date_policy = policy;
        self
    }

    pub fn records(&self) -> &[EnergyRecord] {
        &self.records
    }

    pub fn record_count(&self) -> RecordCountResponse {
        RecordCountResponse {
            count: self.records.len(),
        }
    }

    pub fn daily_consumption(&self) -> Vec<DailyAggregate> {
        daily_consumption(
            &self.records,
            self.display_timezone,
            self.invalid_date_policy,
        )
    }

    /// Get one page of records, optionally sorted
    pub fn get_records_page(&self, query: &RecordQuery) -> RecordListResponse {
        let mut rows: Vec<&EnergyRecord> = self.records.iter().collect();
        if let Some(field) = query.sort_by {
            sort_records(&mut rows, field, query.order);
        }

        let total_records = rows.len();
        let limit = query.limit();
        let records = rows
            .into_iter()
            .skip(query.offset())
            .take(limit)
            .cloned()
            .collect();

        // Calculate pagination metadata
        let total_pages = total_records.div_ceil(limit) as u32;
        let page = query.page();

        RecordListResponse {
            total_records,
            page,
            page_size: limit as u32,
            total_pages,
            has_next_page: page < total_pages,
            has_prev_page: page > 1,
            records,
        }
    }
}

/// Sum consumption per calendar day in `display_timezone`
///
/// Days come out in ascending date order. Records with a non-numeric
/// consumption still open their day's bucket but add nothing to it.
pub fn daily_consumption(
    records: &[EnergyRecord],
    display_timezone: Tz,
    policy: InvalidDatePolicy,
) -> Vec<DailyAggregate> {
    let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    let mut invalid_total: Option<f64> = None;

    for record in records {
        let amount = record.consumption.value().unwrap_or(0.0);

        match record.date.instant() {
            Some(instant) => {
                let day = instant.with_timezone(&display_timezone).date_naive();
                *by_day.entry(day).or_insert(0.0) += amount;
            }
            None if policy == InvalidDatePolicy::Sentinel => {
                *invalid_total.get_or_insert(0.0) += amount;
            }
            None => {}
        }
    }

    let mut aggregates: Vec<DailyAggregate> = by_day
        .into_iter()
        .map(|(day, total)| DailyAggregate {
            label: day_label(day),
            total_consumption: total,
        })
        .collect();

    if let Some(total) = invalid_total {
        aggregates.push(DailyAggregate {
            label: INVALID_DATE_LABEL.to_string(),
            total_consumption: total,
        });
    }

    aggregates
}

pub fn day_label(day: NaiveDate) -> String {
    day.format(DAY_LABEL_FORMAT).to_string()
}

// Missing values sort last in both directions; ties keep source order.
fn sort_records(rows: &mut [&EnergyRecord], field: SortField, order: SortOrder) {
    let key = |r: &EnergyRecord| -> Option<f64> {
        match field {
            SortField::Date => r.date.instant().map(|dt| dt.timestamp_millis() as f64),
            SortField::Consumption => r.consumption.value(),
            SortField::Generation => r.generation.value(),
        }
    };

    rows.sort_by(|a, b| match (key(*a), key(*b)) {
        (Some(x), Some(y)) => match order {
            SortOrder::Asc => x.total_cmp(&y),
            SortOrder::Desc => y.total_cmp(&x),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
