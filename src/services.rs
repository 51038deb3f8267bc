pub mod report_service;

pub use report_service::{InvalidDatePolicy, ReportService};
