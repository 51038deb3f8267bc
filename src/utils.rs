//! Shared parsing helpers for spreadsheet cell text

use regex::Regex;
use std::sync::OnceLock;

fn decimal_prefix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[+-]?(?:Infinity|(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?)")
            .expect("decimal prefix pattern is valid")
    })
}

/// Parse the longest leading decimal number in `value`
///
/// Leading whitespace is skipped and anything after the numeric prefix is
/// ignored, so unit suffixes like `"12.5 kWh"` still yield a value. Returns
/// `None` when the text does not start with a number.
///
/// # Examples
///
/// ```
/// use energy_report::utils::parse_decimal_prefix;
///
/// assert_eq!(parse_decimal_prefix("12.5"), Some(12.5));
/// assert_eq!(parse_decimal_prefix("  -3e2 kWh"), Some(-300.0));
/// assert_eq!(parse_decimal_prefix(".5"), Some(0.5));
/// assert_eq!(parse_decimal_prefix("kWh 12"), None);
/// ```
pub fn parse_decimal_prefix(value: &str) -> Option<f64> {
    let trimmed = value.trim_start();
    let prefix = decimal_prefix_regex().find(trimmed)?.as_str();

    match prefix.trim_start_matches(|c: char| c == '+' || c == '-') {
        "Infinity" => Some(if prefix.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        }),
        _ => prefix.parse::<f64>().ok(),
    }
}

/// Parse a quantity written with either `.` or `,` as decimal mark
///
/// Only the first comma is replaced, so grouped values like `"1.234,5"`
/// keep their leading group (`1.234`).
///
/// ```
/// use energy_report::utils::parse_locale_decimal;
///
/// assert_eq!(parse_locale_decimal("12,5"), Some(12.5));
/// assert_eq!(parse_locale_decimal("3"), Some(3.0));
/// assert_eq!(parse_locale_decimal("n/a"), None);
/// ```
pub fn parse_locale_decimal(value: &str) -> Option<f64> {
    parse_decimal_prefix(&value.replacen(',', ".", 1))
}
