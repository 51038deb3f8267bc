use chrono_tz::Tz;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

use crate::services::report_service::DEFAULT_DISPLAY_TIMEZONE;
use crate::services::InvalidDatePolicy;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown timezone in {var}: {value}")]
    Timezone { var: &'static str, value: String },

    #[error("Invalid value in {var}: {msg}")]
    Invalid { var: &'static str, msg: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub records_path: PathBuf,
    pub display_timezone: Tz,
    pub invalid_date_policy: InvalidDatePolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            records_path: env::var("RECORDS_PATH")
                .unwrap_or_else(|_| "energy-report.json".to_string())
                .into(),
            display_timezone: match env::var("DISPLAY_TIMEZONE") {
                Ok(value) => parse_timezone("DISPLAY_TIMEZONE", &value)?,
                Err(_) => DEFAULT_DISPLAY_TIMEZONE,
            },
            invalid_date_policy: match env::var("INVALID_DATE_POLICY") {
                Ok(value) => value.parse::<InvalidDatePolicy>().map_err(|msg| ConfigError::Invalid {
                    var: "INVALID_DATE_POLICY",
                    msg,
                })?,
                Err(_) => InvalidDatePolicy::default(),
            },
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// Parse an IANA zone name such as `Europe/Vienna`
pub fn parse_timezone(var: &'static str, value: &str) -> Result<Tz, ConfigError> {
    value
        .trim()
        .parse::<Tz>()
        .map_err(|_| ConfigError::Timezone {
            var,
            value: value.to_string(),
        })
}
