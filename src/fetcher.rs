use std::path::Path;
use tracing::{debug, error, info, instrument};

use crate::fetch_error::FetchError;
use crate::models::EnergyRecord;

/// Client for an energy report served as a static JSON file
///
/// One request per call: no retries and no partial results.
#[derive(Clone)]
pub struct ReportFetcher {
    client: reqwest::Client,
    url: String,
}

impl ReportFetcher {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn fetch_records(&self) -> Result<Vec<EnergyRecord>, FetchError> {
        debug!("Sending HTTP request for energy report");
        let response = self.client.get(&self.url).send().await?;
        debug!("Received HTTP response with status: {}", response.status());

        if !response.status().is_success() {
            return Err(FetchError::Status {
                status: response.status().as_u16(),
                url: self.url.clone(),
            });
        }

        let body = response.text().await?;
        debug!("Retrieved JSON content, size: {} bytes", body.len());

        let records = parse_records(&body)?;
        info!("Fetched {} energy records", records.len());
        Ok(records)
    }

    /// Fetch records, treating any failure as "no data"
    pub async fn fetch_or_empty(&self) -> Vec<EnergyRecord> {
        match self.fetch_records().await {
            Ok(records) => records,
            Err(e) => {
                error!("Failed to fetch energy report from {}: {}", self.url, e);
                Vec::new()
            }
        }
    }
}

/// Rebuild records from the JSON array written by the converter
pub fn parse_records(json: &str) -> Result<Vec<EnergyRecord>, FetchError> {
    Ok(serde_json::from_str(json)?)
}

/// Load a JSON report from disk
pub fn read_records_file(path: impl AsRef<Path>) -> Result<Vec<EnergyRecord>, FetchError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| FetchError::Read {
        path: path.display().to_string(),
        source,
    })?;

    let records = parse_records(&json)?;
    debug!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}
