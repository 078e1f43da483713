//! Google Sheets values API client.
//!
//! Fetches the three pricing tabs as raw string grids. Cells are requested
//! unformatted so numbers arrive without locale separators or currency
//! symbols, while dates keep their displayed text.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use super::error::SheetsError;
use super::SheetValues;

/// Default base URL for the Sheets v4 API.
const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

pub const SETTINGS_RANGE: &str = "settings!A:Z";
pub const DESTINOS_RANGE: &str = "destinos!A:Z";
pub const VEHICULOS_RANGE: &str = "vehiculos!A:Z";

/// Configuration for the Sheets client.
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    /// API key with read access to the spreadsheet
    pub api_key: String,
    pub spreadsheet_id: String,
    /// Base URL for the API (defaults to production Google)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl SheetsConfig {
    pub fn new(api_key: impl Into<String>, spreadsheet_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            spreadsheet_id: spreadsheet_id.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Query string for every values request, API key included.
    fn query_params(&self) -> [(&'static str, &str); 3] {
        [
            ("key", self.api_key.as_str()),
            ("valueRenderOption", "UNFORMATTED_VALUE"),
            // Otherwise date cells arrive as day serial numbers
            ("dateTimeRenderOption", "FORMATTED_STRING"),
        ]
    }

    /// Values endpoint for one A1 range.
    fn range_url(&self, range: &str) -> String {
        format!(
            "{}/{}/values/{}",
            self.base_url.trim_end_matches('/'),
            self.spreadsheet_id,
            range
        )
    }
}

/// Body of `spreadsheets.values.get`. Empty ranges omit `values`.
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Sheets API client.
#[derive(Debug, Clone)]
pub struct SheetsClient {
    http: reqwest::Client,
    config: SheetsConfig,
}

impl SheetsClient {
    pub fn new(config: SheetsConfig) -> Result<Self, SheetsError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.config.spreadsheet_id
    }

    /// Fetch the settings, routes and vehicles tabs concurrently.
    pub async fn fetch_all(&self) -> Result<SheetValues, SheetsError> {
        let (settings, destinos, vehiculos) = tokio::try_join!(
            self.fetch_range(SETTINGS_RANGE),
            self.fetch_range(DESTINOS_RANGE),
            self.fetch_range(VEHICULOS_RANGE),
        )?;

        Ok(SheetValues {
            settings,
            destinos,
            vehiculos,
        })
    }

    async fn fetch_range(&self, range: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        let response = self
            .http
            .get(self.config.range_url(range))
            .query(&self.config.query_params())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SheetsError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let body: ValueRange = response.json().await?;
        tracing::debug!("Fetched {} row(s) from {}", body.values.len(), range);
        Ok(into_grid(body.values))
    }
}

fn cell_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn into_grid(rows: Vec<Vec<Value>>) -> Vec<Vec<String>> {
    rows.into_iter()
        .map(|row| row.into_iter().map(cell_to_string).collect())
        .collect()
}
