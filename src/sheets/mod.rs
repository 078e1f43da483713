//! External pricing spreadsheet.
//!
//! The spreadsheet exposes three tabs: `settings` (key/value tariffs),
//! `destinos` (origin, destination, km) and `vehiculos` (category, estimated
//! value). This module fetches them as raw grids, either from the Google
//! Sheets API or from a local JSON snapshot, and parses them into typed
//! pricing tables.

mod client;
mod error;
mod parse;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::Config;

pub use client::{SheetsClient, SheetsConfig, DESTINOS_RANGE, SETTINGS_RANGE, VEHICULOS_RANGE};
pub use error::SheetsError;
pub use parse::{parse_amount, parse_sheet_values};

/// Raw cell grids of the three pricing tabs.
///
/// Also the body of `GET /api/sheets` and the format of snapshot files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetValues {
    #[serde(default)]
    pub settings: Vec<Vec<String>>,
    #[serde(default)]
    pub destinos: Vec<Vec<String>>,
    #[serde(default)]
    pub vehiculos: Vec<Vec<String>>,
}

impl SheetValues {
    /// Load a snapshot previously saved from `GET /api/sheets`.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SheetsError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

/// Where pricing tables come from.
#[derive(Debug, Clone)]
pub enum PricingSource {
    /// Live spreadsheet
    Remote(SheetsClient),
    /// Fixed grids loaded once (offline mode and tests)
    Snapshot(SheetValues),
}

impl PricingSource {
    /// Pick the source from configuration. A snapshot path wins over
    /// spreadsheet credentials.
    pub fn from_config(config: &Config) -> Result<Self, SheetsError> {
        if let Some(path) = &config.snapshot_path {
            let values = SheetValues::from_json_file(path)?;
            return Ok(PricingSource::Snapshot(values));
        }

        match (&config.sheets_api_key, &config.sheets_id) {
            (Some(api_key), Some(sheet_id)) => {
                let sheets_config = SheetsConfig::new(api_key, sheet_id)
                    .with_timeout(config.sheets_timeout_secs);
                Ok(PricingSource::Remote(SheetsClient::new(sheets_config)?))
            }
            _ => Err(SheetsError::NotConfigured(
                "set PRICING_SNAPSHOT_PATH or both GOOGLE_SHEETS_ID and TRASLADO_DE_MOTOS_API_KEY"
                    .to_string(),
            )),
        }
    }

    /// Fetch the current raw grids.
    pub async fn fetch(&self) -> Result<SheetValues, SheetsError> {
        match self {
            PricingSource::Remote(client) => client.fetch_all().await,
            PricingSource::Snapshot(values) => Ok(values.clone()),
        }
    }

    /// Short description for logs.
    pub fn describe(&self) -> String {
        match self {
            PricingSource::Remote(client) => format!("Google Sheets {}", client.spreadsheet_id()),
            PricingSource::Snapshot(_) => "local snapshot".to_string(),
        }
    }
}
