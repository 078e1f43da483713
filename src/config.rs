//! Environment configuration.
//!
//! Values come from the process environment, with `.env` loaded by `main`
//! through dotenvy.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// `BIND_ADDR`
    pub bind_addr: SocketAddr,
    /// `GOOGLE_SHEETS_ID`
    pub sheets_id: Option<String>,
    /// `TRASLADO_DE_MOTOS_API_KEY`
    pub sheets_api_key: Option<String>,
    /// `PRICING_SNAPSHOT_PATH`; takes precedence over the spreadsheet
    pub snapshot_path: Option<PathBuf>,
    /// `PRICING_REFRESH_SECS`
    pub refresh_interval: Duration,
    /// `PRICING_CACHE_TTL_SECS`
    pub cache_ttl: Duration,
    /// `QUOTE_CURRENCY`
    pub currency: String,
    /// `SHEETS_TIMEOUT_SECS`
    pub sheets_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            sheets_id: None,
            sheets_api_key: None,
            snapshot_path: None,
            refresh_interval: Duration::from_secs(10 * 60),
            cache_ttl: Duration::from_secs(30 * 60),
            currency: "ARS".to_string(),
            sheets_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`; unset or blank keys keep their
    /// defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Config::default();

        Ok(Self {
            bind_addr: parse_or(get("BIND_ADDR"), "BIND_ADDR", defaults.bind_addr)?,
            sheets_id: get("GOOGLE_SHEETS_ID"),
            sheets_api_key: get("TRASLADO_DE_MOTOS_API_KEY"),
            snapshot_path: get("PRICING_SNAPSHOT_PATH").map(PathBuf::from),
            refresh_interval: parse_secs(
                get("PRICING_REFRESH_SECS"),
                "PRICING_REFRESH_SECS",
                defaults.refresh_interval,
            )?,
            cache_ttl: parse_secs(
                get("PRICING_CACHE_TTL_SECS"),
                "PRICING_CACHE_TTL_SECS",
                defaults.cache_ttl,
            )?,
            currency: get("QUOTE_CURRENCY").unwrap_or(defaults.currency),
            sheets_timeout_secs: parse_or(
                get("SHEETS_TIMEOUT_SECS"),
                "SHEETS_TIMEOUT_SECS",
                defaults.sheets_timeout_secs,
            )?,
        })
    }
}

fn parse_or<T: FromStr>(
    value: Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

/// Whole seconds, which must be non-zero.
fn parse_secs(
    value: Option<String>,
    key: &'static str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match parse_or(value.clone(), key, default.as_secs())? {
        0 => Err(ConfigError::Invalid {
            key,
            value: value.unwrap_or_default(),
        }),
        secs => Ok(Duration::from_secs(secs)),
    }
}
