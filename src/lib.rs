//! Quote service for the motorcycle transport website.
//!
//! Pricing tables live in a Google spreadsheet; this crate fetches and
//! validates them, caches the result, and serves transport quotes as JSON.

pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod pricing;
pub mod routes;
pub mod sheets;

use std::sync::Arc;

use cache::{AppCache, LoadedPricing};
use config::Config;
use sheets::{PricingSource, SheetValues};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub cache: AppCache,
    pub source: Arc<PricingSource>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, source: PricingSource) -> Self {
        Self {
            cache: AppCache::new(config.cache_ttl),
            source: Arc::new(source),
            config: Arc::new(config),
        }
    }

    /// Current pricing tables, loading them on a cache miss.
    pub async fn pricing(&self) -> error::Result<Arc<LoadedPricing>> {
        self.cache.load_pricing(&self.source).await
    }

    /// Current raw sheet grids, fetching them on a cache miss.
    pub async fn sheet_values(&self) -> error::Result<Arc<SheetValues>> {
        self.cache.load_sheet_values(&self.source).await
    }
}
