//! In-memory caching using moka
//!
//! Holds the pricing tables fetched from the spreadsheet. One fetch serves
//! every quote until the entry expires or the warmer replaces it.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use serde::Serialize;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::error::{AppError, Result};
use crate::pricing::QuoteCalculator;
use crate::sheets::{parse_sheet_values, PricingSource, SheetValues};

const PRICING_KEY: &str = "pricing";
const SHEETS_KEY: &str = "sheets";

/// Pricing tables ready to quote against
#[derive(Debug)]
pub struct LoadedPricing {
    pub calculator: QuoteCalculator,
    pub loaded_at: DateTime<Utc>,
}

/// Application cache holding parsed and raw pricing tables
#[derive(Clone)]
pub struct AppCache {
    /// Validated calculator (singleton)
    pub pricing: Cache<String, Arc<LoadedPricing>>,
    /// Raw sheet grids as last fetched (singleton)
    pub sheets: Cache<String, Arc<SheetValues>>,
}

impl AppCache {
    /// Create a new cache whose entries expire after `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self {
            pricing: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
            sheets: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
        }
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            pricing_cached: self.pricing.contains_key(PRICING_KEY),
            sheets_cached: self.sheets.contains_key(SHEETS_KEY),
        }
    }

    /// Invalidate all caches
    pub fn invalidate_all(&self) {
        self.pricing.invalidate_all();
        self.sheets.invalidate_all();
        info!("All caches invalidated");
    }

    /// Cached pricing tables, loading them from `source` on a miss.
    ///
    /// Concurrent misses share a single load.
    pub async fn load_pricing(&self, source: &PricingSource) -> Result<Arc<LoadedPricing>> {
        if let Some(cached) = self.pricing.get(PRICING_KEY).await {
            debug!("Cache HIT for pricing tables");
            return Ok(cached);
        }
        debug!("Cache MISS for pricing tables");
        self.pricing
            .try_get_with(PRICING_KEY.to_string(), self.load(source))
            .await
            .map_err(AppError::Shared)
    }

    /// Cached raw grids, fetching them from `source` on a miss.
    pub async fn load_sheet_values(&self, source: &PricingSource) -> Result<Arc<SheetValues>> {
        if let Some(cached) = self.sheets.get(SHEETS_KEY).await {
            debug!("Cache HIT for sheet values");
            return Ok(cached);
        }
        debug!("Cache MISS for sheet values");
        let fetch = async { Ok::<_, AppError>(Arc::new(source.fetch().await?)) };
        self.sheets
            .try_get_with(SHEETS_KEY.to_string(), fetch)
            .await
            .map_err(AppError::Shared)
    }

    /// Fetch, parse and validate fresh tables, replacing the cached ones.
    ///
    /// On failure the previous entries stay in place. The raw grids are
    /// cached even when parsing fails, so they can be inspected.
    pub async fn refresh(&self, source: &PricingSource) -> Result<Arc<LoadedPricing>> {
        let loaded = self.load(source).await?;
        self.pricing
            .insert(PRICING_KEY.to_string(), loaded.clone())
            .await;
        Ok(loaded)
    }

    /// Fetch and validate tables without touching the pricing entry.
    async fn load(&self, source: &PricingSource) -> Result<Arc<LoadedPricing>> {
        let values = Arc::new(source.fetch().await?);
        self.sheets
            .insert(SHEETS_KEY.to_string(), values.clone())
            .await;

        let data = parse_sheet_values(&values)?;
        let calculator = QuoteCalculator::try_from(data)?;

        info!(
            "Loaded {} route(s) and {} vehicle categories from {} (last updated {})",
            calculator.routes().len(),
            calculator.vehicles().len(),
            source.describe(),
            calculator.last_updated()
        );

        Ok(Arc::new(LoadedPricing {
            calculator,
            loaded_at: Utc::now(),
        }))
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(30 * 60))
    }
}

/// Cache statistics for monitoring endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub pricing_cached: bool,
    pub sheets_cached: bool,
}

/// Start background cache warmer
///
/// Loads the tables immediately, then refreshes them every `every`.
pub async fn start_cache_warmer(cache: AppCache, source: Arc<PricingSource>, every: Duration) {
    let mut interval = interval(every);
    loop {
        interval.tick().await;
        warm_cache(&cache, &source).await;
    }
}

async fn warm_cache(cache: &AppCache, source: &PricingSource) {
    info!("Starting pricing cache warm-up...");
    match cache.refresh(source).await {
        Ok(_) => info!("Pricing cache warm-up complete. Stats: {:?}", cache.stats()),
        Err(e) => warn!("Failed to warm pricing cache: {}", e),
    }
}
