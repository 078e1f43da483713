//! Response DTOs for pricing API endpoints.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::cache::CacheStats;

use super::calculators::round_money;
use super::services::{InsuranceLine, QuoteResult};

/// Money value for JSON responses
#[derive(Debug, Clone, Serialize)]
pub struct MoneyResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub currency: String,
}

impl MoneyResponse {
    pub fn new(amount: Decimal, currency: &str) -> Self {
        Self {
            amount,
            currency: currency.to_string(),
        }
    }
}

/// Insurance for one vehicle line
#[derive(Debug, Serialize)]
pub struct InsuranceLineResponse {
    pub category: String,
    pub quantity: u32,
    pub unit_value: MoneyResponse,
    pub insurance: MoneyResponse,
}

impl InsuranceLineResponse {
    fn from_line(line: &InsuranceLine, currency: &str) -> Self {
        Self {
            category: line.category.clone(),
            quantity: line.quantity,
            unit_value: MoneyResponse::new(line.unit_value, currency),
            insurance: MoneyResponse::new(round_money(line.amount), currency),
        }
    }
}

/// Response for a quote; every amount is rounded to whole units
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub origin: String,
    pub destination: String,
    pub fuel_cost: MoneyResponse,
    pub driver_cost: MoneyResponse,
    pub accommodation_cost: MoneyResponse,
    pub meal_cost: MoneyResponse,
    pub toll_cost: MoneyResponse,
    pub air_garage_cost: MoneyResponse,
    pub total_direct_cost: MoneyResponse,
    pub price_with_margin: MoneyResponse,
    pub insurance_cost: MoneyResponse,
    pub final_price: MoneyResponse,
    pub insurance_lines: Vec<InsuranceLineResponse>,
    pub total_blocks: u32,
    pub total_km: u32,
    pub waiting_days: u32,
    pub include_insurance: bool,
}

impl QuoteResponse {
    pub fn from_result(result: &QuoteResult, currency: &str) -> Self {
        let costs = &result.costs;
        Self {
            origin: result.origin.clone(),
            destination: result.destination.clone(),
            fuel_cost: MoneyResponse::new(costs.fuel, currency),
            driver_cost: MoneyResponse::new(costs.driver, currency),
            accommodation_cost: MoneyResponse::new(costs.accommodation, currency),
            meal_cost: MoneyResponse::new(costs.meals, currency),
            toll_cost: MoneyResponse::new(costs.tolls, currency),
            air_garage_cost: MoneyResponse::new(costs.air_garage, currency),
            total_direct_cost: MoneyResponse::new(costs.total_direct, currency),
            price_with_margin: MoneyResponse::new(costs.price_with_margin, currency),
            insurance_cost: MoneyResponse::new(costs.insurance, currency),
            final_price: MoneyResponse::new(costs.final_price, currency),
            insurance_lines: result
                .insurance_lines
                .iter()
                .map(|line| InsuranceLineResponse::from_line(line, currency))
                .collect(),
            total_blocks: result.total_blocks,
            total_km: result.total_km,
            waiting_days: result.waiting_days,
            include_insurance: result.include_insurance,
        }
    }
}

/// Response listing every known city
#[derive(Debug, Serialize)]
pub struct OriginsResponse {
    pub origins: Vec<String>,
}

/// Response listing the cities reachable from an origin
#[derive(Debug, Serialize)]
pub struct DestinationsResponse {
    pub origin: String,
    pub destinations: Vec<String>,
}

/// Response listing vehicle categories
#[derive(Debug, Serialize)]
pub struct VehiclesResponse {
    pub categories: Vec<String>,
}

/// Response describing the loaded pricing tables
#[derive(Debug, Serialize)]
pub struct PricingMetaResponse {
    pub last_updated: String,
    pub loaded_at: DateTime<Utc>,
    pub route_count: usize,
    pub vehicle_count: usize,
    pub currency: String,
    pub cache: CacheStats,
}

/// Generic pricing error response
#[derive(Debug, Serialize)]
pub struct PricingErrorResponse {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
