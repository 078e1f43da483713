//! Request DTOs for pricing API endpoints.

use serde::Deserialize;

use super::models::VehicleLine;

fn default_quantity() -> u32 {
    1
}

fn default_include_insurance() -> bool {
    true
}

/// Request to quote a single vehicle category
#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub origin: String,
    pub destination: String,
    pub vehicle_category: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    pub waiting_days: u32,
    #[serde(default = "default_include_insurance")]
    pub include_insurance: bool,
}

/// Request to quote several vehicle categories on one trip
#[derive(Debug, Deserialize)]
pub struct MultiVehicleQuoteRequest {
    pub origin: String,
    pub destination: String,
    pub vehicles: Vec<VehicleLineRequest>,
    pub waiting_days: u32,
    #[serde(default = "default_include_insurance")]
    pub include_insurance: bool,
}

/// A vehicle line in the request
#[derive(Debug, Deserialize)]
pub struct VehicleLineRequest {
    pub category: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

impl From<VehicleLineRequest> for VehicleLine {
    fn from(line: VehicleLineRequest) -> Self {
        VehicleLine::new(line.category, line.quantity)
    }
}

/// Query string for the destinations listing
#[derive(Debug, Deserialize)]
pub struct DestinationsQuery {
    pub origin: String,
}
