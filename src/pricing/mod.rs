//! Pricing engine module.
//!
//! Turns a route, a set of vehicles and a waiting period into a transport
//! quote. The calculation itself is pure; the HTTP handlers only fetch the
//! cached pricing tables and serialize the result.

pub mod calculators;
pub mod models;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;

// Re-export commonly used items
pub use calculators::{round_money, CostBreakdown};
pub use models::{PricingData, Route, SettingKey, Settings, Vehicle, VehicleLine};
pub use routes::router;
pub use services::{InsuranceLine, PricingError, QuoteCalculator, QuoteResult};
