//! Quote calculator.
//!
//! Holds the immutable pricing tables for one cache period and turns trip
//! parameters into a cost breakdown. No I/O happens here.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::calculators::{blocks_for_distance, calculate_costs, insurance_cost, CostBreakdown};
use super::models::{PricingData, Route, Settings, Vehicle, VehicleLine};

/// Insurance computed for one requested vehicle line
#[derive(Debug, Clone, PartialEq)]
pub struct InsuranceLine {
    /// Category name as stored in the vehicle table
    pub category: String,
    pub quantity: u32,
    pub unit_value: Decimal,
    /// Unrounded; zero when insurance was excluded
    pub amount: Decimal,
}

/// Result of a quote calculation
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteResult {
    /// Route endpoints as stored in the route table
    pub origin: String,
    pub destination: String,
    /// Every component rounded to whole currency units
    pub costs: CostBreakdown,
    /// Same components in full precision
    pub exact: CostBreakdown,
    pub insurance_lines: Vec<InsuranceLine>,
    pub total_blocks: u32,
    pub total_km: u32,
    pub waiting_days: u32,
    pub include_insurance: bool,
}

/// Pricing calculation error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PricingError {
    #[error("Route not found: {origin} → {destination}")]
    RouteNotFound { origin: String, destination: String },

    #[error("Vehicle category not found: {category}")]
    VehicleNotFound { category: String },

    #[error("Invalid quote request: {message}")]
    InvalidRequest { message: String },

    #[error("Configuration error: {message}")]
    InvalidConfiguration { message: String, errors: Vec<String> },

    #[error("Price for {origin} → {destination} is out of range")]
    Overflow { origin: String, destination: String },
}

impl PricingError {
    /// Stable identifier used in JSON error bodies.
    pub fn error_type(&self) -> &'static str {
        match self {
            PricingError::RouteNotFound { .. } => "route_not_found",
            PricingError::VehicleNotFound { .. } => "vehicle_not_found",
            PricingError::InvalidRequest { .. } => "invalid_request",
            PricingError::InvalidConfiguration { .. } => "invalid_configuration",
            PricingError::Overflow { .. } => "calculation_overflow",
        }
    }
}

/// Lowercased, trimmed form used for every name comparison.
fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Pricing engine over one set of tariff, route and vehicle tables.
#[derive(Debug, Clone)]
pub struct QuoteCalculator {
    settings: Settings,
    routes: Vec<Route>,
    vehicles: Vec<Vehicle>,
}

impl QuoteCalculator {
    /// Build a calculator, rejecting tables that would produce meaningless
    /// prices (zero divisors, negative tariffs, zero-length routes).
    pub fn new(
        settings: Settings,
        routes: Vec<Route>,
        vehicles: Vec<Vehicle>,
    ) -> Result<Self, PricingError> {
        let mut errors = settings.validate();

        for route in &routes {
            if route.km == 0 {
                errors.push(format!(
                    "route {} → {} must have a positive distance",
                    route.origin, route.destination
                ));
            }
        }

        for vehicle in &vehicles {
            if vehicle.estimated_price < Decimal::ZERO {
                errors.push(format!(
                    "vehicle {} must not have a negative estimated price",
                    vehicle.category
                ));
            }
        }

        if !errors.is_empty() {
            return Err(PricingError::InvalidConfiguration {
                message: format!("{} invalid pricing value(s)", errors.len()),
                errors,
            });
        }

        if settings.margin_general >= Decimal::ONE {
            warn!(
                "MARGIN_GENERAL is {}; a margin divisor of 1 or more does not mark prices up",
                settings.margin_general
            );
        }

        Ok(Self {
            settings,
            routes,
            vehicles,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// Display-only last update stamp from the settings sheet.
    pub fn last_updated(&self) -> &str {
        &self.settings.last_updated
    }

    /// Calculate a quote for a single vehicle category.
    pub fn calculate_quote(
        &self,
        origin: &str,
        destination: &str,
        vehicle_category: &str,
        quantity: u32,
        waiting_days: u32,
        include_insurance: bool,
    ) -> Result<QuoteResult, PricingError> {
        let line = VehicleLine::new(vehicle_category, quantity);
        self.calculate_quote_multiple_vehicles(
            origin,
            destination,
            std::slice::from_ref(&line),
            waiting_days,
            include_insurance,
        )
    }

    /// Calculate a quote for several vehicle lines on one trip.
    ///
    /// Only insurance depends on the vehicles; every other component depends
    /// on distance and waiting days alone.
    pub fn calculate_quote_multiple_vehicles(
        &self,
        origin: &str,
        destination: &str,
        vehicles: &[VehicleLine],
        waiting_days: u32,
        include_insurance: bool,
    ) -> Result<QuoteResult, PricingError> {
        validate_request(vehicles, waiting_days)?;

        let route = self
            .find_route(origin, destination)
            .ok_or_else(|| PricingError::RouteNotFound {
                origin: origin.trim().to_string(),
                destination: destination.trim().to_string(),
            })?;

        let overflow = || PricingError::Overflow {
            origin: route.origin.clone(),
            destination: route.destination.clone(),
        };

        let insurance_lines = vehicles
            .iter()
            .map(|line| -> Result<InsuranceLine, PricingError> {
                let vehicle = self.find_vehicle(&line.category).ok_or_else(|| {
                    PricingError::VehicleNotFound {
                        category: line.category.trim().to_string(),
                    }
                })?;

                let amount = if include_insurance {
                    insurance_cost(vehicle.estimated_price, line.quantity, &self.settings)
                        .ok_or_else(overflow)?
                } else {
                    Decimal::ZERO
                };

                Ok(InsuranceLine {
                    category: vehicle.category.clone(),
                    quantity: line.quantity,
                    unit_value: vehicle.estimated_price,
                    amount,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let total_insurance = insurance_lines
            .iter()
            .try_fold(Decimal::ZERO, |sum, l| sum.checked_add(l.amount))
            .ok_or_else(overflow)?;
        let exact = calculate_costs(route.km, waiting_days, total_insurance, &self.settings)
            .ok_or_else(overflow)?;

        debug!(
            "Quote {} → {} ({} km, {} day(s), {} line(s)): {}",
            route.origin,
            route.destination,
            route.km,
            waiting_days,
            insurance_lines.len(),
            exact.final_price
        );

        Ok(QuoteResult {
            origin: route.origin.clone(),
            destination: route.destination.clone(),
            costs: exact.rounded(),
            exact,
            insurance_lines,
            total_blocks: blocks_for_distance(route.km),
            total_km: route.km,
            waiting_days,
            include_insurance,
        })
    }

    /// Find a route in either direction.
    ///
    /// Names match exactly after trimming and lowercasing; the forward
    /// direction is tried first.
    pub fn find_route(&self, origin: &str, destination: &str) -> Option<&Route> {
        let origin = normalize(origin);
        let destination = normalize(destination);

        let matches = |r: &&Route, a: &str, b: &str| {
            normalize(&r.origin) == a && normalize(&r.destination) == b
        };

        self.routes
            .iter()
            .find(|r| matches(r, &origin, &destination))
            .or_else(|| self.routes.iter().find(|r| matches(r, &destination, &origin)))
    }

    /// Find a vehicle category; the first matching row wins.
    pub fn find_vehicle(&self, category: &str) -> Option<&Vehicle> {
        let category = normalize(category);
        self.vehicles
            .iter()
            .find(|v| normalize(&v.category) == category)
    }

    /// Every city appearing on either end of a route, sorted.
    pub fn origins(&self) -> Vec<String> {
        self.routes
            .iter()
            .flat_map(|r| [r.origin.clone(), r.destination.clone()])
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Cities reachable from `origin` by a single route, sorted.
    pub fn destinations_for_origin(&self, origin: &str) -> Vec<String> {
        let origin = normalize(origin);
        self.routes
            .iter()
            .filter_map(|r| {
                if normalize(&r.origin) == origin {
                    Some(r.destination.clone())
                } else if normalize(&r.destination) == origin {
                    Some(r.origin.clone())
                } else {
                    None
                }
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Vehicle categories in sheet order.
    pub fn vehicle_categories(&self) -> Vec<String> {
        self.vehicles.iter().map(|v| v.category.clone()).collect()
    }
}

impl TryFrom<PricingData> for QuoteCalculator {
    type Error = PricingError;

    fn try_from(data: PricingData) -> Result<Self, Self::Error> {
        QuoteCalculator::new(data.settings, data.routes, data.vehicles)
    }
}

fn validate_request(vehicles: &[VehicleLine], waiting_days: u32) -> Result<(), PricingError> {
    if vehicles.is_empty() {
        return Err(PricingError::InvalidRequest {
            message: "At least one vehicle is required".to_string(),
        });
    }
    if let Some(line) = vehicles.iter().find(|l| l.quantity == 0) {
        return Err(PricingError::InvalidRequest {
            message: format!("Quantity for {} must be at least 1", line.category.trim()),
        });
    }
    if waiting_days == 0 {
        return Err(PricingError::InvalidRequest {
            message: "Waiting days must be at least 1".to_string(),
        });
    }
    Ok(())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::pricing::models::fixtures;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn calculator_with(routes: Vec<Route>, margin: Decimal) -> QuoteCalculator {
        let mut settings = fixtures::settings();
        settings.margin_general = margin;
        QuoteCalculator::new(settings, routes, fixtures::vehicles()).unwrap()
    }

    proptest! {
        #[test]
        fn route_lookup_is_symmetric(km in 1u32..20_000) {
            let calc = calculator_with(vec![fixtures::route("Salta", "Neuquén", km)], dec!(0.7));
            let forward = calc.find_route("Salta", "Neuquén").map(|r| r.km);
            let reverse = calc.find_route("Neuquén", "Salta").map(|r| r.km);
            prop_assert_eq!(forward, Some(km));
            prop_assert_eq!(reverse, Some(km));
        }

        #[test]
        fn blocks_cover_distance(km in 1u32..100_000) {
            let blocks = blocks_for_distance(km);
            prop_assert!(blocks >= 1);
            prop_assert!(blocks * 850 >= km);
            prop_assert!((blocks - 1) * 850 < km);
        }

        #[test]
        fn lodging_grows_with_blocks(blocks in 1u32..50, waiting_days in 1u32..=5) {
            let settings = fixtures::settings();
            use crate::pricing::calculators::{accommodation_cost, meal_cost};
            prop_assert!(accommodation_cost(blocks + 1, waiting_days, &settings)
                >= accommodation_cost(blocks, waiting_days, &settings));
            prop_assert!(meal_cost(blocks + 1, waiting_days, &settings)
                >= meal_cost(blocks, waiting_days, &settings));
        }

        #[test]
        fn no_lodging_after_five_days(blocks in 1u32..50, waiting_days in 6u32..365) {
            let settings = fixtures::settings();
            use crate::pricing::calculators::{accommodation_cost, meal_cost};
            prop_assert_eq!(accommodation_cost(blocks, waiting_days, &settings), Some(Decimal::ZERO));
            prop_assert_eq!(meal_cost(blocks, waiting_days, &settings), Some(Decimal::ZERO));
        }

        #[test]
        fn air_garage_is_all_or_nothing(waiting_days in 1u32..365) {
            let settings = fixtures::settings();
            let cost = crate::pricing::calculators::air_garage_cost(waiting_days, &settings);
            if waiting_days <= 4 {
                prop_assert_eq!(cost, Some(Decimal::ZERO));
            } else {
                prop_assert_eq!(cost, Some(settings.air_fee + settings.garage_trailer_fee));
            }
        }

        #[test]
        fn smaller_margin_raises_final_price(
            km in 1u32..10_000,
            waiting_days in 1u32..15,
            margin_pct in 10u32..99,
        ) {
            let routes = vec![fixtures::route("Salta", "Neuquén", km)];
            let margin = Decimal::new(margin_pct as i64, 2);
            let lower = margin - dec!(0.05);

            let high = calculator_with(routes.clone(), margin)
                .calculate_quote("Salta", "Neuquén", "Trail", 1, waiting_days, true)
                .unwrap();
            let low = calculator_with(routes, lower)
                .calculate_quote("Salta", "Neuquén", "Trail", 1, waiting_days, true)
                .unwrap();

            prop_assert!(low.exact.final_price > high.exact.final_price);
        }

        #[test]
        fn excluded_insurance_is_zero(km in 1u32..10_000, waiting_days in 1u32..15, quantity in 1u32..10) {
            let calc = calculator_with(vec![fixtures::route("Salta", "Neuquén", km)], dec!(0.7));
            let quote = calc
                .calculate_quote("Salta", "Neuquén", "Touring", quantity, waiting_days, false)
                .unwrap();
            prop_assert_eq!(quote.exact.insurance, Decimal::ZERO);
            prop_assert_eq!(quote.exact.final_price, quote.exact.price_with_margin);
        }
    }
}
