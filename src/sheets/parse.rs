//! Strict parsing of raw sheet grids into pricing tables.
//!
//! Every problem found is collected so a broken spreadsheet can be fixed in
//! one pass. Row numbers in messages are 1-based, as shown in the sheet.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::pricing::models::{PricingData, Route, SettingKey, Settings, Vehicle};

use super::error::SheetsError;
use super::SheetValues;

/// Parse the three tabs, failing with every problem found.
pub fn parse_sheet_values(values: &SheetValues) -> Result<PricingData, SheetsError> {
    let mut errors = Vec::new();

    let settings = parse_settings(&values.settings, &mut errors);
    let routes = parse_routes(&values.destinos, &mut errors);
    let vehicles = parse_vehicles(&values.vehiculos, &mut errors);

    match settings {
        Some(settings) if errors.is_empty() => Ok(PricingData {
            settings,
            routes,
            vehicles,
        }),
        _ => Err(SheetsError::InvalidData { errors }),
    }
}

/// Parse a numeric cell. Accepts surrounding whitespace and a leading `$`.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('$').unwrap_or(trimmed).trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(|s| s.trim()).unwrap_or("")
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(|c| c.trim().is_empty())
}

fn parse_settings(rows: &[Vec<String>], errors: &mut Vec<String>) -> Option<Settings> {
    let mut last_updated = None;
    let mut values: HashMap<SettingKey, Decimal> = HashMap::new();
    // Keys whose first row was read, whether or not it parsed
    let mut seen: HashSet<SettingKey> = HashSet::new();
    let errors_before = errors.len();

    for (idx, row) in rows.iter().enumerate() {
        let row_num = idx + 1;
        let raw_key = cell(row, 0);
        if raw_key.is_empty() {
            continue;
        }

        let Some(key) = SettingKey::parse(raw_key) else {
            debug!("Ignoring settings row {}: unknown key {}", row_num, raw_key);
            continue;
        };

        if !seen.insert(key) {
            warn!("Duplicate setting {} in row {}; keeping the first", key, row_num);
            continue;
        }

        let raw_value = cell(row, 1);
        if key == SettingKey::LastUpdated {
            last_updated = Some(raw_value.to_string());
            continue;
        }

        match parse_amount(raw_value) {
            Some(value) => {
                values.insert(key, value);
            }
            None => errors.push(format!(
                "settings row {}: {} has non-numeric value '{}'",
                row_num, key, raw_value
            )),
        }
    }

    for key in SettingKey::NUMERIC {
        if !seen.contains(&key) {
            errors.push(format!("settings: missing {}", key));
        }
    }

    if errors.len() > errors_before {
        return None;
    }

    let get = |key: SettingKey| values.get(&key).copied().unwrap_or_default();
    let settings = Settings {
        last_updated: last_updated.unwrap_or_default(),
        fuel_price_per_liter: get(SettingKey::FuelPricePerLiter),
        km_per_liter: get(SettingKey::KmPerLiter),
        driver_fee: get(SettingKey::DriverFee),
        accommodation_fee: get(SettingKey::AccommodationFee),
        toll_fee: get(SettingKey::TollFee),
        meal_fee: get(SettingKey::MealFee),
        air_fee: get(SettingKey::AirFee),
        garage_trailer_fee: get(SettingKey::GarageTrailerFee),
        insurance_rate: get(SettingKey::InsuranceRate),
        insurance_markup: get(SettingKey::InsuranceMarkup),
        margin_general: get(SettingKey::MarginGeneral),
    };

    let invalid = settings.validate();
    if !invalid.is_empty() {
        errors.extend(invalid.into_iter().map(|e| format!("settings: {}", e)));
        return None;
    }

    Some(settings)
}

fn parse_routes(rows: &[Vec<String>], errors: &mut Vec<String>) -> Vec<Route> {
    let mut routes = Vec::with_capacity(rows.len());

    for (idx, row) in rows.iter().enumerate() {
        let row_num = idx + 1;
        if is_blank(row) {
            continue;
        }

        let origin = cell(row, 0);
        let destination = cell(row, 1);
        let raw_km = cell(row, 2);
        let km = parse_amount(raw_km);

        if idx == 0 && km.is_none() {
            debug!("Skipping destinos header row");
            continue;
        }

        if origin.is_empty() || destination.is_empty() {
            errors.push(format!("destinos row {}: origin and destination are required", row_num));
            continue;
        }

        match km.and_then(whole_km) {
            Some(km) => routes.push(Route {
                origin: origin.to_string(),
                destination: destination.to_string(),
                km,
            }),
            None => errors.push(format!(
                "destinos row {}: distance '{}' must be a positive whole number of km",
                row_num, raw_km
            )),
        }
    }

    routes
}

fn whole_km(km: Decimal) -> Option<u32> {
    if km <= Decimal::ZERO || !km.fract().is_zero() {
        return None;
    }
    km.to_u32()
}

fn parse_vehicles(rows: &[Vec<String>], errors: &mut Vec<String>) -> Vec<Vehicle> {
    let mut vehicles = Vec::with_capacity(rows.len());

    for (idx, row) in rows.iter().enumerate() {
        let row_num = idx + 1;
        if is_blank(row) {
            continue;
        }

        let category = cell(row, 0);
        let raw_price = cell(row, 1);
        let price = parse_amount(raw_price);

        if idx == 0 && price.is_none() {
            debug!("Skipping vehiculos header row");
            continue;
        }

        if category.is_empty() {
            errors.push(format!("vehiculos row {}: category is required", row_num));
            continue;
        }

        match price {
            Some(price) if price >= Decimal::ZERO => vehicles.push(Vehicle {
                category: category.to_string(),
                estimated_price: price,
            }),
            _ => errors.push(format!(
                "vehiculos row {}: estimated price '{}' must be a non-negative number",
                row_num, raw_price
            )),
        }
    }

    vehicles
}
