//! Pricing data models.
//!
//! These are the typed forms of the three spreadsheet tables (settings,
//! routes, vehicles). They are produced by the sheet parser and handed to
//! the calculator as immutable values.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Keys of the `settings` sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    LastUpdated,
    FuelPricePerLiter,
    KmPerLiter,
    DriverFee,
    AccommodationFee,
    TollFee,
    MealFee,
    AirFee,
    GarageTrailerFee,
    InsuranceRate,
    InsuranceMarkup,
    MarginGeneral,
}

impl SettingKey {
    /// Every numeric tariff key, in sheet order.
    pub const NUMERIC: [SettingKey; 11] = [
        SettingKey::FuelPricePerLiter,
        SettingKey::KmPerLiter,
        SettingKey::DriverFee,
        SettingKey::AccommodationFee,
        SettingKey::TollFee,
        SettingKey::MealFee,
        SettingKey::AirFee,
        SettingKey::GarageTrailerFee,
        SettingKey::InsuranceRate,
        SettingKey::InsuranceMarkup,
        SettingKey::MarginGeneral,
    ];

    /// Key as written in the sheet.
    pub fn as_str(self) -> &'static str {
        match self {
            SettingKey::LastUpdated => "ULT_ACTUALIZACION",
            SettingKey::FuelPricePerLiter => "LITRO_DIESEL",
            SettingKey::KmPerLiter => "KM_X_LITRO",
            SettingKey::DriverFee => "CHOFER",
            SettingKey::AccommodationFee => "ALOJAMIENTO",
            SettingKey::TollFee => "PEAJES",
            SettingKey::MealFee => "COMIDAS",
            SettingKey::AirFee => "AEREO",
            SettingKey::GarageTrailerFee => "GARAGE_TRAILER",
            SettingKey::InsuranceRate => "INSURANCE_RATE",
            SettingKey::InsuranceMarkup => "INSURANCE_MARKUP",
            SettingKey::MarginGeneral => "MARGIN_GENERAL",
        }
    }

    /// Look up a sheet key. Matching ignores case and surrounding whitespace.
    pub fn parse(key: &str) -> Option<Self> {
        let key = key.trim();
        std::iter::once(SettingKey::LastUpdated)
            .chain(Self::NUMERIC)
            .find(|k| k.as_str().eq_ignore_ascii_case(key))
    }
}

impl std::fmt::Display for SettingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tariff parameters from the `settings` sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    /// `ULT_ACTUALIZACION`, display only
    pub last_updated: String,
    /// `LITRO_DIESEL`
    pub fuel_price_per_liter: Decimal,
    /// `KM_X_LITRO`
    pub km_per_liter: Decimal,
    /// `CHOFER`, charged per block
    pub driver_fee: Decimal,
    /// `ALOJAMIENTO`, charged per block after the first
    pub accommodation_fee: Decimal,
    /// `PEAJES`, flat
    pub toll_fee: Decimal,
    /// `COMIDAS`, charged per block after the first
    pub meal_fee: Decimal,
    /// `AEREO`
    pub air_fee: Decimal,
    /// `GARAGE_TRAILER`
    pub garage_trailer_fee: Decimal,
    /// `INSURANCE_RATE`
    pub insurance_rate: Decimal,
    /// `INSURANCE_MARKUP`
    pub insurance_markup: Decimal,
    /// `MARGIN_GENERAL`, applied as a divisor
    pub margin_general: Decimal,
}

impl Settings {
    /// Numeric value stored under `key`. `LastUpdated` has no numeric value.
    pub fn value(&self, key: SettingKey) -> Option<Decimal> {
        let value = match key {
            SettingKey::LastUpdated => return None,
            SettingKey::FuelPricePerLiter => self.fuel_price_per_liter,
            SettingKey::KmPerLiter => self.km_per_liter,
            SettingKey::DriverFee => self.driver_fee,
            SettingKey::AccommodationFee => self.accommodation_fee,
            SettingKey::TollFee => self.toll_fee,
            SettingKey::MealFee => self.meal_fee,
            SettingKey::AirFee => self.air_fee,
            SettingKey::GarageTrailerFee => self.garage_trailer_fee,
            SettingKey::InsuranceRate => self.insurance_rate,
            SettingKey::InsuranceMarkup => self.insurance_markup,
            SettingKey::MarginGeneral => self.margin_general,
        };
        Some(value)
    }

    /// Check tariff invariants, returning one message per violation.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for key in SettingKey::NUMERIC {
            if let Some(value) = self.value(key) {
                if value < Decimal::ZERO {
                    errors.push(format!("{} must not be negative (got {})", key, value));
                }
            }
        }

        // Both are divisors in the fuel and margin formulas.
        if self.km_per_liter.is_zero() {
            errors.push(format!("{} must be greater than zero", SettingKey::KmPerLiter));
        }
        if self.margin_general.is_zero() {
            errors.push(format!("{} must be greater than zero", SettingKey::MarginGeneral));
        }

        errors
    }
}

/// A row of the `destinos` sheet. Lookups treat it as undirected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub origin: String,
    pub destination: String,
    pub km: u32,
}

/// A row of the `vehiculos` sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub category: String,
    /// Estimated market value, only used for insurance
    pub estimated_price: Decimal,
}

/// One (category, quantity) pair of a quote request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleLine {
    pub category: String,
    pub quantity: u32,
}

impl VehicleLine {
    pub fn new(category: impl Into<String>, quantity: u32) -> Self {
        Self {
            category: category.into(),
            quantity,
        }
    }
}

/// Fully parsed pricing tables.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingData {
    pub settings: Settings,
    pub routes: Vec<Route>,
    pub vehicles: Vec<Vehicle>,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use rust_decimal_macros::dec;

    /// Tariffs used across the pricing tests.
    pub fn settings() -> Settings {
        Settings {
            last_updated: "01/03/2025".to_string(),
            fuel_price_per_liter: dec!(1000),
            km_per_liter: dec!(10),
            driver_fee: dec!(50000),
            accommodation_fee: dec!(20000),
            toll_fee: dec!(15000),
            meal_fee: dec!(8000),
            air_fee: dec!(120000),
            garage_trailer_fee: dec!(30000),
            insurance_rate: dec!(0.01),
            insurance_markup: dec!(0.2),
            margin_general: dec!(0.7),
        }
    }

    pub fn route(origin: &str, destination: &str, km: u32) -> Route {
        Route {
            origin: origin.to_string(),
            destination: destination.to_string(),
            km,
        }
    }

    pub fn vehicle(category: &str, estimated_price: Decimal) -> Vehicle {
        Vehicle {
            category: category.to_string(),
            estimated_price,
        }
    }

    pub fn routes() -> Vec<Route> {
        vec![
            route("Buenos Aires", "Bariloche", 1634),
            route("Buenos Aires", "Mendoza", 1050),
            route("Córdoba", "Ushuaia", 3200),
            route("Buenos Aires", "Rosario", 300),
        ]
    }

    pub fn vehicles() -> Vec<Vehicle> {
        vec![
            vehicle("Trail", dec!(5000000)),
            vehicle("Touring", dec!(9000000)),
            vehicle("Scooter", dec!(1500000)),
        ]
    }

    pub fn pricing_data() -> PricingData {
        PricingData {
            settings: settings(),
            routes: routes(),
            vehicles: vehicles(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_setting_key_parse_ignores_case_and_whitespace() {
        assert_eq!(SettingKey::parse("MARGIN_GENERAL"), Some(SettingKey::MarginGeneral));
        assert_eq!(SettingKey::parse("  km_x_litro "), Some(SettingKey::KmPerLiter));
        assert_eq!(SettingKey::parse("ULT_ACTUALIZACION"), Some(SettingKey::LastUpdated));
        assert_eq!(SettingKey::parse("PRECIO_DOLAR"), None);
    }

    #[test]
    fn test_valid_settings_have_no_errors() {
        assert!(fixtures::settings().validate().is_empty());
    }

    #[test]
    fn test_zero_margin_is_rejected() {
        let mut settings = fixtures::settings();
        settings.margin_general = dec!(0);
        let errors = settings.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("MARGIN_GENERAL"));
    }

    #[test]
    fn test_zero_km_per_liter_is_rejected() {
        let mut settings = fixtures::settings();
        settings.km_per_liter = dec!(0);
        assert!(settings.validate()[0].contains("KM_X_LITRO"));
    }

    #[test]
    fn test_negative_values_are_rejected() {
        let mut settings = fixtures::settings();
        settings.toll_fee = dec!(-1);
        settings.insurance_rate = dec!(-0.01);
        let errors = settings.validate();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| e.contains("PEAJES")));
        assert!(errors.iter().any(|e| e.contains("INSURANCE_RATE")));
    }

    #[test]
    fn test_zero_fees_are_allowed() {
        let mut settings = fixtures::settings();
        settings.toll_fee = dec!(0);
        settings.air_fee = dec!(0);
        assert!(settings.validate().is_empty());
    }
}
