//! Core pricing calculation functions.
//!
//! Pure functions for the transport tariff - no I/O.
//! Every component is computed in full precision; rounding happens only when
//! a breakdown is prepared for display.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use crate::pricing::models::Settings;

/// Driving capacity of one block (one day on the road), in km.
pub const BLOCK_KM: u32 = 850;

/// Accommodation and meals are only charged up to this many waiting days.
pub const LODGING_MAX_WAITING_DAYS: u32 = 5;

/// Air freight and garage are charged once waiting days exceed this.
///
/// Deliberately one day below `LODGING_MAX_WAITING_DAYS`: a 5-day wait pays
/// both lodging and air/garage.
pub const AIR_GARAGE_AFTER_WAITING_DAYS: u32 = 4;

/// Round to whole currency units, halves away from zero.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use traslado_motos_web::pricing::round_money;
///
/// assert_eq!(round_money(dec!(437714.2857)), dec!(437714));
/// assert_eq!(round_money(dec!(2.5)), dec!(3));
/// assert_eq!(round_money(dec!(3.49)), dec!(3));
/// ```
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Number of 850 km blocks needed to cover `km`, rounding up.
pub fn blocks_for_distance(km: u32) -> u32 {
    km.div_ceil(BLOCK_KM)
}

/// Diesel for the whole distance.
///
/// `settings.km_per_liter` must be non-zero; `QuoteCalculator` guarantees it.
/// `None` when the result is out of range, as with every checked helper below.
pub fn fuel_cost(km: u32, settings: &Settings) -> Option<Decimal> {
    let liters = Decimal::from(km).checked_div(settings.km_per_liter)?;
    liters.checked_mul(settings.fuel_price_per_liter)
}

/// Driver pay, one fee per block.
pub fn driver_cost(blocks: u32, settings: &Settings) -> Option<Decimal> {
    Decimal::from(blocks).checked_mul(settings.driver_fee)
}

/// Lodging for every block after the first, dropped for long waits.
pub fn accommodation_cost(blocks: u32, waiting_days: u32, settings: &Settings) -> Option<Decimal> {
    if waiting_days > LODGING_MAX_WAITING_DAYS {
        return Some(Decimal::ZERO);
    }
    Decimal::from(blocks.saturating_sub(1)).checked_mul(settings.accommodation_fee)
}

/// Meals follow the same rule as accommodation.
pub fn meal_cost(blocks: u32, waiting_days: u32, settings: &Settings) -> Option<Decimal> {
    if waiting_days > LODGING_MAX_WAITING_DAYS {
        return Some(Decimal::ZERO);
    }
    Decimal::from(blocks.saturating_sub(1)).checked_mul(settings.meal_fee)
}

/// Air freight plus garage/trailer for extended waits.
pub fn air_garage_cost(waiting_days: u32, settings: &Settings) -> Option<Decimal> {
    if waiting_days > AIR_GARAGE_AFTER_WAITING_DAYS {
        settings.air_fee.checked_add(settings.garage_trailer_fee)
    } else {
        Some(Decimal::ZERO)
    }
}

/// Apply the general margin (a divisor) to direct costs.
///
/// `settings.margin_general` must be non-zero; `QuoteCalculator` guarantees it.
pub fn apply_margin(direct_cost: Decimal, settings: &Settings) -> Option<Decimal> {
    direct_cost.checked_div(settings.margin_general)
}

/// Insurance for one vehicle line, with its own markup.
///
/// Never subject to the general margin.
pub fn insurance_cost(unit_value: Decimal, quantity: u32, settings: &Settings) -> Option<Decimal> {
    let total_value = unit_value.checked_mul(Decimal::from(quantity))?;
    let gross = total_value.checked_mul(settings.insurance_rate)?;
    gross.checked_mul(Decimal::ONE.checked_add(settings.insurance_markup)?)
}

/// Cost breakdown of a quote.
#[derive(Debug, Clone, PartialEq)]
pub struct CostBreakdown {
    pub fuel: Decimal,
    pub driver: Decimal,
    pub accommodation: Decimal,
    pub meals: Decimal,
    pub tolls: Decimal,
    pub air_garage: Decimal,
    pub total_direct: Decimal,
    pub price_with_margin: Decimal,
    pub insurance: Decimal,
    pub final_price: Decimal,
}

impl CostBreakdown {
    /// Round every field independently for display.
    pub fn rounded(&self) -> CostBreakdown {
        CostBreakdown {
            fuel: round_money(self.fuel),
            driver: round_money(self.driver),
            accommodation: round_money(self.accommodation),
            meals: round_money(self.meals),
            tolls: round_money(self.tolls),
            air_garage: round_money(self.air_garage),
            total_direct: round_money(self.total_direct),
            price_with_margin: round_money(self.price_with_margin),
            insurance: round_money(self.insurance),
            final_price: round_money(self.final_price),
        }
    }
}

/// Compute the full breakdown for a distance and waiting period.
///
/// `insurance` is the already summed insurance of every vehicle line; it is
/// added after the margin. `None` if any step leaves the `Decimal` range.
pub fn calculate_costs(
    km: u32,
    waiting_days: u32,
    insurance: Decimal,
    settings: &Settings,
) -> Option<CostBreakdown> {
    let blocks = blocks_for_distance(km);

    let fuel = fuel_cost(km, settings)?;
    let driver = driver_cost(blocks, settings)?;
    let accommodation = accommodation_cost(blocks, waiting_days, settings)?;
    let meals = meal_cost(blocks, waiting_days, settings)?;
    let tolls = settings.toll_fee;
    let air_garage = air_garage_cost(waiting_days, settings)?;

    let total_direct = [driver, accommodation, meals, tolls, air_garage]
        .into_iter()
        .try_fold(fuel, Decimal::checked_add)?;
    let price_with_margin = apply_margin(total_direct, settings)?;
    let final_price = price_with_margin.checked_add(insurance)?;

    Some(CostBreakdown {
        fuel,
        driver,
        accommodation,
        meals,
        tolls,
        air_garage,
        total_direct,
        price_with_margin,
        insurance,
        final_price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::models::fixtures;
    use rust_decimal_macros::dec;

    // ==================== round_money tests ====================

    #[test]
    fn test_round_money_halves_away_from_zero() {
        assert_eq!(round_money(dec!(2.5)), dec!(3));
        assert_eq!(round_money(dec!(3.5)), dec!(4));
        assert_eq!(round_money(dec!(-2.5)), dec!(-3));
    }

    #[test]
    fn test_round_money_normal_rounding() {
        assert_eq!(round_money(dec!(1.49)), dec!(1));
        assert_eq!(round_money(dec!(1.51)), dec!(2));
        assert_eq!(round_money(dec!(0)), dec!(0));
    }

    // ==================== block tests ====================

    #[test]
    fn test_blocks_round_up() {
        assert_eq!(blocks_for_distance(1), 1);
        assert_eq!(blocks_for_distance(850), 1);
        assert_eq!(blocks_for_distance(851), 2);
        assert_eq!(blocks_for_distance(1634), 2);
        assert_eq!(blocks_for_distance(1700), 2);
        assert_eq!(blocks_for_distance(3200), 4);
    }

    // ==================== component tests ====================

    #[test]
    fn test_fuel_cost_is_linear_in_distance() {
        let settings = fixtures::settings();
        assert_eq!(fuel_cost(1634, &settings), Some(dec!(163400)));
        assert_eq!(fuel_cost(100, &settings), Some(dec!(10000)));
    }

    #[test]
    fn test_driver_cost_per_block() {
        let settings = fixtures::settings();
        assert_eq!(driver_cost(1, &settings), Some(dec!(50000)));
        assert_eq!(driver_cost(4, &settings), Some(dec!(200000)));
    }

    #[test]
    fn test_first_block_has_no_lodging_or_meals() {
        let settings = fixtures::settings();
        assert_eq!(accommodation_cost(1, 3, &settings), Some(dec!(0)));
        assert_eq!(meal_cost(1, 3, &settings), Some(dec!(0)));
        assert_eq!(accommodation_cost(3, 3, &settings), Some(dec!(40000)));
        assert_eq!(meal_cost(3, 3, &settings), Some(dec!(16000)));
    }

    #[test]
    fn test_lodging_and_meals_dropped_after_five_days() {
        let settings = fixtures::settings();
        assert_eq!(accommodation_cost(2, 5, &settings), Some(dec!(20000)));
        assert_eq!(meal_cost(2, 5, &settings), Some(dec!(8000)));
        assert_eq!(accommodation_cost(2, 6, &settings), Some(dec!(0)));
        assert_eq!(meal_cost(2, 6, &settings), Some(dec!(0)));
    }

    #[test]
    fn test_air_garage_after_four_days() {
        let settings = fixtures::settings();
        assert_eq!(air_garage_cost(1, &settings), Some(dec!(0)));
        assert_eq!(air_garage_cost(4, &settings), Some(dec!(0)));
        assert_eq!(air_garage_cost(5, &settings), Some(dec!(150000)));
        assert_eq!(air_garage_cost(30, &settings), Some(dec!(150000)));
    }

    #[test]
    fn test_five_day_wait_pays_lodging_and_air_garage() {
        let costs = calculate_costs(1634, 5, Decimal::ZERO, &fixtures::settings()).unwrap();
        assert_eq!(costs.accommodation, dec!(20000));
        assert_eq!(costs.meals, dec!(8000));
        assert_eq!(costs.air_garage, dec!(150000));
    }

    #[test]
    fn test_insurance_with_markup() {
        let settings = fixtures::settings();
        assert_eq!(insurance_cost(dec!(5000000), 1, &settings), Some(dec!(60000)));
        assert_eq!(insurance_cost(dec!(5000000), 3, &settings), Some(dec!(180000)));
        assert_eq!(insurance_cost(dec!(0), 2, &settings), Some(dec!(0)));
    }

    // ==================== calculate_costs tests ====================

    #[test]
    fn test_calculate_costs_buenos_aires_bariloche() {
        let settings = fixtures::settings();
        let costs = calculate_costs(1634, 3, dec!(60000), &settings).unwrap();

        assert_eq!(costs.fuel, dec!(163400));
        assert_eq!(costs.driver, dec!(100000));
        assert_eq!(costs.accommodation, dec!(20000));
        assert_eq!(costs.meals, dec!(8000));
        assert_eq!(costs.tolls, dec!(15000));
        assert_eq!(costs.air_garage, dec!(0));
        assert_eq!(costs.total_direct, dec!(306400));
        assert_eq!(costs.insurance, dec!(60000));

        let rounded = costs.rounded();
        assert_eq!(rounded.price_with_margin, dec!(437714));
        assert_eq!(rounded.final_price, dec!(497714));
    }

    #[test]
    fn test_margin_is_not_applied_to_insurance() {
        let settings = fixtures::settings();
        let without = calculate_costs(1000, 2, dec!(0), &settings).unwrap();
        let with = calculate_costs(1000, 2, dec!(50000), &settings).unwrap();
        assert_eq!(with.final_price - without.final_price, dec!(50000));
        assert_eq!(with.price_with_margin, without.price_with_margin);
    }

    #[test]
    fn test_rounded_rounds_each_field_independently() {
        let costs = CostBreakdown {
            fuel: dec!(0.4),
            driver: dec!(0.4),
            accommodation: dec!(0),
            meals: dec!(0),
            tolls: dec!(0),
            air_garage: dec!(0),
            total_direct: dec!(0.8),
            price_with_margin: dec!(1.6),
            insurance: dec!(0),
            final_price: dec!(1.6),
        };
        let rounded = costs.rounded();
        assert_eq!(rounded.fuel, dec!(0));
        assert_eq!(rounded.driver, dec!(0));
        assert_eq!(rounded.total_direct, dec!(1));
        assert_eq!(rounded.final_price, dec!(2));
    }

    // ==================== overflow ====================

    #[test]
    fn test_tiny_margin_overflows_instead_of_panicking() {
        let mut settings = fixtures::settings();
        settings.margin_general = dec!(0.0000000000000000000000001);
        assert_eq!(apply_margin(dec!(306400), &settings), None);
        assert_eq!(calculate_costs(1634, 3, dec!(0), &settings), None);
    }

    #[test]
    fn test_huge_vehicle_value_overflows_insurance() {
        let settings = fixtures::settings();
        assert_eq!(insurance_cost(Decimal::MAX, 2, &settings), None);
        assert!(insurance_cost(dec!(5000000), u32::MAX, &settings).is_some());
    }

    #[test]
    fn test_huge_fees_overflow_direct_total() {
        let mut settings = fixtures::settings();
        settings.air_fee = Decimal::MAX;
        assert_eq!(air_garage_cost(5, &settings), None);
        assert_eq!(calculate_costs(100, 5, dec!(0), &settings), None);
        assert!(calculate_costs(100, 4, dec!(0), &settings).is_some());
    }
}
