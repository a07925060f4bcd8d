use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::{
    DISPLAY_DECIMAL_PRECISION, FIRST_YEAR_DEPRECIATION, MILEAGE_PENALTY_PER_UNIT,
    MILEAGE_PENALTY_THRESHOLD, RESIDUAL_VALUE_FLOOR, YEARLY_DEPRECIATION,
};

/// Calculates the current market value of a vehicle.
///
/// The policy is 19% depreciation in the first year of age and 5.7% in every
/// following year, an extra mileage penalty above 100 000 units, and a floor
/// of 10% of the purchase price. The result is rounded half-up to 2 decimal
/// places.
///
/// The function is total: ages or mileages large enough to overflow the
/// intermediate arithmetic simply land on the floor.
///
/// # Arguments
///
/// * `purchase_price` - Price paid for the vehicle.
/// * `year` - Model year.
/// * `mileage` - Current odometer reading.
/// * `as_of` - Date the valuation is computed for.
pub fn calculate_current_value(
    purchase_price: Decimal,
    year: i32,
    mileage: i32,
    as_of: NaiveDate,
) -> Decimal {
    let floor = purchase_price * RESIDUAL_VALUE_FLOOR;
    let age = (i64::from(as_of.year()) - i64::from(year)).max(0);

    let depreciated = if age == 0 {
        Some(purchase_price)
    } else {
        Decimal::from(age - 1)
            .checked_mul(YEARLY_DEPRECIATION)
            .and_then(|rate| rate.checked_add(FIRST_YEAR_DEPRECIATION))
            .map(|rate| (Decimal::ONE - rate).max(Decimal::ZERO))
            .and_then(|factor| purchase_price.checked_mul(factor))
    };

    let value = depreciated
        .and_then(|value| apply_mileage_penalty(value, mileage))
        .map_or(floor, |value| value.max(floor));

    value.round_dp_with_strategy(
        DISPLAY_DECIMAL_PRECISION,
        RoundingStrategy::MidpointAwayFromZero,
    )
}

/// Scales `value` down by 0.01% for every unit of mileage above the threshold.
/// The factor never drops below zero. Returns `None` if the multiplication
/// overflows.
fn apply_mileage_penalty(value: Decimal, mileage: i32) -> Option<Decimal> {
    if mileage <= MILEAGE_PENALTY_THRESHOLD {
        return Some(value);
    }
    let excess = Decimal::from(i64::from(mileage) - i64::from(MILEAGE_PENALTY_THRESHOLD));
    let factor = (Decimal::ONE - excess * MILEAGE_PENALTY_PER_UNIT).max(Decimal::ZERO);
    value.checked_mul(factor)
}
