//! Property-based tests for the valuation policy.
//!
//! These tests check the bounds and monotonicity of the depreciation curve
//! across arbitrary prices, model years and mileages.

use chrono::{Datelike, NaiveDate};
use proptest::prelude::*;
use rust_decimal::{Decimal, RoundingStrategy};
use vehiclemanager_core::valuation::calculate_current_value;

// =============================================================================
// Generators
// =============================================================================

/// Generates a price in cents between 0 and 10 000 000.00.
fn arb_price() -> impl Strategy<Value = Decimal> {
    (0i64..=1_000_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

/// Generates a valuation date between 2000 and 2060.
fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (2000i32..=2060, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn floor_of(price: Decimal) -> Decimal {
    (price * Decimal::new(10, 2)).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The value always lies between the residual floor and the price.
    #[test]
    fn prop_value_is_bounded(
        price in arb_price(),
        year in 1900i32..=2061,
        mileage in 0i32..=i32::MAX,
        as_of in arb_date(),
    ) {
        let value = calculate_current_value(price, year, mileage, as_of);
        prop_assert!(value >= floor_of(price), "{} below floor of {}", value, price);
        prop_assert!(value <= price, "{} above price {}", value, price);
        prop_assert!(value.scale() <= 2);
    }

    /// A vehicle valued in its model year with low mileage keeps its price.
    #[test]
    fn prop_model_year_keeps_price(
        price in arb_price(),
        mileage in 0i32..=100_000,
        as_of in arb_date(),
    ) {
        prop_assert_eq!(calculate_current_value(price, as_of.year(), mileage, as_of), price);
    }

    /// More mileage never increases the value.
    #[test]
    fn prop_value_is_monotonic_in_mileage(
        price in arb_price(),
        year in 1990i32..=2030,
        mileage in 0i32..=600_000,
        extra in 0i32..=50_000,
        as_of in arb_date(),
    ) {
        let lower = calculate_current_value(price, year, mileage, as_of);
        let higher = calculate_current_value(price, year, mileage + extra, as_of);
        prop_assert!(higher <= lower);
    }

    /// An older model year never increases the value.
    #[test]
    fn prop_value_is_monotonic_in_age(
        price in arb_price(),
        year in 1950i32..=2030,
        older_by in 0i32..=30,
        mileage in 0i32..=200_000,
        as_of in arb_date(),
    ) {
        let newer = calculate_current_value(price, year, mileage, as_of);
        let older = calculate_current_value(price, year - older_by, mileage, as_of);
        prop_assert!(older <= newer);
    }
}
