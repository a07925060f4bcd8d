//! Valuation module - the depreciation policy used for every vehicle.

mod valuation_calculator;

pub use valuation_calculator::calculate_current_value;
