use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Value lost in the first year of ownership
pub const FIRST_YEAR_DEPRECIATION: Decimal = dec!(0.19);

/// Value lost in every year after the first
pub const YEARLY_DEPRECIATION: Decimal = dec!(0.057);

/// Mileage above which the per-unit mileage penalty applies
pub const MILEAGE_PENALTY_THRESHOLD: i32 = 100_000;

/// Fraction of value lost per unit of mileage above the threshold
pub const MILEAGE_PENALTY_PER_UNIT: Decimal = dec!(0.0001);

/// A vehicle is never valued below this fraction of its purchase price
pub const RESIDUAL_VALUE_FLOOR: Decimal = dec!(0.10);

/// Decimal precision for money values
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Earliest accepted model year
pub const MIN_MODEL_YEAR: i32 = 1900;

/// Simulated mileage stops growing at this reading
pub const MAX_SIMULATED_MILEAGE: i32 = 500_000;

/// Bounds (inclusive) of the simulated mileage added per revaluation tick
pub const MILEAGE_DRIFT_MIN: i32 = 5;
pub const MILEAGE_DRIFT_MAX: i32 = 25;

/// Default revaluation period in seconds
pub const DEFAULT_REVALUATION_SECS: u64 = 30;

/// Default timeout for remote and database calls in milliseconds
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Default SQLite file of the direct store
pub const DEFAULT_DATABASE_PATH: &str = "./db/vehicles.db";

/// Default collection URL of the remote vehicles API
pub const DEFAULT_API_URL: &str = "http://localhost:8001/api/vehicles";
