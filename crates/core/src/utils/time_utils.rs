use chrono::{Local, NaiveDate};

/// The date valuations are computed for.
///
/// This is the single source of truth for "today" inside the core; the
/// valuation engine itself never reads the clock.
pub fn valuation_date_today() -> NaiveDate {
    Local::now().date_naive()
}

