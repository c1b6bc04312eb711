//! Day count conventions used to turn schedule dates into accrual fractions.
//!
//! Calendar and day count generation belongs to the caller; the timetable only
//! needs a year fraction between two dates when an instrument accrues a rate
//! (swap legs, fixed coupons, autocall coupons). The 30/360 US convention is
//! the one the contract library relies on.
//!
//! ```rust
//! use timetable_core::daycounts::{DayCount, Thirty360US};
//! use timetable_core::types::Date;
//!
//! let dc = Thirty360US;
//! let start = Date::from_ymd(2025, 1, 15).unwrap();
//! let end = Date::from_ymd(2025, 7, 15).unwrap();
//!
//! assert_eq!(dc.day_count(start, end), 180);
//! ```

mod thirty360;

pub use thirty360::Thirty360US;

use crate::types::Date;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Trait for day count conventions.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait DayCount: Send + Sync {
    /// Returns the name of the day count convention.
    fn name(&self) -> &'static str;

    /// Calculates the year fraction between two dates.
    ///
    /// Can be negative if end < start.
    fn year_fraction(&self, start: Date, end: Date) -> Decimal;

    /// Calculates the day count between two dates according to the convention.
    fn day_count(&self, start: Date, end: Date) -> i64;

    /// Year fraction as a float, for use as an event quantity.
    fn year_fraction_f64(&self, start: Date, end: Date) -> f64 {
        self.year_fraction(start, end).to_f64().unwrap_or(0.0)
    }
}
