//! 30/360 US (Bond Basis) day count convention.

use rust_decimal::Decimal;

use super::DayCount;
use crate::types::Date;

/// 30/360 US day count convention (Bond Basis).
///
/// # Rules
///
/// 1. If D1 is the last day of its month, change D1 to 30
/// 2. If D2 is 31 AND D1 is now 30, change D2 to 30
///
/// An end date on the last day of February keeps its day, so a February to
/// February period out of a leap year is two days short of a full year.
///
/// # Formula
///
/// $$\text{Days} = 360 \times (Y_2 - Y_1) + 30 \times (M_2 - M_1) + (D_2 - D_1)$$
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Thirty360US;

impl DayCount for Thirty360US {
    fn name(&self) -> &'static str {
        "30/360 US"
    }

    fn year_fraction(&self, start: Date, end: Date) -> Decimal {
        let days = self.day_count(start, end);
        Decimal::from(days) / Decimal::from(360)
    }

    fn day_count(&self, start: Date, end: Date) -> i64 {
        let y1 = start.year() as i64;
        let y2 = end.year() as i64;
        let m1 = start.month() as i64;
        let m2 = end.month() as i64;
        let mut d1 = start.day() as i64;
        let mut d2 = end.day() as i64;

        if start.is_end_of_month() {
            d1 = 30;
        }
        if d1 == 30 && d2 == 31 {
            d2 = 30;
        }

        360 * (y2 - y1) + 30 * (m2 - m1) + (d2 - d1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_full_year() {
        let dc = Thirty360US;
        let start = Date::from_ymd(2025, 1, 1).unwrap();
        let end = Date::from_ymd(2026, 1, 1).unwrap();

        assert_eq!(dc.day_count(start, end), 360);
        assert_eq!(dc.year_fraction(start, end), dec!(1));
    }

    #[test]
    fn test_half_year_quarter_ends() {
        let dc = Thirty360US;
        let start = Date::from_ymd(2023, 12, 31).unwrap();
        let end = Date::from_ymd(2024, 6, 30).unwrap();

        // D1 = 31 -> 30
        assert_eq!(dc.day_count(start, end), 180);
        assert_eq!(dc.year_fraction(start, end), dec!(0.5));
    }

    #[test]
    fn test_feb_eom_start() {
        let dc = Thirty360US;
        let start = Date::from_ymd(2024, 2, 29).unwrap();
        let end = Date::from_ymd(2024, 3, 31).unwrap();

        // D1 = 30 (Feb EOM), D2 = 31 with D1 >= 30 -> 30
        assert_eq!(dc.day_count(start, end), 30);
    }

    #[test]
    fn test_feb_to_feb() {
        let dc = Thirty360US;
        let start = Date::from_ymd(2024, 2, 29).unwrap();
        let end = Date::from_ymd(2025, 2, 28).unwrap();

        // D1 = 30 (Feb EOM), D2 keeps 28
        assert_eq!(dc.day_count(start, end), 358);
        approx::assert_relative_eq!(dc.year_fraction_f64(start, end), 358.0 / 360.0);
    }

    #[test]
    fn test_thirty_day_month_end_start() {
        let dc = Thirty360US;
        let start = Date::from_ymd(2024, 4, 30).unwrap();
        let end = Date::from_ymd(2024, 5, 31).unwrap();

        assert_eq!(dc.day_count(start, end), 30);
    }

    #[test]
    fn test_d2_31_stays_31() {
        let dc = Thirty360US;
        let start = Date::from_ymd(2025, 1, 15).unwrap();
        let end = Date::from_ymd(2025, 3, 31).unwrap();

        // D1 = 15 < 30, so D2 stays 31
        assert_eq!(dc.day_count(start, end), 76);
    }

    #[test]
    fn test_negative_and_float() {
        let dc = Thirty360US;
        let start = Date::from_ymd(2025, 7, 1).unwrap();
        let end = Date::from_ymd(2025, 1, 1).unwrap();

        assert_eq!(dc.day_count(start, end), -180);
        approx::assert_relative_eq!(dc.year_fraction_f64(start, end), -0.5);
    }
}
