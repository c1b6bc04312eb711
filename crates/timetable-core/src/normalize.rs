//! Conversion of legacy float-years timetables to canonical timestamps.
//!
//! Legacy contracts author times as years from a valuation epoch. The
//! normalizer maps each year fraction onto an absolute instant using a fixed
//! 365-day year:
//!
//! ```text
//! ms = base_ms + round(t * MS_PER_YEAR)
//! ```
//!
//! Only the `time` column changes. A table whose `time` column is already a
//! timestamp passes through untouched, so normalizing twice is the same as
//! normalizing once.

use chrono::{DateTime, Utc};

use crate::column::Column;
use crate::error::{TimetableError, TimetableResult};
use crate::schema::{DataType, SchemaKind};
use crate::table::EventTable;
use crate::timetable::Timetable;

/// Milliseconds in a 365-day year.
pub const MS_PER_YEAR: i64 = 31_536_000_000;

/// Converts one year fraction to epoch milliseconds.
///
/// # Errors
///
/// Returns `InvalidDate` for a non-finite fraction or an out-of-range result.
pub fn years_to_millis(t: f64, base: DateTime<Utc>) -> TimetableResult<i64> {
    if !t.is_finite() {
        return Err(TimetableError::invalid_date(format!(
            "cannot convert {t} years to a timestamp"
        )));
    }
    let offset = (t * MS_PER_YEAR as f64).round();
    if offset.abs() >= i64::MAX as f64 {
        return Err(TimetableError::invalid_date(format!(
            "{t} years is out of range"
        )));
    }
    base.timestamp_millis()
        .checked_add(offset as i64)
        .filter(|ms| DateTime::from_timestamp_millis(*ms).is_some())
        .ok_or_else(|| TimetableError::invalid_date(format!("{t} years from {base} is out of range")))
}

/// Converts a `time` column to canonical timestamps.
///
/// A timestamp column is returned unchanged.
///
/// # Errors
///
/// - `UnsupportedSchema` if the column is neither float nor timestamp
/// - `InvalidDate` if a fraction cannot be converted
pub fn convert_time_column(time: &Column, base: DateTime<Utc>) -> TimetableResult<Column> {
    match time {
        Column::Float64(years) => years
            .iter()
            .map(|t| years_to_millis(*t, base))
            .collect::<TimetableResult<Vec<_>>>()
            .map(Column::Timestamp),
        Column::Timestamp(_) => Ok(time.clone()),
        Column::Dictionary(_) => Err(TimetableError::unsupported_schema(
            "time",
            time.data_type().to_string(),
            format!("{} or {}", DataType::Float64, DataType::Timestamp),
        )),
    }
}

/// Converts an events table to the canonical schema.
///
/// # Errors
///
/// See [`convert_time_column`].
pub fn convert_table(table: EventTable, base: DateTime<Utc>) -> TimetableResult<EventTable> {
    if table.schema_kind() == SchemaKind::Canonical {
        log::debug!("events already canonical, {} rows passed through", table.len());
        return Ok(table);
    }
    let time = convert_time_column(table.time(), base)?;
    log::debug!("converted {} rows from float years at base {base}", table.len());
    table.with_time_column(time)
}

/// Converts a legacy timetable to canonical timestamps relative to `base`.
///
/// Expressions are carried over unchanged. A canonical timetable passes
/// through.
///
/// # Example
///
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use timetable_core::event::Event;
/// use timetable_core::normalize::{convert_time_to_ts, MS_PER_YEAR};
/// use timetable_core::registry::ExpressionRegistry;
/// use timetable_core::schema::SchemaKind;
/// use timetable_core::table::EventTable;
/// use timetable_core::timetable::Timetable;
///
/// let events = vec![Event::pay("", 1.0, 1.0, "USD")];
/// let legacy = Timetable::from_table(
///     EventTable::from_events(&events).unwrap(),
///     ExpressionRegistry::new(),
/// )
/// .unwrap();
///
/// let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let canonical = convert_time_to_ts(legacy, base).unwrap();
/// assert_eq!(canonical.schema_kind(), SchemaKind::Canonical);
/// let row = canonical.events().row(0).unwrap();
/// assert_eq!(
///     row.time.timestamp_millis(),
///     Some(base.timestamp_millis() + MS_PER_YEAR)
/// );
/// ```
///
/// # Errors
///
/// - see [`convert_time_column`]
/// - `SnapperOutOfOrder` if two ticks of one snapper fall on the same
///   millisecond once converted
pub fn convert_time_to_ts(timetable: Timetable, base: DateTime<Utc>) -> TimetableResult<Timetable> {
    timetable.map_events(|table| convert_table(table, base))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::DictionaryArray;
    use crate::event::Event;
    use chrono::TimeZone;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_ticks_collapsing_to_one_instant_rejected() {
        use crate::expression::Expression;
        use crate::registry::ExpressionRegistry;

        let registry = ExpressionRegistry::new()
            .with("_FIX", Expression::snapper(["SPX"], [".K"], |inp| vec![inp[0].to_vec()]))
            .unwrap();
        let events = vec![Event::tick(1.0, "_FIX"), Event::tick(1.0 + 1e-13, "_FIX")];
        let legacy =
            Timetable::from_table(EventTable::from_events(&events).unwrap(), registry).unwrap();

        assert!(matches!(
            convert_time_to_ts(legacy, base()),
            Err(TimetableError::SnapperOutOfOrder { ref key, .. }) if key == "_FIX"
        ));
    }

    #[test]
    fn test_years_to_millis() {
        let base_ms = base().timestamp_millis();
        assert_eq!(years_to_millis(0.0, base()).unwrap(), base_ms);
        assert_eq!(years_to_millis(0.5, base()).unwrap(), base_ms + MS_PER_YEAR / 2);
        assert_eq!(years_to_millis(-1.0, base()).unwrap(), base_ms - MS_PER_YEAR);
        assert!(years_to_millis(f64::NAN, base()).is_err());
        assert!(years_to_millis(f64::INFINITY, base()).is_err());
        assert!(years_to_millis(1.0e12, base()).is_err());
    }

    #[test]
    fn test_convert_column() {
        let col = Column::Float64(vec![0.0, 0.25]);
        let out = convert_time_column(&col, base()).unwrap();
        let base_ms = base().timestamp_millis();
        assert_eq!(out, Column::Timestamp(vec![base_ms, base_ms + 7_884_000_000]));

        assert_eq!(convert_time_column(&out, base()).unwrap(), out);
    }

    #[test]
    fn test_dictionary_time_rejected() {
        let col = Column::from(DictionaryArray::constant(1, "2024-03-31"));
        assert!(matches!(
            convert_time_column(&col, base()),
            Err(TimetableError::UnsupportedSchema { .. })
        ));
    }

    #[test]
    fn test_other_columns_preserved() {
        let events = vec![
            Event::tick(0.0, "_INIT"),
            Event::choose("A", 1.0, 0.0, "USD"),
            Event::pay("A", 1.0, -100.0, "USD"),
        ];
        let legacy = EventTable::from_events(&events).unwrap();
        let canonical = convert_table(legacy.clone(), base()).unwrap();

        assert_eq!(canonical.schema_kind(), SchemaKind::Canonical);
        assert_eq!(canonical.track(), legacy.track());
        assert_eq!(canonical.op(), legacy.op());
        assert_eq!(canonical.quantity(), legacy.quantity());
        assert_eq!(canonical.unit(), legacy.unit());
    }
}
