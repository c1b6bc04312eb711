//! Event rows of a timetable.
//!
//! An [`Event`] is one row of the stream consumed by the valuation engine:
//! a track (sub-ledger), a time, an instruction code ([`Op`]), a quantity and
//! a unit. Times are either absolute instants (canonical) or deprecated
//! year fractions; see [`EventTime`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::daycounts::DayCount;
use crate::error::{TimetableError, TimetableResult};
use crate::types::Date;

/// Wire code of the unconditional payment op.
pub const PAY: &str = "+";

/// Wire code of the optionality (choose) op.
pub const CHOOSE: &str = ">";

/// Instruction code carried by an event.
///
/// # Example
///
/// ```rust
/// use timetable_core::event::Op;
///
/// let op: Op = "CALL".parse().unwrap();
/// assert_eq!(op, Op::Custom("CALL".to_string()));
/// assert_eq!(Op::Choose.as_str(), ">");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Op {
    /// `"+"`: pay/receive `quantity` units of `unit`.
    Pay,
    /// `">"`: the holder receives the greater of zero and the value of
    /// continuing to the remaining events of the same track.
    Choose,
    /// Contract-defined condition code that must resolve to a phrase.
    Custom(String),
}

impl Op {
    /// Creates a custom op code.
    #[must_use]
    pub fn custom(code: impl Into<String>) -> Self {
        Op::Custom(code.into())
    }

    /// Returns the wire code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Op::Pay => PAY,
            Op::Choose => CHOOSE,
            Op::Custom(code) => code,
        }
    }

    /// Returns true for a contract-defined condition code.
    #[must_use]
    pub fn is_custom(&self) -> bool {
        matches!(self, Op::Custom(_))
    }
}

impl FromStr for Op {
    type Err = TimetableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            PAY => Ok(Op::Pay),
            CHOOSE => Ok(Op::Choose),
            "" => Err(TimetableError::InvalidOp {
                code: String::new(),
            }),
            other => Ok(Op::Custom(other.to_string())),
        }
    }
}

impl TryFrom<String> for Op {
    type Error = TimetableError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Op> for String {
    fn from(op: Op) -> Self {
        op.as_str().to_string()
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which time representation an event or column uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeKind {
    /// Absolute UTC instant with millisecond precision.
    Instant,
    /// Deprecated float years from the valuation epoch.
    Years,
}

impl fmt::Display for TimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeKind::Instant => f.write_str("timestamp"),
            TimeKind::Years => f.write_str("float years"),
        }
    }
}

/// The time of an event.
///
/// Instants are truncated to millisecond precision on construction, matching
/// the canonical timestamp column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventTime {
    /// Absolute UTC instant.
    Instant(DateTime<Utc>),
    /// Deprecated: years from the valuation epoch.
    Years(f64),
}

impl EventTime {
    /// Creates an instant time, truncated to milliseconds.
    #[must_use]
    pub fn instant(at: DateTime<Utc>) -> Self {
        let truncated = DateTime::from_timestamp_millis(at.timestamp_millis()).unwrap_or(at);
        EventTime::Instant(truncated)
    }

    /// Creates an instant time from epoch milliseconds.
    #[must_use]
    pub fn from_millis(millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(EventTime::Instant)
    }

    /// Creates a deprecated year-fraction time.
    #[must_use]
    pub fn years(t: f64) -> Self {
        EventTime::Years(t)
    }

    /// Returns the representation kind.
    #[must_use]
    pub fn kind(&self) -> TimeKind {
        match self {
            EventTime::Instant(_) => TimeKind::Instant,
            EventTime::Years(_) => TimeKind::Years,
        }
    }

    /// Returns epoch milliseconds for an instant.
    #[must_use]
    pub fn timestamp_millis(&self) -> Option<i64> {
        match self {
            EventTime::Instant(at) => Some(at.timestamp_millis()),
            EventTime::Years(_) => None,
        }
    }

    /// Returns the year fraction for a deprecated time.
    #[must_use]
    pub fn as_years(&self) -> Option<f64> {
        match self {
            EventTime::Years(t) => Some(*t),
            EventTime::Instant(_) => None,
        }
    }

    /// Compares two times of the same representation.
    ///
    /// # Errors
    ///
    /// Fails when the representations differ or a year fraction is NaN.
    pub fn try_cmp(&self, other: &EventTime) -> TimetableResult<Ordering> {
        match (self, other) {
            (EventTime::Instant(a), EventTime::Instant(b)) => Ok(a.cmp(b)),
            (EventTime::Years(a), EventTime::Years(b)) => a
                .partial_cmp(b)
                .ok_or_else(|| TimetableError::mixed_time("year fraction is NaN")),
            _ => Err(TimetableError::mixed_time(format!(
                "cannot compare {} with {}",
                self.kind(),
                other.kind()
            ))),
        }
    }

    /// Accrual fraction from `start` to `end`.
    ///
    /// Year-fraction times accrue `end - start`; instants accrue the day count
    /// fraction between their UTC dates.
    ///
    /// # Errors
    ///
    /// Fails when the two times use different representations.
    pub fn accrual_fraction(
        start: EventTime,
        end: EventTime,
        day_count: &dyn DayCount,
    ) -> TimetableResult<f64> {
        match (start, end) {
            (EventTime::Years(s), EventTime::Years(e)) => Ok(e - s),
            (EventTime::Instant(s), EventTime::Instant(e)) => {
                Ok(day_count.year_fraction_f64(Date::from(s), Date::from(e)))
            }
            _ => Err(TimetableError::mixed_time(format!(
                "accrual from {} to {}",
                start.kind(),
                end.kind()
            ))),
        }
    }
}

impl From<DateTime<Utc>> for EventTime {
    fn from(at: DateTime<Utc>) -> Self {
        EventTime::instant(at)
    }
}

impl From<Date> for EventTime {
    fn from(date: Date) -> Self {
        EventTime::Instant(date.to_utc())
    }
}

impl From<f64> for EventTime {
    fn from(t: f64) -> Self {
        EventTime::Years(t)
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventTime::Instant(at) => write!(f, "{}", at.format("%Y-%m-%d %H:%M:%S%.3fZ")),
            EventTime::Years(t) => write!(f, "{t}y"),
        }
    }
}

/// One row of a timetable.
///
/// A `None` track and a `None` op together with a unit naming a snapper
/// encode a state-update tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Sub-ledger the event belongs to.
    pub track: Option<String>,
    /// When the event happens.
    pub time: EventTime,
    /// Instruction code, `None` for a state tick.
    pub op: Option<Op>,
    /// Signed quantity; meaning depends on the op.
    pub quantity: f64,
    /// Denomination, asset, register or expression key.
    pub unit: String,
}

impl Event {
    /// Creates an event with every column given explicitly.
    #[must_use]
    pub fn new(
        track: Option<String>,
        time: impl Into<EventTime>,
        op: Option<Op>,
        quantity: f64,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            track,
            time: time.into(),
            op,
            quantity,
            unit: unit.into(),
        }
    }

    /// Unconditional payment of `quantity` units of `unit`.
    #[must_use]
    pub fn pay(
        track: impl Into<String>,
        time: impl Into<EventTime>,
        quantity: f64,
        unit: impl Into<String>,
    ) -> Self {
        Self::new(Some(track.into()), time, Some(Op::Pay), quantity, unit)
    }

    /// Optionality node over the remaining events of `track`.
    #[must_use]
    pub fn choose(
        track: impl Into<String>,
        time: impl Into<EventTime>,
        quantity: f64,
        unit: impl Into<String>,
    ) -> Self {
        Self::new(Some(track.into()), time, Some(Op::Choose), quantity, unit)
    }

    /// Condition event gated by the phrase registered under `code`.
    #[must_use]
    pub fn condition(
        track: impl Into<String>,
        time: impl Into<EventTime>,
        code: impl Into<String>,
        quantity: f64,
        unit: impl Into<String>,
    ) -> Self {
        Self::new(
            Some(track.into()),
            time,
            Some(Op::Custom(code.into())),
            quantity,
            unit,
        )
    }

    /// State-update tick running the snapper registered under `key`.
    #[must_use]
    pub fn tick(time: impl Into<EventTime>, key: impl Into<String>) -> Self {
        Self::new(None, time, None, 0.0, key)
    }

    /// Returns true if this event is a state-update tick.
    #[must_use]
    pub fn is_tick(&self) -> bool {
        self.op.is_none()
    }

    /// The track name, empty when unset.
    #[must_use]
    pub fn track_name(&self) -> &str {
        self.track.as_deref().unwrap_or("")
    }
}

/// Builds an expression key, op code or register name owned by a leg.
///
/// `suffix` carries its own separator, so an unnamed leg keeps the bare
/// register name.
///
/// ```rust
/// use timetable_core::event::leg_key;
///
/// assert_eq!(leg_key("FWD1", ".K"), "FWD1.K");
/// assert_eq!(leg_key("", "_INIT"), "_INIT");
/// ```
#[must_use]
pub fn leg_key(track: &str, suffix: &str) -> String {
    format!("{track}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daycounts::Thirty360US;

    #[test]
    fn test_op_round_trip() {
        for code in ["+", ">", "KO", "CALL"] {
            let op: Op = code.parse().unwrap();
            assert_eq!(op.as_str(), code);
        }
        assert!("".parse::<Op>().is_err());
        assert!(Op::custom("ko").is_custom());
        assert!(!Op::Pay.is_custom());
    }

    #[test]
    fn test_op_serde_as_code() {
        let json = serde_json::to_string(&Op::Choose).unwrap();
        assert_eq!(json, "\">\"");
        let op: Op = serde_json::from_str("\"CALL\"").unwrap();
        assert_eq!(op, Op::custom("CALL"));
    }

    #[test]
    fn test_instant_truncates_to_millis() {
        let at = DateTime::from_timestamp(1_711_843_200, 123_456_789).unwrap();
        let time = EventTime::instant(at);
        assert_eq!(time.timestamp_millis(), Some(1_711_843_200_123));
    }

    #[test]
    fn test_try_cmp() {
        let a = EventTime::years(0.5);
        let b = EventTime::years(1.0);
        assert_eq!(a.try_cmp(&b).unwrap(), Ordering::Less);

        let d = EventTime::from(Date::from_ymd(2024, 3, 31).unwrap());
        assert!(a.try_cmp(&d).is_err());
        assert!(EventTime::years(f64::NAN).try_cmp(&b).is_err());
    }

    #[test]
    fn test_accrual_fraction() {
        let dc = Thirty360US;
        let frac =
            EventTime::accrual_fraction(EventTime::years(0.5), EventTime::years(1.5), &dc).unwrap();
        approx::assert_relative_eq!(frac, 1.0);

        let start = EventTime::from(Date::from_ymd(2023, 12, 31).unwrap());
        let end = EventTime::from(Date::from_ymd(2024, 6, 30).unwrap());
        let frac = EventTime::accrual_fraction(start, end, &dc).unwrap();
        approx::assert_relative_eq!(frac, 0.5);

        assert!(EventTime::accrual_fraction(start, EventTime::years(1.0), &dc).is_err());
    }

    #[test]
    fn test_tick_has_null_columns() {
        let tick = Event::tick(1.0, "_UPDATE");
        assert!(tick.is_tick());
        assert!(tick.track.is_none());
        assert_eq!(tick.track_name(), "");
        assert_eq!(tick.quantity, 0.0);
    }
}
