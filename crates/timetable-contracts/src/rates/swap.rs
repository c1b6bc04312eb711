//! Fixed-for-floating swaps.

use serde::{Deserialize, Serialize};
use timetable_core::contract::Contract;
use timetable_core::event::{leg_key, Event, EventTime};

use crate::error::{ContractError, ContractResult};
use crate::schedule::{accrual, check_schedule, event_times};

/// One swap period paying fixed and receiving floating, on `track`.
///
/// The floating leg is replicated by receiving one unit of `ccy` at `start`
/// and paying it back at `end`; the fixed coupon `rate * accrual` is paid
/// with it.
///
/// ```rust
/// use timetable_contracts::rates::simple_swap_period;
///
/// let events = simple_swap_period("USD", 0.5, 1.0, 0.05, ".swp").unwrap();
/// assert_eq!(events[0].quantity, 1.0);
/// assert!((events[1].quantity + 1.025).abs() < 1e-12);
/// ```
///
/// # Errors
///
/// Fails if `start` is not before `end` or the times mix kinds.
pub fn simple_swap_period(
    ccy: &str,
    start: impl Into<EventTime>,
    end: impl Into<EventTime>,
    rate: f64,
    track: &str,
) -> ContractResult<Vec<Event>> {
    let (start, end) = (start.into(), end.into());
    check_schedule("swap period", &[start, end])?;
    let frac = accrual(start, end)?;
    Ok(swap_period(ccy, start, end, -1.0 - rate * frac, track))
}

fn swap_period(ccy: &str, start: EventTime, end: EventTime, repay: f64, track: &str) -> Vec<Event> {
    vec![
        Event::pay(track, start, 1.0, ccy),
        Event::pay(track, end, repay, ccy),
    ]
}

/// Period dates of a swap with the accrual of each period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct SwapSchedule {
    dates: Vec<EventTime>,
    accruals: Vec<f64>,
}

impl SwapSchedule {
    pub(crate) fn new<I, T>(dates: I) -> ContractResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<EventTime>,
    {
        let dates = event_times(dates);
        check_schedule("dates", &dates)?;
        if dates.len() < 2 {
            return Err(ContractError::invalid_spec(
                "a swap needs an inception and at least one period end",
            ));
        }
        let accruals = dates
            .windows(2)
            .map(|w| accrual(w[0], w[1]))
            .collect::<ContractResult<Vec<_>>>()?;
        Ok(Self { dates, accruals })
    }

    pub(crate) fn periods(&self) -> usize {
        self.accruals.len()
    }

    pub(crate) fn start(&self, period: usize) -> EventTime {
        self.dates[period]
    }

    /// Events of one period on `track`.
    pub(crate) fn period_events(&self, period: usize, ccy: &str, rate: f64, track: &str) -> Vec<Event> {
        swap_period(
            ccy,
            self.dates[period],
            self.dates[period + 1],
            -1.0 - rate * self.accruals[period],
            track,
        )
    }
}

/// A vanilla swap paying `strike_rate` on the `{track}.swp` track.
///
/// `dates` holds the inception followed by every period end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Swap {
    ccy: String,
    schedule: SwapSchedule,
    strike_rate: f64,
    track: String,
}

impl Swap {
    /// Creates a swap.
    ///
    /// # Errors
    ///
    /// Fails if fewer than two dates are given or they are unordered.
    pub fn new<I, T>(ccy: impl Into<String>, dates: I, strike_rate: f64) -> ContractResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<EventTime>,
    {
        Ok(Self {
            ccy: ccy.into(),
            schedule: SwapSchedule::new(dates)?,
            strike_rate,
            track: String::new(),
        })
    }

    /// Sets the track prefix.
    #[must_use]
    pub fn with_track(mut self, track: impl Into<String>) -> Self {
        self.track = track.into();
        self
    }

    /// Track holding the swap payments.
    #[must_use]
    pub fn swap_track(&self) -> String {
        leg_key(&self.track, ".swp")
    }
}

impl Contract for Swap {
    fn events(&self) -> Vec<Event> {
        let track = self.swap_track();
        (0..self.schedule.periods())
            .flat_map(|i| {
                self.schedule
                    .period_events(i, &self.ccy, self.strike_rate, &track)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use timetable_core::types::Date;

    #[test]
    fn test_swap_events() {
        let swap = Swap::new("USD", [0.5, 1.0, 1.5], 0.05).unwrap();
        let events = swap.events();
        assert_eq!(events.len(), 4);
        assert!(events.iter().all(|e| e.track_name() == ".swp"));
        let q: Vec<f64> = events.iter().map(|e| e.quantity).collect();
        assert_relative_eq!(q[1], -1.025, epsilon = 1e-12);
        assert_eq!(q[2], 1.0);
    }

    #[test]
    fn test_dated_period_uses_thirty_360() {
        let start = Date::from_ymd(2023, 12, 31).unwrap();
        let end = Date::from_ymd(2024, 6, 30).unwrap();
        let events = simple_swap_period("USD", start, end, 0.03, "S").unwrap();
        assert_relative_eq!(events[1].quantity, -1.015, epsilon = 1e-12);
    }

    #[test]
    fn test_single_date_rejected() {
        assert!(Swap::new("USD", [0.5], 0.05).is_err());
        assert!(simple_swap_period("USD", 1.0, 0.5, 0.05, "").is_err());
    }
}
