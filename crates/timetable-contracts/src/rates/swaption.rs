//! European and Bermudan swaptions.

use serde::{Deserialize, Serialize};
use timetable_core::contract::Contract;
use timetable_core::event::{leg_key, Event, EventTime};

use super::swap::SwapSchedule;
use crate::error::ContractResult;

fn exercise(track: &str, time: EventTime) -> Event {
    Event::choose(leg_key(track, ".opt"), time, 1.0, leg_key(track, ".swp"))
}

/// The right to enter a payer swap at the start of its first period.
///
/// A single choose on `{track}.opt` exchanges one unit of the
/// `{track}.swp` track, which holds the swap payments.
///
/// # Example
///
/// ```rust
/// use timetable_contracts::rates::Swaption;
/// use timetable_core::prelude::*;
///
/// let swaption = Swaption::new("USD", [0.5, 1.0, 1.5], 0.05).unwrap();
/// let tt = swaption.timetable().unwrap();
/// assert_eq!(tt.events().len(), 5);
/// assert_eq!(tt.events().unit().get(0), Some(".swp"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Swaption {
    ccy: String,
    schedule: SwapSchedule,
    strike_rate: f64,
    track: String,
}

impl Swaption {
    /// Creates a swaption over the swap with the given period dates.
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

    /// Sets the track prefix of the option and swap tracks.
    #[must_use]
    pub fn with_track(mut self, track: impl Into<String>) -> Self {
        self.track = track.into();
        self
    }
}

impl Contract for Swaption {
    fn events(&self) -> Vec<Event> {
        let swp = leg_key(&self.track, ".swp");
        let mut events = vec![exercise(&self.track, self.schedule.start(0))];
        for i in 0..self.schedule.periods() {
            events.extend(self.schedule.period_events(i, &self.ccy, self.strike_rate, &swp));
        }
        events
    }
}

/// A co-terminal Bermudan swaption.
///
/// The holder may exercise at the start of every period into the remaining
/// swap; an unexercised period pays nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BermudaSwaption {
    ccy: String,
    schedule: SwapSchedule,
    strike_rate: f64,
    track: String,
}

impl BermudaSwaption {
    /// Creates a Bermudan swaption.
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

    /// Sets the track prefix of the option and swap tracks.
    #[must_use]
    pub fn with_track(mut self, track: impl Into<String>) -> Self {
        self.track = track.into();
        self
    }
}

impl Contract for BermudaSwaption {
    fn events(&self) -> Vec<Event> {
        let swp = leg_key(&self.track, ".swp");
        let mut events = Vec::with_capacity(3 * self.schedule.periods());
        for i in 0..self.schedule.periods() {
            events.push(exercise(&self.track, self.schedule.start(i)));
            events.extend(self.schedule.period_events(i, &self.ccy, self.strike_rate, &swp));
        }
        events
    }
}
