//! Rainbow options.

use serde::{Deserialize, Serialize};
use timetable_core::contract::Contract;
use timetable_core::event::{Event, EventTime};

use crate::equity::vanilla::OptionType;
use crate::error::{ContractError, ContractResult};

/// An option on the best (call) or worst (put) of several assets.
///
/// At maturity the holder pays the notional and may choose, in order, to
/// receive `notional / strike` units of one asset; declining all of them
/// returns the notional. Puts flip every sign.
///
/// # Example
///
/// ```rust
/// use timetable_contracts::equity::{OptionType, RainbowOption};
/// use timetable_core::prelude::*;
///
/// let rainbow = RainbowOption::new(
///     "USD",
///     ["SPX", "FTSE", "N225"],
///     vec![5087.0, 7684.0, 39100.0],
///     100_000.0,
///     Date::from_ymd(2024, 3, 31).unwrap(),
///     OptionType::Call,
/// )
/// .unwrap();
/// let events = rainbow.events();
/// assert_eq!(events.len(), 5);
/// assert_eq!(events[1].unit, "SPX");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RainbowOption {
    ccy: String,
    assets: Vec<String>,
    strikes: Vec<f64>,
    notional: f64,
    maturity: EventTime,
    option_type: OptionType,
    track: String,
}

impl RainbowOption {
    /// Creates a rainbow option.
    ///
    /// # Errors
    ///
    /// Fails if no assets are given, the asset and strike lists differ in
    /// length, or a strike is not positive.
    pub fn new<A, S>(
        ccy: impl Into<String>,
        assets: A,
        strikes: Vec<f64>,
        notional: f64,
        maturity: impl Into<EventTime>,
        option_type: OptionType,
    ) -> ContractResult<Self>
    where
        A: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let assets: Vec<String> = assets.into_iter().map(Into::into).collect();
        if assets.is_empty() {
            return Err(ContractError::empty_schedule("assets"));
        }
        if assets.len() != strikes.len() {
            return Err(ContractError::invalid_spec(format!(
                "{} assets but {} strikes",
                assets.len(),
                strikes.len()
            )));
        }
        if let Some(bad) = strikes.iter().find(|k| !(k.is_finite() && **k > 0.0)) {
            return Err(ContractError::invalid_spec(format!(
                "strikes must be positive, got {bad}"
            )));
        }
        Ok(Self {
            ccy: ccy.into(),
            assets,
            strikes,
            notional,
            maturity: maturity.into(),
            option_type,
            track: String::new(),
        })
    }

    /// Sets the track.
    #[must_use]
    pub fn with_track(mut self, track: impl Into<String>) -> Self {
        self.track = track.into();
        self
    }
}

impl Contract for RainbowOption {
    fn events(&self) -> Vec<Event> {
        let sign = self.option_type.sign();
        let mut events = Vec::with_capacity(self.assets.len() + 2);
        events.push(Event::pay(&self.track, self.maturity, -self.notional * sign, &self.ccy));
        for (asset, strike) in self.assets.iter().zip(&self.strikes) {
            events.push(Event::choose(
                &self.track,
                self.maturity,
                self.notional / strike * sign,
                asset,
            ));
        }
        events.push(Event::pay(&self.track, self.maturity, self.notional * sign, &self.ccy));
        events
    }
}
