//! European vanilla options.

use serde::{Deserialize, Serialize};
use timetable_core::contract::Contract;
use timetable_core::event::{Event, EventTime};

/// Call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionType {
    /// Right to buy.
    Call,
    /// Right to sell.
    Put,
}

impl OptionType {
    /// Returns the type for an `is_call` flag.
    #[must_use]
    pub fn from_is_call(is_call: bool) -> Self {
        if is_call {
            OptionType::Call
        } else {
            OptionType::Put
        }
    }

    /// `+1` for a call, `-1` for a put.
    #[must_use]
    pub fn sign(self) -> f64 {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }
}

/// A European option on one asset, settled physically.
///
/// Encodes the replicating structure at maturity: a choice over the rest of
/// the track, followed by the strike payment and the asset delivery.
///
/// # Example
///
/// ```rust
/// use timetable_contracts::equity::{OptionType, VanillaOption};
/// use timetable_core::prelude::*;
///
/// let call = VanillaOption::new("USD", "SPX", 2900.0, Date::from_ymd(2024, 3, 31).unwrap(), OptionType::Call)
///     .with_track("<SPX2900>");
/// let events = call.events();
/// assert_eq!(events.len(), 3);
/// assert_eq!(events[1].quantity, -2900.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VanillaOption {
    ccy: String,
    asset: String,
    strike: f64,
    maturity: EventTime,
    option_type: OptionType,
    track: String,
}

impl VanillaOption {
    /// Creates a vanilla option.
    pub fn new(
        ccy: impl Into<String>,
        asset: impl Into<String>,
        strike: f64,
        maturity: impl Into<EventTime>,
        option_type: OptionType,
    ) -> Self {
        Self {
            ccy: ccy.into(),
            asset: asset.into(),
            strike,
            maturity: maturity.into(),
            option_type,
            track: String::new(),
        }
    }

    /// Sets the track.
    #[must_use]
    pub fn with_track(mut self, track: impl Into<String>) -> Self {
        self.track = track.into();
        self
    }

    /// The track.
    #[must_use]
    pub fn track(&self) -> &str {
        &self.track
    }

    /// The settlement currency.
    #[must_use]
    pub fn ccy(&self) -> &str {
        &self.ccy
    }

    /// The underlying asset.
    #[must_use]
    pub fn asset(&self) -> &str {
        &self.asset
    }

    /// Maturity time.
    #[must_use]
    pub fn maturity(&self) -> EventTime {
        self.maturity
    }
}

impl Contract for VanillaOption {
    fn events(&self) -> Vec<Event> {
        let sign = self.option_type.sign();
        vec![
            Event::choose(&self.track, self.maturity, 0.0, &self.ccy),
            Event::pay(&self.track, self.maturity, -self.strike * sign, &self.ccy),
            Event::pay(&self.track, self.maturity, sign, &self.asset),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use timetable_core::event::Op;

    fn summary(events: &[Event]) -> Vec<(Op, f64, String)> {
        events
            .iter()
            .filter_map(|e| e.op.clone().map(|op| (op, e.quantity, e.unit.clone())))
            .collect()
    }

    #[test]
    fn test_call_structure() {
        let call = VanillaOption::new("USD", "AAPL", 190.0, 1.0, OptionType::Call);
        assert_eq!(
            summary(&call.events()),
            vec![
                (Op::Choose, 0.0, "USD".to_string()),
                (Op::Pay, -190.0, "USD".to_string()),
                (Op::Pay, 1.0, "AAPL".to_string()),
            ]
        );
    }

    #[test]
    fn test_put_structure() {
        let put = VanillaOption::new("USD", "AAPL", 190.0, 1.0, OptionType::from_is_call(false));
        assert_eq!(
            summary(&put.events()),
            vec![
                (Op::Choose, 0.0, "USD".to_string()),
                (Op::Pay, 190.0, "USD".to_string()),
                (Op::Pay, -1.0, "AAPL".to_string()),
            ]
        );
        assert!(put.events().iter().all(|e| e.time == EventTime::years(1.0)));
    }
}
