//! Forward starting options.

use serde::{Deserialize, Serialize};
use timetable_core::contract::Contract;
use timetable_core::event::{leg_key, Event, EventTime};
use timetable_core::expression::Expression;
use timetable_core::registry::ExpressionRegistry;
use timetable_core::state::PriorState;
use timetable_core::TimetableResult;

use crate::equity::vanilla::OptionType;
use crate::error::ContractResult;
use crate::schedule::check_not_after;

/// Prior-state name of an asset fixing already observed on the strike date.
pub const STRIKE_FIXING: &str = "strike_fixing";

/// An option whose strike is set on a future date as a fraction of the
/// asset price observed then.
///
/// A state tick `{track}.fix_K` copies the asset price into the register
/// `{track}.K`; at maturity the holder may pay `strike_rate` units of that
/// register for the asset. If the fixing is already known (supplied as
/// [`STRIKE_FIXING`] in the prior state) no tick is emitted and the strike is
/// paid in cash.
///
/// # Example
///
/// ```rust
/// use timetable_contracts::equity::{ForwardStartOption, OptionType};
/// use timetable_core::prelude::*;
///
/// let fwd = ForwardStartOption::new(
///     "USD",
///     "SPX",
///     1.0,
///     Date::from_ymd(2024, 3, 31).unwrap(),
///     Date::from_ymd(2024, 9, 30).unwrap(),
///     OptionType::Call,
/// )
/// .unwrap()
/// .with_track("F1");
///
/// let tt = fwd.timetable().unwrap();
/// assert_eq!(tt.events().len(), 4);
/// assert!(tt.expressions().contains_key("F1.fix_K"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForwardStartOption {
    ccy: String,
    asset: String,
    strike_rate: f64,
    strike_date: EventTime,
    maturity: EventTime,
    option_type: OptionType,
    track: String,
    prior: PriorState,
}

impl ForwardStartOption {
    /// Creates a forward starting option.
    ///
    /// # Errors
    ///
    /// Fails if the strike date is after maturity or the times mix kinds.
    pub fn new(
        ccy: impl Into<String>,
        asset: impl Into<String>,
        strike_rate: f64,
        strike_date: impl Into<EventTime>,
        maturity: impl Into<EventTime>,
        option_type: OptionType,
    ) -> ContractResult<Self> {
        let strike_date = strike_date.into();
        let maturity = maturity.into();
        check_not_after("strike date", strike_date, maturity)?;
        Ok(Self {
            ccy: ccy.into(),
            asset: asset.into(),
            strike_rate,
            strike_date,
            maturity,
            option_type,
            track: String::new(),
            prior: PriorState::new(),
        })
    }

    /// Sets the track; expression keys and registers are prefixed with it.
    #[must_use]
    pub fn with_track(mut self, track: impl Into<String>) -> Self {
        self.track = track.into();
        self
    }

    /// Supplies values observed before the valuation date.
    #[must_use]
    pub fn with_prior_state(mut self, prior: PriorState) -> Self {
        self.prior = prior;
        self
    }

    /// Key of the strike-fixing snapper.
    #[must_use]
    pub fn fix_key(&self) -> String {
        leg_key(&self.track, ".fix_K")
    }

    /// Register holding the fixed strike level.
    #[must_use]
    pub fn strike_register(&self) -> String {
        leg_key(&self.track, ".K")
    }

    fn fixing(&self) -> Option<f64> {
        self.prior.get(STRIKE_FIXING)
    }
}

impl Contract for ForwardStartOption {
    fn events(&self) -> Vec<Event> {
        let sign = self.option_type.sign();
        let mut events = Vec::with_capacity(4);
        let strike_leg = match self.fixing() {
            Some(fixing) => Event::pay(
                &self.track,
                self.maturity,
                -self.strike_rate * fixing * sign,
                &self.ccy,
            ),
            None => {
                events.push(Event::tick(self.strike_date, self.fix_key()));
                Event::pay(
                    &self.track,
                    self.maturity,
                    -self.strike_rate * sign,
                    self.strike_register(),
                )
            }
        };
        events.push(Event::choose(&self.track, self.maturity, 0.0, &self.ccy));
        events.push(strike_leg);
        events.push(Event::pay(&self.track, self.maturity, sign, &self.asset));
        events
    }

    fn expressions(&self) -> TimetableResult<ExpressionRegistry> {
        if self.fixing().is_some() {
            return Ok(ExpressionRegistry::new());
        }
        ExpressionRegistry::new().with(
            self.fix_key(),
            Expression::snapper([self.asset.as_str()], [self.strike_register()], |inputs| {
                vec![inputs[0].to_vec()]
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use timetable_core::event::Op;

    fn fwd() -> ForwardStartOption {
        ForwardStartOption::new("USD", "SPX", 1.1, 1.0, 2.0, OptionType::Call).unwrap()
    }

    #[test]
    fn test_events() {
        let events = fwd().events();
        assert_eq!(events.len(), 4);
        assert!(events[0].is_tick());
        assert_eq!(events[0].unit, ".fix_K");
        assert_eq!(events[2].unit, ".K");
        assert_eq!(events[2].quantity, -1.1);
        assert_eq!(events[3].quantity, 1.0);
    }

    #[test]
    fn test_put_signs() {
        let put = ForwardStartOption::new("USD", "SPX", 1.1, 1.0, 2.0, OptionType::Put).unwrap();
        let events = put.events();
        assert_eq!(events[2].quantity, 1.1);
        assert_eq!(events[3].quantity, -1.0);
    }

    #[test]
    fn test_fixed_strike_from_prior_state() {
        let option = fwd().with_prior_state(PriorState::new().with(STRIKE_FIXING, 4000.0));
        let events = option.events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].op, Some(Op::Choose));
        assert_eq!(events[1].unit, "USD");
        assert!((events[1].quantity + 4400.0).abs() < 1e-9);
        assert!(option.expressions().unwrap().is_empty());
        assert!(option.timetable().is_ok());
    }

    #[test]
    fn test_strike_after_maturity_rejected() {
        assert!(ForwardStartOption::new("USD", "SPX", 1.0, 2.0, 1.0, OptionType::Call).is_err());
    }
}
