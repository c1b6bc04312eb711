//! Accumulator cliquets.

use serde::{Deserialize, Serialize};
use timetable_core::contract::Contract;
use timetable_core::event::{leg_key, Event, EventTime};
use timetable_core::expression::Expression;
use timetable_core::registry::ExpressionRegistry;
use timetable_core::state::PriorState;
use timetable_core::TimetableResult;

use crate::error::{ContractError, ContractResult};
use crate::schedule::{check_schedule, event_times};

/// Prior-state name of the last asset fixing.
pub const LAST_FIX: &str = "last_fix";

/// Prior-state name of the return accumulated so far.
pub const LAST_ACC: &str = "last_acc";

/// An accumulator cliquet.
///
/// On every fixing date after the first, the period return
/// `S / S_last - 1` is clamped to `[local_floor, local_cap]` and added to an
/// accumulator. At maturity the holder receives the accumulator, floored at
/// `global_floor`.
///
/// Events: one `{track}_INIT` tick on the first fixing date, one
/// `{track}_UPDATE` tick on each later date, then a choose against the
/// global floor and a payment of the `{track}_A` register.
///
/// When constructed mid-life, [`LAST_FIX`] and [`LAST_ACC`] in the prior
/// state seed the first tick instead of the observed asset price and zero.
///
/// # Example
///
/// ```rust
/// use timetable_contracts::equity::AccumulatorCliquet;
/// use timetable_core::prelude::*;
///
/// let cliquet = AccumulatorCliquet::new("USD", "SPX", [0.0, 0.5, 1.0, 1.5], 0.0, -0.03, 0.05)
///     .unwrap();
/// let tt = cliquet.timetable().unwrap();
/// assert_eq!(tt.events().len(), 6);
/// assert_eq!(tt.events().unit().get(0), Some("_INIT"));
/// assert_eq!(tt.events().unit().get(1), Some("_UPDATE"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccumulatorCliquet {
    ccy: String,
    asset: String,
    fix_dates: Vec<EventTime>,
    global_floor: f64,
    local_floor: f64,
    local_cap: f64,
    track: String,
    prior: PriorState,
}

impl AccumulatorCliquet {
    /// Creates a cliquet.
    ///
    /// # Errors
    ///
    /// Fails if the fixing dates are empty, unordered or of mixed kinds, if
    /// a floor or cap is not finite, or if the local floor exceeds the local
    /// cap.
    pub fn new<I, T>(
        ccy: impl Into<String>,
        asset: impl Into<String>,
        fix_dates: I,
        global_floor: f64,
        local_floor: f64,
        local_cap: f64,
    ) -> ContractResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<EventTime>,
    {
        let fix_dates = event_times(fix_dates);
        check_schedule("fix_dates", &fix_dates)?;
        for (name, value) in [
            ("global floor", global_floor),
            ("local floor", local_floor),
            ("local cap", local_cap),
        ] {
            if !value.is_finite() {
                return Err(ContractError::invalid_spec(format!("{name} must be finite, got {value}")));
            }
        }
        if local_floor > local_cap {
            return Err(ContractError::invalid_spec(format!(
                "local floor {local_floor} exceeds local cap {local_cap}"
            )));
        }
        Ok(Self {
            ccy: ccy.into(),
            asset: asset.into(),
            fix_dates,
            global_floor,
            local_floor,
            local_cap,
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

    /// Supplies [`LAST_FIX`] / [`LAST_ACC`] observed before the valuation date.
    #[must_use]
    pub fn with_prior_state(mut self, prior: PriorState) -> Self {
        self.prior = prior;
        self
    }

    /// Key of the first tick.
    #[must_use]
    pub fn init_key(&self) -> String {
        leg_key(&self.track, "_INIT")
    }

    /// Key of every later tick.
    #[must_use]
    pub fn update_key(&self) -> String {
        leg_key(&self.track, "_UPDATE")
    }

    /// Register holding the accumulated return.
    #[must_use]
    pub fn accumulator(&self) -> String {
        leg_key(&self.track, "_A")
    }

    /// Register holding the previous fixing.
    #[must_use]
    pub fn last_fixing(&self) -> String {
        leg_key(&self.track, "_S_last")
    }
}

impl Contract for AccumulatorCliquet {
    fn events(&self) -> Vec<Event> {
        let mut events = Vec::with_capacity(self.fix_dates.len() + 2);
        let init = self.init_key();
        let update = self.update_key();
        for (i, date) in self.fix_dates.iter().enumerate() {
            let key = if i == 0 { &init } else { &update };
            events.push(Event::tick(*date, key));
        }
        if let Some(maturity) = self.fix_dates.last() {
            events.push(Event::choose(&self.track, *maturity, self.global_floor, &self.ccy));
            events.push(Event::pay(&self.track, *maturity, 1.0, self.accumulator()));
        }
        events
    }

    fn expressions(&self) -> TimetableResult<ExpressionRegistry> {
        let outputs = [self.accumulator(), self.last_fixing()];
        let last_acc = self.prior.get(LAST_ACC).unwrap_or(0.0);
        let last_fix = self.prior.get(LAST_FIX);

        let init = Expression::snapper([self.asset.as_str()], outputs.clone(), move |inputs| {
            let spot = inputs[0];
            let s_last = match last_fix {
                Some(fix) => vec![fix; spot.len()],
                None => spot.to_vec(),
            };
            vec![vec![last_acc; spot.len()], s_last]
        });

        let (floor, cap) = (self.local_floor, self.local_cap);
        let update = Expression::snapper(
            [self.asset.clone(), self.last_fixing(), self.accumulator()],
            outputs,
            move |inputs| {
                let (spot, s_last, acc) = (inputs[0], inputs[1], inputs[2]);
                let acc = spot
                    .iter()
                    .zip(s_last)
                    .zip(acc)
                    .map(|((s, l), a)| a + (s / l - 1.0).clamp(floor, cap))
                    .collect();
                vec![acc, spot.to_vec()]
            },
        );

        ExpressionRegistry::new()
            .with(self.init_key(), init)?
            .with(self.update_key(), update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use timetable_core::registers::RegisterFile;

    fn cliquet() -> AccumulatorCliquet {
        AccumulatorCliquet::new("USD", "SPX", [1.0, 2.0, 3.0], 0.01, -0.03, 0.05).unwrap()
    }

    #[test]
    fn test_event_count_and_keys() {
        let events = cliquet().events();
        assert_eq!(events.len(), 5);
        assert_eq!(events[0].unit, "_INIT");
        assert!(events[1..3].iter().all(|e| e.unit == "_UPDATE" && e.is_tick()));
        assert_eq!(events[3].quantity, 0.01);
        assert_eq!(events[4].unit, "_A");
    }

    #[test]
    fn test_track_prefixes_keys() {
        let c = cliquet().with_track("CQ");
        let keys: Vec<_> = c.expressions().unwrap().keys().map(str::to_string).collect();
        assert_eq!(keys, vec!["CQ_INIT", "CQ_UPDATE"]);
        assert_eq!(c.events()[4].unit, "CQ_A");
    }

    #[test]
    fn test_local_floor_above_cap_rejected() {
        assert!(AccumulatorCliquet::new("USD", "SPX", [1.0], 0.0, 0.05, -0.03).is_err());
    }

    #[test]
    fn test_non_finite_bounds_rejected() {
        assert!(AccumulatorCliquet::new("USD", "SPX", [1.0], 0.0, f64::NAN, 0.05).is_err());
        assert!(AccumulatorCliquet::new("USD", "SPX", [1.0], 0.0, -0.03, f64::NAN).is_err());
        assert!(AccumulatorCliquet::new("USD", "SPX", [1.0], f64::INFINITY, -0.03, 0.05).is_err());
        assert!(AccumulatorCliquet::new("USD", "SPX", [1.0], f64::NAN, -0.03, 0.05).is_err());
    }

    #[test]
    fn test_accumulation_is_clamped() {
        let registry = cliquet().expressions().unwrap();
        let mut regs = RegisterFile::new(2);

        regs.observe("SPX", vec![100.0, 100.0]).unwrap();
        regs.snap("_INIT", 1.0, &registry).unwrap();
        regs.observe("SPX", vec![110.0, 99.0]).unwrap();
        regs.snap("_UPDATE", 2.0, &registry).unwrap();

        let acc = regs.get("_A").unwrap();
        assert_relative_eq!(acc[0], 0.05);
        assert_relative_eq!(acc[1], -0.01, epsilon = 1e-12);
        assert_eq!(regs.get("_S_last"), Some(&[110.0, 99.0][..]));
    }

    #[test]
    fn test_prior_state_seeds_init() {
        let registry = cliquet()
            .with_prior_state(PriorState::new().with(LAST_FIX, 90.0).with(LAST_ACC, 0.02))
            .expressions()
            .unwrap();
        let mut regs = RegisterFile::new(1);
        regs.observe("SPX", vec![100.0]).unwrap();
        regs.snap("_INIT", 1.0, &registry).unwrap();
        assert_eq!(regs.get("_S_last"), Some(&[90.0][..]));
        assert_eq!(regs.get("_A"), Some(&[0.02][..]));
    }
}
