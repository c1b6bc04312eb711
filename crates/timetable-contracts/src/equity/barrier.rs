//! Knock-out barrier options.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use timetable_core::contract::Contract;
use timetable_core::event::{leg_key, Event, EventTime};
use timetable_core::expression::{Expression, PhraseValue};
use timetable_core::registry::ExpressionRegistry;
use timetable_core::TimetableResult;

use crate::equity::vanilla::{OptionType, VanillaOption};
use crate::error::{ContractError, ContractResult};
use crate::schedule::{check_not_after, check_schedule, event_times};

/// Direction of a knock-out barrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BarrierType {
    /// Cancelled when the asset is below the barrier (`"Dn/Out"`).
    #[serde(rename = "Dn/Out")]
    DownOut,
    /// Cancelled when the asset is above the barrier (`"Up/Out"`).
    #[serde(rename = "Up/Out")]
    UpOut,
}

impl BarrierType {
    /// Returns true if `spot` knocks the option out.
    #[must_use]
    pub fn is_breached(self, spot: f64, barrier: f64) -> bool {
        match self {
            BarrierType::DownOut => spot < barrier,
            BarrierType::UpOut => spot > barrier,
        }
    }
}

impl FromStr for BarrierType {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Dn/Out" => Ok(BarrierType::DownOut),
            "Up/Out" => Ok(BarrierType::UpOut),
            other => Err(ContractError::invalid_spec(format!(
                "Unknown barrier type: {other}"
            ))),
        }
    }
}

impl fmt::Display for BarrierType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BarrierType::DownOut => f.write_str("Dn/Out"),
            BarrierType::UpOut => f.write_str("Up/Out"),
        }
    }
}

/// A vanilla option cancelled if the asset crosses a barrier on any
/// observation date, paying `rebate` on cancellation.
///
/// The knock-out condition events come first and the vanilla events follow,
/// all on the same track. The condition op is `{track}.ko`.
///
/// # Example
///
/// ```rust
/// use timetable_contracts::equity::{BarrierType, KnockOutOption, OptionType, VanillaOption};
/// use timetable_core::prelude::*;
///
/// let vanilla = VanillaOption::new("USD", "EQ", 100.0, 1.0, OptionType::Call);
/// let ko = KnockOutOption::new(vanilla, 102.0, "Up/Out".parse().unwrap(), [0.25, 0.5, 0.75, 1.0])
///     .unwrap();
/// let tt = ko.timetable().unwrap();
/// assert_eq!(tt.events().len(), 7);
/// assert!(tt.expressions().contains_key(".ko"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnockOutOption {
    vanilla: VanillaOption,
    barrier: f64,
    barrier_type: BarrierType,
    barrier_dates: Vec<EventTime>,
    rebate: f64,
}

impl KnockOutOption {
    /// Creates a knock-out option.
    ///
    /// # Errors
    ///
    /// Fails if the barrier dates are empty, unordered, after the option
    /// maturity or of a different time kind.
    pub fn new<I, T>(
        vanilla: VanillaOption,
        barrier: f64,
        barrier_type: BarrierType,
        barrier_dates: I,
    ) -> ContractResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<EventTime>,
    {
        let barrier_dates = event_times(barrier_dates);
        check_schedule("barrier_dates", &barrier_dates)?;
        if let Some(last) = barrier_dates.last() {
            check_not_after("last barrier date", *last, vanilla.maturity())?;
        }
        Ok(Self {
            vanilla,
            barrier,
            barrier_type,
            barrier_dates,
            rebate: 0.0,
        })
    }

    /// Convenience constructor mirroring the flat parameter list.
    ///
    /// # Errors
    ///
    /// Fails on an unknown barrier type string or an invalid schedule.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts<I, T>(
        ccy: impl Into<String>,
        asset: impl Into<String>,
        strike: f64,
        maturity: impl Into<EventTime>,
        is_call: bool,
        barrier: f64,
        barrier_type: &str,
        barrier_dates: I,
    ) -> ContractResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<EventTime>,
    {
        let barrier_type = barrier_type.parse()?;
        let vanilla = VanillaOption::new(ccy, asset, strike, maturity, OptionType::from_is_call(is_call));
        Self::new(vanilla, barrier, barrier_type, barrier_dates)
    }

    /// Sets the rebate paid at knock-out.
    #[must_use]
    pub fn with_rebate(mut self, rebate: f64) -> Self {
        self.rebate = rebate;
        self
    }

    /// Sets the track of the option and its knock-out events.
    #[must_use]
    pub fn with_track(mut self, track: impl Into<String>) -> Self {
        self.vanilla = self.vanilla.with_track(track);
        self
    }

    /// The knock-out op code.
    #[must_use]
    pub fn ko_key(&self) -> String {
        leg_key(self.vanilla.track(), ".ko")
    }
}

impl Contract for KnockOutOption {
    fn events(&self) -> Vec<Event> {
        let key = self.ko_key();
        let track = self.vanilla.track();
        let mut events: Vec<Event> = self
            .barrier_dates
            .iter()
            .map(|date| Event::condition(track, *date, &key, self.rebate, self.vanilla.ccy()))
            .collect();
        events.extend(self.vanilla.events());
        events
    }

    fn expressions(&self) -> TimetableResult<ExpressionRegistry> {
        let barrier = self.barrier;
        let barrier_type = self.barrier_type;
        let ko = Expression::phrase([self.vanilla.asset()], move |inputs| {
            PhraseValue::Condition(
                inputs[0]
                    .iter()
                    .map(|s| barrier_type.is_breached(*s, barrier))
                    .collect(),
            )
        });
        let mut registry = self.vanilla.expressions()?;
        registry.insert(self.ko_key(), ko)?;
        Ok(registry)
    }
}
