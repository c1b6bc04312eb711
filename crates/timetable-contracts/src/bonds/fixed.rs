//! Fixed cash flow streams and fixed rate bonds.

use serde::{Deserialize, Serialize};
use timetable_core::column::{Column, DictionaryArray};
use timetable_core::contract::Contract;
use timetable_core::event::{Event, EventTime, TimeKind, PAY};
use timetable_core::registry::ExpressionRegistry;
use timetable_core::table::EventTable;
use timetable_core::timetable::Timetable;
use timetable_core::TimetableResult;

use crate::error::{ContractError, ContractResult};
use crate::schedule::{accrual, check_schedule, event_times};

/// Known cash flows in a single currency.
///
/// The timetable is assembled column by column rather than event by event:
/// track, op and unit are constant dictionary columns.
///
/// # Example
///
/// ```rust
/// use timetable_contracts::bonds::FixedCashFlows;
/// use timetable_core::prelude::*;
///
/// let flows = FixedCashFlows::new(
///     "USD",
///     [
///         Date::from_ymd(2023, 12, 31).unwrap(),
///         Date::from_ymd(2024, 6, 30).unwrap(),
///         Date::from_ymd(2024, 12, 31).unwrap(),
///     ],
///     vec![0.05, 0.05, 1.05],
/// )
/// .unwrap();
/// let tt = flows.timetable().unwrap();
/// assert_eq!(tt.events().len(), 3);
/// assert_eq!(tt.events().op().dictionary(), ["+"]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedCashFlows {
    ccy: String,
    times: Vec<EventTime>,
    amounts: Vec<f64>,
    track: String,
}

impl FixedCashFlows {
    /// Creates a cash flow stream.
    ///
    /// # Errors
    ///
    /// Fails if the lists differ in length or the times are empty, unordered
    /// or of mixed kinds.
    pub fn new<I, T>(ccy: impl Into<String>, times: I, amounts: Vec<f64>) -> ContractResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<EventTime>,
    {
        let times = event_times(times);
        if times.len() != amounts.len() {
            return Err(ContractError::invalid_spec(format!(
                "{} times but {} amounts",
                times.len(),
                amounts.len()
            )));
        }
        check_schedule("times", &times)?;
        Ok(Self {
            ccy: ccy.into(),
            times,
            amounts,
            track: String::new(),
        })
    }

    /// Sets the track.
    #[must_use]
    pub fn with_track(mut self, track: impl Into<String>) -> Self {
        self.track = track.into();
        self
    }

    /// The cash flow amounts.
    #[must_use]
    pub fn amounts(&self) -> &[f64] {
        &self.amounts
    }

    fn time_column(&self) -> Column {
        match self.times.first().map(EventTime::kind) {
            Some(TimeKind::Years) => {
                Column::Float64(self.times.iter().filter_map(EventTime::as_years).collect())
            }
            _ => Column::Timestamp(
                self.times
                    .iter()
                    .filter_map(EventTime::timestamp_millis)
                    .collect(),
            ),
        }
    }
}

impl Contract for FixedCashFlows {
    fn events(&self) -> Vec<Event> {
        self.times
            .iter()
            .zip(&self.amounts)
            .map(|(time, amount)| Event::pay(&self.track, *time, *amount, &self.ccy))
            .collect()
    }

    fn timetable(&self) -> TimetableResult<Timetable> {
        let n = self.times.len();
        let table = EventTable::try_from_columns(
            DictionaryArray::constant(n, &self.track).into(),
            self.time_column(),
            DictionaryArray::constant(n, PAY).into(),
            Column::Float64(self.amounts.clone()),
            DictionaryArray::constant(n, &self.ccy).into(),
        )?;
        Timetable::from_table(table, ExpressionRegistry::new())
    }
}

/// A fixed rate bond of notional one.
///
/// Each coupon pays `coupon * accrual(previous, date)` where the first period
/// starts at `accrual_start`; the principal is added to the last payment.
/// Coupon dates come from the caller's schedule generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedBond {
    flows: FixedCashFlows,
    coupon: f64,
}

impl FixedBond {
    /// Creates a fixed rate bond.
    ///
    /// # Errors
    ///
    /// Fails if the coupon dates are empty, unordered, do not follow the
    /// accrual start, or mix time kinds.
    pub fn new<S, I, T>(
        ccy: impl Into<String>,
        coupon: f64,
        accrual_start: S,
        coupon_dates: I,
    ) -> ContractResult<Self>
    where
        S: Into<EventTime>,
        I: IntoIterator<Item = T>,
        T: Into<EventTime>,
    {
        let start = accrual_start.into();
        let dates = event_times(coupon_dates);
        check_schedule("coupon_dates", &dates)?;

        let mut schedule = Vec::with_capacity(dates.len() + 1);
        schedule.push(start);
        schedule.extend_from_slice(&dates);
        check_schedule("accrual periods", &schedule)?;

        let mut amounts = schedule
            .windows(2)
            .map(|w| accrual(w[0], w[1]).map(|frac| coupon * frac))
            .collect::<ContractResult<Vec<_>>>()?;
        if let Some(last) = amounts.last_mut() {
            *last += 1.0;
        }

        Ok(Self {
            flows: FixedCashFlows::new(ccy, dates, amounts)?,
            coupon,
        })
    }

    /// Sets the track.
    #[must_use]
    pub fn with_track(mut self, track: impl Into<String>) -> Self {
        self.flows = self.flows.with_track(track);
        self
    }

    /// Annual coupon rate.
    #[must_use]
    pub fn coupon(&self) -> f64 {
        self.coupon
    }

    /// Payment amounts, principal included in the last.
    #[must_use]
    pub fn amounts(&self) -> &[f64] {
        self.flows.amounts()
    }
}

impl Contract for FixedBond {
    fn events(&self) -> Vec<Event> {
        self.flows.events()
    }

    fn timetable(&self) -> TimetableResult<Timetable> {
        self.flows.timetable()
    }
}
