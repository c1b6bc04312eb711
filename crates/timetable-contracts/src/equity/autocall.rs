//! Autocallable notes.
//!
//! Both notes observe the asset on a list of barrier dates and redeem early
//! when it closes above `barrier` percent of the initial spot. If never
//! called, the maturity payoff is linked to the asset below `strike` percent.
//! Amounts are quoted per 100 of notional.

use serde::{Deserialize, Serialize};
use timetable_core::contract::Contract;
use timetable_core::event::{leg_key, Event, EventTime};
use timetable_core::expression::{Expression, PhraseValue};
use timetable_core::registry::ExpressionRegistry;
use timetable_core::TimetableResult;

use crate::error::{ContractError, ContractResult};
use crate::schedule::{accrual, check_not_after, check_schedule, event_times};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct NoteTerms {
    ccy: String,
    asset: String,
    initial_spot: f64,
    strike: f64,
    accrual_start: EventTime,
    maturity: EventTime,
    barrier: f64,
    barrier_dates: Vec<EventTime>,
    cpn_rate: f64,
    track: String,
}

impl NoteTerms {
    #[allow(clippy::too_many_arguments)]
    fn new<I, T>(
        ccy: String,
        asset: String,
        initial_spot: f64,
        strike: f64,
        accrual_start: EventTime,
        maturity: EventTime,
        barrier: f64,
        barrier_dates: I,
        cpn_rate: f64,
    ) -> ContractResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<EventTime>,
    {
        if !(initial_spot.is_finite() && initial_spot > 0.0) {
            return Err(ContractError::invalid_spec(format!(
                "initial spot must be positive, got {initial_spot}"
            )));
        }
        let barrier_dates = event_times(barrier_dates);
        check_schedule("barrier_dates", &barrier_dates)?;
        check_not_after("accrual start", accrual_start, maturity)?;
        if let (Some(first), Some(last)) = (barrier_dates.first(), barrier_dates.last()) {
            check_not_after("accrual start", accrual_start, *first)?;
            check_not_after("last barrier date", *last, maturity)?;
        }
        Ok(Self {
            ccy,
            asset,
            initial_spot,
            strike,
            accrual_start,
            maturity,
            barrier,
            barrier_dates,
            cpn_rate,
            track: String::new(),
        })
    }

    fn call_key(&self) -> String {
        leg_key(&self.track, ".CALL")
    }

    fn payoff_key(&self) -> String {
        leg_key(&self.track, ".PAYOFF")
    }

    /// Call when the asset is above the barrier level.
    fn call_phrase(&self) -> Expression {
        let level = self.barrier * self.initial_spot / 100.0;
        Expression::phrase([self.asset.as_str()], move |inputs| {
            PhraseValue::Condition(inputs[0].iter().map(|s| *s > level).collect())
        })
    }

    /// Asset performance below the strike, `above` otherwise.
    fn payoff_phrase(&self, above: f64) -> Expression {
        let (initial_spot, strike) = (self.initial_spot, self.strike);
        Expression::phrase([self.asset.as_str()], move |inputs| {
            PhraseValue::Amount(
                inputs[0]
                    .iter()
                    .map(|s| {
                        let eq = s * 100.0 / initial_spot;
                        if eq < strike {
                            eq
                        } else {
                            above
                        }
                    })
                    .collect(),
            )
        })
    }

    fn payoff_event(&self) -> Event {
        Event::pay(&self.track, self.maturity, 1.0, self.payoff_key())
    }

    fn registry(&self, above: f64) -> TimetableResult<ExpressionRegistry> {
        ExpressionRegistry::new()
            .with(self.call_key(), self.call_phrase())?
            .with(self.payoff_key(), self.payoff_phrase(above))
    }
}

/// An autocallable discount certificate.
///
/// On each barrier date a `{track}.CALL` condition redeems the note at
/// `100 * exp(accrual * cpn_rate)`; otherwise the `{track}.PAYOFF` phrase is
/// paid at maturity: the asset performance if below the strike, else the
/// fully accrued redemption amount.
///
/// # Example
///
/// ```rust
/// use timetable_contracts::equity::AutoCallable;
/// use timetable_core::prelude::*;
///
/// let dates: Vec<Date> = (4..=9)
///     .map(|m| Date::from_ymd(2024, m, 1).unwrap().add_months(1).unwrap().add_days(-1))
///     .collect();
/// let note = AutoCallable::new(
///     "USD",
///     "AAPL",
///     100.0,
///     80.0,
///     Date::from_ymd(2024, 3, 31).unwrap(),
///     Date::from_ymd(2024, 9, 30).unwrap(),
///     102.0,
///     dates,
///     0.092,
/// )
/// .unwrap();
/// assert_eq!(note.timetable().unwrap().events().len(), 7);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoCallable {
    terms: NoteTerms,
    call_amounts: Vec<f64>,
    redemption: f64,
}

impl AutoCallable {
    /// Creates an autocallable note.
    ///
    /// # Errors
    ///
    /// Fails on a non-positive initial spot, an empty or unordered barrier
    /// schedule, or barrier dates outside `[accrual_start, maturity]`.
    #[allow(clippy::too_many_arguments)]
    pub fn new<I, T>(
        ccy: impl Into<String>,
        asset: impl Into<String>,
        initial_spot: f64,
        strike: f64,
        accrual_start: impl Into<EventTime>,
        maturity: impl Into<EventTime>,
        barrier: f64,
        barrier_dates: I,
        cpn_rate: f64,
    ) -> ContractResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<EventTime>,
    {
        let terms = NoteTerms::new(
            ccy.into(),
            asset.into(),
            initial_spot,
            strike,
            accrual_start.into(),
            maturity.into(),
            barrier,
            barrier_dates,
            cpn_rate,
        )?;
        let grow = |date: EventTime| -> ContractResult<f64> {
            Ok(100.0 * (accrual(terms.accrual_start, date)? * terms.cpn_rate).exp())
        };
        let call_amounts = terms
            .barrier_dates
            .iter()
            .map(|d| grow(*d))
            .collect::<ContractResult<Vec<_>>>()?;
        let redemption = grow(terms.maturity)?;
        Ok(Self {
            terms,
            call_amounts,
            redemption,
        })
    }

    /// Sets the track; expression keys are prefixed with it.
    #[must_use]
    pub fn with_track(mut self, track: impl Into<String>) -> Self {
        self.terms.track = track.into();
        self
    }

    /// Redemption amounts on each barrier date.
    #[must_use]
    pub fn call_amounts(&self) -> &[f64] {
        &self.call_amounts
    }
}

impl Contract for AutoCallable {
    fn events(&self) -> Vec<Event> {
        let t = &self.terms;
        let key = t.call_key();
        let mut events: Vec<Event> = t
            .barrier_dates
            .iter()
            .zip(&self.call_amounts)
            .map(|(date, amount)| Event::condition(&t.track, *date, &key, *amount, &t.ccy))
            .collect();
        events.push(t.payoff_event());
        events
    }

    fn expressions(&self) -> TimetableResult<ExpressionRegistry> {
        self.terms.registry(self.redemption)
    }
}

/// A callable reverse convertible.
///
/// Each observation date pays the coupon accrued since the previous one and
/// then checks the `{track}.CALL` condition, redeeming at par when called.
/// If never called the holder receives the `{track}.PAYOFF` phrase at
/// maturity: the asset performance below the strike, par otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReverseConvertible {
    terms: NoteTerms,
    coupons: Vec<f64>,
}

impl ReverseConvertible {
    /// Creates a reverse convertible.
    ///
    /// # Errors
    ///
    /// Same conditions as [`AutoCallable::new`].
    #[allow(clippy::too_many_arguments)]
    pub fn new<I, T>(
        ccy: impl Into<String>,
        asset: impl Into<String>,
        initial_spot: f64,
        strike: f64,
        accrual_start: impl Into<EventTime>,
        maturity: impl Into<EventTime>,
        barrier: f64,
        barrier_dates: I,
        cpn_rate: f64,
    ) -> ContractResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<EventTime>,
    {
        let terms = NoteTerms::new(
            ccy.into(),
            asset.into(),
            initial_spot,
            strike,
            accrual_start.into(),
            maturity.into(),
            barrier,
            barrier_dates,
            cpn_rate,
        )?;
        let mut coupons = Vec::with_capacity(terms.barrier_dates.len());
        let mut prev = terms.accrual_start;
        for date in &terms.barrier_dates {
            coupons.push(100.0 * terms.cpn_rate * accrual(prev, *date)?);
            prev = *date;
        }
        Ok(Self { terms, coupons })
    }

    /// Sets the track; expression keys are prefixed with it.
    #[must_use]
    pub fn with_track(mut self, track: impl Into<String>) -> Self {
        self.terms.track = track.into();
        self
    }

    /// Coupon paid on each observation date.
    #[must_use]
    pub fn coupons(&self) -> &[f64] {
        &self.coupons
    }
}

impl Contract for ReverseConvertible {
    fn events(&self) -> Vec<Event> {
        let t = &self.terms;
        let key = t.call_key();
        let mut events = Vec::with_capacity(2 * t.barrier_dates.len() + 1);
        for (date, coupon) in t.barrier_dates.iter().zip(&self.coupons) {
            events.push(Event::pay(&t.track, *date, *coupon, &t.ccy));
            events.push(Event::condition(&t.track, *date, &key, 100.0, &t.ccy));
        }
        events.push(t.payoff_event());
        events
    }

    fn expressions(&self) -> TimetableResult<ExpressionRegistry> {
        self.terms.registry(100.0)
    }
}
