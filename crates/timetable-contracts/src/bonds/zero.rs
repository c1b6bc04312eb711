//! Zero coupon bonds and options on them.

use serde::{Deserialize, Serialize};
use timetable_core::contract::Contract;
use timetable_core::event::{Event, EventTime};

use crate::error::ContractResult;
use crate::schedule::check_not_after;

/// A zero coupon bond paying `notional` units of `ccy` at maturity.
///
/// # Example
///
/// ```rust
/// use timetable_contracts::bonds::ZeroCouponBond;
/// use timetable_core::prelude::*;
///
/// let bond = ZeroCouponBond::new("USD", Date::from_ymd(2025, 3, 31).unwrap());
/// let tt = bond.timetable().unwrap();
/// assert_eq!(tt.events().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZeroCouponBond {
    ccy: String,
    maturity: EventTime,
    notional: f64,
    track: String,
}

impl ZeroCouponBond {
    /// Creates a bond with a notional of one.
    pub fn new(ccy: impl Into<String>, maturity: impl Into<EventTime>) -> Self {
        Self {
            ccy: ccy.into(),
            maturity: maturity.into(),
            notional: 1.0,
            track: String::new(),
        }
    }

    /// Sets the notional.
    #[must_use]
    pub fn with_notional(mut self, notional: f64) -> Self {
        self.notional = notional;
        self
    }

    /// Sets the track.
    #[must_use]
    pub fn with_track(mut self, track: impl Into<String>) -> Self {
        self.track = track.into();
        self
    }

    /// Maturity time.
    #[must_use]
    pub fn maturity(&self) -> EventTime {
        self.maturity
    }
}

impl Contract for ZeroCouponBond {
    fn events(&self) -> Vec<Event> {
        vec![Event::pay(&self.track, self.maturity, self.notional, &self.ccy)]
    }
}

/// Whether a bond option buys or sells the bond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BondOptionType {
    /// Right to buy the bond for the strike.
    Call,
    /// Right to sell the bond for the strike.
    Put,
}

impl BondOptionType {
    fn sign(self) -> f64 {
        match self {
            BondOptionType::Call => 1.0,
            BondOptionType::Put => -1.0,
        }
    }
}

/// A European option on a zero coupon bond of notional one.
///
/// At option maturity the holder chooses between nothing and exchanging the
/// strike for the bond's payment at bond maturity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondOption {
    ccy: String,
    option_type: BondOptionType,
    option_maturity: EventTime,
    bond_maturity: EventTime,
    strike: f64,
    track: String,
}

impl BondOption {
    /// Creates a bond option.
    ///
    /// # Errors
    ///
    /// Fails if the option expires after the bond or the times mix kinds.
    pub fn new(
        ccy: impl Into<String>,
        option_type: BondOptionType,
        option_maturity: impl Into<EventTime>,
        bond_maturity: impl Into<EventTime>,
        strike: f64,
    ) -> ContractResult<Self> {
        let option_maturity = option_maturity.into();
        let bond_maturity = bond_maturity.into();
        check_not_after("option maturity", option_maturity, bond_maturity)?;
        Ok(Self {
            ccy: ccy.into(),
            option_type,
            option_maturity,
            bond_maturity,
            strike,
            track: String::new(),
        })
    }

    /// Creates a bond call.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn call(
        ccy: impl Into<String>,
        option_maturity: impl Into<EventTime>,
        bond_maturity: impl Into<EventTime>,
        strike: f64,
    ) -> ContractResult<Self> {
        Self::new(ccy, BondOptionType::Call, option_maturity, bond_maturity, strike)
    }

    /// Creates a bond put.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn put(
        ccy: impl Into<String>,
        option_maturity: impl Into<EventTime>,
        bond_maturity: impl Into<EventTime>,
        strike: f64,
    ) -> ContractResult<Self> {
        Self::new(ccy, BondOptionType::Put, option_maturity, bond_maturity, strike)
    }

    /// Sets the track.
    #[must_use]
    pub fn with_track(mut self, track: impl Into<String>) -> Self {
        self.track = track.into();
        self
    }
}

impl Contract for BondOption {
    fn events(&self) -> Vec<Event> {
        let sign = self.option_type.sign();
        vec![
            Event::choose(&self.track, self.option_maturity, 0.0, &self.ccy),
            Event::pay(&self.track, self.option_maturity, -self.strike * sign, &self.ccy),
            Event::pay(&self.track, self.bond_maturity, sign, &self.ccy),
        ]
    }
}

/// Call on a zero coupon bond.
///
/// Fixes the direction of a [`BondOption`] at the type level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BondCall(BondOption);

impl BondCall {
    /// Creates the option.
    ///
    /// # Errors
    ///
    /// See [`BondOption::new`].
    pub fn new(
        ccy: impl Into<String>,
        option_maturity: impl Into<EventTime>,
        bond_maturity: impl Into<EventTime>,
        strike: f64,
    ) -> ContractResult<Self> {
        BondOption::new(ccy, BondOptionType::Call, option_maturity, bond_maturity, strike).map(Self)
    }

    /// Sets the track.
    #[must_use]
    pub fn with_track(self, track: impl Into<String>) -> Self {
        Self(self.0.with_track(track))
    }
}

impl From<BondCall> for BondOption {
    fn from(option: BondCall) -> Self {
        option.0
    }
}

impl Contract for BondCall {
    fn events(&self) -> Vec<Event> {
        self.0.events()
    }
}

/// Put on a zero coupon bond.
///
/// Fixes the direction of a [`BondOption`] at the type level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BondPut(BondOption);

impl BondPut {
    /// Creates the option.
    ///
    /// # Errors
    ///
    /// See [`BondOption::new`].
    pub fn new(
        ccy: impl Into<String>,
        option_maturity: impl Into<EventTime>,
        bond_maturity: impl Into<EventTime>,
        strike: f64,
    ) -> ContractResult<Self> {
        BondOption::new(ccy, BondOptionType::Put, option_maturity, bond_maturity, strike).map(Self)
    }

    /// Sets the track.
    #[must_use]
    pub fn with_track(self, track: impl Into<String>) -> Self {
        Self(self.0.with_track(track))
    }
}

impl From<BondPut> for BondOption {
    fn from(option: BondPut) -> Self {
        option.0
    }
}

impl Contract for BondPut {
    fn events(&self) -> Vec<Event> {
        self.0.events()
    }
}
