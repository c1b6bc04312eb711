//! # Timetable Contracts
//!
//! Instrument producers for the timetable event model.
//!
//! Every contract implements [`Contract`](timetable_core::contract::Contract):
//! it lists its events and the expressions they reference, and
//! `timetable()` validates the pair into an immutable
//! [`Timetable`](timetable_core::timetable::Timetable).
//!
//! - **Bonds**: zero coupon bonds, bond options, fixed cash flows, fixed
//!   rate bonds
//! - **Equity**: vanilla, knock-out, forward starting, cliquet, autocallable
//!   and rainbow options
//! - **Rates**: swaps, European and Bermudan swaptions
//! - **Composition**: [`Composite`](composite::Composite) for building one
//!   contract out of others
//!
//! ## Example
//!
//! ```rust
//! use timetable_contracts::prelude::*;
//! use timetable_core::prelude::*;
//!
//! let ko = KnockOutOption::from_parts(
//!     "USD",
//!     "EQ",
//!     100.0,
//!     Date::from_ymd(2024, 9, 30).unwrap(),
//!     true,
//!     102.0,
//!     "Up/Out",
//!     [
//!         Date::from_ymd(2024, 6, 30).unwrap(),
//!         Date::from_ymd(2024, 9, 30).unwrap(),
//!     ],
//! )
//! .unwrap()
//! .with_track("KO1");
//!
//! let tt = ko.timetable().unwrap();
//! assert_eq!(tt.events().len(), 5);
//! assert_eq!(tt.schema_kind(), SchemaKind::Canonical);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::float_cmp)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]

pub mod bonds;
pub mod composite;
pub mod equity;
pub mod error;
pub mod rates;
pub mod schedule;

pub use error::{ContractError, ContractResult};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bonds::{
        BondCall, BondOption, BondOptionType, BondPut, FixedBond, FixedCashFlows, ZeroCouponBond,
    };
    pub use crate::composite::Composite;
    pub use crate::equity::{
        AccumulatorCliquet, AutoCallable, BarrierType, ForwardStartOption, KnockOutOption,
        OptionType, RainbowOption, ReverseConvertible, VanillaOption, LAST_ACC, LAST_FIX,
        STRIKE_FIXING,
    };
    pub use crate::error::{ContractError, ContractResult};
    pub use crate::rates::{simple_swap_period, BermudaSwaption, Swap, Swaption};
}
