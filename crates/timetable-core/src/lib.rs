//! # Timetable Core
//!
//! The data model shared by every instrument producer and the external
//! valuation engine.
//!
//! An instrument is described as a **timetable**: an ordered stream of timed
//! events plus a registry of named expressions those events reference.
//!
//! - **Events**: `(track, time, op, quantity, unit)` rows; `"+"` pays, `">"`
//!   offers a choice, a custom op is gated by a phrase, a null op ticks a
//!   snapper
//! - **Expressions**: stateless phrases and stateful snappers, keyed by name
//! - **Schemas**: a canonical timestamp schema and a deprecated float-years
//!   schema, plus a normalizer between them
//! - **Composition**: the [`Contract`](contract::Contract) trait and
//!   [`build_timetable`](contract::build_timetable), which validate every
//!   reference at construction time
//!
//! ## Example
//!
//! ```rust
//! use timetable_core::prelude::*;
//!
//! struct Call {
//!     strike: f64,
//!     maturity: Date,
//! }
//!
//! impl Contract for Call {
//!     fn events(&self) -> Vec<Event> {
//!         vec![
//!             Event::choose("", self.maturity, 0.0, "USD"),
//!             Event::pay("", self.maturity, -self.strike, "USD"),
//!             Event::pay("", self.maturity, 1.0, "SPX"),
//!         ]
//!     }
//! }
//!
//! let call = Call { strike: 100.0, maturity: Date::from_ymd(2025, 3, 31).unwrap() };
//! let tt = build_timetable(&call).unwrap();
//! assert_eq!(tt.schema_kind(), SchemaKind::Canonical);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::float_cmp)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::type_complexity)]

pub mod column;
pub mod config;
pub mod contract;
pub mod daycounts;
pub mod error;
pub mod event;
pub mod expression;
pub mod normalize;
pub mod registers;
pub mod registry;
pub mod schema;
pub mod state;
pub mod table;
pub mod timetable;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::{BuildConfig, Validate};
    pub use crate::contract::{build_timetable, build_timetable_with, Contract};
    pub use crate::daycounts::{DayCount, Thirty360US};
    pub use crate::error::{TimetableError, TimetableResult};
    pub use crate::event::{leg_key, Event, EventTime, Op};
    pub use crate::expression::{Expression, ExpressionKind, PhraseValue};
    pub use crate::normalize::{convert_time_to_ts, MS_PER_YEAR};
    pub use crate::registers::RegisterFile;
    pub use crate::registry::ExpressionRegistry;
    pub use crate::schema::{SchemaKind, EVENT_SCHEMA, TS_EVENT_SCHEMA};
    pub use crate::state::PriorState;
    pub use crate::table::EventTable;
    pub use crate::timetable::Timetable;
    pub use crate::types::Date;
}

pub use error::{TimetableError, TimetableResult};
