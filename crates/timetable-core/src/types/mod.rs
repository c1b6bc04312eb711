//! Domain types shared by timetable producers.
//!
//! - [`Date`]: Calendar date used to author contract schedules

mod date;

pub use date::Date;
