//! Interest rate contracts.
//!
//! Swap payments live on a `{track}.swp` track; swaption exercises live on
//! `{track}.opt` and choose one unit of the swap track.

mod swap;
mod swaption;

pub use swap::{simple_swap_period, Swap};
pub use swaption::{BermudaSwaption, Swaption};
