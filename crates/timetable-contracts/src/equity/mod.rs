//! Equity contracts.
//!
//! - [`VanillaOption`]: European call or put
//! - [`KnockOutOption`]: vanilla cancelled on a barrier breach
//! - [`ForwardStartOption`]: strike fixed on a future date
//! - [`AccumulatorCliquet`]: capped and floored periodic returns
//! - [`AutoCallable`] / [`ReverseConvertible`]: autocallable notes
//! - [`RainbowOption`]: best-of or worst-of several assets

mod autocall;
mod barrier;
mod cliquet;
mod forward;
mod rainbow;
mod vanilla;

pub use autocall::{AutoCallable, ReverseConvertible};
pub use barrier::{BarrierType, KnockOutOption};
pub use cliquet::{AccumulatorCliquet, LAST_ACC, LAST_FIX};
pub use forward::{ForwardStartOption, STRIKE_FIXING};
pub use rainbow::RainbowOption;
pub use vanilla::{OptionType, VanillaOption};
