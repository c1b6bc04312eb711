//! Bond contracts.
//!
//! - [`ZeroCouponBond`]: single principal payment
//! - [`BondOption`]: call or put on a zero coupon bond, with [`BondCall`]
//!   and [`BondPut`] fixing the direction
//! - [`FixedCashFlows`]: known single-currency flows, built column-wise
//! - [`FixedBond`]: fixed coupons over a caller-supplied schedule

mod fixed;
mod zero;

pub use fixed::{FixedBond, FixedCashFlows};
pub use zero::{BondCall, BondOption, BondOptionType, BondPut, ZeroCouponBond};
