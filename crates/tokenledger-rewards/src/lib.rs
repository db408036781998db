//! tokenledger-rewards
//!
//! Read-only query layer over reward accruals and the module reward pool.

pub mod query;

pub use query::{RewardFilter, RewardQuery};
