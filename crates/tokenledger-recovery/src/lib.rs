//! tokenledger-recovery
//!
//! Read-only query layer over the recovery operation audit trail.

pub mod query;

pub use query::{RecoveryFilter, RecoveryQuery};
