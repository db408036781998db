//! tokenledger-state
//!
//! The persistent store and the state-transition engine. Every exposed
//! operation of the module runs through `PolicyEngine` against a sled-backed
//! `StateDb`; execution is strictly sequential, one operation at a time,
//! and each operation validates every precondition before its first write.

pub mod db;
pub mod engine;
pub mod groups;

pub use db::StateDb;
pub use engine::{EngineConfig, PolicyEngine};
pub use groups::{GroupRegistry, InMemoryGroupRegistry};
