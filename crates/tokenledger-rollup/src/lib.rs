//! tokenledger-rollup
//!
//! The daily rollup clock. A single watermark (the last rolled local date)
//! turns repeated begin-block style calls into exactly one event per civil
//! day in the configured timezone, no matter how often the tick fires or
//! where UTC midnight falls.

pub mod clock;

pub use clock::{run_daily_rollup, status, RollupStatus};
