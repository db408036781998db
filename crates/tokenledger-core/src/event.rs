use serde::{Deserialize, Serialize};

use crate::types::Amount;

/// Domain events returned alongside operation responses. The surrounding
/// execution pipeline decides where they are published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    DailyRollup {
        date: String,
        timezone: String,
    },
    RecoveryQueued {
        id: u64,
        denom: String,
        from_address: String,
        to_address: String,
        amount: Amount,
        execute_after: u64,
    },
    RecoveryExecuted {
        id: u64,
        denom: String,
        from_address: String,
        to_address: String,
        amount: Amount,
        executed_at: u64,
    },
    RecoveryCancelled {
        id: u64,
        denom: String,
        cancelled_at: u64,
        reason: String,
    },
}
