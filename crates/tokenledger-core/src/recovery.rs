use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::types::Amount;

/// Recovery operation lifecycle. Transitions are one-way:
/// `Queued → Executed` or `Queued → Cancelled`; both terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryStatus {
    Queued,
    Executed,
    Cancelled,
}

impl fmt::Display for RecoveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecoveryStatus::Queued => "queued",
            RecoveryStatus::Executed => "executed",
            RecoveryStatus::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

impl RecoveryStatus {
    /// Parse a query-filter status string.
    pub fn parse(s: &str) -> Result<Self, LedgerError> {
        match s {
            "queued" => Ok(RecoveryStatus::Queued),
            "executed" => Ok(RecoveryStatus::Executed),
            "cancelled" => Ok(RecoveryStatus::Cancelled),
            other => Err(LedgerError::InvalidRequest(format!(
                "invalid status filter: {other}"
            ))),
        }
    }
}

/// A time-locked involuntary transfer request. Append-only audit trail:
/// records are mutated exactly once (execute or cancel) and never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryOperation {
    /// Monotonically increasing sequence id.
    pub id: u64,
    pub denom: String,
    pub from_address: String,
    pub to_address: String,
    pub amount: Amount,
    pub requested_by: String,
    /// Unix seconds; `created_at + recovery_timelock_hours * 3600`.
    pub execute_after: u64,
    pub created_at: u64,
    pub status: RecoveryStatus,
    pub executed_at: u64,
    pub cancelled_at: u64,
    pub cancel_reason: String,
}
