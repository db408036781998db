use serde::{Deserialize, Serialize};

use crate::types::{Amount, Bps};

/// Composite key for a reward accrual record.
pub fn accrual_key(address: &str, denom: &str) -> String {
    format!("{address}|{denom}")
}

/// Composite key for a merchant allocation record.
pub fn allocation_key(date: &str, denom: &str) -> String {
    format!("{date}|{denom}")
}

/// Per (address, denom) claimable reward accumulator. Created on first
/// accrual, incremented on later ones, removed atomically on full claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardAccrual {
    pub key: String,
    pub address: String,
    pub denom: String,
    pub amount: Amount,
    pub last_rollup_date: String,
}

/// Per (date, denom) stakers/treasury split of a merchant-incentive bucket.
/// Upserted idempotently; re-recording the same key overwrites amounts
/// using the token's current bps, so late corrections are expected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantAllocation {
    pub key: String,
    pub date: String,
    pub denom: String,
    pub activity_score: u64,
    pub bucket_c_amount: Amount,
    pub stakers_amount: Amount,
    pub treasury_amount: Amount,
    /// Bps snapshot used for this computation.
    pub merchant_incentive_stakers_bps: Bps,
    pub merchant_incentive_treasury_bps: Bps,
}

/// A creator admitted (or suspended) under the `allowlisted` creation mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllowlistEntry {
    pub address: String,
    pub enabled: bool,
}
