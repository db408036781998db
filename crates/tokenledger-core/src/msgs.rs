//! Request/response pairs for every exposed operation. The engine consumes
//! these after the surrounding pipeline has verified transaction signatures;
//! `creator` is always the verified signer address.

use serde::{Deserialize, Serialize};

use crate::denom::DenomInput;
use crate::recovery::RecoveryStatus;
use crate::types::{Amount, Bps};

// ── Token lifecycle ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTokenMsg {
    pub creator: String,
    /// Defaults to the creator when absent.
    pub issuer: Option<String>,
    pub denom: DenomInput,
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub website: String,
    pub max_supply: Amount,
    pub verified: bool,
    pub seizure_opt_in: bool,
    pub recovery_group_policy: String,
    pub recovery_timelock_hours: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTokenResponse {
    pub denom: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTokenMsg {
    pub creator: String,
    pub denom: DenomInput,
    pub issuer: String,
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub website: String,
    pub max_supply: Amount,
    pub verified: bool,
    pub seizure_opt_in: bool,
    pub recovery_group_policy: String,
    pub recovery_timelock_hours: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteTokenMsg {
    pub creator: String,
    pub denom: DenomInput,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintTokenMsg {
    pub creator: String,
    pub denom: String,
    pub recipient: String,
    pub amount: Amount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenounceTokenAdminMsg {
    pub creator: String,
    pub denom: DenomInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenounceTokenAdminResponse {
    pub denom: String,
    pub admin_renounced: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetMerchantRoutingMsg {
    pub creator: String,
    pub denom: DenomInput,
    pub stakers_bps: Bps,
    pub treasury_bps: Bps,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetMerchantRoutingResponse {
    pub denom: String,
    pub stakers_bps: Bps,
    pub treasury_bps: Bps,
}

// ── Recovery timelock ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueRecoveryMsg {
    pub creator: String,
    pub denom: String,
    pub from_address: String,
    pub to_address: String,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueRecoveryResponse {
    pub id: u64,
    pub status: RecoveryStatus,
    pub execute_after: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteRecoveryMsg {
    pub creator: String,
    pub id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteRecoveryResponse {
    pub id: u64,
    pub executed_at: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelRecoveryMsg {
    pub creator: String,
    pub id: u64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelRecoveryResponse {
    pub id: u64,
    pub status: RecoveryStatus,
    pub cancelled_at: u64,
}

// ── Merchant allocations ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordMerchantAllocationMsg {
    pub creator: String,
    /// `YYYY-MM-DD`; defaults to today in the configured rollup timezone.
    pub date: String,
    pub denom: String,
    pub activity_score: u64,
    pub bucket_c_amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMerchantAllocationResponse {
    pub key: String,
    pub date: String,
    pub denom: String,
    pub stakers_amount: Amount,
    pub treasury_amount: Amount,
    pub stakers_bps: Bps,
    pub treasury_bps: Bps,
    /// True when a record already existed for this (date, denom).
    pub updated: bool,
}

// ── Reward accruals ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordRewardAccrualMsg {
    pub creator: String,
    pub address: String,
    pub denom: String,
    pub amount: Amount,
    /// `YYYY-MM-DD`; defaults to today in the configured rollup timezone.
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRewardAccrualResponse {
    pub key: String,
    pub address: String,
    pub denom: String,
    pub amount_added: Amount,
    pub total_amount: Amount,
    pub rollup_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimRewardMsg {
    pub creator: String,
    pub denom: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRewardResponse {
    pub address: String,
    pub denom: String,
    pub amount_claimed: Amount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundRewardPoolMsg {
    pub creator: String,
    pub denom: String,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundRewardPoolResponse {
    pub module_address: String,
    pub denom: String,
    pub amount_funded: Amount,
    pub new_balance: u128,
}

// ── Creator allowlist ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllowlistMsg {
    pub creator: String,
    pub address: String,
    pub enabled: bool,
}
