use serde::{Deserialize, Serialize};

use crate::params::{
    DEFAULT_MERCHANT_INCENTIVE_STAKERS_BPS, DEFAULT_MERCHANT_INCENTIVE_TREASURY_BPS,
};
use crate::types::{Amount, Bps};

/// A capped, policy-governed token record. One per unique denom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiedToken {
    /// Canonical `factory/{issuer}/{subdenom}` denom. Unique key.
    pub denom: String,
    /// Issuer address embedded in the denom. Immutable after creation.
    pub issuer: String,
    /// Account that created the record; the token owner for gated ops.
    pub creator: String,
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub website: String,
    pub max_supply: Amount,
    pub minted_supply: Amount,
    pub verified: bool,
    /// Permits governed, time-locked involuntary transfers (recovery).
    pub seizure_opt_in: bool,
    /// Group-authority address empowered to drive recovery operations.
    /// Empty unless seizure is enabled.
    pub recovery_group_policy: String,
    pub recovery_timelock_hours: u64,
    /// Once renounced, cap and recovery settings are frozen forever.
    pub admin_renounced: bool,
    pub merchant_incentive_stakers_bps: Bps,
    pub merchant_incentive_treasury_bps: Bps,
}

impl VerifiedToken {
    /// Legacy records predate per-token routing and carry 0/0; treat them
    /// as the default 5000/5000 split before any computation.
    pub fn normalize_merchant_routing(&mut self) {
        if self.merchant_incentive_stakers_bps == 0 && self.merchant_incentive_treasury_bps == 0 {
            self.merchant_incentive_stakers_bps = DEFAULT_MERCHANT_INCENTIVE_STAKERS_BPS;
            self.merchant_incentive_treasury_bps = DEFAULT_MERCHANT_INCENTIVE_TREASURY_BPS;
        }
    }
}

/// Derived denom metadata registered with the ledger's metadata service
/// when a token is created or updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenomMetadata {
    /// Base unit: the full tokenfactory denom, exponent 0.
    pub base: String,
    /// Display unit: the bare subdenom.
    pub display: String,
    pub display_exponent: u32,
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub uri: String,
}
