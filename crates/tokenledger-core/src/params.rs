use serde::{Deserialize, Serialize};

use crate::constants::TOTAL_BPS;
use crate::date;
use crate::error::LedgerError;
use crate::types::Bps;

/// Who may create verified tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreationMode {
    AdminOnly,
    Allowlisted,
    Permissionless,
}

/// Network tier selecting the minimum recovery timelock. An explicit
/// configuration value; the chain-id substring heuristic survives only as
/// the `from_chain_id` constructor for operators migrating old configs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkTier {
    Mainnet,
    Testnet,
}

impl NetworkTier {
    /// Legacy heuristic: an empty chain id or one containing "testnet" or
    /// "localnet" (case-insensitive) is a testnet.
    pub fn from_chain_id(chain_id: &str) -> Self {
        let id = chain_id.to_lowercase();
        if id.is_empty() || id.contains("testnet") || id.contains("localnet") {
            NetworkTier::Testnet
        } else {
            NetworkTier::Mainnet
        }
    }
}

/// Module configuration, read-only to the state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Params {
    pub creation_mode: CreationMode,
    pub daily_rollup_timezone: String,
    pub testnet_timelock_hours: u64,
    pub mainnet_timelock_hours: u64,
    pub fee_split_validator_bps: Bps,
    pub fee_split_token_stakers_bps: Bps,
    pub fee_split_merchant_pool_bps: Bps,
    pub seizure_opt_in_default: bool,
}

pub const DEFAULT_DAILY_ROLLUP_TIMEZONE: &str = "America/Edmonton";
pub const DEFAULT_TESTNET_TIMELOCK_HOURS: u64 = 1;
pub const DEFAULT_MAINNET_TIMELOCK_HOURS: u64 = 24;
pub const DEFAULT_FEE_SPLIT_VALIDATOR_BPS: Bps = 7000;
pub const DEFAULT_FEE_SPLIT_TOKEN_STAKERS_BPS: Bps = 2000;
pub const DEFAULT_FEE_SPLIT_MERCHANT_POOL_BPS: Bps = 1000;

/// Default per-token share of the merchant incentive bucket routed to stakers.
pub const DEFAULT_MERCHANT_INCENTIVE_STAKERS_BPS: Bps = 5000;
/// Default per-token share routed to the merchant treasury.
pub const DEFAULT_MERCHANT_INCENTIVE_TREASURY_BPS: Bps = 5000;

impl Default for Params {
    fn default() -> Self {
        Self {
            creation_mode: CreationMode::AdminOnly,
            daily_rollup_timezone: DEFAULT_DAILY_ROLLUP_TIMEZONE.to_string(),
            testnet_timelock_hours: DEFAULT_TESTNET_TIMELOCK_HOURS,
            mainnet_timelock_hours: DEFAULT_MAINNET_TIMELOCK_HOURS,
            fee_split_validator_bps: DEFAULT_FEE_SPLIT_VALIDATOR_BPS,
            fee_split_token_stakers_bps: DEFAULT_FEE_SPLIT_TOKEN_STAKERS_BPS,
            fee_split_merchant_pool_bps: DEFAULT_FEE_SPLIT_MERCHANT_POOL_BPS,
            seizure_opt_in_default: false,
        }
    }
}

impl Params {
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.daily_rollup_timezone.is_empty() {
            return Err(LedgerError::Config(
                "daily rollup timezone cannot be empty".into(),
            ));
        }
        date::load_timezone(&self.daily_rollup_timezone)?;

        if self.testnet_timelock_hours == 0 {
            return Err(LedgerError::Config(
                "testnet timelock must be greater than zero".into(),
            ));
        }
        if self.mainnet_timelock_hours == 0 {
            return Err(LedgerError::Config(
                "mainnet timelock must be greater than zero".into(),
            ));
        }
        if self.mainnet_timelock_hours < self.testnet_timelock_hours {
            return Err(LedgerError::Config(
                "mainnet timelock must be greater than or equal to testnet timelock".into(),
            ));
        }

        for bps in [
            self.fee_split_validator_bps,
            self.fee_split_token_stakers_bps,
            self.fee_split_merchant_pool_bps,
        ] {
            if bps > TOTAL_BPS {
                return Err(LedgerError::Config("fee split component exceeds 100%".into()));
            }
        }
        let total = self.fee_split_validator_bps
            + self.fee_split_token_stakers_bps
            + self.fee_split_merchant_pool_bps;
        if total != TOTAL_BPS {
            return Err(LedgerError::Config(format!(
                "fee split bps must total {TOTAL_BPS}, got {total}"
            )));
        }

        Ok(())
    }

    /// Minimum recovery timelock hours for the given network tier.
    pub fn min_recovery_timelock_hours(&self, tier: NetworkTier) -> u64 {
        match tier {
            NetworkTier::Mainnet => self.mainnet_timelock_hours,
            NetworkTier::Testnet => self.testnet_timelock_hours,
        }
    }
}

/// Validate a per-token merchant incentive routing split.
pub fn validate_merchant_routing(stakers_bps: Bps, treasury_bps: Bps) -> Result<(), LedgerError> {
    if stakers_bps > TOTAL_BPS {
        return Err(LedgerError::MerchantRouting(
            "merchant incentive stakers bps exceeds 100%".into(),
        ));
    }
    if treasury_bps > TOTAL_BPS {
        return Err(LedgerError::MerchantRouting(
            "merchant incentive treasury bps exceeds 100%".into(),
        ));
    }
    if stakers_bps + treasury_bps != TOTAL_BPS {
        return Err(LedgerError::MerchantRouting(format!(
            "merchant incentive routing bps must total {TOTAL_BPS}"
        )));
    }
    Ok(())
}
