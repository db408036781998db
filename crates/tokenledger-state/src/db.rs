use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use tokenledger_core::address;
use tokenledger_core::error::LedgerError;
use tokenledger_core::recovery::RecoveryOperation;
use tokenledger_core::rewards::{AllowlistEntry, MerchantAllocation, RewardAccrual};
use tokenledger_core::token::{DenomMetadata, VerifiedToken};
use tokenledger_core::types::Balance;

const META_ROLLUP_WATERMARK: &str = "last_daily_rollup_date";
const META_RECOVERY_SEQ: &str = "recovery_seq";

/// Persistent module state backed by sled (pure-Rust, no C dependencies).
///
/// Named trees (analogous to column families):
///   tokens               — denom bytes        → bincode(VerifiedToken)
///   recovery_ops         — u64 big-endian     → bincode(RecoveryOperation)
///   reward_accruals      — "address|denom"    → bincode(RewardAccrual)
///   merchant_allocations — "date|denom"       → bincode(MerchantAllocation)
///   creator_allowlist    — address bytes      → bincode(AllowlistEntry)
///   balances             — "address|denom"    → u128 big-endian
///   denom_metadata       — base denom bytes   → bincode(DenomMetadata)
///   meta                 — utf8 key bytes     → raw bytes
pub struct StateDb {
    _db: sled::Db,
    tokens: sled::Tree,
    recovery_ops: sled::Tree,
    reward_accruals: sled::Tree,
    merchant_allocations: sled::Tree,
    creator_allowlist: sled::Tree,
    balances: sled::Tree,
    denom_metadata: sled::Tree,
    meta: sled::Tree,
}

fn storage_err(e: sled::Error) -> LedgerError {
    LedgerError::Storage(e.to_string())
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, LedgerError> {
    bincode::deserialize(bytes).map_err(|e| LedgerError::Serialization(e.to_string()))
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, LedgerError> {
    bincode::serialize(value).map_err(|e| LedgerError::Serialization(e.to_string()))
}

fn get_record<T: DeserializeOwned>(tree: &sled::Tree, key: &[u8]) -> Result<Option<T>, LedgerError> {
    match tree.get(key).map_err(storage_err)? {
        Some(bytes) => Ok(Some(decode(&bytes)?)),
        None => Ok(None),
    }
}

fn put_record<T: Serialize>(tree: &sled::Tree, key: &[u8], value: &T) -> Result<(), LedgerError> {
    tree.insert(key, encode(value)?).map_err(storage_err)?;
    Ok(())
}

fn iter_records<T: DeserializeOwned>(tree: &sled::Tree) -> Result<Vec<T>, LedgerError> {
    let mut out = Vec::new();
    for item in tree.iter() {
        let (_, bytes) = item.map_err(storage_err)?;
        out.push(decode(&bytes)?);
    }
    Ok(out)
}

fn balance_key(address: &str, denom: &str) -> Vec<u8> {
    format!("{address}|{denom}").into_bytes()
}

impl StateDb {
    /// Open or create the state database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LedgerError> {
        let db = sled::open(path).map_err(storage_err)?;
        let open = |name: &str| db.open_tree(name).map_err(storage_err);
        Ok(Self {
            tokens: open("tokens")?,
            recovery_ops: open("recovery_ops")?,
            reward_accruals: open("reward_accruals")?,
            merchant_allocations: open("merchant_allocations")?,
            creator_allowlist: open("creator_allowlist")?,
            balances: open("balances")?,
            denom_metadata: open("denom_metadata")?,
            meta: open("meta")?,
            _db: db,
        })
    }

    // ── Verified tokens ──────────────────────────────────────────────────────

    pub fn get_token(&self, denom: &str) -> Result<Option<VerifiedToken>, LedgerError> {
        get_record(&self.tokens, denom.as_bytes())
    }

    pub fn put_token(&self, token: &VerifiedToken) -> Result<(), LedgerError> {
        put_record(&self.tokens, token.denom.as_bytes(), token)
    }

    pub fn remove_token(&self, denom: &str) -> Result<(), LedgerError> {
        self.tokens.remove(denom.as_bytes()).map_err(storage_err)?;
        Ok(())
    }

    /// All tokens in denom key order.
    pub fn iter_tokens(&self) -> Result<Vec<VerifiedToken>, LedgerError> {
        iter_records(&self.tokens)
    }

    // ── Recovery operations ──────────────────────────────────────────────────

    pub fn get_recovery_op(&self, id: u64) -> Result<Option<RecoveryOperation>, LedgerError> {
        get_record(&self.recovery_ops, &id.to_be_bytes())
    }

    pub fn put_recovery_op(&self, op: &RecoveryOperation) -> Result<(), LedgerError> {
        put_record(&self.recovery_ops, &op.id.to_be_bytes(), op)
    }

    /// All recovery operations in id order.
    pub fn iter_recovery_ops(&self) -> Result<Vec<RecoveryOperation>, LedgerError> {
        iter_records(&self.recovery_ops)
    }

    /// Next recovery sequence id, starting at 1. Callers run sequentially,
    /// so read-increment-write needs no coordination.
    pub fn next_recovery_id(&self) -> Result<u64, LedgerError> {
        let next = match self.meta.get(META_RECOVERY_SEQ).map_err(storage_err)? {
            Some(bytes) => {
                let mut arr = [0u8; 8];
                arr.copy_from_slice(&bytes);
                u64::from_be_bytes(arr) + 1
            }
            None => 1,
        };
        self.meta
            .insert(META_RECOVERY_SEQ, next.to_be_bytes().to_vec())
            .map_err(storage_err)?;
        Ok(next)
    }

    // ── Reward accruals ──────────────────────────────────────────────────────

    pub fn get_accrual(&self, key: &str) -> Result<Option<RewardAccrual>, LedgerError> {
        get_record(&self.reward_accruals, key.as_bytes())
    }

    pub fn put_accrual(&self, record: &RewardAccrual) -> Result<(), LedgerError> {
        put_record(&self.reward_accruals, record.key.as_bytes(), record)
    }

    pub fn remove_accrual(&self, key: &str) -> Result<(), LedgerError> {
        self.reward_accruals
            .remove(key.as_bytes())
            .map_err(storage_err)?;
        Ok(())
    }

    pub fn iter_accruals(&self) -> Result<Vec<RewardAccrual>, LedgerError> {
        iter_records(&self.reward_accruals)
    }

    // ── Merchant allocations ─────────────────────────────────────────────────

    pub fn get_allocation(&self, key: &str) -> Result<Option<MerchantAllocation>, LedgerError> {
        get_record(&self.merchant_allocations, key.as_bytes())
    }

    pub fn has_allocation(&self, key: &str) -> Result<bool, LedgerError> {
        self.merchant_allocations
            .contains_key(key.as_bytes())
            .map_err(storage_err)
    }

    pub fn put_allocation(&self, record: &MerchantAllocation) -> Result<(), LedgerError> {
        put_record(&self.merchant_allocations, record.key.as_bytes(), record)
    }

    pub fn iter_allocations(&self) -> Result<Vec<MerchantAllocation>, LedgerError> {
        iter_records(&self.merchant_allocations)
    }

    // ── Creator allowlist ────────────────────────────────────────────────────

    pub fn get_allowlist_entry(&self, address: &str) -> Result<Option<AllowlistEntry>, LedgerError> {
        get_record(&self.creator_allowlist, address.as_bytes())
    }

    pub fn put_allowlist_entry(&self, entry: &AllowlistEntry) -> Result<(), LedgerError> {
        put_record(&self.creator_allowlist, entry.address.as_bytes(), entry)
    }

    pub fn remove_allowlist_entry(&self, address: &str) -> Result<(), LedgerError> {
        self.creator_allowlist
            .remove(address.as_bytes())
            .map_err(storage_err)?;
        Ok(())
    }

    pub fn iter_allowlist(&self) -> Result<Vec<AllowlistEntry>, LedgerError> {
        iter_records(&self.creator_allowlist)
    }

    // ── Denom metadata ───────────────────────────────────────────────────────

    pub fn put_denom_metadata(&self, metadata: &DenomMetadata) -> Result<(), LedgerError> {
        put_record(&self.denom_metadata, metadata.base.as_bytes(), metadata)
    }

    pub fn get_denom_metadata(&self, base: &str) -> Result<Option<DenomMetadata>, LedgerError> {
        get_record(&self.denom_metadata, base.as_bytes())
    }

    // ── Bank primitives ──────────────────────────────────────────────────────
    //
    // The transfer/minting surface the policy engine is allowed to touch.
    // Amounts never silently clamp: a short balance is a hard error.

    pub fn balance_of(&self, address: &str, denom: &str) -> Result<Balance, LedgerError> {
        match self
            .balances
            .get(balance_key(address, denom))
            .map_err(storage_err)?
        {
            Some(bytes) => {
                let mut arr = [0u8; 16];
                arr.copy_from_slice(&bytes);
                Ok(Balance::from_be_bytes(arr))
            }
            None => Ok(0),
        }
    }

    fn set_balance(&self, address: &str, denom: &str, amount: Balance) -> Result<(), LedgerError> {
        self.balances
            .insert(balance_key(address, denom), amount.to_be_bytes().to_vec())
            .map_err(storage_err)?;
        Ok(())
    }

    /// Mint new supply directly into the module pool account.
    pub fn mint_to_module(&self, denom: &str, amount: Balance) -> Result<(), LedgerError> {
        let module = address::module_address();
        let balance = self.balance_of(&module, denom)?;
        self.set_balance(&module, denom, balance + amount)
    }

    /// Move `amount` of `denom` between accounts. Fails loudly when the
    /// source balance is short; no partial movement.
    pub fn transfer(
        &self,
        from: &str,
        to: &str,
        denom: &str,
        amount: Balance,
    ) -> Result<(), LedgerError> {
        let from_balance = self.balance_of(from, denom)?;
        if from_balance < amount {
            return Err(LedgerError::InsufficientFunds {
                address: from.to_string(),
                denom: denom.to_string(),
                need: amount,
                have: from_balance,
            });
        }
        let to_balance = self.balance_of(to, denom)?;
        self.set_balance(from, denom, from_balance - amount)?;
        self.set_balance(to, denom, to_balance + amount)?;
        Ok(())
    }

    // ── Daily rollup watermark ───────────────────────────────────────────────

    pub fn rollup_watermark(&self) -> Result<Option<String>, LedgerError> {
        match self.meta.get(META_ROLLUP_WATERMARK).map_err(storage_err)? {
            Some(bytes) => {
                let s = String::from_utf8(bytes.to_vec())
                    .map_err(|e| LedgerError::Serialization(e.to_string()))?;
                Ok(Some(s))
            }
            None => Ok(None),
        }
    }

    pub fn set_rollup_watermark(&self, date: &str) -> Result<(), LedgerError> {
        self.meta
            .insert(META_ROLLUP_WATERMARK, date.as_bytes())
            .map_err(storage_err)?;
        Ok(())
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> Result<(), LedgerError> {
        self._db.flush().map_err(storage_err)?;
        Ok(())
    }
}
