use serde::{Deserialize, Serialize};

use tokenledger_core::address;
use tokenledger_core::error::LedgerError;
use tokenledger_core::pagination::{paginate, PageRequest, PageResponse};
use tokenledger_core::rewards::{accrual_key, RewardAccrual};
use tokenledger_core::types::Balance;
use tokenledger_state::StateDb;

/// Equality filter over reward accruals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RewardFilter {
    pub address: Option<String>,
    pub denom: Option<String>,
}

pub struct RewardQuery<'a> {
    pub db: &'a StateDb,
}

impl<'a> RewardQuery<'a> {
    pub fn new(db: &'a StateDb) -> Self {
        Self { db }
    }

    pub fn get(&self, address: &str, denom: &str) -> Result<RewardAccrual, LedgerError> {
        let key = accrual_key(address, denom);
        self.db
            .get_accrual(&key)?
            .ok_or(LedgerError::AccrualNotFound(key))
    }

    pub fn list(
        &self,
        page: Option<&PageRequest>,
    ) -> Result<(Vec<RewardAccrual>, PageResponse), LedgerError> {
        self.filter(&RewardFilter::default(), page)
    }

    pub fn filter(
        &self,
        filter: &RewardFilter,
        page: Option<&PageRequest>,
    ) -> Result<(Vec<RewardAccrual>, PageResponse), LedgerError> {
        let mut records = self.db.iter_accruals()?;
        records.retain(|r| {
            filter.address.as_deref().is_none_or(|a| a == r.address)
                && filter.denom.as_deref().is_none_or(|d| d == r.denom)
        });
        paginate(&records, page)
    }

    /// Current module reward-pool balance for a denom.
    pub fn pool_balance(&self, denom: &str) -> Result<Balance, LedgerError> {
        self.db.balance_of(&address::module_address(), denom)
    }
}
