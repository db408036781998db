use serde::{Deserialize, Serialize};

use tokenledger_core::error::LedgerError;
use tokenledger_core::pagination::{paginate, PageRequest, PageResponse};
use tokenledger_core::recovery::{RecoveryOperation, RecoveryStatus};
use tokenledger_core::types::Timestamp;
use tokenledger_state::StateDb;

/// Equality filter over recovery operations. The status field takes the
/// wire form (`queued` / `executed` / `cancelled`) and rejects anything else.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecoveryFilter {
    pub status: Option<String>,
    pub denom: Option<String>,
    pub requested_by: Option<String>,
    pub from_address: Option<String>,
    pub to_address: Option<String>,
}

pub struct RecoveryQuery<'a> {
    pub db: &'a StateDb,
}

impl<'a> RecoveryQuery<'a> {
    pub fn new(db: &'a StateDb) -> Self {
        Self { db }
    }

    pub fn get(&self, id: u64) -> Result<RecoveryOperation, LedgerError> {
        self.db
            .get_recovery_op(id)?
            .ok_or(LedgerError::RecoveryNotFound(id))
    }

    pub fn list(
        &self,
        page: Option<&PageRequest>,
    ) -> Result<(Vec<RecoveryOperation>, PageResponse), LedgerError> {
        self.filter(&RecoveryFilter::default(), page)
    }

    pub fn filter(
        &self,
        filter: &RecoveryFilter,
        page: Option<&PageRequest>,
    ) -> Result<(Vec<RecoveryOperation>, PageResponse), LedgerError> {
        let status = filter
            .status
            .as_deref()
            .map(RecoveryStatus::parse)
            .transpose()?;
        let mut ops = self.db.iter_recovery_ops()?;
        ops.retain(|op| {
            status.is_none_or(|s| s == op.status)
                && filter.denom.as_deref().is_none_or(|d| d == op.denom)
                && filter
                    .requested_by
                    .as_deref()
                    .is_none_or(|r| r == op.requested_by)
                && filter
                    .from_address
                    .as_deref()
                    .is_none_or(|f| f == op.from_address)
                && filter
                    .to_address
                    .as_deref()
                    .is_none_or(|t| t == op.to_address)
        });
        paginate(&ops, page)
    }

    /// Whether the operation is queued and its timelock has elapsed at `now`.
    pub fn can_execute(&self, id: u64, now: Timestamp) -> Result<bool, LedgerError> {
        let op = self.get(id)?;
        let now = u64::try_from(now)
            .map_err(|_| LedgerError::RecoveryBadRequest("invalid block time".into()))?;
        Ok(op.status == RecoveryStatus::Queued && now >= op.execute_after)
    }
}
