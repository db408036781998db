use serde::{Deserialize, Serialize};

use tokenledger_core::error::LedgerError;
use tokenledger_core::pagination::{paginate, PageRequest, PageResponse};
use tokenledger_core::rewards::{allocation_key, AllowlistEntry, MerchantAllocation};
use tokenledger_core::token::VerifiedToken;
use tokenledger_state::StateDb;

/// Equality filter over verified tokens. `None` fields match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenFilter {
    pub creator: Option<String>,
    pub issuer: Option<String>,
    pub verified: Option<bool>,
    pub seizure_opt_in: Option<bool>,
}

impl TokenFilter {
    fn matches(&self, token: &VerifiedToken) -> bool {
        self.creator.as_deref().is_none_or(|c| c == token.creator)
            && self.issuer.as_deref().is_none_or(|i| i == token.issuer)
            && self.verified.is_none_or(|v| v == token.verified)
            && self
                .seizure_opt_in
                .is_none_or(|s| s == token.seizure_opt_in)
    }
}

pub struct TokenQuery<'a> {
    pub db: &'a StateDb,
}

impl<'a> TokenQuery<'a> {
    pub fn new(db: &'a StateDb) -> Self {
        Self { db }
    }

    pub fn get(&self, denom: &str) -> Result<VerifiedToken, LedgerError> {
        // legacy 0/0 routing reads as the default split
        let mut token = self
            .db
            .get_token(denom)?
            .ok_or_else(|| LedgerError::TokenNotFound(denom.to_string()))?;
        token.normalize_merchant_routing();
        Ok(token)
    }

    pub fn list(
        &self,
        page: Option<&PageRequest>,
    ) -> Result<(Vec<VerifiedToken>, PageResponse), LedgerError> {
        self.filter(&TokenFilter::default(), page)
    }

    pub fn filter(
        &self,
        filter: &TokenFilter,
        page: Option<&PageRequest>,
    ) -> Result<(Vec<VerifiedToken>, PageResponse), LedgerError> {
        let mut tokens = self.db.iter_tokens()?;
        for token in &mut tokens {
            token.normalize_merchant_routing();
        }
        tokens.retain(|t| filter.matches(t));
        paginate(&tokens, page)
    }
}

/// Equality filter over merchant allocations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AllocationFilter {
    pub date: Option<String>,
    pub denom: Option<String>,
}

pub struct AllocationQuery<'a> {
    pub db: &'a StateDb,
}

impl<'a> AllocationQuery<'a> {
    pub fn new(db: &'a StateDb) -> Self {
        Self { db }
    }

    pub fn get(&self, date: &str, denom: &str) -> Result<MerchantAllocation, LedgerError> {
        let key = allocation_key(date, denom);
        self.db
            .get_allocation(&key)?
            .ok_or_else(|| LedgerError::InvalidRequest(format!("no merchant allocation for {key}")))
    }

    pub fn filter(
        &self,
        filter: &AllocationFilter,
        page: Option<&PageRequest>,
    ) -> Result<(Vec<MerchantAllocation>, PageResponse), LedgerError> {
        let mut records = self.db.iter_allocations()?;
        records.retain(|r| {
            filter.date.as_deref().is_none_or(|d| d == r.date)
                && filter.denom.as_deref().is_none_or(|d| d == r.denom)
        });
        paginate(&records, page)
    }

    pub fn list(
        &self,
        page: Option<&PageRequest>,
    ) -> Result<(Vec<MerchantAllocation>, PageResponse), LedgerError> {
        self.filter(&AllocationFilter::default(), page)
    }
}

pub struct AllowlistQuery<'a> {
    pub db: &'a StateDb,
}

impl<'a> AllowlistQuery<'a> {
    pub fn new(db: &'a StateDb) -> Self {
        Self { db }
    }

    pub fn get(&self, address: &str) -> Result<AllowlistEntry, LedgerError> {
        self.db
            .get_allowlist_entry(address)?
            .ok_or_else(|| LedgerError::AllowlistNotFound(address.to_string()))
    }

    pub fn list(
        &self,
        page: Option<&PageRequest>,
    ) -> Result<(Vec<AllowlistEntry>, PageResponse), LedgerError> {
        let entries = self.db.iter_allowlist()?;
        paginate(&entries, page)
    }
}
