//! tokenledger-token
//!
//! Read-only query layer over verified tokens, merchant allocations and the
//! creator allowlist. Filters are ANDed equality predicates applied in key
//! order before pagination.

pub mod query;

pub use query::{AllocationFilter, AllocationQuery, AllowlistQuery, TokenFilter, TokenQuery};
