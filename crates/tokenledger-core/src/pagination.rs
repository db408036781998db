use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Cursor-based page request shared by every list and filter query.
/// `key` is an opaque cursor from a previous response and wins over
/// `offset` when both are set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub key: Option<String>,
    pub offset: u64,
    /// 0 means no limit.
    pub limit: u64,
    pub count_total: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResponse {
    /// Cursor for the next page; `None` when exhausted.
    pub next_key: Option<String>,
    /// Total matching items, when requested.
    pub total: Option<u64>,
}

/// Slice an already-filtered, key-ordered result set. The cursor is the
/// numeric index of the first item of the next page.
pub fn paginate<T: Clone>(
    items: &[T],
    page: Option<&PageRequest>,
) -> Result<(Vec<T>, PageResponse), LedgerError> {
    let total = items.len() as u64;
    let mut start = 0u64;
    let mut limit = total;
    let mut need_total = true;

    if let Some(req) = page {
        need_total = req.count_total;
        if let Some(key) = req.key.as_deref() {
            start = key
                .parse::<u64>()
                .map_err(|_| LedgerError::InvalidRequest("invalid pagination key".into()))?;
        } else {
            start = req.offset;
        }
        if req.limit > 0 {
            limit = req.limit;
        }
    }

    let start = start.min(total);
    let end = if limit < total - start {
        start + limit
    } else {
        total
    };

    let slice = items[start as usize..end as usize].to_vec();
    let response = PageResponse {
        next_key: (end < total).then(|| end.to_string()),
        total: need_total.then_some(total),
    };
    Ok((slice, response))
}
