/// Token amount in base units. Caps and minted supply are u64 end to end.
pub type Amount = u64;

/// Bank balance in base units. u128 so pooled module balances cannot
/// overflow even when many capped tokens accumulate in one account.
pub type Balance = u128;

/// Unix timestamp (seconds, UTC) as delivered by the block clock.
/// Negative values are rejected at the operation boundary.
pub type Timestamp = i64;

/// Basis points. All split fields for one allocation sum to 10_000.
pub type Bps = u64;
