use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    // ── Address / denom errors ───────────────────────────────────────────────
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid denom: {0}")]
    InvalidDenom(String),

    // ── Token errors ─────────────────────────────────────────────────────────
    #[error("token already exists: {0}")]
    TokenExists(String),

    #[error("token not found: {0}")]
    TokenNotFound(String),

    #[error("invalid max supply cap: {0}")]
    InvalidCap(String),

    #[error("mint would exceed max supply cap")]
    CapExceeded,

    #[error("admin renounced: {0}")]
    AdminRenounced(String),

    // ── Authorization errors ─────────────────────────────────────────────────
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("invalid signer: expected authority {expected}, got {got}")]
    InvalidSigner { expected: String, got: String },

    #[error("creator is not allowed to create tokens")]
    CreatorNotAllowed,

    #[error("invalid token creation mode: {0}")]
    InvalidCreationMode(String),

    // ── Recovery errors ──────────────────────────────────────────────────────
    #[error("invalid recovery policy: {0}")]
    RecoveryPolicy(String),

    #[error("recovery action unauthorized: {0}")]
    RecoveryUnauthorized(String),

    #[error("recovery operation not found: {0}")]
    RecoveryNotFound(u64),

    #[error("recovery operation {id} is in {status} state, not queued")]
    RecoveryNotQueued { id: u64, status: String },

    #[error("recovery operation {id} timelock not elapsed (unlocks at {execute_after})")]
    RecoveryTooEarly { id: u64, execute_after: u64 },

    #[error("invalid recovery operation request: {0}")]
    RecoveryBadRequest(String),

    #[error("recovery operation {id}: funds collected into module account but delivery failed: {reason}")]
    RecoveryDeliverFailed { id: u64, reason: String },

    // ── Rewards / allocation errors ──────────────────────────────────────────
    #[error("merchant incentive routing invalid: {0}")]
    MerchantRouting(String),

    #[error("reward accrual not found: {0}")]
    AccrualNotFound(String),

    #[error("reward pool balance {have}{denom} is smaller than claim {need}{denom}")]
    RewardPoolInsufficient {
        denom: String,
        have: u128,
        need: u128,
    },

    // ── Allowlist errors ─────────────────────────────────────────────────────
    #[error("allowlist entry already exists: {0}")]
    AllowlistExists(String),

    #[error("allowlist entry not found: {0}")]
    AllowlistNotFound(String),

    // ── Bank errors ──────────────────────────────────────────────────────────
    #[error("insufficient funds: account {address} has {have}{denom}, needs {need}{denom}")]
    InsufficientFunds {
        address: String,
        denom: String,
        need: u128,
        have: u128,
    },

    // ── General ──────────────────────────────────────────────────────────────
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("storage error: {0}")]
    Storage(String),
}
