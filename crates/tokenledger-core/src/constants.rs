//! Module-wide constants.

/// Module name; namespaces the derived module pool account.
pub const MODULE_NAME: &str = "tokenledger";

/// All split fields for one allocation must sum to this.
pub const TOTAL_BPS: u64 = 10_000;

/// Chain base staking denom. Never mintable through this module.
pub const BASE_STAKE_DENOM: &str = "stake";

/// Display exponent registered in the derived denom metadata.
pub const TOKEN_DISPLAY_EXPONENT: u32 = 6;

/// Prefix of a canonical tokenfactory denom: factory/{issuer}/{subdenom}.
pub const TOKEN_FACTORY_PREFIX: &str = "factory";

/// Calendar-date layout used by the daily rollup watermark.
pub const ROLLUP_DATE_FORMAT: &str = "%Y-%m-%d";

pub const SECONDS_PER_HOUR: u64 = 3600;

/// Cancel reasons are required and bounded after trimming.
pub const MAX_CANCEL_REASON_CHARS: usize = 512;

// ── Subdenom syntax: ^[A-Za-z][A-Za-z0-9._-]{2,63}$ ──────────────────────────

pub const SUBDENOM_MIN_LEN: usize = 3;
pub const SUBDENOM_MAX_LEN: usize = 64;

// ── General denom syntax (SDK rule): [a-zA-Z][a-zA-Z0-9/:._-]{2,127} ─────────

pub const DENOM_MIN_LEN: usize = 3;
pub const DENOM_MAX_LEN: usize = 128;
