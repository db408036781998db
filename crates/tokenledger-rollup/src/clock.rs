use serde::{Deserialize, Serialize};
use tracing::info;

use tokenledger_core::date;
use tokenledger_core::error::LedgerError;
use tokenledger_core::event::Event;
use tokenledger_core::params::Params;
use tokenledger_core::types::Timestamp;
use tokenledger_state::StateDb;

/// Read-only view of the rollup clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollupStatus {
    pub timezone: String,
    pub current_local_date: String,
    /// Empty until the first rollup ever runs.
    pub last_rollup_date: String,
    pub has_rolled_today: bool,
    pub next_rollup_date: String,
}

/// Advance the daily rollup if the local calendar day has changed since the
/// last run. Idempotent within a day: the second and later calls for the
/// same local date write nothing and return no event.
pub fn run_daily_rollup(
    db: &StateDb,
    params: &Params,
    now: Timestamp,
) -> Result<Option<Event>, LedgerError> {
    if now < 0 {
        return Err(LedgerError::InvalidRequest("invalid block time".into()));
    }
    let today = date::local_date(now, &params.daily_rollup_timezone)?;
    if db.rollup_watermark()?.as_deref() == Some(today.as_str()) {
        return Ok(None);
    }
    db.set_rollup_watermark(&today)?;
    info!(date = %today, timezone = %params.daily_rollup_timezone, "daily rollup");
    Ok(Some(Event::DailyRollup {
        date: today,
        timezone: params.daily_rollup_timezone.clone(),
    }))
}

/// Report the clock state without touching it.
pub fn status(db: &StateDb, params: &Params, now: Timestamp) -> Result<RollupStatus, LedgerError> {
    if now < 0 {
        return Err(LedgerError::InvalidRequest("invalid block time".into()));
    }
    let today = date::local_date(now, &params.daily_rollup_timezone)?;
    let last = db.rollup_watermark()?.unwrap_or_default();
    let has_rolled_today = last == today;
    // always the day after the current local date, rolled or not
    let next_rollup_date = date::next_date(&today)?;
    Ok(RollupStatus {
        timezone: params.daily_rollup_timezone.clone(),
        current_local_date: today,
        last_rollup_date: last,
        has_rolled_today,
        next_rollup_date,
    })
}
