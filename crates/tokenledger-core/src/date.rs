use chrono::{Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use crate::constants::ROLLUP_DATE_FORMAT;
use crate::error::LedgerError;
use crate::types::Timestamp;

/// Load an IANA timezone by name.
pub fn load_timezone(name: &str) -> Result<Tz, LedgerError> {
    name.parse::<Tz>()
        .map_err(|_| LedgerError::Config(format!("unknown timezone: {name}")))
}

/// Convert a block timestamp into the local calendar date (`YYYY-MM-DD`)
/// under the named civil timezone. This is what makes the daily boundary
/// exact even when UTC has not crossed midnight.
pub fn local_date(now: Timestamp, tz_name: &str) -> Result<String, LedgerError> {
    let tz = load_timezone(tz_name)?;
    let instant = Utc
        .timestamp_opt(now, 0)
        .single()
        .ok_or_else(|| LedgerError::InvalidRequest("invalid block time".into()))?;
    Ok(instant.with_timezone(&tz).format(ROLLUP_DATE_FORMAT).to_string())
}

/// Validate an explicit `YYYY-MM-DD` date string.
pub fn validate_date(date: &str) -> Result<(), LedgerError> {
    NaiveDate::parse_from_str(date, ROLLUP_DATE_FORMAT)
        .map(|_| ())
        .map_err(|_| LedgerError::InvalidRequest("date must be YYYY-MM-DD".into()))
}

/// The calendar day after `date`.
pub fn next_date(date: &str) -> Result<String, LedgerError> {
    let parsed = NaiveDate::parse_from_str(date, ROLLUP_DATE_FORMAT)
        .map_err(|_| LedgerError::InvalidRequest("date must be YYYY-MM-DD".into()))?;
    Ok((parsed + Duration::days(1)).format(ROLLUP_DATE_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edmonton_crosses_local_midnight_before_utc() {
        // 2026-02-26T06:59:00Z is still 2026-02-25 in America/Edmonton (UTC-7).
        let before = 1_772_089_140;
        let after = 1_772_089_260; // 07:01:00Z, past local midnight
        assert_eq!(local_date(before, "America/Edmonton").unwrap(), "2026-02-25");
        assert_eq!(local_date(after, "America/Edmonton").unwrap(), "2026-02-26");
    }

    #[test]
    fn utc_date_matches_calendar() {
        assert_eq!(local_date(1_786_816_800, "UTC").unwrap(), "2026-08-15");
    }

    #[test]
    fn unknown_timezone_is_config_error() {
        assert!(matches!(
            local_date(0, "Mars/OlympusMons"),
            Err(LedgerError::Config(_))
        ));
    }

    #[test]
    fn date_validation_and_successor() {
        validate_date("2026-02-28").unwrap();
        assert!(validate_date("2026-2-28").is_err());
        assert!(validate_date("not-a-date").is_err());
        assert_eq!(next_date("2026-02-28").unwrap(), "2026-03-01");
        assert_eq!(next_date("2026-12-31").unwrap(), "2027-01-01");
    }
}
