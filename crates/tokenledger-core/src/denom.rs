use serde::{Deserialize, Serialize};

use crate::address;
use crate::constants::{
    DENOM_MAX_LEN, DENOM_MIN_LEN, SUBDENOM_MAX_LEN, SUBDENOM_MIN_LEN, TOKEN_FACTORY_PREFIX,
};
use crate::error::LedgerError;

/// Caller-supplied token identifier, resolved exactly once at the message
/// boundary. Older call sites pass a bare subdenom; newer ones pass the
/// full tokenfactory denom. The two intents are kept distinct instead of
/// being re-derived from string prefixes inside business logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DenomInput {
    Subdenom(String),
    FullDenom(String),
}

impl DenomInput {
    /// Resolve to the canonical `factory/{issuer}/{subdenom}` denom for a
    /// token being created or updated by `issuer`. A full denom must embed
    /// the same issuer it is being resolved against.
    pub fn canonical(&self, issuer: &str) -> Result<String, LedgerError> {
        match self {
            DenomInput::Subdenom(sub) => {
                let sub = sub.trim();
                validate_subdenom(sub)?;
                let full = format!("{TOKEN_FACTORY_PREFIX}/{issuer}/{sub}");
                validate_factory_denom(&full)?;
                Ok(full)
            }
            DenomInput::FullDenom(denom) => {
                let denom = denom.trim();
                if denom.is_empty() {
                    return Err(LedgerError::InvalidDenom("denom cannot be empty".into()));
                }
                let (tf_issuer, _) = split_factory_denom(denom)?;
                if tf_issuer != issuer {
                    return Err(LedgerError::InvalidRequest(format!(
                        "tokenfactory denom issuer {tf_issuer} must match message issuer {issuer}"
                    )));
                }
                validate_factory_denom(denom)?;
                Ok(denom.to_string())
            }
        }
    }

    /// Resolve to the store lookup key for an existing token owned by
    /// `signer`. Bare subdenoms are scoped to the signer's issuer namespace.
    pub fn lookup_key(&self, signer: &str) -> String {
        match self {
            DenomInput::Subdenom(sub) => {
                format!("{TOKEN_FACTORY_PREFIX}/{signer}/{}", sub.trim())
            }
            DenomInput::FullDenom(denom) => denom.trim().to_string(),
        }
    }
}

/// Split a canonical tokenfactory denom into (issuer, subdenom).
pub fn split_factory_denom(denom: &str) -> Result<(&str, &str), LedgerError> {
    let parts: Vec<&str> = denom.split('/').collect();
    if parts.len() != 3 || parts[0] != TOKEN_FACTORY_PREFIX {
        return Err(LedgerError::InvalidDenom(
            "expected tokenfactory denom format: factory/{issuer}/{subdenom}".into(),
        ));
    }
    if parts[1].is_empty() || parts[2].is_empty() {
        return Err(LedgerError::InvalidDenom(
            "tokenfactory denom issuer/subdenom cannot be empty".into(),
        ));
    }
    Ok((parts[1], parts[2]))
}

/// Full tokenfactory validation: general denom syntax, three segments,
/// a parseable issuer address, and a well-formed subdenom.
pub fn validate_factory_denom(denom: &str) -> Result<(), LedgerError> {
    validate_denom(denom)?;
    let (issuer, subdenom) = split_factory_denom(denom)?;
    address::validate(issuer)
        .map_err(|_| LedgerError::InvalidAddress("invalid tokenfactory issuer address".into()))?;
    validate_subdenom(subdenom)
}

/// Subdenom syntax: `^[A-Za-z][A-Za-z0-9._-]{2,63}$`.
pub fn validate_subdenom(subdenom: &str) -> Result<(), LedgerError> {
    let mut chars = subdenom.chars();
    let lead_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    let len = subdenom.len();
    if !lead_ok || !rest_ok || !(SUBDENOM_MIN_LEN..=SUBDENOM_MAX_LEN).contains(&len) {
        return Err(LedgerError::InvalidDenom(
            "subdenom must match ^[A-Za-z][A-Za-z0-9._-]{2,63}$".into(),
        ));
    }
    Ok(())
}

/// General denom syntax: `[a-zA-Z][a-zA-Z0-9/:._-]{2,127}`.
pub fn validate_denom(denom: &str) -> Result<(), LedgerError> {
    let mut chars = denom.chars();
    let lead_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | ':' | '.' | '_' | '-'));
    let len = denom.len();
    if !lead_ok || !rest_ok || !(DENOM_MIN_LEN..=DENOM_MAX_LEN).contains(&len) {
        return Err(LedgerError::InvalidDenom(format!("invalid denom: {denom}")));
    }
    Ok(())
}
