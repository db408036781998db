use crate::constants::MODULE_NAME;
use crate::error::LedgerError;

/// Account addresses are base58-encoded 32-byte identifiers.
pub const ADDRESS_BYTES: usize = 32;

/// Parse and validate an address string, returning the raw bytes.
pub fn parse(address: &str) -> Result<[u8; ADDRESS_BYTES], LedgerError> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::InvalidAddress("address cannot be empty".into()));
    }
    let bytes = bs58::decode(trimmed)
        .into_vec()
        .map_err(|e| LedgerError::InvalidAddress(format!("{trimmed}: {e}")))?;
    if bytes.len() != ADDRESS_BYTES {
        return Err(LedgerError::InvalidAddress(format!(
            "{trimmed}: expected {ADDRESS_BYTES} bytes, got {}",
            bytes.len()
        )));
    }
    let mut arr = [0u8; ADDRESS_BYTES];
    arr.copy_from_slice(&bytes);
    Ok(arr)
}

/// Validate an address string without keeping the bytes.
pub fn validate(address: &str) -> Result<(), LedgerError> {
    parse(address).map(|_| ())
}

/// Format raw address bytes back into the string form.
pub fn format(bytes: &[u8; ADDRESS_BYTES]) -> String {
    bs58::encode(bytes).into_string()
}

/// The module's own pooled holding account. Derived, never key-controlled:
/// funds held here are the reward pool and in-flight recovery transfers.
pub fn module_address() -> String {
    let digest = blake3::hash(format!("{MODULE_NAME}/module-account").as_bytes());
    bs58::encode(digest.as_bytes()).into_string()
}
