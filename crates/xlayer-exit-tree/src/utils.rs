use crate::{Hash, error::{Result, TreeError}};

/// Format a 32-byte hash as hexadecimal string with 0x prefix
pub fn format_hash_hex(hash: &Hash) -> String {
    format!("0x{}", hex::encode(hash))
}

/// Parse a 32-byte value from hex, with or without the 0x prefix
pub fn parse_hash_hex(value: &str) -> Result<Hash> {
    let stripped = value.strip_prefix("0x").unwrap_or(value);
    let bytes = hex::decode(stripped).map_err(|e| TreeError::InvalidHex(e.to_string()))?;
    bytes
        .try_into()
        .map_err(|bytes: Vec<u8>| {
            TreeError::InvalidHex(format!("expected 32 bytes, got {}", bytes.len()))
        })
}

/// Pack ASCII text into a 32-byte value, right-padded with zero bytes.
///
/// At most 31 bytes are accepted so the value always keeps a trailing zero.
pub fn bytes32_from_str(text: &str) -> Result<Hash> {
    let bytes = text.as_bytes();
    if bytes.len() > 31 {
        return Err(TreeError::TextTooLong { len: bytes.len() });
    }
    let mut out = [0u8; 32];
    out[..bytes.len()].copy_from_slice(bytes);
    Ok(out)
}
