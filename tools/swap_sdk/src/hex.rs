//! Hex helpers for secrets, secret hashes and transaction ids.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum HexError {
    #[error("invalid hex: {0}")]
    Invalid(#[from] ::hex::FromHexError),
    #[error("expected {expected}-byte hex, got {actual}")]
    Length { expected: usize, actual: usize },
}

/// Drops a leading `0x` (if any) and surrounding whitespace.
pub fn strip_prefix(value: &str) -> &str {
    let trimmed = value.trim();
    trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed)
}

/// Canonical `0x`-prefixed form, whether or not the input carried a prefix.
pub fn normalize_prefixed(value: &str) -> String {
    format!("0x{}", strip_prefix(value))
}

pub fn decode(value: &str) -> Result<Vec<u8>, HexError> {
    Ok(::hex::decode(strip_prefix(value))?)
}

pub fn decode_fixed<const N: usize>(value: &str) -> Result<[u8; N], HexError> {
    let bytes = decode(value)?;
    let actual = bytes.len();
    bytes
        .try_into()
        .map_err(|_| HexError::Length { expected: N, actual })
}

pub fn encode(bytes: impl AsRef<[u8]>) -> String {
    ::hex::encode(bytes)
}
