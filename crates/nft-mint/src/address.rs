//! Base58 address handling.
//!
//! Solana addresses are Base58-encoded 32-byte values: either Ed25519 public
//! keys or program-derived addresses. There is no hashing step between the
//! public key and the address.

use crate::error::MintError;

/// Raw 32-byte account address.
pub type Address = [u8; 32];

/// Decode a Base58 address string to its 32-byte representation.
///
/// Returns an error if the string is not valid Base58 or does not decode
/// to exactly 32 bytes.
pub fn address_to_bytes(address: &str) -> Result<Address, MintError> {
    let bytes = bs58::decode(address)
        .into_vec()
        .map_err(|e| MintError::InvalidAddress(format!("base58 decode failed: {e}")))?;

    let arr: Address = bytes.try_into().map_err(|v: Vec<u8>| {
        MintError::InvalidAddress(format!("expected 32 bytes, got {}", v.len()))
    })?;

    Ok(arr)
}

/// Encode 32 bytes as a Base58 address string.
pub fn bytes_to_address(bytes: &Address) -> String {
    bs58::encode(bytes).into_string()
}

/// Base58 form of a 64-byte transaction signature.
pub fn signature_to_string(signature: &[u8; 64]) -> String {
    bs58::encode(signature).into_string()
}
