//! Ed25519 keypairs for the mint and the creator/payer.
//!
//! Keypair files use the Solana CLI format: a JSON array of 64 bytes, the
//! 32-byte secret seed followed by the 32-byte public key. Every buffer that
//! holds secret bytes is zeroized when dropped.

use std::fmt;
use std::path::Path;

use ed25519_dalek::{Signer, SigningKey};
use rand_core::OsRng;
use zeroize::Zeroizing;

use crate::address::{bytes_to_address, Address};
use crate::error::MintError;

/// Length of a serialized keypair (secret seed + public key).
pub const KEYPAIR_LENGTH: usize = 64;

/// An Ed25519 signing key together with its address.
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a fresh keypair from the operating system RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Build a keypair from a 32-byte secret seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Parse 64 bytes of `secret || public`.
    ///
    /// The public half must match the key derived from the secret half.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MintError> {
        if bytes.len() != KEYPAIR_LENGTH {
            return Err(MintError::InvalidKey(format!(
                "expected {KEYPAIR_LENGTH} bytes, got {}",
                bytes.len()
            )));
        }

        let mut seed = Zeroizing::new([0u8; 32]);
        seed.copy_from_slice(&bytes[..32]);
        let keypair = Self::from_seed(&seed);

        if keypair.pubkey()[..] != bytes[32..] {
            return Err(MintError::InvalidKey(
                "public key does not match secret key".into(),
            ));
        }

        Ok(keypair)
    }

    /// Parse the JSON byte-array keypair format.
    pub fn from_json(json: &str) -> Result<Self, MintError> {
        let bytes: Zeroizing<Vec<u8>> = Zeroizing::new(
            serde_json::from_str(json)
                .map_err(|e| MintError::InvalidKey(format!("malformed keypair JSON: {e}")))?,
        );
        Self::from_bytes(&bytes)
    }

    /// Read a keypair file written by `solana-keygen`.
    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self, MintError> {
        let path = path.as_ref();
        let contents = Zeroizing::new(std::fs::read_to_string(path).map_err(|e| {
            MintError::InvalidKey(format!("cannot read {}: {e}", path.display()))
        })?);
        Self::from_json(&contents)
    }

    /// The 32-byte public key, which is also the account address.
    pub fn pubkey(&self) -> Address {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Sign `message` and return the raw 64-byte signature.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("pubkey", &bytes_to_address(&self.pubkey()))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keypair_bytes(seed: [u8; 32]) -> Vec<u8> {
        let kp = Keypair::from_seed(&seed);
        let mut bytes = seed.to_vec();
        bytes.extend_from_slice(&kp.pubkey());
        bytes
    }

    #[test]
    fn generated_keys_differ() {
        let a = Keypair::generate();
        let b = Keypair::generate();
        assert_ne!(a.pubkey(), b.pubkey());
    }

    #[test]
    fn from_bytes_roundtrip() {
        let bytes = keypair_bytes([0x42; 32]);
        let kp = Keypair::from_bytes(&bytes).unwrap();
        assert_eq!(kp.pubkey()[..], bytes[32..]);
    }

    #[test]
    fn mismatched_public_half_is_rejected() {
        let mut bytes = keypair_bytes([0x42; 32]);
        bytes[63] ^= 0xff;
        let err = Keypair::from_bytes(&bytes).unwrap_err();
        assert!(err.to_string().contains("does not match"));
    }

    #[test]
    fn wrong_length_is_rejected() {
        assert!(Keypair::from_bytes(&[0u8; 32]).is_err());
    }

    #[test]
    fn json_format_is_accepted() {
        let bytes = keypair_bytes([0x07; 32]);
        let json = serde_json::to_string(&bytes).unwrap();
        let kp = Keypair::from_json(&json).unwrap();
        assert_eq!(kp.pubkey(), Keypair::from_seed(&[0x07; 32]).pubkey());
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(Keypair::from_json("[1, 2, \"x\"]").is_err());
    }

    #[test]
    fn read_from_file_roundtrip() {
        let bytes = keypair_bytes([0x33; 32]);
        let path = std::env::temp_dir().join(format!("nft-mint-key-{}.json", std::process::id()));
        std::fs::write(&path, serde_json::to_string(&bytes).unwrap()).unwrap();

        let kp = Keypair::read_from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(kp.pubkey()[..], bytes[32..]);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(Keypair::read_from_file("/nonexistent/keypair.json").is_err());
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let kp = Keypair::from_seed(&[0x42; 32]);
        let debug = format!("{kp:?}");
        assert!(debug.contains(&bytes_to_address(&kp.pubkey())));
        assert!(!debug.contains("66, 66"));
    }
}
