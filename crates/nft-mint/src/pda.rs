//! Program-derived address (PDA) derivation.
//!
//! A PDA is `SHA-256(seeds.. || bump || program_id || "ProgramDerivedAddress")`
//! for the highest bump in `255..=1` whose digest is NOT a valid Ed25519
//! point, so no private key can ever sign for it.

use sha2::{Digest, Sha256};

use crate::address::Address;
use crate::error::MintError;

/// Appended to every PDA preimage.
const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// Maximum number of seeds, including the bump.
pub const MAX_SEEDS: usize = 16;

/// Maximum length of a single seed.
pub const MAX_SEED_LEN: usize = 32;

/// Seed prefix shared by every token-metadata PDA.
pub const METADATA_PREFIX: &[u8] = b"metadata";

/// Seed suffix of the master-edition PDA.
pub const EDITION_SUFFIX: &[u8] = b"edition";

/// Find a valid program-derived address for the given seeds and program.
///
/// Returns the address together with the bump seed that produced it.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &Address,
) -> Result<(Address, u8), MintError> {
    if seeds.len() >= MAX_SEEDS {
        return Err(MintError::AddressDerivation(format!(
            "at most {} seeds allowed, got {}",
            MAX_SEEDS - 1,
            seeds.len()
        )));
    }
    if let Some(seed) = seeds.iter().find(|s| s.len() > MAX_SEED_LEN) {
        return Err(MintError::AddressDerivation(format!(
            "seed of {} bytes exceeds {MAX_SEED_LEN}",
            seed.len()
        )));
    }

    for bump in bump_seeds() {
        if let Some(address) = try_create_program_address(seeds, &[bump], program_id) {
            return Ok((address, bump));
        }
    }

    Err(MintError::AddressDerivation(
        "could not find valid PDA bump seed".into(),
    ))
}

/// Metadata account of `mint`: `["metadata", program_id, mint]`.
pub fn metadata_address(
    mint: &Address,
    metadata_program: &Address,
) -> Result<(Address, u8), MintError> {
    find_program_address(
        &[METADATA_PREFIX, metadata_program.as_ref(), mint.as_ref()],
        metadata_program,
    )
}

/// Master edition account of `mint`: `["metadata", program_id, mint, "edition"]`.
pub fn master_edition_address(
    mint: &Address,
    metadata_program: &Address,
) -> Result<(Address, u8), MintError> {
    find_program_address(
        &[
            METADATA_PREFIX,
            metadata_program.as_ref(),
            mint.as_ref(),
            EDITION_SUFFIX,
        ],
        metadata_program,
    )
}

/// Associated token account of `owner` for `mint`.
///
/// Seeds are `[owner, token_program, mint]`, derived under the associated
/// token account program.
pub fn associated_token_address(
    owner: &Address,
    mint: &Address,
    token_program: &Address,
    associated_token_program: &Address,
) -> Result<Address, MintError> {
    find_program_address(
        &[owner.as_ref(), token_program.as_ref(), mint.as_ref()],
        associated_token_program,
    )
    .map(|(address, _bump)| address)
}

/// Bump candidates in search order. Zero is never tried.
fn bump_seeds() -> impl Iterator<Item = u8> {
    (1u8..=255).rev()
}

/// Returns `Some(address)` if the digest is off the curve, `None` otherwise.
fn try_create_program_address(
    seeds: &[&[u8]],
    bump_seed: &[u8],
    program_id: &Address,
) -> Option<Address> {
    let mut hasher = Sha256::new();

    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update(bump_seed);
    hasher.update(program_id);
    hasher.update(PDA_MARKER);

    let hash: Address = hasher.finalize().into();

    if is_on_curve(&hash) {
        return None;
    }

    Some(hash)
}

/// Whether 32 bytes decompress to an Ed25519 point.
pub fn is_on_curve(bytes: &Address) -> bool {
    curve25519_dalek::edwards::CompressedEdwardsY(*bytes)
        .decompress()
        .is_some()
}
