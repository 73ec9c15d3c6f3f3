//! Token-metadata instruction arguments.
//!
//! The metadata program deserializes its instruction data with Borsh: a
//! one-byte instruction tag followed by the argument record. Strings are a
//! u32 LE length followed by UTF-8 bytes; `Option<T>` is a 0/1 presence byte
//! followed by `T` only when present; `bool` is a single 0/1 byte.
//!
//! ```text
//! CreateMetadataArgs (tag 0):
//!   name                    string
//!   symbol                  string
//!   uri                     string
//!   seller_fee_basis_points u16 LE
//!   creators                option<vec<{ address [u8; 32], verified u8, share u8 }>>
//!   is_mutable              u8
//!
//! CreateMasterEditionArgs (tag 10):
//!   max_supply              option<u64 LE>
//! ```

use std::collections::HashSet;
use std::io::{Read, Write};

use borsh::{BorshDeserialize, BorshSerialize};

use crate::address::Address;
use crate::error::MintError;

pub const MAX_NAME_LENGTH: usize = 32;
pub const MAX_SYMBOL_LENGTH: usize = 10;
pub const MAX_URI_LENGTH: usize = 200;
pub const MAX_CREATOR_LIMIT: usize = 5;
pub const MAX_SELLER_FEE_BASIS_POINTS: u16 = 10_000;

/// Sum every creator list must reach, in percent.
pub const TOTAL_CREATOR_SHARES: u16 = 100;

/// A royalty recipient listed on the metadata record.
#[derive(BorshSerialize, BorshDeserialize, PartialEq, Eq, Debug, Clone)]
pub struct Creator {
    pub address: Address,
    pub verified: bool,
    /// Percent of the royalties, not basis points.
    pub share: u8,
}

/// Descriptive fields of a metadata record.
#[derive(BorshSerialize, BorshDeserialize, PartialEq, Eq, Debug, Clone)]
pub struct Data {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub seller_fee_basis_points: u16,
    pub creators: Option<Vec<Creator>>,
}

/// Supply cap for prints of a master edition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxSupply {
    /// Unlimited prints; encoded as an absent option.
    Unlimited,
    /// At most this many prints. `Capped(0)` makes the edition one of one.
    Capped(u64),
}

impl MaxSupply {
    /// A master edition that can never be printed.
    pub const ONE_OF_ONE: MaxSupply = MaxSupply::Capped(0);
}

impl From<MaxSupply> for Option<u64> {
    fn from(value: MaxSupply) -> Self {
        match value {
            MaxSupply::Unlimited => None,
            MaxSupply::Capped(n) => Some(n),
        }
    }
}

impl From<Option<u64>> for MaxSupply {
    fn from(value: Option<u64>) -> Self {
        match value {
            None => MaxSupply::Unlimited,
            Some(n) => MaxSupply::Capped(n),
        }
    }
}

impl BorshSerialize for MaxSupply {
    fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        Option::<u64>::from(*self).serialize(writer)
    }
}

impl BorshDeserialize for MaxSupply {
    fn deserialize_reader<R: Read>(reader: &mut R) -> std::io::Result<Self> {
        Option::<u64>::deserialize_reader(reader).map(MaxSupply::from)
    }
}

/// Arguments of `CreateMetadataAccount`.
#[derive(BorshSerialize, BorshDeserialize, PartialEq, Eq, Debug, Clone)]
pub struct CreateMetadataArgs {
    pub data: Data,
    pub is_mutable: bool,
}

/// Arguments of `CreateMasterEdition`.
#[derive(BorshSerialize, BorshDeserialize, PartialEq, Eq, Debug, Clone)]
pub struct CreateMasterEditionArgs {
    pub max_supply: MaxSupply,
}

/// An argument record with a fixed instruction tag in the metadata program.
pub trait MetadataArgs: BorshSerialize + BorshDeserialize {
    /// Index of the instruction in the metadata program's instruction enum.
    const TAG: u8;

    /// Reject values the on-chain program would refuse.
    fn validate(&self) -> Result<(), MintError> {
        Ok(())
    }
}

impl MetadataArgs for CreateMetadataArgs {
    const TAG: u8 = 0;

    fn validate(&self) -> Result<(), MintError> {
        self.data.validate()
    }
}

impl MetadataArgs for CreateMasterEditionArgs {
    const TAG: u8 = 10;
}

impl Data {
    /// Check string lengths, royalty bounds, and the creator list.
    pub fn validate(&self) -> Result<(), MintError> {
        check_len("name", &self.name, MAX_NAME_LENGTH)?;
        check_len("symbol", &self.symbol, MAX_SYMBOL_LENGTH)?;
        check_len("uri", &self.uri, MAX_URI_LENGTH)?;

        if self.seller_fee_basis_points > MAX_SELLER_FEE_BASIS_POINTS {
            return Err(MintError::Encoding(format!(
                "seller fee of {} basis points exceeds {MAX_SELLER_FEE_BASIS_POINTS}",
                self.seller_fee_basis_points
            )));
        }

        if let Some(creators) = &self.creators {
            validate_creators(creators)?;
        }

        Ok(())
    }
}

/// Creator lists must be non-empty, small, free of duplicates, and split
/// exactly 100 percent between them.
pub fn validate_creators(creators: &[Creator]) -> Result<(), MintError> {
    if creators.is_empty() {
        return Err(MintError::Encoding(
            "creator list is present but empty".into(),
        ));
    }
    if creators.len() > MAX_CREATOR_LIMIT {
        return Err(MintError::Encoding(format!(
            "{} creators exceeds the limit of {MAX_CREATOR_LIMIT}",
            creators.len()
        )));
    }

    let mut seen = HashSet::with_capacity(creators.len());
    if let Some(dup) = creators.iter().find(|c| !seen.insert(c.address)) {
        return Err(MintError::Encoding(format!(
            "duplicate creator {}",
            crate::address::bytes_to_address(&dup.address)
        )));
    }

    let total: u16 = creators.iter().map(|c| c.share as u16).sum();
    if total != TOTAL_CREATOR_SHARES {
        return Err(MintError::Encoding(format!(
            "creator shares sum to {total}, expected {TOTAL_CREATOR_SHARES}"
        )));
    }

    Ok(())
}

/// Validate `args` and produce the instruction data: tag byte, then Borsh.
pub fn encode<A: MetadataArgs>(args: &A) -> Result<Vec<u8>, MintError> {
    args.validate()?;

    let mut buf = vec![A::TAG];
    args.serialize(&mut buf)
        .map_err(|e| MintError::Encoding(format!("borsh serialize failed: {e}")))?;
    Ok(buf)
}

/// Parse instruction data produced by [`encode`].
///
/// Fails if the tag does not match `A` or if bytes are left over.
pub fn decode<A: MetadataArgs>(data: &[u8]) -> Result<A, MintError> {
    let (&tag, body) = data.split_first().ok_or_else(|| {
        MintError::Serialization("instruction data is empty".into())
    })?;
    if tag != A::TAG {
        return Err(MintError::Serialization(format!(
            "expected instruction tag {}, got {tag}",
            A::TAG
        )));
    }

    A::try_from_slice(body)
        .map_err(|e| MintError::Serialization(format!("borsh deserialize failed: {e}")))
}

fn check_len(field: &str, value: &str, max: usize) -> Result<(), MintError> {
    if value.len() > max {
        return Err(MintError::Encoding(format!(
            "{field} is {} bytes, maximum is {max}",
            value.len()
        )));
    }
    Ok(())
}
