//! Single-edition NFT minting on Solana.
//!
//! Builds the six-instruction transaction that creates a mint, an associated
//! token account for the recipient, mints one token into it, and registers
//! the metadata and master edition records with the token-metadata program.
//!
//! No `solana-sdk`: the wire format, program-derived addresses and
//! instruction layouts are implemented here on top of `ed25519-dalek`,
//! `curve25519-dalek`, `sha2`, `bs58` and `borsh`.
//! The network side is the narrow [`LedgerClient`] trait.

pub mod address;
pub mod args;
pub mod error;
pub mod instruction;
pub mod keys;
pub mod ledger;
pub mod mint;
pub mod pda;
pub mod programs;
pub mod transaction;

pub use address::{address_to_bytes, bytes_to_address, Address};
pub use args::{CreateMasterEditionArgs, CreateMetadataArgs, Creator, Data, MaxSupply};
pub use error::MintError;
pub use instruction::{build_mint_instructions, MintAccounts, MintInstruction, MintPlan};
pub use keys::Keypair;
pub use ledger::LedgerClient;
pub use mint::{mint_nft, mint_nft_with_mint_key, MintOutcome, MintRequest};
pub use pda::{find_program_address, master_edition_address, metadata_address};
pub use programs::ProgramIds;
pub use transaction::{
    compile_transaction, decode_compact_u16, encode_compact_u16, serialize_message,
    sign_transaction, AccountMeta, Instruction, SignedTransaction, SolTransaction,
};
