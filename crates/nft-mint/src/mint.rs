//! One-shot NFT mint: derive, encode, build, assemble, sign, submit.

use tracing::{debug, info};

use crate::address::{bytes_to_address, signature_to_string, Address};
use crate::args::{CreateMetadataArgs, Data, MaxSupply, MetadataArgs};
use crate::error::MintError;
use crate::instruction::{build_mint_instructions, MintPlan, MINT_ACCOUNT_SIZE};
use crate::keys::Keypair;
use crate::ledger::LedgerClient;
use crate::programs::ProgramIds;
use crate::transaction::{compile_transaction, sign_transaction};

/// What to mint.
#[derive(Debug, Clone)]
pub struct MintRequest {
    pub data: Data,
    pub is_mutable: bool,
    pub max_supply: MaxSupply,
}

impl MintRequest {
    /// A mutable, one-of-one edition.
    pub fn new(data: Data) -> Self {
        Self {
            data,
            is_mutable: true,
            max_supply: MaxSupply::ONE_OF_ONE,
        }
    }
}

/// Addresses produced by a submitted mint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintOutcome {
    /// Base58 signature as reported by the ledger.
    pub signature: String,
    pub mint: Address,
    pub associated_account: Address,
    pub metadata: Address,
    pub master_edition: Address,
}

/// Mint a single NFT to `recipient`, paid for and authorized by `creator`.
///
/// A fresh mint key is generated per call. Argument validation runs before
/// any network call, so an invalid request never touches the ledger. The
/// returned signature is not waited on for confirmation.
pub async fn mint_nft<L: LedgerClient + ?Sized>(
    ledger: &L,
    creator: &Keypair,
    recipient: &Address,
    request: MintRequest,
    programs: &ProgramIds,
) -> Result<MintOutcome, MintError> {
    let mint = Keypair::generate();
    mint_nft_with_mint_key(ledger, creator, &mint, recipient, request, programs).await
}

/// [`mint_nft`] with a caller-supplied mint key, which must not be the
/// creator's.
pub async fn mint_nft_with_mint_key<L: LedgerClient + ?Sized>(
    ledger: &L,
    creator: &Keypair,
    mint: &Keypair,
    recipient: &Address,
    request: MintRequest,
    programs: &ProgramIds,
) -> Result<MintOutcome, MintError> {
    let creator_key = creator.pubkey();
    let mint_key = mint.pubkey();
    if mint_key == creator_key {
        return Err(MintError::InvalidKey(
            "mint key must differ from the creator key".into(),
        ));
    }

    let metadata = CreateMetadataArgs {
        data: request.data,
        is_mutable: request.is_mutable,
    };
    metadata.validate()?;
    info!(
        mint = %bytes_to_address(&mint_key),
        creator = %bytes_to_address(&creator_key),
        recipient = %bytes_to_address(recipient),
        "minting NFT"
    );

    let mint_rent_lamports = ledger
        .get_minimum_balance_for_rent_exemption(MINT_ACCOUNT_SIZE)
        .await?;
    debug!(lamports = mint_rent_lamports, "mint account rent");

    let plan = MintPlan {
        creator: creator_key,
        mint: mint_key,
        recipient: *recipient,
        mint_rent_lamports,
        metadata,
        max_supply: request.max_supply,
    };
    let (accounts, instructions) = build_mint_instructions(&plan, programs)?;
    debug!(
        associated_account = %bytes_to_address(&accounts.associated_account),
        metadata = %bytes_to_address(&accounts.metadata),
        master_edition = %bytes_to_address(&accounts.master_edition),
        "derived accounts"
    );

    let blockhash = ledger.get_latest_blockhash().await?;
    debug!(blockhash = %bytes_to_address(&blockhash), "recent blockhash");

    let tx = compile_transaction(&instructions, &creator_key, &blockhash)?;
    let signed = sign_transaction(&tx, &[mint, creator])?;
    let wire = signed.to_wire()?;
    debug!(
        bytes = wire.len(),
        local_signature = %signature_to_string(&signed.signature()),
        "signed transaction"
    );

    let signature = ledger.send_transaction(&wire).await?;
    info!(%signature, "submitted mint transaction");

    Ok(MintOutcome {
        signature,
        mint: mint_key,
        associated_account: accounts.associated_account,
        metadata: accounts.metadata,
        master_edition: accounts.master_edition,
    })
}
