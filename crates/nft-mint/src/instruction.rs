//! The six instructions of a single-edition mint.
//!
//! Each [`MintInstruction`] variant pairs its typed accounts with a fixed
//! access table. The on-chain programs read accounts by position, so the
//! tables below are the contract:
//!
//! ```text
//! CreateMintAccount    (system)            payer[sw] mint[sw]
//! InitializeMint       (token)             mint[w] rent[]
//! CreateAssociated...  (associated token)  payer[sw] ata[w] owner[] mint[] system[] token[] rent[]
//! MintTo               (token)             mint[w] ata[w] authority[s]
//! CreateMetadata       (token metadata)    metadata[w] mint[] mint_authority[s] payer[s]
//!                                          update_authority[] system[] rent[]
//! CreateMasterEdition  (token metadata)    edition[w] mint[w] update_authority[s] mint_authority[s]
//!                                          payer[s] metadata[] token[] system[] rent[]
//! ```

use tracing::debug;

use crate::address::Address;
use crate::args::{self, CreateMasterEditionArgs, CreateMetadataArgs, MaxSupply};
use crate::error::MintError;
use crate::pda;
use crate::programs::ProgramIds;
use crate::transaction::{AccountMeta, Instruction};

/// Size of an SPL Token mint account.
pub const MINT_ACCOUNT_SIZE: u64 = 82;

/// System Program `CreateAccount` index (u32 LE).
const SYSTEM_CREATE_ACCOUNT_IX: u32 = 0;
/// SPL Token `InitializeMint` index.
const TOKEN_INITIALIZE_MINT_IX: u8 = 0;
/// SPL Token `MintTo` index.
const TOKEN_MINT_TO_IX: u8 = 7;

/// How an instruction touches one of its accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Access {
    pub is_signer: bool,
    pub is_writable: bool,
}

const R: Access = Access {
    is_signer: false,
    is_writable: false,
};
const W: Access = Access {
    is_signer: false,
    is_writable: true,
};
const S: Access = Access {
    is_signer: true,
    is_writable: false,
};
const SW: Access = Access {
    is_signer: true,
    is_writable: true,
};

pub const CREATE_MINT_ACCOUNT_ACCESS: [Access; 2] = [SW, SW];
pub const INITIALIZE_MINT_ACCESS: [Access; 2] = [W, R];
pub const CREATE_ASSOCIATED_TOKEN_ACCOUNT_ACCESS: [Access; 7] = [SW, W, R, R, R, R, R];
pub const MINT_TO_ACCESS: [Access; 3] = [W, W, S];
pub const CREATE_METADATA_ACCESS: [Access; 7] = [W, R, S, S, R, R, R];
pub const CREATE_MASTER_EDITION_ACCESS: [Access; 9] = [W, W, S, S, S, R, R, R, R];

/// Zip keys with their access table; the array length ties the two together.
fn metas<const N: usize>(keys: [Address; N], access: &[Access; N]) -> Vec<AccountMeta> {
    keys.iter()
        .zip(access.iter())
        .map(|(pubkey, a)| AccountMeta {
            pubkey: *pubkey,
            is_signer: a.is_signer,
            is_writable: a.is_writable,
        })
        .collect()
}

/// One instruction of the mint transaction, with its typed inputs.
#[derive(Debug, Clone)]
pub enum MintInstruction {
    /// Allocate the mint account, rent-exempt, owned by the token program.
    CreateMintAccount {
        payer: Address,
        mint: Address,
        lamports: u64,
        space: u64,
    },
    InitializeMint {
        mint: Address,
        decimals: u8,
        mint_authority: Address,
        freeze_authority: Option<Address>,
    },
    CreateAssociatedTokenAccount {
        payer: Address,
        associated_account: Address,
        owner: Address,
        mint: Address,
    },
    MintTo {
        mint: Address,
        destination: Address,
        authority: Address,
        amount: u64,
    },
    CreateMetadata {
        metadata: Address,
        mint: Address,
        mint_authority: Address,
        payer: Address,
        update_authority: Address,
        args: CreateMetadataArgs,
    },
    CreateMasterEdition {
        edition: Address,
        mint: Address,
        update_authority: Address,
        mint_authority: Address,
        payer: Address,
        metadata: Address,
        args: CreateMasterEditionArgs,
    },
}

impl MintInstruction {
    pub fn name(&self) -> &'static str {
        match self {
            MintInstruction::CreateMintAccount { .. } => "CreateMintAccount",
            MintInstruction::InitializeMint { .. } => "InitializeMint",
            MintInstruction::CreateAssociatedTokenAccount { .. } => "CreateAssociatedTokenAccount",
            MintInstruction::MintTo { .. } => "MintTo",
            MintInstruction::CreateMetadata { .. } => "CreateMetadata",
            MintInstruction::CreateMasterEdition { .. } => "CreateMasterEdition",
        }
    }

    /// Lower to a program id, ordered account list, and encoded data.
    pub fn build(&self, programs: &ProgramIds) -> Result<Instruction, MintError> {
        let ix = match self {
            MintInstruction::CreateMintAccount {
                payer,
                mint,
                lamports,
                space,
            } => {
                let mut data = Vec::with_capacity(52);
                data.extend_from_slice(&SYSTEM_CREATE_ACCOUNT_IX.to_le_bytes());
                data.extend_from_slice(&lamports.to_le_bytes());
                data.extend_from_slice(&space.to_le_bytes());
                data.extend_from_slice(&programs.token);

                Instruction {
                    program_id: programs.system,
                    accounts: metas([*payer, *mint], &CREATE_MINT_ACCOUNT_ACCESS),
                    data,
                }
            }
            MintInstruction::InitializeMint {
                mint,
                decimals,
                mint_authority,
                freeze_authority,
            } => {
                let mut data = Vec::with_capacity(67);
                data.push(TOKEN_INITIALIZE_MINT_IX);
                data.push(*decimals);
                data.extend_from_slice(mint_authority);
                match freeze_authority {
                    Some(key) => {
                        data.push(1);
                        data.extend_from_slice(key);
                    }
                    None => data.push(0),
                }

                Instruction {
                    program_id: programs.token,
                    accounts: metas([*mint, programs.rent_sysvar], &INITIALIZE_MINT_ACCESS),
                    data,
                }
            }
            MintInstruction::CreateAssociatedTokenAccount {
                payer,
                associated_account,
                owner,
                mint,
            } => Instruction {
                program_id: programs.associated_token,
                accounts: metas(
                    [
                        *payer,
                        *associated_account,
                        *owner,
                        *mint,
                        programs.system,
                        programs.token,
                        programs.rent_sysvar,
                    ],
                    &CREATE_ASSOCIATED_TOKEN_ACCOUNT_ACCESS,
                ),
                data: Vec::new(),
            },
            MintInstruction::MintTo {
                mint,
                destination,
                authority,
                amount,
            } => {
                let mut data = Vec::with_capacity(9);
                data.push(TOKEN_MINT_TO_IX);
                data.extend_from_slice(&amount.to_le_bytes());

                Instruction {
                    program_id: programs.token,
                    accounts: metas([*mint, *destination, *authority], &MINT_TO_ACCESS),
                    data,
                }
            }
            MintInstruction::CreateMetadata {
                metadata,
                mint,
                mint_authority,
                payer,
                update_authority,
                args,
            } => Instruction {
                program_id: programs.token_metadata,
                accounts: metas(
                    [
                        *metadata,
                        *mint,
                        *mint_authority,
                        *payer,
                        *update_authority,
                        programs.system,
                        programs.rent_sysvar,
                    ],
                    &CREATE_METADATA_ACCESS,
                ),
                data: args::encode(args)?,
            },
            MintInstruction::CreateMasterEdition {
                edition,
                mint,
                update_authority,
                mint_authority,
                payer,
                metadata,
                args,
            } => Instruction {
                program_id: programs.token_metadata,
                accounts: metas(
                    [
                        *edition,
                        *mint,
                        *update_authority,
                        *mint_authority,
                        *payer,
                        *metadata,
                        programs.token,
                        programs.system,
                        programs.rent_sysvar,
                    ],
                    &CREATE_MASTER_EDITION_ACCESS,
                ),
                data: args::encode(args)?,
            },
        };

        debug!(
            instruction = self.name(),
            accounts = ix.accounts.len(),
            data_len = ix.data.len(),
            "built instruction"
        );
        Ok(ix)
    }
}

/// Everything needed to lay out one mint transaction.
///
/// The creator is mint authority, update authority and fee payer at once.
#[derive(Debug, Clone)]
pub struct MintPlan {
    pub creator: Address,
    pub mint: Address,
    pub recipient: Address,
    pub mint_rent_lamports: u64,
    pub metadata: CreateMetadataArgs,
    pub max_supply: MaxSupply,
}

/// Derived accounts of a mint plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintAccounts {
    pub associated_account: Address,
    pub metadata: Address,
    pub master_edition: Address,
}

impl MintPlan {
    /// Derive the associated token, metadata and master edition addresses.
    pub fn derive_accounts(&self, programs: &ProgramIds) -> Result<MintAccounts, MintError> {
        let associated_account = pda::associated_token_address(
            &self.recipient,
            &self.mint,
            &programs.token,
            &programs.associated_token,
        )?;
        let (metadata, _) = pda::metadata_address(&self.mint, &programs.token_metadata)?;
        let (master_edition, _) =
            pda::master_edition_address(&self.mint, &programs.token_metadata)?;

        Ok(MintAccounts {
            associated_account,
            metadata,
            master_edition,
        })
    }

    /// The six instructions in execution order.
    pub fn instructions(&self, accounts: &MintAccounts) -> [MintInstruction; 6] {
        [
            MintInstruction::CreateMintAccount {
                payer: self.creator,
                mint: self.mint,
                lamports: self.mint_rent_lamports,
                space: MINT_ACCOUNT_SIZE,
            },
            MintInstruction::InitializeMint {
                mint: self.mint,
                decimals: 0,
                mint_authority: self.creator,
                freeze_authority: None,
            },
            MintInstruction::CreateAssociatedTokenAccount {
                payer: self.creator,
                associated_account: accounts.associated_account,
                owner: self.recipient,
                mint: self.mint,
            },
            MintInstruction::MintTo {
                mint: self.mint,
                destination: accounts.associated_account,
                authority: self.creator,
                amount: 1,
            },
            MintInstruction::CreateMetadata {
                metadata: accounts.metadata,
                mint: self.mint,
                mint_authority: self.creator,
                payer: self.creator,
                update_authority: self.creator,
                args: self.metadata.clone(),
            },
            MintInstruction::CreateMasterEdition {
                edition: accounts.master_edition,
                mint: self.mint,
                update_authority: self.creator,
                mint_authority: self.creator,
                payer: self.creator,
                metadata: accounts.metadata,
                args: CreateMasterEditionArgs {
                    max_supply: self.max_supply,
                },
            },
        ]
    }
}

/// Derive accounts and lower the plan to six wire-level instructions.
pub fn build_mint_instructions(
    plan: &MintPlan,
    programs: &ProgramIds,
) -> Result<(MintAccounts, Vec<Instruction>), MintError> {
    let accounts = plan.derive_accounts(programs)?;
    let instructions = plan
        .instructions(&accounts)
        .iter()
        .map(|ix| ix.build(programs))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((accounts, instructions))
}
