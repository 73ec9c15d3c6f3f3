//! JSON configuration for a mint run.
//!
//! ```json
//! {
//!   "rpc_url": "https://api.devnet.solana.com",
//!   "keypair": "~/.config/solana/id.json",
//!   "recipient": "AVdBTNhDqYgXGaaVkqiaUJ1Yqa61hMiFFaVRtqwzs5GZ",
//!   "metadata": {
//!     "name": "My NFT",
//!     "symbol": "SYMBOL",
//!     "uri": "https://arweave.net/FPGAv1XnyZidnqquOdEbSY6_ES735ckcDTdaAtI7GFw",
//!     "seller_fee_basis_points": 100
//!   }
//! }
//! ```
//!
//! Program ids default to the well-known deployments and only need to be
//! set when talking to a validator with relocated programs.

use std::path::{Path, PathBuf};

use nft_mint::{address_to_bytes, Address, Creator, Data, MaxSupply, MintError, MintRequest, ProgramIds};
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_RPC_URL: &str = "https://api.devnet.solana.com";
pub const DEFAULT_COMMITMENT: &str = "confirmed";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid {field}: {source}")]
    Address {
        field: &'static str,
        source: MintError,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MintConfig {
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    #[serde(default = "default_commitment")]
    pub commitment: String,
    /// Creator/payer keypair file. A fresh keypair is generated when unset.
    #[serde(default)]
    pub keypair: Option<PathBuf>,
    pub recipient: String,
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub programs: ProgramsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetadataConfig {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    #[serde(default)]
    pub seller_fee_basis_points: u16,
    /// Defaults to the payer holding 100 percent, verified.
    #[serde(default)]
    pub creators: Option<Vec<CreatorConfig>>,
    #[serde(default = "default_true")]
    pub is_mutable: bool,
    /// `null` for unlimited prints; defaults to 0 (one of one).
    #[serde(default = "default_max_supply")]
    pub max_supply: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatorConfig {
    pub address: String,
    pub share: u8,
    #[serde(default)]
    pub verified: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProgramsConfig {
    pub system: Option<String>,
    pub token: Option<String>,
    pub associated_token: Option<String>,
    pub token_metadata: Option<String>,
    pub rent_sysvar: Option<String>,
}

fn default_rpc_url() -> String {
    DEFAULT_RPC_URL.to_string()
}

fn default_commitment() -> String {
    DEFAULT_COMMITMENT.to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_supply() -> Option<u64> {
    Some(0)
}

fn parse_address(field: &'static str, value: &str) -> Result<Address, ConfigError> {
    address_to_bytes(value).map_err(|source| ConfigError::Address { field, source })
}

impl MintConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn recipient(&self) -> Result<Address, ConfigError> {
        parse_address("recipient", &self.recipient)
    }

    /// Program ids with per-field overrides applied.
    pub fn program_ids(&self) -> Result<ProgramIds, ConfigError> {
        let mut ids = ProgramIds::default();
        let p = &self.programs;
        let overrides: [(&'static str, &Option<String>, &mut Address); 5] = [
            ("programs.system", &p.system, &mut ids.system),
            ("programs.token", &p.token, &mut ids.token),
            ("programs.associated_token", &p.associated_token, &mut ids.associated_token),
            ("programs.token_metadata", &p.token_metadata, &mut ids.token_metadata),
            ("programs.rent_sysvar", &p.rent_sysvar, &mut ids.rent_sysvar),
        ];
        for (field, value, slot) in overrides {
            if let Some(value) = value {
                *slot = parse_address(field, value)?;
            }
        }
        Ok(ids)
    }

    /// The mint request, with `payer` as sole creator unless creators are set.
    pub fn mint_request(&self, payer: &Address) -> Result<MintRequest, ConfigError> {
        let m = &self.metadata;
        let creators = match &m.creators {
            Some(list) => list
                .iter()
                .map(|c| {
                    Ok(Creator {
                        address: parse_address("metadata.creators.address", &c.address)?,
                        verified: c.verified,
                        share: c.share,
                    })
                })
                .collect::<Result<Vec<_>, ConfigError>>()?,
            None => vec![Creator {
                address: *payer,
                verified: true,
                share: 100,
            }],
        };

        Ok(MintRequest {
            data: Data {
                name: m.name.clone(),
                symbol: m.symbol.clone(),
                uri: m.uri.clone(),
                seller_fee_basis_points: m.seller_fee_basis_points,
                creators: Some(creators),
            },
            is_mutable: m.is_mutable,
            max_supply: MaxSupply::from(m.max_supply),
        })
    }
}
