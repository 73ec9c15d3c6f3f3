use thiserror::Error;

/// Errors raised while building, signing, or submitting a mint transaction.
#[derive(Debug, Error)]
pub enum MintError {
    #[error("address derivation failed: {0}")]
    AddressDerivation(String),

    #[error("encoding failed: {0}")]
    Encoding(String),

    #[error("network failure: {0}")]
    Network(String),

    #[error("ledger rejected transaction: {0}")]
    LedgerRejection(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("transaction build error: {0}")]
    TransactionBuild(String),

    #[error("signing error: {0}")]
    Signing(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl MintError {
    /// True when the failure happened before anything reached the network.
    pub fn is_local(&self) -> bool {
        !matches!(self, MintError::Network(_) | MintError::LedgerRejection(_))
    }
}
