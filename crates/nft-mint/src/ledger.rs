use async_trait::async_trait;

use crate::error::MintError;

/// The ledger round-trips a mint request needs.
///
/// Implementations report transport problems as [`MintError::Network`] and a
/// node or program refusing a submitted transaction as
/// [`MintError::LedgerRejection`]. Nothing here retries.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Lamports an account of `size` bytes needs to be rent exempt.
    async fn get_minimum_balance_for_rent_exemption(&self, size: u64) -> Result<u64, MintError>;

    /// A recent blockhash to anchor the transaction to.
    async fn get_latest_blockhash(&self) -> Result<[u8; 32], MintError>;

    /// Submit signed wire bytes and return the Base58 transaction signature.
    async fn send_transaction(&self, wire: &[u8]) -> Result<String, MintError>;
}
