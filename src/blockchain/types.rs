//! Chain-specific types and error definitions.

use alloy::primitives::{Address, TxHash};
use thiserror::Error;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Invalid private key format or derivation error.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Transaction request could not be completed or signed.
    #[error("Transaction build error: {0}")]
    TxBuild(String),

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// Endpoint could not be set up.
    #[error("Blockchain not available: {0}")]
    NotAvailable(String),
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// Terminal state of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Receipt retrieved with the required block depth.
    Confirmed {
        tx_hash: TxHash,
        block_number: u64,
        /// Set for contract creations.
        contract_address: Option<Address>,
    },
    /// Hash known but no receipt within the confirmation window.
    Pending(TxHash),
    /// Send failed with no recoverable hash, or the transaction reverted.
    Failed(String),
}

impl SubmitOutcome {
    pub fn tx_hash(&self) -> Option<TxHash> {
        match self {
            SubmitOutcome::Confirmed { tx_hash, .. } => Some(*tx_hash),
            SubmitOutcome::Pending(hash) => Some(*hash),
            SubmitOutcome::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SubmitOutcome::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_conversion() {
        let chain_id = ChainId::from(97u64);
        assert_eq!(chain_id.0, 97);
        assert_eq!(u64::from(chain_id), 97);
    }

    #[test]
    fn test_error_display() {
        let err = BlockchainError::Timeout(10);
        assert_eq!(err.to_string(), "RPC timeout after 10 seconds");

        let err = BlockchainError::ChainMismatch { expected: 97, actual: 56 };
        assert_eq!(err.to_string(), "Chain ID mismatch: expected 97, got 56");
    }

    #[test]
    fn test_outcome_hash() {
        let hash = TxHash::repeat_byte(0xab);
        assert_eq!(SubmitOutcome::Pending(hash).tx_hash(), Some(hash));
        let confirmed = SubmitOutcome::Confirmed {
            tx_hash: hash,
            block_number: 7,
            contract_address: None,
        };
        assert_eq!(confirmed.tx_hash(), Some(hash));
        assert!(!confirmed.is_failed());
        assert!(SubmitOutcome::Failed("boom".into()).is_failed());
        assert_eq!(SubmitOutcome::Failed("boom".into()).tx_hash(), None);
    }
}
