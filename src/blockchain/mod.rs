//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Config (private key / mnemonic, RPC URL, relay URL)
//!     → wallet.rs (key loading, typed-data and transaction signing)
//!     → client.rs (RPC connection with timeouts, contract views)
//!     → contracts.rs (calldata for the signed contract calls)
//!     → transaction.rs (build, sign, broadcast, confirm)
//! ```
//!
//! # Security Constraints
//! - Keys come from config or environment, never from the command line
//! - Never log private keys or the relay API key
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod contracts;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::BlockchainClient;
pub use transaction::{recover_tx_hash, SendFailure, SignedTx, TxBuilder};
pub use types::{BlockchainError, BlockchainResult, ChainId, SubmitOutcome};
pub use wallet::Wallet;
