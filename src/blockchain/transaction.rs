//! Transaction building, signing, submission and confirmation monitoring.
//!
//! # Data Flow
//! ```text
//! build(to, data) ──► TransactionRequest ──► sign() ──► SignedTx
//!                                                         │
//!                        eth_sendRawTransaction ◄─────────┘
//!                         │                │
//!                      Ok(hash)      Err(SendFailure)
//!                         │                │ recover_tx_hash()
//!                         │         Some(hash) │ None
//!                         ▼                ▼   ▼
//!                 wait_for_confirmation   ... Failed
//!                         │
//!          Confirmed | Pending (window elapsed) | Failed (reverted)
//! ```
//!
//! # Responsibilities
//! - Sync the sender nonce and gas price from chain before building
//! - Sign locally and compute the transaction hash before sending
//! - Recover a hash from duplicate-submission errors instead of failing
//! - Poll for the receipt until the configured depth or timeout

use alloy::eips::eip2718::Encodable2718;
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::rpc::types::TransactionRequest;
use std::fmt;
use std::time::Duration;
use tokio::time::{interval, timeout};

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::types::{BlockchainError, BlockchainResult, SubmitOutcome};
use crate::blockchain::wallet::Wallet;
use crate::config::SubmissionConfig;

/// Node messages meaning the exact transaction is already in the pool or chain.
const DUPLICATE_MARKERS: &[&str] = &[
    "already known",
    "known transaction",
    "already imported",
    "alreadyknown",
];

/// Why `eth_sendRawTransaction` did not return a hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendFailure {
    /// The endpoint answered with a JSON-RPC error object.
    Rpc {
        code: i64,
        message: String,
        /// Raw JSON of the error's `data` member.
        data: Option<String>,
    },
    /// No JSON-RPC answer (connection, HTTP status, timeout).
    Transport(String),
}

impl fmt::Display for SendFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendFailure::Rpc { code, message, data: Some(data) } => {
                write!(f, "RPC error {}: {} ({})", code, message, data)
            }
            SendFailure::Rpc { code, message, data: None } => {
                write!(f, "RPC error {}: {}", code, message)
            }
            SendFailure::Transport(msg) => write!(f, "Transport error: {}", msg),
        }
    }
}

/// Find the hash of a transaction the endpoint already accepted.
///
/// Relays report it as `returnedHash` in the error data. Nodes rejecting a
/// duplicate only say so in the message, and then the hash is `expected`,
/// the hash of the raw bytes we sent.
pub fn recover_tx_hash(failure: &SendFailure, expected: TxHash) -> Option<TxHash> {
    let SendFailure::Rpc { message, data, .. } = failure else {
        return None;
    };

    if let Some(hash) = data.as_deref().and_then(returned_hash) {
        if hash != expected {
            tracing::warn!(
                returned = %hash,
                expected = %expected,
                "Endpoint returned a different transaction hash"
            );
        }
        return Some(hash);
    }

    let message = message.to_lowercase();
    DUPLICATE_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
        .then_some(expected)
}

fn returned_hash(data: &str) -> Option<TxHash> {
    let value: serde_json::Value = serde_json::from_str(data).ok()?;
    value.get("returnedHash")?.as_str()?.parse().ok()
}

/// A locally signed transaction, ready to broadcast.
#[derive(Debug, Clone)]
pub struct SignedTx {
    /// EIP-2718 encoded envelope.
    pub raw: Bytes,
    pub tx_hash: TxHash,
    pub nonce: u64,
}

/// Transaction pipeline for one sender.
pub struct TxBuilder {
    client: BlockchainClient,
    /// Where raw transactions go and receipts come from; the relay when enabled.
    submitter: BlockchainClient,
    wallet: Wallet,
    config: SubmissionConfig,
}

impl TxBuilder {
    /// Create a builder that submits to the same endpoint it reads from.
    pub fn new(client: BlockchainClient, wallet: Wallet, config: SubmissionConfig) -> Self {
        Self {
            submitter: client.clone(),
            client,
            wallet,
            config,
        }
    }

    /// Route submission and receipt polling through another endpoint.
    pub fn with_submitter(mut self, submitter: BlockchainClient) -> Self {
        self.submitter = submitter;
        self
    }

    /// Build a legacy transaction request; `to = None` deploys `data` as init code.
    pub async fn build(
        &self,
        to: Option<Address>,
        data: Bytes,
    ) -> BlockchainResult<TransactionRequest> {
        let chain_nonce = self.client.get_transaction_count(self.wallet.address()).await?;
        self.wallet.set_nonce(chain_nonce);

        let gas_price = self.client.get_gas_price().await?;
        let nonce = self.wallet.get_and_increment_nonce();

        let tx = TransactionRequest::default()
            .with_from(self.wallet.address())
            .with_nonce(nonce)
            .with_gas_price(gas_price)
            .with_chain_id(self.wallet.chain_id())
            .with_gas_limit(self.config.gas_limit);

        let tx = match to {
            Some(to) => tx.with_to(to).with_input(data),
            None => tx.with_deploy_code(data),
        };

        tracing::debug!(
            from = %self.wallet.address(),
            to = ?to,
            nonce = nonce,
            gas_price = gas_price,
            gas_limit = self.config.gas_limit,
            "Transaction built"
        );

        Ok(tx)
    }

    /// Sign a built request with the sender key.
    pub async fn sign(&self, tx: TransactionRequest) -> BlockchainResult<SignedTx> {
        let nonce = tx.nonce.unwrap_or_else(|| self.wallet.current_nonce());
        let envelope = tx
            .build(&self.wallet.ethereum_wallet())
            .await
            .map_err(|e| BlockchainError::TxBuild(e.to_string()))?;

        let signed = SignedTx {
            raw: envelope.encoded_2718().into(),
            tx_hash: *envelope.tx_hash(),
            nonce,
        };

        tracing::debug!(tx_hash = %signed.tx_hash, nonce = nonce, "Transaction signed");
        Ok(signed)
    }

    /// Broadcast a signed transaction, recovering the hash from duplicate errors.
    pub async fn submit(&self, signed: &SignedTx) -> Result<TxHash, SendFailure> {
        match self.submitter.send_raw_transaction(&signed.raw).await {
            Ok(hash) => {
                tracing::info!(
                    tx_hash = %hash,
                    endpoint = self.submitter.url(),
                    "Transaction submitted"
                );
                Ok(hash)
            }
            Err(failure) => match recover_tx_hash(&failure, signed.tx_hash) {
                Some(hash) => {
                    tracing::warn!(
                        tx_hash = %hash,
                        error = %failure,
                        "Submission reported an error, transaction already accepted"
                    );
                    Ok(hash)
                }
                None => {
                    tracing::error!(
                        tx_hash = %signed.tx_hash,
                        error = %failure,
                        "Transaction submission failed"
                    );
                    Err(failure)
                }
            },
        }
    }

    /// Wait for a transaction to reach the configured confirmation depth.
    ///
    /// Returns `Pending` when the window elapses without a receipt.
    pub async fn wait_for_confirmation(&self, tx_hash: TxHash) -> BlockchainResult<SubmitOutcome> {
        let required = u64::from(self.config.confirmation_blocks);
        let window = Duration::from_secs(self.config.confirmation_timeout_secs);
        let poll_interval = Duration::from_millis(self.config.poll_interval_ms);

        let result = timeout(window, async {
            let mut ticker = interval(poll_interval);

            loop {
                ticker.tick().await;

                let receipt = match self.submitter.get_transaction_receipt(tx_hash).await? {
                    Some(r) => r,
                    None => {
                        tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                        continue;
                    }
                };

                if !receipt.status() {
                    return Ok(SubmitOutcome::Failed(format!(
                        "Transaction {} reverted",
                        tx_hash
                    )));
                }

                let current_block = self.submitter.get_block_number().await?;
                let tx_block = receipt.block_number.unwrap_or(current_block);
                let confirmations = current_block.saturating_sub(tx_block);

                if confirmations >= required {
                    return Ok(SubmitOutcome::Confirmed {
                        tx_hash,
                        block_number: tx_block,
                        contract_address: receipt.contract_address,
                    });
                }

                tracing::debug!(
                    tx_hash = %tx_hash,
                    confirmations = confirmations,
                    required = required,
                    "Waiting for confirmations"
                );
            }
        })
        .await;

        match result {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::warn!(
                    tx_hash = %tx_hash,
                    timeout_secs = self.config.confirmation_timeout_secs,
                    "No receipt within confirmation window"
                );
                Ok(SubmitOutcome::Pending(tx_hash))
            }
        }
    }

    /// Build, sign, submit and await one transaction.
    pub async fn execute(
        &self,
        to: Option<Address>,
        data: Bytes,
    ) -> BlockchainResult<SubmitOutcome> {
        let tx = self.build(to, data).await?;
        let signed = self.sign(tx).await?;

        let hash = match self.submit(&signed).await {
            Ok(hash) => hash,
            Err(failure) => return Ok(SubmitOutcome::Failed(failure.to_string())),
        };

        let outcome = self.wait_for_confirmation(hash).await?;
        match &outcome {
            SubmitOutcome::Confirmed { tx_hash, block_number, .. } => {
                tracing::info!(tx_hash = %tx_hash, block = block_number, "Transaction confirmed");
            }
            SubmitOutcome::Pending(hash) => {
                tracing::warn!(tx_hash = %hash, "Transaction still pending");
            }
            SubmitOutcome::Failed(cause) => {
                tracing::error!(cause = %cause, "Transaction failed");
            }
        }
        Ok(outcome)
    }
}
