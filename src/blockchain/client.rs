//! Blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to a JSON-RPC endpoint (node or relay)
//! - Query chain state (nonces, balances, receipts) and contract views
//! - Send signed raw transactions, keeping RPC error payloads intact
//! - Bound every call by the configured timeout

use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::client::RpcClient;
use alloy::rpc::types::TransactionReceipt;
use alloy::transports::http::Http;
use alloy::transports::{RpcError, TransportErrorKind};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::fmt::Display;
use std::future::IntoFuture;
use std::time::Duration;
use tokio::time::timeout;

use crate::blockchain::contracts::{IBuyCredit, ISugarBounceToken};
use crate::blockchain::transaction::SendFailure;
use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainId};
use crate::config::{NetworkConfig, RelayConfig};

/// JSON-RPC client wrapper.
#[derive(Clone)]
pub struct BlockchainClient {
    provider: DynProvider,
    /// Endpoint URL, for logs.
    url: String,
    config: NetworkConfig,
    timeout_duration: Duration,
}

impl BlockchainClient {
    /// Connect to `config.rpc_url`.
    ///
    /// Fails on a chain id mismatch when `verify_chain_id` is set; an
    /// unreachable endpoint only logs a warning.
    pub async fn new(config: &NetworkConfig) -> BlockchainResult<Self> {
        let url: url::Url = config.rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        let provider = ProviderBuilder::new().connect_http(url).erased();

        let client = Self::from_provider(provider, config.rpc_url.clone(), config);

        if config.verify_chain_id {
            match client.verify_chain_id().await {
                Ok(()) => {}
                Err(e @ BlockchainError::ChainMismatch { .. }) => return Err(e),
                Err(e) => {
                    tracing::warn!(error = %e, "Chain verification skipped, endpoint unreachable");
                }
            }
        }

        tracing::info!(
            rpc_url = %config.rpc_url,
            chain_id = config.chain_id,
            "Blockchain client initialized"
        );

        Ok(client)
    }

    /// Connect to the relay endpoint, attaching the API key header to every request.
    pub fn relay(relay: &RelayConfig, network: &NetworkConfig) -> BlockchainResult<Self> {
        let url: url::Url = relay.url.parse().map_err(|e| {
            BlockchainError::NotAvailable(format!("Invalid relay URL '{}': {}", relay.url, e))
        })?;

        let mut headers = HeaderMap::new();
        if let Some(key) = relay.api_key.as_deref() {
            let name = HeaderName::from_bytes(relay.api_key_header.as_bytes()).map_err(|e| {
                BlockchainError::NotAvailable(format!("Invalid relay header name: {}", e))
            })?;
            let mut value = HeaderValue::from_str(key).map_err(|e| {
                BlockchainError::NotAvailable(format!("Invalid relay API key: {}", e))
            })?;
            value.set_sensitive(true);
            headers.insert(name, value);
        } else {
            tracing::warn!(relay_url = %relay.url, "Relay enabled without an API key");
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| BlockchainError::NotAvailable(format!("HTTP client: {}", e)))?;
        let rpc = RpcClient::new(Http::with_client(http, url), false);
        let provider = ProviderBuilder::new().connect_client(rpc).erased();

        tracing::info!(relay_url = %relay.url, "Relay client initialized");

        Ok(Self::from_provider(provider, relay.url.clone(), network))
    }

    fn from_provider(provider: DynProvider, url: String, config: &NetworkConfig) -> Self {
        Self {
            provider,
            url,
            config: config.clone(),
            timeout_duration: Duration::from_secs(config.rpc_timeout_secs),
        }
    }

    /// Await an RPC future under the client timeout, flattening its error.
    async fn timed<F, T, E>(&self, op: &'static str, fut: F) -> BlockchainResult<T>
    where
        F: IntoFuture<Output = Result<T, E>>,
        E: Display,
    {
        match timeout(self.timeout_duration, fut).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(e)) => {
                tracing::warn!(op = op, url = %self.url, error = %e, "RPC error");
                Err(BlockchainError::Rpc(format!("{}: {}", op, e)))
            }
            Err(_) => {
                tracing::warn!(op = op, url = %self.url, "RPC timeout");
                Err(BlockchainError::Timeout(self.config.rpc_timeout_secs))
            }
        }
    }

    /// Verify the connected chain ID matches configuration.
    pub async fn verify_chain_id(&self) -> BlockchainResult<()> {
        let chain_id = self.get_chain_id().await?;
        if chain_id.0 != self.config.chain_id {
            return Err(BlockchainError::ChainMismatch {
                expected: self.config.chain_id,
                actual: chain_id.0,
            });
        }
        Ok(())
    }

    /// Get the chain ID from the RPC.
    pub async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
        self.timed("eth_chainId", self.provider.get_chain_id())
            .await
            .map(ChainId)
    }

    /// Get the latest block number.
    pub async fn get_block_number(&self) -> BlockchainResult<u64> {
        self.timed("eth_blockNumber", self.provider.get_block_number()).await
    }

    /// Get the transaction count (sender nonce) for an address.
    pub async fn get_transaction_count(&self, address: Address) -> BlockchainResult<u64> {
        self.timed("eth_getTransactionCount", self.provider.get_transaction_count(address))
            .await
    }

    /// Get current gas price in wei.
    pub async fn get_gas_price(&self) -> BlockchainResult<u128> {
        self.timed("eth_gasPrice", self.provider.get_gas_price()).await
    }

    /// Get a transaction receipt by hash.
    pub async fn get_transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> BlockchainResult<Option<TransactionReceipt>> {
        self.timed("eth_getTransactionReceipt", self.provider.get_transaction_receipt(tx_hash))
            .await
    }

    /// Broadcast signed raw transaction bytes.
    ///
    /// Errors keep the JSON-RPC error payload so the caller can look for a
    /// hash in it.
    pub async fn send_raw_transaction(&self, raw: &Bytes) -> Result<TxHash, SendFailure> {
        match timeout(self.timeout_duration, self.provider.send_raw_transaction(raw)).await {
            Ok(Ok(pending)) => Ok(*pending.tx_hash()),
            Ok(Err(e)) => Err(send_failure_from_rpc(&e)),
            Err(_) => Err(SendFailure::Transport(format!(
                "eth_sendRawTransaction timed out after {} seconds",
                self.config.rpc_timeout_secs
            ))),
        }
    }

    /// Owner's permit nonce on the token.
    pub async fn token_nonce(&self, token: Address, owner: Address) -> BlockchainResult<U256> {
        let contract = ISugarBounceToken::new(token, self.provider.clone());
        self.timed("nonces", contract.nonces(owner).call()).await
    }

    pub async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> BlockchainResult<U256> {
        let contract = ISugarBounceToken::new(token, self.provider.clone());
        self.timed("allowance", contract.allowance(owner, spender).call()).await
    }

    pub async fn balance_of(&self, token: Address, account: Address) -> BlockchainResult<U256> {
        let contract = ISugarBounceToken::new(token, self.provider.clone());
        self.timed("balanceOf", contract.balanceOf(account).call()).await
    }

    /// Token `decimals()`, for display.
    pub async fn decimals(&self, token: Address) -> BlockchainResult<u8> {
        let contract = ISugarBounceToken::new(token, self.provider.clone());
        self.timed("decimals", contract.decimals().call()).await
    }

    /// User's meta-transaction nonce on the relay contract.
    pub async fn relay_nonce(&self, relay: Address, user: Address) -> BlockchainResult<U256> {
        let contract = IBuyCredit::new(relay, self.provider.clone());
        self.timed("getNonce", contract.getNonce(user).call()).await
    }

    /// User's BuyCredit salt counter on the relay contract.
    pub async fn buy_credit_nonce(&self, relay: Address, user: Address) -> BlockchainResult<U256> {
        let contract = IBuyCredit::new(relay, self.provider.clone());
        self.timed("getBuyCreditNonces", contract.getBuyCreditNonces(user).call())
            .await
    }

    /// Endpoint URL this client talks to.
    pub fn url(&self) -> &str {
        &self.url
    }
}

fn send_failure_from_rpc(error: &RpcError<TransportErrorKind>) -> SendFailure {
    match error.as_error_resp() {
        Some(payload) => SendFailure::Rpc {
            code: payload.code,
            message: payload.message.to_string(),
            data: payload.data.as_ref().map(|d| d.get().to_string()),
        },
        None => SendFailure::Transport(error.to_string()),
    }
}

impl std::fmt::Debug for BlockchainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainClient")
            .field("url", &self.url)
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}
