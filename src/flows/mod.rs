//! End-to-end operations behind the CLI subcommands.
//!
//! # Data Flow
//! ```text
//! Session::connect(config)
//!     → on-chain reads (token nonce, relay nonce, BuyCredit salt)
//!     → typed_data (domain + message)     pure
//!     → Wallet::sign_typed                pure
//!     → contracts::*_calldata             pure
//!     → Session::dispatch ─► dry run: FlowOutcome::DryRun
//!                         └► TxBuilder::execute ─► FlowOutcome::Submitted
//! ```
//!
//! # Design Decisions
//! - Token, relay and BuyCredit nonces are read separately, never cached
//! - A session without a signer can still read state and preview payloads

pub mod buy_credit;
pub mod deploy;
pub mod permit;
pub mod relay;
pub mod token;

use alloy::primitives::utils::{parse_units, ParseUnits};
use alloy::primitives::{Address, Bytes, U256};
use std::path::PathBuf;
use thiserror::Error;
use time::OffsetDateTime;

use crate::blockchain::{BlockchainClient, BlockchainError, SubmitOutcome, TxBuilder, Wallet};
use crate::config::{AppConfig, ConfigError};
use crate::typed_data::{DomainDescriptor, SignatureError};

/// Errors ending a CLI flow.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Blockchain(#[from] BlockchainError),

    #[error("Signature error: {0}")]
    Signature(#[from] SignatureError),

    #[error("Invalid amount '{amount}': {reason}")]
    InvalidAmount { amount: String, reason: String },

    #[error("Invalid address for {field}: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("No signer configured: set signer.private_key or signer.mnemonic")]
    SignerRequired,

    #[error("Artifact {path}: {reason}")]
    Artifact { path: PathBuf, reason: String },

    #[error("Deployments file {path}: {reason}")]
    Deployments { path: PathBuf, reason: String },
}

pub type FlowResult<T> = Result<T, FlowError>;

/// What a flow produced.
#[derive(Debug, Clone)]
pub enum FlowOutcome {
    Submitted(SubmitOutcome),
    /// `--dry-run`: everything up to submission, nothing sent.
    DryRun(DryRunReport),
}

impl FlowOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, FlowOutcome::Submitted(outcome) if outcome.is_failed())
    }
}

/// The transaction a flow would have sent.
#[derive(Debug, Clone)]
pub struct DryRunReport {
    /// `None` for contract creation.
    pub to: Option<Address>,
    pub calldata: Bytes,
    /// Signed typed-data payloads, in signing order.
    pub payloads: Vec<serde_json::Value>,
}

/// Connected clients plus configuration for one CLI invocation.
pub struct Session {
    config: AppConfig,
    client: BlockchainClient,
    relay: Option<BlockchainClient>,
    wallet: Option<Wallet>,
    dry_run: bool,
}

impl Session {
    /// Connect to the node (and relay when enabled) and load the signer if any.
    pub async fn connect(config: AppConfig, dry_run: bool) -> FlowResult<Self> {
        let client = BlockchainClient::new(&config.network).await?;

        let relay = if config.relay.enabled {
            Some(BlockchainClient::relay(&config.relay, &config.network)?)
        } else {
            None
        };

        let wallet = if config.signer.has_source() {
            Some(Wallet::from_config(&config.signer, config.network.chain_id)?)
        } else {
            tracing::info!("No signer configured, read-only session");
            None
        };

        Ok(Self {
            config,
            client,
            relay,
            wallet,
            dry_run,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn client(&self) -> &BlockchainClient {
        &self.client
    }

    pub fn wallet(&self) -> FlowResult<&Wallet> {
        self.wallet.as_ref().ok_or(FlowError::SignerRequired)
    }

    /// The signer's address, or `fallback` when given.
    pub fn account_or_signer(&self, fallback: Option<Address>) -> FlowResult<Address> {
        match fallback {
            Some(address) => Ok(address),
            None => Ok(self.wallet()?.address()),
        }
    }

    pub fn token_address(&self) -> FlowResult<Address> {
        parse_address("contracts.token_address", &self.config.contracts.token_address)
    }

    pub fn buy_credit_address(&self) -> FlowResult<Address> {
        parse_address(
            "contracts.buy_credit_address",
            &self.config.contracts.buy_credit_address,
        )
    }

    /// Token domain: chain-id variant.
    pub fn token_domain(&self) -> FlowResult<DomainDescriptor> {
        let contracts = &self.config.contracts;
        Ok(DomainDescriptor::with_chain_id(
            contracts.token_name.clone(),
            contracts.version.clone(),
            self.config.network.chain_id,
            self.token_address()?,
        ))
    }

    /// BuyCredit domain: salt variant.
    pub fn buy_credit_domain(&self) -> FlowResult<DomainDescriptor> {
        let contracts = &self.config.contracts;
        Ok(DomainDescriptor::with_salt(
            contracts.buy_credit_name.clone(),
            contracts.version.clone(),
            self.config.network.chain_id,
            self.buy_credit_address()?,
        ))
    }

    /// Deadline `submission.deadline_secs` from now.
    pub fn deadline(&self) -> U256 {
        deadline_from_now(self.config.submission.deadline_secs)
    }

    /// Scale a human token amount by the configured decimals.
    pub fn token_amount(&self, amount: &str) -> FlowResult<U256> {
        parse_token_amount(amount, self.config.contracts.token_decimals)
    }

    fn tx_builder(&self, via_relay: bool) -> FlowResult<TxBuilder> {
        let builder = TxBuilder::new(
            self.client.clone(),
            self.wallet()?.clone(),
            self.config.submission.clone(),
        );

        Ok(match (via_relay, &self.relay) {
            (true, Some(relay)) => builder.with_submitter(relay.clone()),
            (true, None) => {
                tracing::info!("Relay disabled, submitting directly");
                builder
            }
            (false, _) => builder,
        })
    }

    /// Send `data` to `to` (or deploy it when `to` is `None`), unless dry-running.
    pub async fn dispatch(
        &self,
        to: Option<Address>,
        data: Bytes,
        via_relay: bool,
        payloads: Vec<serde_json::Value>,
    ) -> FlowResult<FlowOutcome> {
        if self.dry_run {
            tracing::info!(to = ?to, calldata_len = data.len(), "Dry run, not submitting");
            return Ok(FlowOutcome::DryRun(DryRunReport {
                to,
                calldata: data,
                payloads,
            }));
        }

        let outcome = self.tx_builder(via_relay)?.execute(to, data).await?;
        Ok(FlowOutcome::Submitted(outcome))
    }
}

pub fn parse_address(field: &'static str, value: &str) -> FlowResult<Address> {
    value.trim().parse().map_err(|_| FlowError::InvalidAddress {
        field,
        value: value.to_string(),
    })
}

/// Unix time plus `secs`.
pub fn deadline_from_now(secs: u64) -> U256 {
    let now = u64::try_from(OffsetDateTime::now_utc().unix_timestamp()).unwrap_or_default();
    U256::from(now.saturating_add(secs))
}

/// Exact decimal parse of `amount` scaled by `10^decimals`.
pub fn parse_token_amount(amount: &str, decimals: u8) -> FlowResult<U256> {
    let invalid = |reason: String| FlowError::InvalidAmount {
        amount: amount.to_string(),
        reason,
    };

    match parse_units(amount.trim(), decimals).map_err(|e| invalid(e.to_string()))? {
        ParseUnits::U256(value) => Ok(value),
        ParseUnits::I256(_) => Err(invalid("negative amounts are not allowed".to_string())),
    }
}
