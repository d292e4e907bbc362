//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the tool.
//! All types derive Serde traits for deserialization from config files.
//! Secrets (private key, mnemonic, relay API key) are accepted on input but
//! never serialized back out.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// JSON-RPC endpoint and chain settings.
    pub network: NetworkConfig,

    /// Where the signing key comes from.
    pub signer: SignerConfig,

    /// Gas-abstraction relay endpoint.
    pub relay: RelayConfig,

    /// Deployed contract addresses and EIP-712 domain names.
    pub contracts: ContractsConfig,

    /// Transaction submission and confirmation settings.
    pub submission: SubmissionConfig,

    /// Contract deployment settings.
    pub deploy: DeployConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Network configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Chain ID (97 for BSC testnet, 31337 for a local node).
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Compare the endpoint's chain id with `chain_id` on connect.
    pub verify_chain_id: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://data-seed-prebsc-1-s1.binance.org:8545".to_string(),
            chain_id: 97,
            rpc_timeout_secs: 10,
            verify_chain_id: true,
        }
    }
}

/// Signer key source. Exactly one of `private_key` / `mnemonic` is used,
/// the private key winning when both are set.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SignerConfig {
    /// Hex private key (with or without 0x).
    #[serde(skip_serializing)]
    pub private_key: Option<String>,

    /// BIP-39 phrase.
    #[serde(skip_serializing)]
    pub mnemonic: Option<String>,

    /// Account index under `m/44'/60'/0'/0/`.
    pub account_index: u32,
}

impl SignerConfig {
    /// Whether any key source is configured.
    pub fn has_source(&self) -> bool {
        self.private_key.as_deref().is_some_and(|k| !k.trim().is_empty())
            || self.mnemonic.as_deref().is_some_and(|m| !m.trim().is_empty())
    }
}

/// Relay configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Send signed transactions through the relay instead of `network.rpc_url`.
    pub enabled: bool,

    /// Relay JSON-RPC URL.
    pub url: String,

    /// API key attached to every relay request.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Header carrying the API key.
    pub api_key_header: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: String::new(),
            api_key: None,
            api_key_header: "x-api-key".to_string(),
        }
    }
}

/// Contract addresses and EIP-712 domain names.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContractsConfig {
    /// SugarBounceToken address.
    pub token_address: String,

    /// BuyCredit relay contract address.
    pub buy_credit_address: String,

    /// EIP-712 domain name of the token.
    pub token_name: String,

    /// EIP-712 domain name of the relay contract.
    pub buy_credit_name: String,

    /// EIP-712 domain version shared by both contracts.
    pub version: String,

    /// Token decimals used to scale whole-token amounts.
    pub token_decimals: u8,
}

impl Default for ContractsConfig {
    fn default() -> Self {
        Self {
            token_address: "0x41e279A5891CaB78cCcd72C9fdd0e4b937BcAaC0".to_string(),
            buy_credit_address: "0xFA2579F983B741a991AdC3beEb282434F72b49A6".to_string(),
            token_name: "SugarBounce".to_string(),
            buy_credit_name: "BuyCredit".to_string(),
            version: "1".to_string(),
            token_decimals: 18,
        }
    }
}

/// Submission configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SubmissionConfig {
    /// Gas limit attached to every transaction.
    pub gas_limit: u64,

    /// Blocks on top of the receipt block before a transaction counts as confirmed.
    pub confirmation_blocks: u32,

    /// How long to poll for a receipt before reporting the transaction as pending.
    pub confirmation_timeout_secs: u64,

    /// Receipt polling interval in milliseconds.
    pub poll_interval_ms: u64,

    /// Seconds from now used for permit / BuyCredit deadlines.
    pub deadline_secs: u64,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            gas_limit: 1_000_000,
            confirmation_blocks: 0,
            confirmation_timeout_secs: 120,
            poll_interval_ms: 2_000,
            deadline_secs: 2_000,
        }
    }
}

/// Deployment configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Directory holding Hardhat artifacts (`<Name>.json` with `abi` and `bytecode`).
    pub artifacts_dir: String,

    /// Deployments record file.
    pub deployments_path: String,

    /// Network label written into the deployments file.
    pub network_name: String,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            artifacts_dir: "artifacts".to_string(),
            deployments_path: "deployments.json".to_string(),
            network_name: "bscTest".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [network]
            rpc_url = "http://localhost:8545"
            chain_id = 31337

            [relay]
            enabled = true
            url = "https://relay.example"
            "#,
        )
        .unwrap();

        assert_eq!(config.network.chain_id, 31337);
        assert_eq!(config.network.rpc_timeout_secs, 10);
        assert!(config.relay.enabled);
        assert_eq!(config.relay.api_key_header, "x-api-key");
        assert_eq!(config.contracts.token_name, "SugarBounce");
        assert_eq!(config.submission.gas_limit, 1_000_000);
    }

    #[test]
    fn test_secrets_not_serialized() {
        let mut config = AppConfig::default();
        config.signer.private_key = Some("0xdeadbeef".to_string());
        config.signer.mnemonic = Some("test test test".to_string());
        config.relay.api_key = Some("secret".to_string());

        let rendered = toml::to_string(&config).unwrap();
        assert!(!rendered.contains("deadbeef"));
        assert!(!rendered.contains("test test test"));
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn test_signer_source() {
        let mut signer = SignerConfig::default();
        assert!(!signer.has_source());
        signer.mnemonic = Some("  ".to_string());
        assert!(!signer.has_source());
        signer.private_key = Some("0x01".to_string());
        assert!(signer.has_source());
    }
}
