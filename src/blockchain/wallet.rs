//! Wallet management and signing.
//!
//! # Security
//! - Keys come from the environment or config; they are never logged
//! - Keys never leave the wallet; callers receive signatures only

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, B256};
use alloy::signers::local::{coins_bip39::English, MnemonicBuilder, PrivateKeySigner};
use alloy::signers::{Signature, Signer};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::config::SignerConfig;
use crate::typed_data::{TypedMessage, TypedPayload};

/// Wallet for message and transaction signing with sender nonce tracking.
#[derive(Debug, Clone)]
pub struct Wallet {
    /// The underlying signer (private key).
    signer: PrivateKeySigner,
    /// Next transaction nonce, synced from chain before each build.
    nonce: Arc<AtomicU64>,
    /// Chain ID for EIP-155 replay protection.
    chain_id: u64,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    /// * `chain_id` - Chain ID for transaction signing
    pub fn from_private_key(private_key_hex: &str, chain_id: u64) -> BlockchainResult<Self> {
        let trimmed = private_key_hex.trim();
        let key_hex = trimmed.strip_prefix("0x").unwrap_or(trimmed);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key format: {}", e)))?;

        Ok(Self::from_signer(signer, chain_id))
    }

    /// Derive the account at `m/44'/60'/0'/0/{index}` from a BIP-39 phrase.
    pub fn from_mnemonic(phrase: &str, index: u32, chain_id: u64) -> BlockchainResult<Self> {
        let signer = MnemonicBuilder::<English>::default()
            .phrase(phrase.trim())
            .index(index)
            .map_err(|e| BlockchainError::Wallet(format!("Invalid derivation index {}: {}", index, e)))?
            .build()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid mnemonic: {}", e)))?;

        Ok(Self::from_signer(signer, chain_id))
    }

    /// Build from config, preferring the private key over the mnemonic.
    pub fn from_config(config: &SignerConfig, chain_id: u64) -> BlockchainResult<Self> {
        match (config.private_key.as_deref(), config.mnemonic.as_deref()) {
            (Some(key), _) if !key.trim().is_empty() => Self::from_private_key(key, chain_id),
            (_, Some(phrase)) if !phrase.trim().is_empty() => {
                Self::from_mnemonic(phrase, config.account_index, chain_id)
            }
            _ => Err(BlockchainError::Wallet(
                "No signer configured: set a private key or mnemonic".to_string(),
            )),
        }
    }

    fn from_signer(signer: PrivateKeySigner, chain_id: u64) -> Self {
        let signer = signer.with_chain_id(Some(chain_id));

        tracing::info!(
            address = %signer.address(),
            chain_id = chain_id,
            "Wallet initialized"
        );

        Self {
            signer,
            nonce: Arc::new(AtomicU64::new(0)),
            chain_id,
        }
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Get the chain ID this wallet is configured for.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Get and increment the nonce atomically.
    pub fn get_and_increment_nonce(&self) -> u64 {
        self.nonce.fetch_add(1, Ordering::SeqCst)
    }

    /// Set the nonce to a specific value (e.g., after querying from chain).
    pub fn set_nonce(&self, nonce: u64) {
        self.nonce.store(nonce, Ordering::SeqCst);
    }

    /// Get current nonce without incrementing.
    pub fn current_nonce(&self) -> u64 {
        self.nonce.load(Ordering::SeqCst)
    }

    /// Sign a 32-byte digest.
    pub async fn sign_hash(&self, hash: B256) -> BlockchainResult<Signature> {
        self.signer
            .sign_hash(&hash)
            .await
            .map_err(|e| BlockchainError::Wallet(format!("Signing failed: {}", e)))
    }

    /// Sign a typed-data payload (domain separator + struct hash, V4 rules).
    pub async fn sign_typed<M: TypedMessage>(
        &self,
        payload: &TypedPayload<M>,
    ) -> BlockchainResult<Signature> {
        let digest = payload.signing_hash();
        tracing::debug!(
            kind = %M::KIND,
            domain = payload.domain().name(),
            digest = %digest,
            "Signing typed data"
        );
        self.sign_hash(digest).await
    }

    /// Transaction signer for alloy's transaction builder.
    pub fn ethereum_wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typed_data::{DomainDescriptor, Permit, SignatureParts, serialize_signature};
    use alloy::primitives::{address, U256};

    // Well-known development key (Anvil/Hardhat account #0)
    const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TEST_MNEMONIC: &str = "test test test test test test test test test test test junk";

    fn permit_payload(owner: Address) -> TypedPayload<Permit> {
        TypedPayload::new(
            DomainDescriptor::with_chain_id(
                "SugarBounce",
                "1",
                97,
                address!("41e279a5891cab78cccd72c9fdd0e4b937bcaac0"),
            ),
            Permit {
                owner,
                spender: address!("fa2579f983b741a991adc3beeb282434f72b49a6"),
                value: U256::from(1_000_000u64),
                nonce: U256::ZERO,
                deadline: U256::from(1_700_002_000u64),
            },
        )
    }

    #[test]
    fn test_wallet_from_private_key() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY, 97).unwrap();
        assert_eq!(
            wallet.address().to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
        assert_eq!(wallet.chain_id(), 97);
    }

    #[test]
    fn test_wallet_with_0x_prefix() {
        let wallet = Wallet::from_private_key(&format!("0x{}", TEST_PRIVATE_KEY), 97).unwrap();
        assert_eq!(
            wallet.address().to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn test_wallet_from_mnemonic_indices() {
        let alice = Wallet::from_mnemonic(TEST_MNEMONIC, 0, 97).unwrap();
        let bob = Wallet::from_mnemonic(TEST_MNEMONIC, 1, 97).unwrap();
        assert_eq!(
            alice.address().to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
        assert_eq!(
            bob.address().to_string().to_lowercase(),
            "0x70997970c51812dc3a010c7d01b50e0d17dc79c8"
        );
    }

    #[test]
    fn test_from_config_prefers_private_key() {
        let config = SignerConfig {
            private_key: Some(TEST_PRIVATE_KEY.to_string()),
            mnemonic: Some(TEST_MNEMONIC.to_string()),
            account_index: 1,
        };
        let wallet = Wallet::from_config(&config, 97).unwrap();
        assert_eq!(
            wallet.address().to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );

        let err = Wallet::from_config(&SignerConfig::default(), 97).unwrap_err();
        assert!(err.to_string().contains("No signer configured"));
    }

    #[test]
    fn test_nonce_management() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY, 97).unwrap();

        assert_eq!(wallet.current_nonce(), 0);
        assert_eq!(wallet.get_and_increment_nonce(), 0);
        assert_eq!(wallet.get_and_increment_nonce(), 1);
        assert_eq!(wallet.current_nonce(), 2);

        wallet.set_nonce(100);
        assert_eq!(wallet.current_nonce(), 100);
    }

    #[test]
    fn test_invalid_private_key() {
        let result = Wallet::from_private_key("invalid_key", 97);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid private key"));
    }

    #[tokio::test]
    async fn test_typed_signature_recovers_owner() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY, 97).unwrap();
        let payload = permit_payload(wallet.address());

        let signature = wallet.sign_typed(&payload).await.unwrap();
        let recovered = signature
            .recover_address_from_prehash(&payload.signing_hash())
            .unwrap();
        assert_eq!(recovered, wallet.address());
    }

    #[tokio::test]
    async fn test_typed_signature_is_deterministic() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY, 97).unwrap();
        let payload = permit_payload(wallet.address());

        let first = serialize_signature(&wallet.sign_typed(&payload).await.unwrap());
        let second = serialize_signature(&wallet.sign_typed(&payload).await.unwrap());
        assert_eq!(first, second);
        assert_eq!(first.len(), 2 + 130);

        let a = SignatureParts::decompose(&first).unwrap();
        let b = SignatureParts::decompose(&second).unwrap();
        assert_eq!(a, b);
        assert!(a.v == 27 || a.v == 28);
    }

    #[tokio::test]
    async fn test_signature_bound_to_domain_variant() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY, 97).unwrap();
        let payload = permit_payload(wallet.address());
        let signature = wallet.sign_typed(&payload).await.unwrap();

        let salted = TypedPayload::new(
            DomainDescriptor::with_salt(
                "SugarBounce",
                "1",
                97,
                payload.domain().verifying_contract(),
            ),
            payload.message().clone(),
        );
        let recovered = signature
            .recover_address_from_prehash(&salted.signing_hash())
            .unwrap();
        assert_ne!(recovered, wallet.address());
    }

    #[tokio::test]
    async fn test_parts_match_signature() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY, 97).unwrap();
        let signature = wallet.sign_typed(&permit_payload(wallet.address())).await.unwrap();
        assert_eq!(
            SignatureParts::from_signature(&signature),
            SignatureParts::decompose(&serialize_signature(&signature)).unwrap()
        );
    }
}
