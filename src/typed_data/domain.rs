//! EIP-712 domain descriptors.

use std::borrow::Cow;

use alloy::primitives::{Address, B256, U256};
use alloy::sol_types::Eip712Domain;
use serde_json::{json, Value};

use crate::typed_data::schema::{FieldSchema, CHAIN_ID_DOMAIN, SALT_DOMAIN};

/// Domain of a verifying contract.
///
/// The token signs over a chain-id keyed domain while the relay contract uses
/// a salt keyed one. Exactly one of the two keys is present per variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainDescriptor {
    ChainId {
        name: String,
        version: String,
        chain_id: u64,
        verifying_contract: Address,
    },
    Salt {
        name: String,
        version: String,
        salt: B256,
        verifying_contract: Address,
    },
}

impl DomainDescriptor {
    pub fn with_chain_id(
        name: impl Into<String>,
        version: impl Into<String>,
        chain_id: u64,
        verifying_contract: Address,
    ) -> Self {
        Self::ChainId {
            name: name.into(),
            version: version.into(),
            chain_id,
            verifying_contract,
        }
    }

    /// Salt keyed domain whose salt is the chain id left-padded to 32 bytes.
    pub fn with_salt(
        name: impl Into<String>,
        version: impl Into<String>,
        chain_id: u64,
        verifying_contract: Address,
    ) -> Self {
        Self::Salt {
            name: name.into(),
            version: version.into(),
            salt: salt_from_chain_id(chain_id),
            verifying_contract,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::ChainId { name, .. } | Self::Salt { name, .. } => name,
        }
    }

    pub fn verifying_contract(&self) -> Address {
        match self {
            Self::ChainId { verifying_contract, .. } | Self::Salt { verifying_contract, .. } => {
                *verifying_contract
            }
        }
    }

    /// `EIP712Domain` schema for this variant.
    pub fn schema(&self) -> &'static [FieldSchema] {
        match self {
            Self::ChainId { .. } => CHAIN_ID_DOMAIN,
            Self::Salt { .. } => SALT_DOMAIN,
        }
    }

    pub fn to_eip712_domain(&self) -> Eip712Domain {
        match self {
            Self::ChainId { name, version, chain_id, verifying_contract } => Eip712Domain::new(
                Some(Cow::Owned(name.clone())),
                Some(Cow::Owned(version.clone())),
                Some(U256::from(*chain_id)),
                Some(*verifying_contract),
                None,
            ),
            Self::Salt { name, version, salt, verifying_contract } => Eip712Domain::new(
                Some(Cow::Owned(name.clone())),
                Some(Cow::Owned(version.clone())),
                None,
                Some(*verifying_contract),
                Some(*salt),
            ),
        }
    }

    /// The domain separator the verifying contract must reproduce.
    pub fn separator(&self) -> B256 {
        self.to_eip712_domain().separator()
    }

    /// Wire form used in the `domain` slot of a payload.
    pub fn to_json(&self) -> Value {
        match self {
            Self::ChainId { name, version, chain_id, verifying_contract } => json!({
                "name": name,
                "version": version,
                "chainId": chain_id,
                "verifyingContract": verifying_contract.to_checksum(None),
            }),
            Self::Salt { name, version, salt, verifying_contract } => json!({
                "name": name,
                "version": version,
                "verifyingContract": verifying_contract.to_checksum(None),
                "salt": salt.to_string(),
            }),
        }
    }
}

/// Chain id as a 32-byte big-endian salt.
pub fn salt_from_chain_id(chain_id: u64) -> B256 {
    B256::from(U256::from(chain_id))
}
