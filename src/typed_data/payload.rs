//! Typed-data payload assembly.

use std::collections::BTreeMap;

use alloy::primitives::B256;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};

use crate::typed_data::domain::DomainDescriptor;
use crate::typed_data::messages::TypedMessage;
use crate::typed_data::schema::FieldSchema;

/// A domain plus a message, ready to be hashed or handed to a signing backend.
///
/// Serializes to the V4 `{types, domain, primaryType, message}` object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedPayload<M> {
    domain: DomainDescriptor,
    message: M,
}

impl<M: TypedMessage> TypedPayload<M> {
    pub fn new(domain: DomainDescriptor, message: M) -> Self {
        Self { domain, message }
    }

    pub fn domain(&self) -> &DomainDescriptor {
        &self.domain
    }

    pub fn message(&self) -> &M {
        &self.message
    }

    pub fn primary_type(&self) -> &'static str {
        M::NAME
    }

    /// Schemas keyed by struct name, always including `EIP712Domain`.
    pub fn types(&self) -> BTreeMap<&'static str, &'static [FieldSchema]> {
        let mut types = BTreeMap::new();
        types.insert("EIP712Domain", self.domain.schema());
        types.insert(M::NAME, M::FIELDS);
        types
    }

    /// `keccak256(0x1901 ‖ domainSeparator ‖ hashStruct(message))`.
    pub fn signing_hash(&self) -> B256 {
        self.message.eip712_signing_hash(&self.domain.to_eip712_domain())
    }

    pub fn to_json(&self) -> Value {
        json!({
            "types": self.types(),
            "domain": self.domain.to_json(),
            "primaryType": self.primary_type(),
            "message": self.message.message_json(),
        })
    }
}

impl<M: TypedMessage> Serialize for TypedPayload<M> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
