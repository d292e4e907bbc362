//! Field schemas of the typed-data structs.
//!
//! Field order is significant: EIP-712 hashing is order-sensitive and every
//! list here must mirror the verifying contract's struct layout.

use serde::Serialize;

/// One `{name, type}` entry of a typed-data schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSchema {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub ty: &'static str,
}

impl FieldSchema {
    pub const fn new(name: &'static str, ty: &'static str) -> Self {
        Self { name, ty }
    }
}

/// Domain schema keyed by chain id (token domain).
pub const CHAIN_ID_DOMAIN: &[FieldSchema] = &[
    FieldSchema::new("name", "string"),
    FieldSchema::new("version", "string"),
    FieldSchema::new("chainId", "uint256"),
    FieldSchema::new("verifyingContract", "address"),
];

/// Domain schema keyed by salt (relay domain).
pub const SALT_DOMAIN: &[FieldSchema] = &[
    FieldSchema::new("name", "string"),
    FieldSchema::new("version", "string"),
    FieldSchema::new("verifyingContract", "address"),
    FieldSchema::new("salt", "bytes32"),
];

pub const PERMIT: &[FieldSchema] = &[
    FieldSchema::new("owner", "address"),
    FieldSchema::new("spender", "address"),
    FieldSchema::new("value", "uint256"),
    FieldSchema::new("nonce", "uint256"),
    FieldSchema::new("deadline", "uint256"),
];

pub const META_TRANSACTION: &[FieldSchema] = &[
    FieldSchema::new("nonce", "uint256"),
    FieldSchema::new("from", "address"),
    FieldSchema::new("functionSignature", "bytes"),
];

pub const BUY_CREDIT: &[FieldSchema] = &[
    FieldSchema::new("from", "address"),
    FieldSchema::new("to", "address"),
    FieldSchema::new("amount", "uint256"),
    FieldSchema::new("deadline", "uint256"),
    FieldSchema::new("salt", "uint256"),
];

/// Canonical `encodeType` rendering, e.g. `Mail(address from,string contents)`.
pub fn encode_type(name: &str, fields: &[FieldSchema]) -> String {
    let members: Vec<String> = fields
        .iter()
        .map(|f| format!("{} {}", f.ty, f.name))
        .collect();
    format!("{}({})", name, members.join(","))
}
