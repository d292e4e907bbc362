//! Message structs signed by token holders.

use alloy::sol;
use alloy::sol_types::SolStruct;
use serde_json::{json, Value};

use crate::typed_data::schema::{self, FieldSchema};

sol! {
    /// Token allowance granted off-chain.
    #[derive(Debug, PartialEq, Eq)]
    struct Permit {
        address owner;
        address spender;
        uint256 value;
        uint256 nonce;
        uint256 deadline;
    }

    /// An already ABI-encoded call executed by the relay on behalf of `from`.
    #[derive(Debug, PartialEq, Eq)]
    struct MetaTransaction {
        uint256 nonce;
        address from;
        bytes functionSignature;
    }

    /// Direct token transfer through the relay contract.
    #[derive(Debug, PartialEq, Eq)]
    struct BuyCredit {
        address from;
        address to;
        uint256 amount;
        uint256 deadline;
        uint256 salt;
    }
}

/// Message kinds understood by the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Permit,
    MetaTransaction,
    BuyCredit,
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MessageKind::Permit => "Permit",
            MessageKind::MetaTransaction => "MetaTransaction",
            MessageKind::BuyCredit => "BuyCredit",
        };
        f.write_str(name)
    }
}

/// A struct that can be placed in the `message` slot of a typed-data payload.
pub trait TypedMessage: SolStruct {
    const KIND: MessageKind;

    /// Field schema in contract struct order.
    const FIELDS: &'static [FieldSchema];

    /// Wire form. Integers are decimal strings, never floats.
    fn message_json(&self) -> Value;
}

impl TypedMessage for Permit {
    const KIND: MessageKind = MessageKind::Permit;
    const FIELDS: &'static [FieldSchema] = schema::PERMIT;

    fn message_json(&self) -> Value {
        json!({
            "owner": self.owner.to_checksum(None),
            "spender": self.spender.to_checksum(None),
            "value": self.value.to_string(),
            "nonce": self.nonce.to_string(),
            "deadline": self.deadline.to_string(),
        })
    }
}

impl TypedMessage for MetaTransaction {
    const KIND: MessageKind = MessageKind::MetaTransaction;
    const FIELDS: &'static [FieldSchema] = schema::META_TRANSACTION;

    fn message_json(&self) -> Value {
        json!({
            "nonce": self.nonce.to_string(),
            "from": self.from.to_checksum(None),
            "functionSignature": self.functionSignature.to_string(),
        })
    }
}

impl TypedMessage for BuyCredit {
    const KIND: MessageKind = MessageKind::BuyCredit;
    const FIELDS: &'static [FieldSchema] = schema::BUY_CREDIT;

    fn message_json(&self) -> Value {
        json!({
            "from": self.from.to_checksum(None),
            "to": self.to.to_checksum(None),
            "amount": self.amount.to_string(),
            "deadline": self.deadline.to_string(),
            "salt": self.salt.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typed_data::schema::encode_type;
    use alloy::primitives::{Address, Bytes, U256};

    // The hashed structs and the published schemas must describe the same layout.
    #[test]
    fn test_schemas_match_hashed_structs() {
        assert_eq!(encode_type(Permit::NAME, Permit::FIELDS), Permit::eip712_root_type());
        assert_eq!(
            encode_type(MetaTransaction::NAME, MetaTransaction::FIELDS),
            MetaTransaction::eip712_root_type()
        );
        assert_eq!(encode_type(BuyCredit::NAME, BuyCredit::FIELDS), BuyCredit::eip712_root_type());
    }

    #[test]
    fn test_numbers_serialize_as_decimal_strings() {
        let permit = Permit {
            owner: Address::ZERO,
            spender: Address::ZERO,
            value: U256::from(10u64).pow(U256::from(24u64)),
            nonce: U256::ZERO,
            deadline: U256::from(1_700_002_000u64),
        };
        let json = permit.message_json();
        assert_eq!(json["value"], "1000000000000000000000000");
        assert_eq!(json["nonce"], "0");
        assert_eq!(json["deadline"], "1700002000");
    }

    #[test]
    fn test_function_signature_is_hex() {
        let meta = MetaTransaction {
            nonce: U256::from(3u64),
            from: Address::ZERO,
            functionSignature: Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]),
        };
        assert_eq!(meta.message_json()["functionSignature"], "0xdeadbeef");
        assert_eq!(MetaTransaction::KIND.to_string(), "MetaTransaction");
    }
}
