//! EIP-712 typed-data construction.
//!
//! # Data Flow
//! ```text
//! on-chain reads (nonce, addresses)
//!     → domain.rs (chain-id or salt keyed domain)
//!     → messages.rs (Permit / MetaTransaction / BuyCredit)
//!     → payload.rs ({types, domain, primaryType, message} + signing hash)
//!     → wallet signs the hash
//!     → signature.rs (serialized signature → r, s, v)
//! ```
//!
//! Everything here is pure construction; no I/O.

pub mod domain;
pub mod messages;
pub mod payload;
pub mod schema;
pub mod signature;

pub use domain::{salt_from_chain_id, DomainDescriptor};
pub use messages::{BuyCredit, MessageKind, MetaTransaction, Permit, TypedMessage};
pub use payload::TypedPayload;
pub use schema::FieldSchema;
pub use signature::{serialize_signature, SignatureError, SignatureParts};
