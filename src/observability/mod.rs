//! Observability subsystem.
//!
//! # Design Decisions
//! - Structured `tracing` events with typed fields (`tx_hash = %hash`)
//! - `RUST_LOG` overrides the configured level
//! - Secrets are never recorded as fields

pub mod logging;
