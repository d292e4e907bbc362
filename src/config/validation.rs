//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check URLs and contract addresses parse
//! - Validate value ranges (chain id, gas limit, timeouts > 0)
//!
//! Returns all validation errors, not just the first.

use alloy::primitives::Address;
use std::fmt;

use crate::config::schema::AppConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a loaded configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = config.network.rpc_url.parse::<url::Url>() {
        errors.push(ValidationError::new("network.rpc_url", format!("invalid URL: {}", e)));
    }
    if config.network.chain_id == 0 {
        errors.push(ValidationError::new("network.chain_id", "must be non-zero"));
    }
    if config.network.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("network.rpc_timeout_secs", "must be non-zero"));
    }

    if config.relay.enabled {
        if config.relay.url.trim().is_empty() {
            errors.push(ValidationError::new("relay.url", "required when relay is enabled"));
        } else if let Err(e) = config.relay.url.parse::<url::Url>() {
            errors.push(ValidationError::new("relay.url", format!("invalid URL: {}", e)));
        }
        if config.relay.api_key_header.trim().is_empty() {
            errors.push(ValidationError::new("relay.api_key_header", "must not be empty"));
        }
    }

    if config.contracts.token_address.parse::<Address>().is_err() {
        errors.push(ValidationError::new("contracts.token_address", "invalid address"));
    }
    if config.contracts.buy_credit_address.parse::<Address>().is_err() {
        errors.push(ValidationError::new("contracts.buy_credit_address", "invalid address"));
    }
    if config.contracts.version.is_empty() {
        errors.push(ValidationError::new("contracts.version", "must not be empty"));
    }

    if config.submission.gas_limit == 0 {
        errors.push(ValidationError::new("submission.gas_limit", "must be non-zero"));
    }
    if config.submission.poll_interval_ms == 0 {
        errors.push(ValidationError::new("submission.poll_interval_ms", "must be non-zero"));
    }
    if config.submission.confirmation_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "submission.confirmation_timeout_secs",
            "must be non-zero",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
