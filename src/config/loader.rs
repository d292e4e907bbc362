//! Configuration loading from disk and environment.

use std::path::Path;
use std::fs;
use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `network.rpc_url`.
pub const RPC_URL_ENV_VAR: &str = "RELAY_RPC_URL";
/// Environment variable overriding `network.chain_id`.
pub const CHAIN_ID_ENV_VAR: &str = "RELAY_CHAIN_ID";
/// Environment variable holding the signer private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "RELAY_SIGNER_PRIVATE_KEY";
/// Environment variable holding the signer mnemonic.
pub const MNEMONIC_ENV_VAR: &str = "RELAY_SIGNER_MNEMONIC";
/// Environment variable holding the relay API key.
pub const API_KEY_ENV_VAR: &str = "RELAY_API_KEY";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { var: &'static str, reason: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { var, reason } => write!(f, "Invalid {}: {}", var, reason),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration from a TOML file (defaults when the file is missing),
/// apply environment overrides, then validate.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let mut config = if path.exists() {
        let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
        toml::from_str(&content).map_err(ConfigError::Parse)?
    } else {
        tracing::warn!(path = %path.display(), "Config file not found, using defaults");
        AppConfig::default()
    };

    apply_env_overrides(&mut config, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay values read through `lookup` (normally `std::env::var`) onto `config`.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(RPC_URL_ENV_VAR) {
        config.network.rpc_url = url;
    }
    if let Some(raw) = lookup(CHAIN_ID_ENV_VAR) {
        config.network.chain_id = raw.trim().parse().map_err(|e| ConfigError::Env {
            var: CHAIN_ID_ENV_VAR,
            reason: format!("{}", e),
        })?;
    }
    if let Some(key) = lookup(PRIVATE_KEY_ENV_VAR) {
        config.signer.private_key = Some(key);
    }
    if let Some(phrase) = lookup(MNEMONIC_ENV_VAR) {
        config.signer.mnemonic = Some(phrase);
    }
    if let Some(key) = lookup(API_KEY_ENV_VAR) {
        config.relay.api_key = Some(key);
    }
    Ok(())
}
