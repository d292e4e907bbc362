//! Contract deployment from compiled Hardhat artifacts.
//!
//! # Responsibilities
//! - Load `{abi, bytecode}` artifacts
//! - Append constructor arguments and send the creation transaction
//! - Record confirmed addresses in the deployments file

use alloy::primitives::{Address, Bytes, TxHash};
use alloy::sol_types::SolValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::blockchain::SubmitOutcome;
use crate::flows::{FlowError, FlowOutcome, FlowResult, Session};

/// Deployable contracts and their artifact names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractKind {
    SugarBounceToken,
    BuyCredit,
}

impl ContractKind {
    pub fn artifact_name(self) -> &'static str {
        match self {
            ContractKind::SugarBounceToken => "SugarBounceToken",
            ContractKind::BuyCredit => "BuyCredit",
        }
    }
}

/// The parts of a Hardhat artifact needed to deploy.
#[derive(Debug, Clone, Deserialize)]
pub struct Artifact {
    #[serde(rename = "contractName", default)]
    pub contract_name: String,
    #[serde(default)]
    pub abi: serde_json::Value,
    pub bytecode: String,
}

impl Artifact {
    /// Load `{dir}/{name}.json`, or Hardhat's `{dir}/contracts/{name}.sol/{name}.json`.
    pub fn load(dir: &Path, name: &str) -> FlowResult<Self> {
        let flat = dir.join(format!("{}.json", name));
        let nested = dir
            .join("contracts")
            .join(format!("{}.sol", name))
            .join(format!("{}.json", name));
        let path = if flat.exists() { flat } else { nested };

        let content = fs::read_to_string(&path).map_err(|e| FlowError::Artifact {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| FlowError::Artifact {
            path,
            reason: e.to_string(),
        })
    }

    /// Creation code; fails on empty or non-hex bytecode.
    pub fn creation_code(&self) -> Result<Bytes, String> {
        let trimmed = self.bytecode.trim();
        let hex_part = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        if hex_part.is_empty() {
            return Err("empty bytecode (abstract contract or interface?)".to_string());
        }
        alloy::hex::decode(hex_part)
            .map(Bytes::from)
            .map_err(|e| format!("invalid bytecode hex: {}", e))
    }
}

/// Creation code followed by ABI-encoded constructor arguments.
pub fn init_code(creation_code: &Bytes, constructor_args: &[u8]) -> Bytes {
    let mut code = creation_code.to_vec();
    code.extend_from_slice(constructor_args);
    code.into()
}

/// One recorded deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub address: Address,
    pub tx_hash: TxHash,
    pub chain_id: u64,
    /// RFC 3339, UTC.
    pub deployed_at: String,
}

/// Deployments file: `{network, updated_at, deployments: {name: record}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployments {
    pub network: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub deployments: BTreeMap<String, DeploymentRecord>,
}

impl Deployments {
    /// Read `path`; a missing file is an empty set for `network`.
    ///
    /// A file recorded for another network is an error, so its records are
    /// never read or rewritten under the wrong label.
    pub fn load(path: &Path, network: &str) -> FlowResult<Self> {
        if !path.exists() {
            return Ok(Self {
                network: network.to_string(),
                ..Self::default()
            });
        }

        let content = fs::read_to_string(path).map_err(|e| deployments_error(path, e))?;
        let deployments: Self =
            serde_json::from_str(&content).map_err(|e| deployments_error(path, e))?;

        if deployments.network != network {
            return Err(deployments_error(
                path,
                format!(
                    "recorded for network '{}', not '{}'; set deploy.deployments_path per network",
                    deployments.network, network
                ),
            ));
        }
        Ok(deployments)
    }

    pub fn get(&self, name: &str) -> Option<&DeploymentRecord> {
        self.deployments.get(name)
    }

    /// `name`'s record, only if it was deployed on `chain_id`.
    pub fn deployed_on(&self, name: &str, chain_id: u64) -> Option<&DeploymentRecord> {
        match self.get(name) {
            Some(record) if record.chain_id == chain_id => Some(record),
            Some(record) => {
                tracing::warn!(
                    contract = name,
                    recorded_chain_id = record.chain_id,
                    chain_id = chain_id,
                    "Ignoring deployment recorded on another chain"
                );
                None
            }
            None => None,
        }
    }

    pub fn record(&mut self, name: &str, record: DeploymentRecord) {
        self.updated_at = record.deployed_at.clone();
        self.deployments.insert(name.to_string(), record);
    }

    /// Write through a temporary sibling file and rename it into place.
    pub fn save(&self, path: &Path) -> FlowResult<()> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| deployments_error(path, e))?;
        }

        let serialized =
            serde_json::to_string_pretty(self).map_err(|e| deployments_error(path, e))?;
        let tmp_path = tmp_path_for(path);
        fs::write(&tmp_path, serialized.as_bytes()).map_err(|e| deployments_error(path, e))?;
        fs::rename(&tmp_path, path).map_err(|e| deployments_error(path, e))?;

        tracing::debug!(path = %path.display(), "Deployments file written");
        Ok(())
    }
}

fn deployments_error(path: &Path, e: impl std::fmt::Display) -> FlowError {
    FlowError::Deployments {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string())
}

/// Deploy `SugarBounceToken` (no constructor arguments).
pub async fn deploy_token(session: &Session) -> FlowResult<FlowOutcome> {
    deploy(session, ContractKind::SugarBounceToken, Vec::new()).await
}

/// Deploy `BuyCredit(sbToken)`.
///
/// The token is `token`, else the recorded `SugarBounceToken` deployment,
/// else `contracts.token_address`. Records from another chain are skipped.
pub async fn deploy_buy_credit(session: &Session, token: Option<Address>) -> FlowResult<FlowOutcome> {
    let token = match token {
        Some(token) => token,
        None => {
            let deploy_config = &session.config().deploy;
            let deployments = Deployments::load(
                Path::new(&deploy_config.deployments_path),
                &deploy_config.network_name,
            )?;
            let recorded = deployments.deployed_on(
                ContractKind::SugarBounceToken.artifact_name(),
                session.config().network.chain_id,
            );
            match recorded {
                Some(record) => record.address,
                None => session.token_address()?,
            }
        }
    };

    tracing::info!(token = %token, "BuyCredit constructor token");
    deploy(session, ContractKind::BuyCredit, token.abi_encode()).await
}

async fn deploy(
    session: &Session,
    kind: ContractKind,
    constructor_args: Vec<u8>,
) -> FlowResult<FlowOutcome> {
    let deploy_config = &session.config().deploy;
    let path = Path::new(&deploy_config.deployments_path);
    // A mislabelled deployments file fails here, before anything is sent.
    let mut deployments = Deployments::load(path, &deploy_config.network_name)?;

    let artifacts_dir = Path::new(&deploy_config.artifacts_dir);
    let artifact = Artifact::load(artifacts_dir, kind.artifact_name())?;
    let creation_code = artifact.creation_code().map_err(|reason| FlowError::Artifact {
        path: artifacts_dir.join(kind.artifact_name()),
        reason,
    })?;
    let code = init_code(&creation_code, &constructor_args);

    tracing::info!(
        contract = kind.artifact_name(),
        init_code_len = code.len(),
        "Deploying contract"
    );

    let outcome = session.dispatch(None, code, false, Vec::new()).await?;

    if let FlowOutcome::Submitted(SubmitOutcome::Confirmed {
        tx_hash,
        contract_address: Some(address),
        ..
    }) = &outcome
    {
        deployments.record(
            kind.artifact_name(),
            DeploymentRecord {
                address: *address,
                tx_hash: *tx_hash,
                chain_id: session.config().network.chain_id,
                deployed_at: now_rfc3339(),
            },
        );
        deployments.save(path)?;

        tracing::info!(
            contract = kind.artifact_name(),
            address = %address,
            tx_hash = %tx_hash,
            "Contract deployed"
        );
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "buycredit-relay-{}-{}-{}",
            tag,
            std::process::id(),
            OffsetDateTime::now_utc().unix_timestamp_nanos()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_artifact_nested_layout() {
        let dir = temp_dir("artifact");
        let nested = dir.join("contracts").join("BuyCredit.sol");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            nested.join("BuyCredit.json"),
            r#"{"contractName":"BuyCredit","abi":[],"bytecode":"0x6080604052"}"#,
        )
        .unwrap();

        let artifact = Artifact::load(&dir, "BuyCredit").unwrap();
        assert_eq!(artifact.contract_name, "BuyCredit");
        assert_eq!(
            artifact.creation_code().unwrap(),
            Bytes::from(vec![0x60, 0x80, 0x60, 0x40, 0x52])
        );

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_missing_artifact_is_error() {
        let dir = temp_dir("missing");
        assert!(matches!(
            Artifact::load(&dir, "SugarBounceToken"),
            Err(FlowError::Artifact { .. })
        ));
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_empty_bytecode_rejected() {
        let artifact = Artifact {
            contract_name: "IERC20".into(),
            abi: serde_json::Value::Null,
            bytecode: "0x".into(),
        };
        assert!(artifact.creation_code().is_err());
    }

    #[test]
    fn test_constructor_arg_appended() {
        let token = Address::repeat_byte(0x41);
        let code = init_code(&Bytes::from(vec![0x60, 0x80]), &token.abi_encode());
        assert_eq!(code.len(), 2 + 32);
        assert_eq!(&code[..2], &[0x60, 0x80]);
        assert_eq!(&code[2..14], &[0u8; 12]);
        assert_eq!(&code[14..], token.as_slice());
    }

    #[test]
    fn test_deployments_file_cycle() {
        let dir = temp_dir("deployments");
        let path = dir.join("nested").join("deployments.json");

        let mut deployments = Deployments::load(&path, "bscTest").unwrap();
        assert!(deployments.deployments.is_empty());

        deployments.record(
            "SugarBounceToken",
            DeploymentRecord {
                address: Address::repeat_byte(0x41),
                tx_hash: TxHash::repeat_byte(0x01),
                chain_id: 97,
                deployed_at: "2024-01-01T00:00:00Z".to_string(),
            },
        );
        deployments.save(&path).unwrap();
        assert!(!tmp_path_for(&path).exists());

        let reloaded = Deployments::load(&path, "bscTest").unwrap();
        assert_eq!(reloaded, deployments);
        assert_eq!(reloaded.updated_at, "2024-01-01T00:00:00Z");

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["network"], "bscTest");
        assert_eq!(raw["deployments"]["SugarBounceToken"]["chain_id"], 97);

        fs::remove_dir_all(dir).unwrap();
    }

    fn record_on(chain_id: u64) -> DeploymentRecord {
        DeploymentRecord {
            address: Address::repeat_byte(0x56),
            tx_hash: TxHash::repeat_byte(0x02),
            chain_id,
            deployed_at: now_rfc3339(),
        }
    }

    #[test]
    fn test_other_network_file_rejected() {
        let dir = temp_dir("network");
        let path = dir.join("deployments.json");

        let mut mainnet = Deployments::load(&path, "bsc").unwrap();
        mainnet.record("SugarBounceToken", record_on(56));
        mainnet.save(&path).unwrap();

        let err = Deployments::load(&path, "bscTest").unwrap_err();
        assert!(matches!(err, FlowError::Deployments { .. }));
        assert!(err.to_string().contains("recorded for network 'bsc'"));

        // The mainnet file is left as it was.
        assert_eq!(Deployments::load(&path, "bsc").unwrap(), mainnet);

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_record_from_other_chain_ignored() {
        let mut deployments = Deployments {
            network: "bscTest".to_string(),
            ..Deployments::default()
        };
        deployments.record("SugarBounceToken", record_on(56));

        assert!(deployments.deployed_on("SugarBounceToken", 97).is_none());
        assert_eq!(
            deployments.deployed_on("SugarBounceToken", 56).map(|r| r.address),
            Some(Address::repeat_byte(0x56))
        );
    }

    #[test]
    fn test_timestamps_are_rfc3339() {
        let stamp = now_rfc3339();
        assert!(OffsetDateTime::parse(&stamp, &Rfc3339).is_ok(), "{}", stamp);

        let mut deployments = Deployments::default();
        deployments.record("BuyCredit", record_on(97));
        assert_eq!(
            deployments.updated_at,
            deployments.deployments["BuyCredit"].deployed_at
        );
    }
}
