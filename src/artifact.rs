// src/artifact.rs - Compiled contract artifacts (Truffle JSON layout)

use std::path::{Path, PathBuf};

use alloy_primitives::Bytes;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    contract_name: Option<String>,
    abi: serde_json::Value,
    bytecode: String,
}

/// A compiled contract: ABI and creation bytecode
#[derive(Debug, Clone, PartialEq)]
pub struct ContractArtifact {
    pub contract_name: String,
    pub abi: serde_json::Value,
    pub bytecode: Bytes,
}

impl ContractArtifact {
    /// Reads `<build_dir>/<name>.json`
    pub fn load(build_dir: impl AsRef<Path>, name: &str) -> Result<Self> {
        let path = build_dir.as_ref().join(format!("{name}.json"));
        let source = std::fs::read_to_string(&path).map_err(|e| Error::file(&path, e))?;
        let artifact = Self::parse(&source, name).map_err(|message| Error::Artifact {
            path: path.clone(),
            message,
        })?;
        debug!(
            contract = %artifact.contract_name,
            path = %path.display(),
            bytecode_len = artifact.bytecode.len(),
            "loaded artifact"
        );
        Ok(artifact)
    }

    fn parse(source: &str, default_name: &str) -> std::result::Result<Self, String> {
        let raw: RawArtifact =
            serde_json::from_str(source).map_err(|e| format!("invalid JSON: {e}"))?;
        if !raw.abi.is_array() {
            return Err("`abi` must be a JSON array".to_string());
        }
        let hex_code = raw.bytecode.strip_prefix("0x").unwrap_or(&raw.bytecode);
        if hex_code.is_empty() {
            return Err("`bytecode` is empty; is the contract abstract?".to_string());
        }
        let bytecode = hex::decode(hex_code).map_err(|e| format!("invalid bytecode: {e}"))?;
        Ok(Self {
            contract_name: raw
                .contract_name
                .unwrap_or_else(|| default_name.to_string()),
            abi: raw.abi,
            bytecode: bytecode.into(),
        })
    }

    /// Creation payload: bytecode followed by ABI-encoded constructor arguments
    pub fn deploy_data(&self, constructor_args: &[u8]) -> Bytes {
        let mut data = Vec::with_capacity(self.bytecode.len() + constructor_args.len());
        data.extend_from_slice(&self.bytecode);
        data.extend_from_slice(constructor_args);
        data.into()
    }
}

/// Directory of compiled artifacts keyed by contract name
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    build_dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(build_dir: impl Into<PathBuf>) -> Self {
        Self {
            build_dir: build_dir.into(),
        }
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    pub fn load(&self, name: &str) -> Result<ContractArtifact> {
        ContractArtifact::load(&self.build_dir, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_truffle_artifact() {
        let source = r#"{
            "contractName": "Proxy",
            "abi": [{"type": "constructor", "inputs": []}],
            "bytecode": "0x6080604052",
            "deployedBytecode": "0x6080"
        }"#;
        let artifact = ContractArtifact::parse(source, "ignored").unwrap();
        assert_eq!(artifact.contract_name, "Proxy");
        assert_eq!(&artifact.bytecode[..], &[0x60, 0x80, 0x60, 0x40, 0x52]);
    }

    #[test]
    fn test_name_defaults_to_file_stem() {
        let source = r#"{"abi": [], "bytecode": "6001"}"#;
        let artifact = ContractArtifact::parse(source, "KIP7Logic").unwrap();
        assert_eq!(artifact.contract_name, "KIP7Logic");
    }

    #[test]
    fn test_rejects_empty_or_invalid_bytecode() {
        assert!(ContractArtifact::parse(r#"{"abi": [], "bytecode": "0x"}"#, "X").is_err());
        assert!(ContractArtifact::parse(r#"{"abi": [], "bytecode": "0xzz"}"#, "X").is_err());
        assert!(ContractArtifact::parse(r#"{"abi": {}, "bytecode": "0x60"}"#, "X").is_err());
    }

    #[test]
    fn test_deploy_data_appends_constructor_args() {
        let artifact = ContractArtifact::parse(r#"{"abi": [], "bytecode": "0xaabb"}"#, "X").unwrap();
        let data = artifact.deploy_data(&[0x01, 0x02]);
        assert_eq!(&data[..], &[0xaa, 0xbb, 0x01, 0x02]);
    }

    #[test]
    fn test_missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = ArtifactStore::new(dir.path()).load("Proxy").unwrap_err();
        assert!(err.to_string().contains("Proxy.json"));
    }
}
