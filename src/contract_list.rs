// src/contract_list.rs - The contract_list.json record of deployed addresses

use std::path::Path;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Addresses of the four deployed contracts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedContracts {
    #[serde(rename = "Proxy")]
    pub proxy: Address,
    #[serde(rename = "PrimaryStorage")]
    pub primary_storage: Address,
    #[serde(rename = "KIP7Logic")]
    pub kip7_logic: Address,
    #[serde(rename = "KIP7Storage")]
    pub kip7_storage: Address,
}

impl DeployedContracts {
    /// JSON with 4-space indentation
    pub fn to_json(&self) -> Result<String> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)?;
        String::from_utf8(out).map_err(|e| Error::InvalidResponse(e.to_string()))
    }

    /// Replaces any existing file at `path`
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json()?;
        if path.exists() {
            debug!(path = %path.display(), "removing previous contract list");
            std::fs::remove_file(path).map_err(|e| Error::file(path, e))?;
        }
        std::fs::write(path, json).map_err(|e| Error::file(path, e))?;
        info!(path = %path.display(), "contract list written");
        Ok(())
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| Error::file(path, e))?;
        Ok(serde_json::from_str(&source)?)
    }
}
