// src/accounts.rs - Role holder addresses read from accountInfo.json

use std::path::Path;

use alloy_primitives::Address;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Addresses that receive the minter and burner roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AccountInfo {
    #[serde(rename = "Minter")]
    pub minter: Address,
    #[serde(rename = "Burner")]
    pub burner: Address,
}

impl AccountInfo {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| Error::file(path, e))?;
        Ok(serde_json::from_str(&source)?)
    }
}
