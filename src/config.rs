// src/config.rs - Deployment parameters

use std::path::PathBuf;

use crate::rpc::RpcConfig;

/// Public Baobab testnet endpoint
pub const DEFAULT_RPC_URL: &str = "https://api.baobab.klaytn.net:8651/";
pub const DEFAULT_BUILD_DIR: &str = "build/contracts";
pub const DEFAULT_ACCOUNT_INFO: &str = "accountInfo.json";
pub const DEFAULT_OUTPUT: &str = "contract_list.json";

/// Metadata written into KIP7Storage before ownership moves to the proxy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenDetails {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl Default for TokenDetails {
    fn default() -> Self {
        Self {
            name: "POINT".to_string(),
            symbol: "HLP".to_string(),
            decimals: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeployConfig {
    pub rpc_url: String,
    pub build_dir: PathBuf,
    pub account_info: PathBuf,
    pub output: PathBuf,
    /// Deploy gas limit = estimate x this factor
    pub gas_multiplier: u64,
    /// Fixed gas limit of every wiring transaction
    pub setup_gas: u64,
    pub logic_version: String,
    pub token: TokenDetails,
    pub rpc: RpcConfig,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            build_dir: PathBuf::from(DEFAULT_BUILD_DIR),
            account_info: PathBuf::from(DEFAULT_ACCOUNT_INFO),
            output: PathBuf::from(DEFAULT_OUTPUT),
            gas_multiplier: 10,
            setup_gas: 100_000_000,
            logic_version: "1".to_string(),
            token: TokenDetails::default(),
            rpc: RpcConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DeployConfig::default();
        assert_eq!(config.rpc_url, DEFAULT_RPC_URL);
        assert_eq!(config.build_dir, PathBuf::from("build/contracts"));
        assert_eq!(config.output, PathBuf::from("contract_list.json"));
        assert_eq!(config.gas_multiplier, 10);
        assert_eq!(config.setup_gas, 100_000_000);
        assert_eq!(config.logic_version, "1");
        assert_eq!(config.token.symbol, "HLP");
        assert_eq!(config.token.decimals, 0);
    }
}
