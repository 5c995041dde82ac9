// src/lib.rs - Deployment tooling for the upgradeable Point (HLP) KIP-7 token on Klaytn
// Deploys Proxy, PrimaryStorage, KIP7Storage and KIP7Logic, wires them together
// and records the resulting addresses.

pub mod abi;
pub mod accounts;
pub mod artifact;
pub mod chain;
pub mod config;
pub mod contract;
pub mod contract_list;
pub mod deployer;
pub mod devnet;
pub mod error;
pub mod keyring;
pub mod rlp;
pub mod rpc;

pub use accounts::AccountInfo;
pub use artifact::{ArtifactStore, ContractArtifact};
pub use chain::{Chain, TransactionReceipt, TransactionRequest};
pub use config::{DeployConfig, TokenDetails};
pub use contract::{CallOptions, ContractHandle};
pub use contract_list::DeployedContracts;
pub use deployer::{deploy, deploy_point_token, verify_deployment, wire_point_token};
pub use devnet::DevNet;
pub use error::{Error, Result};
pub use keyring::Keyring;
pub use rpc::{KlaytnRpc, RpcConfig};
