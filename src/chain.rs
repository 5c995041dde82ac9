// src/chain.rs - Transaction types and the Chain trait implemented by the RPC client and the devnet

use alloy_primitives::{Address, Bytes, Log, B256, U256};
use async_trait::async_trait;

use crate::error::Result;

/// Transaction or call request. `to == None` creates a contract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Option<Address>,
    pub data: Bytes,
    pub value: U256,
    /// Gas limit; filled by estimation when absent
    pub gas: Option<u64>,
    /// Account nonce; filled from the chain when absent
    pub nonce: Option<u64>,
}

impl TransactionRequest {
    pub fn create(from: Address, data: impl Into<Bytes>) -> Self {
        Self {
            from,
            data: data.into(),
            ..Self::default()
        }
    }

    pub fn call(from: Address, to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            from,
            to: Some(to),
            data: data.into(),
            ..Self::default()
        }
    }

    pub fn with_gas(mut self, gas: u64) -> Self {
        self.gas = Some(gas);
        self
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn is_create(&self) -> bool {
        self.to.is_none()
    }
}

/// Receipt of a mined transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    pub contract_address: Option<Address>,
    pub status: bool,
    pub gas_used: u64,
    pub logs: Vec<Log>,
}

/// Minimal surface of a Klaytn-compatible node used by the deployer.
///
/// `send_transaction` resolves once the transaction is mined and returns
/// `Error::Reverted` when execution failed.
#[async_trait]
pub trait Chain: Send + Sync {
    async fn chain_id(&self) -> Result<u64>;

    async fn transaction_count(&self, address: Address) -> Result<u64>;

    async fn estimate_gas(&self, request: &TransactionRequest) -> Result<u64>;

    async fn send_transaction(&self, request: TransactionRequest) -> Result<TransactionReceipt>;

    async fn call(&self, request: &TransactionRequest) -> Result<Bytes>;
}
