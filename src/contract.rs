// src/contract.rs - Contract handle bound to an address on a Chain

use alloy_primitives::Address;
use alloy_sol_types::SolCall;
use tracing::debug;

use crate::chain::{Chain, TransactionReceipt, TransactionRequest};
use crate::error::Result;

/// Per-transaction overrides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallOptions {
    pub from: Address,
    pub gas: Option<u64>,
    pub nonce: Option<u64>,
}

impl CallOptions {
    pub fn new(from: Address) -> Self {
        Self {
            from,
            gas: None,
            nonce: None,
        }
    }

    pub fn gas(mut self, gas: u64) -> Self {
        self.gas = Some(gas);
        self
    }

    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }
}

/// A deployed contract reachable through `chain`
pub struct ContractHandle<'a, C: Chain + ?Sized> {
    address: Address,
    chain: &'a C,
}

impl<'a, C: Chain + ?Sized> Clone for ContractHandle<'a, C> {
    fn clone(&self) -> Self {
        Self {
            address: self.address,
            chain: self.chain,
        }
    }
}

impl<'a, C: Chain + ?Sized> ContractHandle<'a, C> {
    pub fn at(chain: &'a C, address: Address) -> Self {
        Self { address, chain }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Sends `call` as a transaction and waits for its receipt
    pub async fn send<T: SolCall>(
        &self,
        call: &T,
        options: CallOptions,
    ) -> Result<TransactionReceipt> {
        debug!(
            contract = %self.address,
            function = T::SIGNATURE,
            from = %options.from,
            "sending transaction"
        );
        let mut request = TransactionRequest::call(options.from, self.address, call.abi_encode());
        request.gas = options.gas;
        request.nonce = options.nonce;
        self.chain.send_transaction(request).await
    }

    /// Executes `call` without a transaction and decodes its return values
    pub async fn call<T: SolCall>(&self, call: &T, from: Address) -> Result<T::Return> {
        let request = TransactionRequest::call(from, self.address, call.abi_encode());
        let output = self.chain.call(&request).await?;
        Ok(T::abi_decode_returns(&output, true)?)
    }
}
