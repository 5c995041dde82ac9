// src/devnet/world.rs - Account, contract and log state of the devnet

use std::collections::HashMap;

use alloy_primitives::{keccak256, Address, Log, LogData};
use alloy_sol_types::SolCall;

use super::contracts::{reasons, Contract, Context};
use crate::rlp::RlpList;

/// Revert with a reason string, the `Error(string)` of a Solidity `require`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revert(pub String);

impl Revert {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }

    pub fn reason(&self) -> &str {
        &self.0
    }
}

pub type ExecResult<T> = std::result::Result<T, Revert>;

/// Contract models the devnet can instantiate, keyed by artifact name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractKind {
    Proxy,
    PrimaryStorage,
    Kip7Storage,
    Kip7Logic,
}

impl ContractKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Proxy" => Some(Self::Proxy),
            "PrimaryStorage" => Some(Self::PrimaryStorage),
            "KIP7Storage" => Some(Self::Kip7Storage),
            "KIP7Logic" => Some(Self::Kip7Logic),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Proxy => "Proxy",
            Self::PrimaryStorage => "PrimaryStorage",
            Self::Kip7Storage => "KIP7Storage",
            Self::Kip7Logic => "KIP7Logic",
        }
    }
}

/// Address of a contract created by `sender` at `nonce`
pub fn create_address(sender: Address, nonce: u64) -> Address {
    let encoded = RlpList::new().bytes(sender.as_slice()).uint(nonce).finish();
    Address::from_slice(&keccak256(encoded)[12..])
}

/// Whole-chain state. Cloned before each transaction so a revert can
/// restore it.
#[derive(Debug, Clone, Default)]
pub struct World {
    nonces: HashMap<Address, u64>,
    contracts: HashMap<Address, Contract>,
    /// Contracts taken out of `contracts` while their code runs
    executing: HashMap<Address, ContractKind>,
    logs: Vec<Log>,
}

impl World {
    pub fn nonce(&self, account: Address) -> u64 {
        self.nonces.get(&account).copied().unwrap_or(0)
    }

    pub fn bump_nonce(&mut self, account: Address) {
        *self.nonces.entry(account).or_insert(0) += 1;
    }

    pub fn has_code(&self, address: Address) -> bool {
        self.contracts.contains_key(&address) || self.executing.contains_key(&address)
    }

    pub fn kind_of(&self, address: Address) -> Option<ContractKind> {
        self.contracts
            .get(&address)
            .map(Contract::kind)
            .or_else(|| self.executing.get(&address).copied())
    }

    pub fn emit(&mut self, address: Address, data: LogData) {
        self.logs.push(Log { address, data });
    }

    pub fn take_logs(&mut self) -> Vec<Log> {
        std::mem::take(&mut self.logs)
    }

    /// Runs the constructor of `kind` and stores the contract at the CREATE address
    pub fn create(
        &mut self,
        sender: Address,
        kind: ContractKind,
        constructor_args: &[u8],
    ) -> ExecResult<Address> {
        let address = create_address(sender, self.nonce(sender));
        if self.has_code(address) {
            return Err(Revert::new("contract address collision"));
        }
        let contract = Contract::construct(kind, self, sender, constructor_args)?;
        self.contracts.insert(address, contract);
        Ok(address)
    }

    /// Message call. Calls to accounts without code succeed with no output;
    /// calls back into a contract that is already running revert.
    pub fn call(&mut self, sender: Address, to: Address, data: &[u8]) -> ExecResult<Vec<u8>> {
        let Some(mut contract) = self.contracts.remove(&to) else {
            if self.executing.contains_key(&to) {
                return Err(Revert::new(reasons::REENTRANT_CALL));
            }
            return Ok(Vec::new());
        };
        self.executing.insert(to, contract.kind());
        let result = contract.execute(self, Context { this: to, sender }, data);
        self.executing.remove(&to);
        self.contracts.insert(to, contract);
        result
    }

    /// Typed call that decodes the return values
    pub fn call_typed<T: SolCall>(
        &mut self,
        sender: Address,
        to: Address,
        call: &T,
    ) -> ExecResult<T::Return> {
        let output = self.call(sender, to, &call.abi_encode())?;
        T::abi_decode_returns(&output, true)
            .map_err(|_| Revert::new(format!("invalid return data from {}", T::SIGNATURE)))
    }

    /// Typed call whose return values are ignored
    pub fn send_typed<T: SolCall>(&mut self, sender: Address, to: Address, call: &T) -> ExecResult<()> {
        self.call(sender, to, &call.abi_encode()).map(|_| ())
    }
}
