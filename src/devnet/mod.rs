// src/devnet/mod.rs - In-process local chain for exercising the deployment
//
// Plays the role of the framework test chain: unlocked fixture accounts,
// nonce tracking, revert-atomic transactions, receipts and logs. Bytecode
// is not interpreted; each registered artifact maps to a native model of
// the contract it was compiled from.

mod contracts;
mod world;

pub use contracts::reasons;
pub use world::{create_address, ContractKind, Revert};

use alloy_primitives::{keccak256, Address, Bytes, B256};
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::artifact::{ArtifactStore, ContractArtifact};
use crate::chain::{Chain, TransactionReceipt, TransactionRequest};
use crate::deployer::DEPLOY_ORDER;
use crate::error::{Error, Result};
use crate::rlp::RlpList;
use world::World;

pub const DEVNET_CHAIN_ID: u64 = 1337;
pub const DEFAULT_ACCOUNTS: usize = 10;

mod gas_costs {
    pub const TRANSACTION: u64 = 21_000;
    pub const CREATE: u64 = 32_000;
    pub const ZERO_BYTE: u64 = 4;
    pub const NON_ZERO_BYTE: u64 = 16;
    pub const EXECUTION: u64 = 30_000;
    pub const CODE_DEPOSIT_PER_BYTE: u64 = 200;
}

/// A transaction as recorded by the devnet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevTransaction {
    pub hash: B256,
    pub from: Address,
    pub to: Option<Address>,
    pub nonce: u64,
    pub selector: Option<[u8; 4]>,
    pub contract_address: Option<Address>,
    pub status: bool,
}

#[derive(Debug, Default)]
struct State {
    world: World,
    history: Vec<DevTransaction>,
}

pub struct DevNet {
    accounts: Vec<Address>,
    code: Vec<(Bytes, ContractKind)>,
    state: Mutex<State>,
}

impl DevNet {
    /// Creates a chain with `account_count` deterministic unlocked accounts
    pub fn new(account_count: usize) -> Self {
        let accounts = (0..account_count)
            .map(|index| {
                let seed = keccak256(format!("point-devnet-account-{index}"));
                Address::from_slice(&seed[12..])
            })
            .collect();
        Self {
            accounts,
            code: Vec::new(),
            state: Mutex::new(State::default()),
        }
    }

    /// Devnet with the four Point token artifacts from `store` registered
    pub fn with_artifacts(store: &ArtifactStore) -> Result<Self> {
        let mut devnet = Self::new(DEFAULT_ACCOUNTS);
        for name in DEPLOY_ORDER {
            devnet.register(&store.load(name)?)?;
        }
        Ok(devnet)
    }

    /// Associates the artifact's creation bytecode with its native model
    pub fn register(&mut self, artifact: &ContractArtifact) -> Result<()> {
        let kind = ContractKind::from_name(&artifact.contract_name).ok_or_else(|| {
            Error::Config(format!(
                "devnet has no model for contract {}",
                artifact.contract_name
            ))
        })?;
        self.code.retain(|(_, registered)| *registered != kind);
        self.code.push((artifact.bytecode.clone(), kind));
        Ok(())
    }

    pub fn accounts(&self) -> &[Address] {
        &self.accounts
    }

    /// Every mined transaction, in order
    pub async fn transactions(&self) -> Vec<DevTransaction> {
        self.state.lock().await.history.clone()
    }

    /// Registered model whose bytecode prefixes `data`; the rest is the
    /// constructor arguments
    fn resolve_code<'d>(&self, data: &'d [u8]) -> Result<(ContractKind, &'d [u8])> {
        self.code
            .iter()
            .filter(|(bytecode, _)| data.starts_with(bytecode))
            .max_by_key(|(bytecode, _)| bytecode.len())
            .map(|(bytecode, kind)| (*kind, &data[bytecode.len()..]))
            .ok_or_else(|| Error::Reverted {
                reason: Some("devnet: unknown contract bytecode".to_string()),
            })
    }

    fn required_gas(request: &TransactionRequest) -> u64 {
        let data_gas: u64 = request
            .data
            .iter()
            .map(|&b| {
                if b == 0 {
                    gas_costs::ZERO_BYTE
                } else {
                    gas_costs::NON_ZERO_BYTE
                }
            })
            .sum();
        let base = gas_costs::TRANSACTION + data_gas + gas_costs::EXECUTION;
        if request.is_create() {
            base + gas_costs::CREATE
                + gas_costs::CODE_DEPOSIT_PER_BYTE * request.data.len() as u64
        } else {
            base
        }
    }

    /// Runs `request` against `world`; returns the output and the created address
    fn execute(
        &self,
        world: &mut World,
        request: &TransactionRequest,
    ) -> Result<(Vec<u8>, Option<Address>)> {
        let outcome = match request.to {
            Some(to) => world.call(request.from, to, &request.data).map(|out| (out, None)),
            None => {
                let (kind, args) = self.resolve_code(&request.data)?;
                world
                    .create(request.from, kind, args)
                    .map(|address| (Vec::new(), Some(address)))
            }
        };
        outcome.map_err(|revert| Error::Reverted {
            reason: Some(revert.0),
        })
    }
}

impl Default for DevNet {
    fn default() -> Self {
        Self::new(DEFAULT_ACCOUNTS)
    }
}

#[async_trait]
impl Chain for DevNet {
    async fn chain_id(&self) -> Result<u64> {
        Ok(DEVNET_CHAIN_ID)
    }

    async fn transaction_count(&self, address: Address) -> Result<u64> {
        Ok(self.state.lock().await.world.nonce(address))
    }

    async fn estimate_gas(&self, request: &TransactionRequest) -> Result<u64> {
        let mut world = self.state.lock().await.world.clone();
        self.execute(&mut world, request)?;
        Ok(Self::required_gas(request))
    }

    async fn send_transaction(&self, request: TransactionRequest) -> Result<TransactionReceipt> {
        if !self.accounts.contains(&request.from) {
            return Err(Error::UnknownSender(request.from));
        }
        let mut state = self.state.lock().await;

        let nonce = state.world.nonce(request.from);
        if let Some(provided) = request.nonce {
            if provided != nonce {
                return Err(Error::NonceMismatch {
                    account: request.from,
                    expected: nonce,
                    provided,
                });
            }
        }
        let required = Self::required_gas(&request);
        if let Some(limit) = request.gas {
            if limit < required {
                return Err(Error::OutOfGas { limit, required });
            }
        }

        let snapshot = state.world.clone();
        let outcome = self.execute(&mut state.world, &request);
        if outcome.is_err() {
            state.world = snapshot;
        }
        state.world.bump_nonce(request.from);
        let logs = state.world.take_logs();

        let hash = keccak256(
            RlpList::new()
                .bytes(request.from.as_slice())
                .uint(nonce)
                .uint(DEVNET_CHAIN_ID)
                .finish(),
        );
        let contract_address = outcome.as_ref().ok().and_then(|(_, address)| *address);
        state.history.push(DevTransaction {
            hash,
            from: request.from,
            to: request.to,
            nonce,
            selector: request
                .data
                .get(..4)
                .filter(|_| request.to.is_some())
                .and_then(|selector| selector.try_into().ok()),
            contract_address,
            status: outcome.is_ok(),
        });
        debug!(tx = %hash, from = %request.from, nonce, ok = outcome.is_ok(), "devnet transaction mined");

        outcome?;
        Ok(TransactionReceipt {
            transaction_hash: hash,
            contract_address,
            status: true,
            gas_used: required,
            logs,
        })
    }

    async fn call(&self, request: &TransactionRequest) -> Result<Bytes> {
        let mut world = self.state.lock().await.world.clone();
        let (output, _) = self.execute(&mut world, request)?;
        Ok(output.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{IKIP7Storage, IOwnable};
    use crate::contract::{CallOptions, ContractHandle};
    use alloy_sol_types::{SolCall, SolEvent, SolValue};

    fn artifact(name: &str, code: &[u8]) -> ContractArtifact {
        ContractArtifact {
            contract_name: name.to_string(),
            abi: serde_json::json!([]),
            bytecode: Bytes::copy_from_slice(code),
        }
    }

    fn devnet() -> DevNet {
        let mut devnet = DevNet::default();
        devnet.register(&artifact("KIP7Storage", &[0x60, 0x0c])).unwrap();
        devnet.register(&artifact("PrimaryStorage", &[0x60, 0x0b])).unwrap();
        devnet.register(&artifact("Proxy", &[0x60, 0x0d])).unwrap();
        devnet
    }

    async fn create(devnet: &DevNet, from: Address, data: Vec<u8>) -> Result<Address> {
        let receipt = devnet
            .send_transaction(TransactionRequest::create(from, data))
            .await?;
        Ok(receipt.contract_address.unwrap())
    }

    #[tokio::test]
    async fn test_accounts_are_deterministic() {
        let a = DevNet::new(3);
        let b = DevNet::new(3);
        assert_eq!(a.accounts(), b.accounts());
        assert_eq!(a.accounts().len(), 3);
        assert_ne!(a.accounts()[0], a.accounts()[1]);
    }

    #[tokio::test]
    async fn test_register_rejects_unknown_contract() {
        let mut devnet = DevNet::default();
        assert!(matches!(
            devnet.register(&artifact("ERC20", &[0x60])),
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_create_uses_sender_nonce() {
        let devnet = devnet();
        let operator = devnet.accounts()[0];
        let first = create(&devnet, operator, vec![0x60, 0x0c]).await.unwrap();
        let second = create(&devnet, operator, vec![0x60, 0x0c]).await.unwrap();
        assert_eq!(first, create_address(operator, 0));
        assert_eq!(second, create_address(operator, 1));
        assert_eq!(devnet.transaction_count(operator).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_unknown_bytecode_and_sender() {
        let devnet = devnet();
        let operator = devnet.accounts()[0];
        let err = create(&devnet, operator, vec![0xfe]).await.unwrap_err();
        assert_eq!(err.revert_reason(), Some("devnet: unknown contract bytecode"));

        let stranger = Address::repeat_byte(0xee);
        let err = create(&devnet, stranger, vec![0x60, 0x0c]).await.unwrap_err();
        assert!(matches!(err, Error::UnknownSender(_)));
    }

    #[tokio::test]
    async fn test_proxy_requires_existing_primary_storage() {
        let devnet = devnet();
        let operator = devnet.accounts()[0];
        let mut data = vec![0x60, 0x0d];
        data.extend(Address::repeat_byte(0x99).abi_encode());
        let err = create(&devnet, operator, data).await.unwrap_err();
        assert_eq!(err.revert_reason(), Some(reasons::STORAGE_NOT_CONTRACT));
    }

    #[tokio::test]
    async fn test_nonce_and_gas_checks() {
        let devnet = devnet();
        let operator = devnet.accounts()[0];
        let request = TransactionRequest::create(operator, vec![0x60, 0x0c]);

        let err = devnet
            .send_transaction(request.clone().with_nonce(5))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NonceMismatch { expected: 0, provided: 5, .. }));

        let err = devnet
            .send_transaction(request.clone().with_gas(1))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::OutOfGas { limit: 1, .. }));

        let estimated = devnet.estimate_gas(&request).await.unwrap();
        devnet
            .send_transaction(request.with_gas(estimated).with_nonce(0))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_revert_rolls_back_state_but_consumes_nonce() {
        let devnet = devnet();
        let operator = devnet.accounts()[0];
        let stranger = devnet.accounts()[1];
        let storage_address = create(&devnet, operator, vec![0x60, 0x0c]).await.unwrap();
        let storage = ContractHandle::at(&devnet, storage_address);

        let err = storage
            .send(
                &IKIP7Storage::updateTokenDetailsCall {
                    tokenName: "POINT".to_string(),
                    tokenSymbol: "HLP".to_string(),
                    tokenDecimals: 0,
                },
                CallOptions::new(stranger),
            )
            .await
            .unwrap_err();
        assert_eq!(err.revert_reason(), Some(reasons::NOT_OWNER));
        assert_eq!(devnet.transaction_count(stranger).await.unwrap(), 1);

        let name = storage.call(&IKIP7Storage::nameCall {}, stranger).await.unwrap();
        assert_eq!(name._0, "");

        let history = devnet.transactions().await;
        assert_eq!(history.len(), 2);
        assert!(!history[1].status);
        assert_eq!(
            history[1].selector,
            Some(IKIP7Storage::updateTokenDetailsCall::SELECTOR)
        );
    }

    #[tokio::test]
    async fn test_ownership_transfer_emits_event() {
        let devnet = devnet();
        let operator = devnet.accounts()[0];
        let new_owner = devnet.accounts()[1];
        let storage_address = create(&devnet, operator, vec![0x60, 0x0b]).await.unwrap();
        let storage = ContractHandle::at(&devnet, storage_address);

        let receipt = storage
            .send(
                &IOwnable::transferOwnershipCall { newOwner: new_owner },
                CallOptions::new(operator),
            )
            .await
            .unwrap();
        assert_eq!(receipt.logs.len(), 1);
        let event =
            IOwnable::OwnershipTransferred::decode_log_data(&receipt.logs[0].data, true).unwrap();
        assert_eq!(event.previousOwner, operator);
        assert_eq!(event.newOwner, new_owner);

        let owner = storage.call(&IOwnable::ownerCall {}, operator).await.unwrap();
        assert_eq!(owner._0, new_owner);
    }
}
