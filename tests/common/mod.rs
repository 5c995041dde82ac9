// tests/common/mod.rs - Shared devnet fixture for the integration tests

#![allow(dead_code)]

use alloy_primitives::{Address, Log};
use alloy_sol_types::SolEvent;

use point_token::abi::IKIP7Logic;
use point_token::{
    deploy_point_token, AccountInfo, ArtifactStore, CallOptions, ContractHandle, DeployConfig,
    DeployedContracts, DevNet, Error,
};

pub fn artifact_store() -> ArtifactStore {
    ArtifactStore::new(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/fixtures/build/contracts"
    ))
}

/// Devnet with the Point token deployed, wired and initialized.
///
/// accounts[0] is the operator, accounts[1] the minter, accounts[2] the
/// burner; the rest hold no role.
pub struct Fixture {
    pub devnet: DevNet,
    pub deployed: DeployedContracts,
    pub operator: Address,
    pub minter: Address,
    pub burner: Address,
    pub users: Vec<Address>,
    pub config: DeployConfig,
}

impl Fixture {
    pub async fn deployed() -> Self {
        let devnet = DevNet::with_artifacts(&artifact_store()).unwrap();
        let accounts = devnet.accounts().to_vec();
        let operator = accounts[0];
        let roles = AccountInfo {
            minter: accounts[1],
            burner: accounts[2],
        };
        let config = DeployConfig::default();

        let deployed = deploy_point_token(&devnet, &artifact_store(), operator, &roles, &config)
            .await
            .unwrap();

        Self {
            devnet,
            deployed,
            operator,
            minter: roles.minter,
            burner: roles.burner,
            users: accounts[3..].to_vec(),
            config,
        }
    }

    pub async fn initialized() -> Self {
        let fixture = Self::deployed().await;
        fixture
            .token()
            .send(&IKIP7Logic::initializeCall {}, CallOptions::new(fixture.operator))
            .await
            .unwrap();
        fixture
    }

    pub fn account_info(&self) -> AccountInfo {
        AccountInfo {
            minter: self.minter,
            burner: self.burner,
        }
    }

    /// The token surface lives at the proxy address
    pub fn token(&self) -> ContractHandle<'_, DevNet> {
        ContractHandle::at(&self.devnet, self.deployed.proxy)
    }

    pub async fn mint(&self, to: Address, amount: u64) {
        self.token()
            .send(
                &IKIP7Logic::mintCall {
                    account: to,
                    amount: alloy_primitives::U256::from(amount),
                },
                CallOptions::new(self.minter),
            )
            .await
            .unwrap();
    }

    pub async fn balance_of(&self, account: Address) -> alloy_primitives::U256 {
        self.token()
            .call(&IKIP7Logic::balanceOfCall { account }, self.operator)
            .await
            .unwrap()
            ._0
    }
}

/// Asserts that `result` is a revert carrying `reason`
#[track_caller]
pub fn expect_revert<T: std::fmt::Debug>(result: Result<T, Error>, reason: &str) {
    match result {
        Err(Error::Reverted { reason: Some(actual) }) => assert_eq!(actual, reason),
        other => panic!("expected revert {reason:?}, got {other:?}"),
    }
}

/// The single Transfer event in `logs`
pub fn transfer_event(logs: &[Log]) -> IKIP7Logic::Transfer {
    let transfers: Vec<_> = logs
        .iter()
        .filter(|log| log.topics().first() == Some(&IKIP7Logic::Transfer::SIGNATURE_HASH))
        .collect();
    assert_eq!(transfers.len(), 1, "expected exactly one Transfer event");
    IKIP7Logic::Transfer::decode_log_data(&transfers[0].data, true).unwrap()
}
