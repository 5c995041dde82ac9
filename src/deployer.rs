// src/deployer.rs - Deployment and wiring of the Point token contracts

use alloy_primitives::Address;
use alloy_sol_types::SolValue;
use tracing::{debug, info};

use crate::abi::{IOwnable, IKIP7Storage, IProxy, TYPE_BURNER, TYPE_MINTER};
use crate::accounts::AccountInfo;
use crate::artifact::{ArtifactStore, ContractArtifact};
use crate::chain::{Chain, TransactionRequest};
use crate::config::DeployConfig;
use crate::contract::{CallOptions, ContractHandle};
use crate::contract_list::DeployedContracts;
use crate::error::{Error, Result};

pub const PROXY: &str = "Proxy";
pub const PRIMARY_STORAGE: &str = "PrimaryStorage";
pub const KIP7_LOGIC: &str = "KIP7Logic";
pub const KIP7_STORAGE: &str = "KIP7Storage";

/// Artifact names in deployment order
pub const DEPLOY_ORDER: [&str; 4] = [KIP7_LOGIC, PRIMARY_STORAGE, KIP7_STORAGE, PROXY];

// ============================================================================
// SINGLE CONTRACT DEPLOYMENT
// ============================================================================

/// Deploys `artifact` from `from` and returns the created address.
///
/// The gas limit is the node's estimate times `gas_multiplier`; the nonce is
/// read from the chain right before sending.
pub async fn deploy<C: Chain + ?Sized>(
    chain: &C,
    artifact: &ContractArtifact,
    constructor_args: &[u8],
    from: Address,
    gas_multiplier: u64,
) -> Result<Address> {
    let nonce = chain.transaction_count(from).await?;
    let request = TransactionRequest::create(from, artifact.deploy_data(constructor_args));
    let estimated = chain.estimate_gas(&request).await?;
    let gas = estimated
        .checked_mul(gas_multiplier)
        .ok_or_else(|| Error::Config(format!("gas multiplier {gas_multiplier} overflows")))?;
    debug!(
        contract = %artifact.contract_name,
        nonce,
        estimated,
        gas,
        "deploying"
    );

    let receipt = chain
        .send_transaction(request.with_gas(gas).with_nonce(nonce))
        .await?;
    let address = receipt
        .contract_address
        .ok_or_else(|| Error::MissingContractAddress(artifact.contract_name.clone()))?;
    info!(
        contract = %artifact.contract_name,
        %address,
        tx = %receipt.transaction_hash,
        "deployed"
    );
    Ok(address)
}

// ============================================================================
// FULL SYSTEM DEPLOYMENT
// ============================================================================

/// Deploys the four contracts, then links proxy, storages and logic and
/// grants the minter and burner roles. Steps run strictly in order and the
/// first failure aborts the run.
pub async fn deploy_point_token<C: Chain + ?Sized>(
    chain: &C,
    artifacts: &ArtifactStore,
    operator: Address,
    accounts: &AccountInfo,
    config: &DeployConfig,
) -> Result<DeployedContracts> {
    let logic_artifact = artifacts.load(KIP7_LOGIC)?;
    let primary_artifact = artifacts.load(PRIMARY_STORAGE)?;
    let storage_artifact = artifacts.load(KIP7_STORAGE)?;
    let proxy_artifact = artifacts.load(PROXY)?;

    let multiplier = config.gas_multiplier;
    let kip7_logic = deploy(chain, &logic_artifact, &[], operator, multiplier).await?;
    let primary_storage = deploy(chain, &primary_artifact, &[], operator, multiplier).await?;
    let kip7_storage = deploy(chain, &storage_artifact, &[], operator, multiplier).await?;
    let proxy = deploy(
        chain,
        &proxy_artifact,
        &primary_storage.abi_encode(),
        operator,
        multiplier,
    )
    .await?;

    let deployed = DeployedContracts {
        proxy,
        primary_storage,
        kip7_logic,
        kip7_storage,
    };
    wire_point_token(chain, &deployed, operator, accounts, config).await?;
    Ok(deployed)
}

/// The nine configuration transactions. Only the first one carries an
/// explicit nonce; the rest let the chain assign it.
pub async fn wire_point_token<C: Chain + ?Sized>(
    chain: &C,
    deployed: &DeployedContracts,
    operator: Address,
    accounts: &AccountInfo,
    config: &DeployConfig,
) -> Result<()> {
    let primary = ContractHandle::at(chain, deployed.primary_storage);
    let storage = ContractHandle::at(chain, deployed.kip7_storage);
    let proxy = ContractHandle::at(chain, deployed.proxy);

    let nonce = chain.transaction_count(operator).await?;
    let options = CallOptions::new(operator).gas(config.setup_gas);

    info!(step = 1, "PrimaryStorage.transferOwnership(Proxy)");
    primary
        .send(
            &IOwnable::transferOwnershipCall {
                newOwner: deployed.proxy,
            },
            options.nonce(nonce),
        )
        .await?;

    info!(step = 2, name = %config.token.name, symbol = %config.token.symbol, "KIP7Storage.updateTokenDetails");
    storage
        .send(
            &IKIP7Storage::updateTokenDetailsCall {
                tokenName: config.token.name.clone(),
                tokenSymbol: config.token.symbol.clone(),
                tokenDecimals: config.token.decimals,
            },
            options,
        )
        .await?;

    info!(step = 3, "KIP7Storage.transferOwnership(Proxy)");
    storage
        .send(
            &IOwnable::transferOwnershipCall {
                newOwner: deployed.proxy,
            },
            options,
        )
        .await?;

    info!(step = 4, "Proxy.addAdditionalStorage(KIP7Storage)");
    proxy
        .send(
            &IProxy::addAdditionalStorageCall {
                storageAddress: deployed.kip7_storage,
            },
            options,
        )
        .await?;

    info!(step = 5, version = %config.logic_version, "Proxy.updateLogicContract(KIP7Logic)");
    proxy
        .send(
            &IProxy::updateLogicContractCall {
                logic: deployed.kip7_logic,
                version: config.logic_version.clone(),
            },
            options,
        )
        .await?;

    info!(step = 6, "Proxy.addRoleType(TYPE_MINTER)");
    proxy
        .send(&IProxy::addRoleTypeCall { roleType: TYPE_MINTER }, options)
        .await?;

    info!(step = 7, "Proxy.addRoleType(TYPE_BURNER)");
    proxy
        .send(&IProxy::addRoleTypeCall { roleType: TYPE_BURNER }, options)
        .await?;

    info!(step = 8, minter = %accounts.minter, "Proxy.grantRole(TYPE_MINTER)");
    proxy
        .send(
            &IProxy::grantRoleCall {
                roleType: TYPE_MINTER,
                account: accounts.minter,
            },
            options,
        )
        .await?;

    info!(step = 9, burner = %accounts.burner, "Proxy.grantRole(TYPE_BURNER)");
    proxy
        .send(
            &IProxy::grantRoleCall {
                roleType: TYPE_BURNER,
                account: accounts.burner,
            },
            options,
        )
        .await?;

    Ok(())
}

// ============================================================================
// VERIFICATION
// ============================================================================

/// Reads the wiring back from the chain and reports the first mismatch
pub async fn verify_deployment<C: Chain + ?Sized>(
    chain: &C,
    deployed: &DeployedContracts,
    operator: Address,
    accounts: &AccountInfo,
    config: &DeployConfig,
) -> Result<()> {
    let primary = ContractHandle::at(chain, deployed.primary_storage);
    let storage = ContractHandle::at(chain, deployed.kip7_storage);
    let proxy = ContractHandle::at(chain, deployed.proxy);

    let primary_owner = primary.call(&IOwnable::ownerCall {}, operator).await?._0;
    expect("PrimaryStorage owner", primary_owner, deployed.proxy)?;

    let storage_owner = storage.call(&IOwnable::ownerCall {}, operator).await?._0;
    expect("KIP7Storage owner", storage_owner, deployed.proxy)?;

    let proxy_owner = proxy.call(&IProxy::ownerCall {}, operator).await?._0;
    expect("Proxy operator", proxy_owner, operator)?;

    let logic = proxy.call(&IProxy::logicContractCall {}, operator).await?._0;
    expect("logic contract", logic, deployed.kip7_logic)?;

    let version = proxy.call(&IProxy::versionCall {}, operator).await?._0;
    expect("logic version", version, config.logic_version.clone())?;

    for (label, role, account) in [
        ("minter role", TYPE_MINTER, accounts.minter),
        ("burner role", TYPE_BURNER, accounts.burner),
    ] {
        let granted = proxy
            .call(&IProxy::hasRoleCall { roleType: role, account }, operator)
            .await?
            ._0;
        expect(label, granted, true)?;
    }

    info!(proxy = %deployed.proxy, "deployment verified");
    Ok(())
}

fn expect<T: PartialEq + std::fmt::Debug>(what: &str, actual: T, expected: T) -> Result<()> {
    if actual != expected {
        return Err(Error::Verification(format!(
            "{what}: expected {expected:?}, found {actual:?}"
        )));
    }
    Ok(())
}
