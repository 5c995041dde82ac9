// src/devnet/contracts.rs - Native models of the Point token contracts
//
// Storage contracts hold all state and are owned by the proxy after wiring.
// The proxy keeps only its operator and the primary storage address and
// runs the logic contract's code in its own context for unknown selectors,
// so the logic reaches the storages with `msg.sender == proxy`.

use std::collections::{HashMap, HashSet};

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::{SolEvent, SolInterface, SolValue};

use super::world::{ContractKind, ExecResult, Revert, World};
use crate::abi::{IKIP7Logic, IKIP7Storage, IOwnable, IPrimaryStorage, IProxy, TYPE_BURNER, TYPE_MINTER};

// ============================================================================
// REVERT REASONS
// ============================================================================

pub mod reasons {
    pub const NOT_OWNER: &str = "Ownable: caller is not the owner";
    pub const ZERO_OWNER: &str = "Ownable: new owner is the zero address";
    pub const NOT_OPERATOR: &str = "Caller is not the Operator";
    pub const NOT_MINTER: &str = "Caller is not the Minter";
    pub const NOT_BURNER: &str = "Caller is not the Burner";
    pub const ZERO_MINT: &str = "Can not mint zero amount";
    pub const ZERO_BURN: &str = "Can not burn zero amount";
    pub const PAUSED: &str = "Pausable: paused";
    pub const NOT_PAUSED: &str = "Pausable: not paused";
    pub const TRANSFER_TO_ZERO: &str = "KIP7: transfer to the zero address";
    pub const MINT_TO_ZERO: &str = "KIP7: mint to the zero address";
    pub const BURN_FROM_ZERO: &str = "KIP7: burn from the zero address";
    pub const TRANSFER_EXCEEDS_BALANCE: &str = "KIP7: transfer amount exceeds balance";
    pub const BURN_EXCEEDS_BALANCE: &str = "KIP7: burn amount exceeds balance";
    pub const OVERFLOW: &str = "KIP7: arithmetic overflow";
    pub const NOT_INITIALIZED: &str = "KIP7: token is not initialized";
    pub const ALREADY_INITIALIZED: &str = "KIP7: already initialized";
    pub const ROLE_TYPE_EXISTS: &str = "Role type already exists";
    pub const UNKNOWN_ROLE_TYPE: &str = "Role type does not exist";
    pub const LOGIC_NOT_CONTRACT: &str = "Logic contract must be a contract";
    pub const LOGIC_NOT_SET: &str = "Logic contract is not set";
    pub const STORAGE_NOT_CONTRACT: &str = "Storage must be a contract";
    pub const TOKEN_STORAGE_NOT_SET: &str = "Token storage is not set";
    pub const UNKNOWN_FUNCTION: &str = "Function does not exist";
    pub const REENTRANT_CALL: &str = "devnet: re-entrant call";
}

use reasons::*;

/// Address executing the code and the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    pub this: Address,
    pub sender: Address,
}

#[derive(Debug, Clone)]
pub enum Contract {
    Proxy(Proxy),
    PrimaryStorage(PrimaryStorage),
    Kip7Storage(Kip7Storage),
    Kip7Logic,
}

impl Contract {
    pub fn construct(
        kind: ContractKind,
        world: &World,
        deployer: Address,
        constructor_args: &[u8],
    ) -> ExecResult<Self> {
        Ok(match kind {
            ContractKind::Proxy => {
                let primary_storage = Address::abi_decode(constructor_args, true)
                    .map_err(|_| Revert::new("Proxy: invalid constructor arguments"))?;
                if !world.has_code(primary_storage) {
                    return Err(Revert::new(STORAGE_NOT_CONTRACT));
                }
                Contract::Proxy(Proxy {
                    operator: deployer,
                    primary_storage,
                })
            }
            ContractKind::PrimaryStorage => Contract::PrimaryStorage(PrimaryStorage::new(deployer)),
            ContractKind::Kip7Storage => Contract::Kip7Storage(Kip7Storage::new(deployer)),
            ContractKind::Kip7Logic => Contract::Kip7Logic,
        })
    }

    pub fn kind(&self) -> ContractKind {
        match self {
            Contract::Proxy(_) => ContractKind::Proxy,
            Contract::PrimaryStorage(_) => ContractKind::PrimaryStorage,
            Contract::Kip7Storage(_) => ContractKind::Kip7Storage,
            Contract::Kip7Logic => ContractKind::Kip7Logic,
        }
    }

    pub fn execute(&mut self, world: &mut World, ctx: Context, data: &[u8]) -> ExecResult<Vec<u8>> {
        match self {
            Contract::Proxy(proxy) => proxy.execute(world, ctx, data),
            Contract::PrimaryStorage(storage) => storage.execute(world, ctx, data),
            Contract::Kip7Storage(storage) => storage.execute(world, ctx, data),
            // Called directly, the logic has no storage wired to it
            Contract::Kip7Logic => Err(Revert::new(TOKEN_STORAGE_NOT_SET)),
        }
    }
}

// ============================================================================
// OWNABLE
// ============================================================================

#[derive(Debug, Clone)]
struct Ownable {
    owner: Address,
}

impl Ownable {
    fn only_owner(&self, sender: Address) -> ExecResult<()> {
        if sender != self.owner {
            return Err(Revert::new(NOT_OWNER));
        }
        Ok(())
    }

    fn transfer_ownership(&mut self, world: &mut World, ctx: Context, new_owner: Address) -> ExecResult<()> {
        self.only_owner(ctx.sender)?;
        if new_owner == Address::ZERO {
            return Err(Revert::new(ZERO_OWNER));
        }
        let previous_owner = self.owner;
        self.owner = new_owner;
        world.emit(
            ctx.this,
            IOwnable::OwnershipTransferred {
                previousOwner: previous_owner,
                newOwner: new_owner,
            }
            .encode_log_data(),
        );
        Ok(())
    }
}

fn decode<T: SolInterface>(data: &[u8]) -> ExecResult<T> {
    T::abi_decode(data, true).map_err(|_| Revert::new(UNKNOWN_FUNCTION))
}

fn done() -> ExecResult<Vec<u8>> {
    Ok(Vec::new())
}

// ============================================================================
// PRIMARY STORAGE
// ============================================================================

#[derive(Debug, Clone)]
pub struct PrimaryStorage {
    ownable: Ownable,
    logic: Address,
    version: String,
    additional_storages: Vec<Address>,
    role_types: HashSet<B256>,
    roles: HashSet<(B256, Address)>,
    paused: bool,
}

impl PrimaryStorage {
    fn new(owner: Address) -> Self {
        Self {
            ownable: Ownable { owner },
            logic: Address::ZERO,
            version: String::new(),
            additional_storages: Vec::new(),
            role_types: HashSet::new(),
            roles: HashSet::new(),
            paused: false,
        }
    }

    fn execute(&mut self, world: &mut World, ctx: Context, data: &[u8]) -> ExecResult<Vec<u8>> {
        use IPrimaryStorage::IPrimaryStorageCalls as Calls;

        match decode::<Calls>(data)? {
            Calls::owner(_) => Ok(self.ownable.owner.abi_encode()),
            Calls::transferOwnership(call) => {
                self.ownable.transfer_ownership(world, ctx, call.newOwner)?;
                done()
            }
            Calls::setLogicContract(call) => {
                self.ownable.only_owner(ctx.sender)?;
                self.logic = call.logic;
                self.version = call.version;
                done()
            }
            Calls::logicContract(_) => Ok(self.logic.abi_encode()),
            Calls::version(_) => Ok(self.version.abi_encode()),
            Calls::addAdditionalStorage(call) => {
                self.ownable.only_owner(ctx.sender)?;
                if !self.additional_storages.contains(&call.storageAddress) {
                    self.additional_storages.push(call.storageAddress);
                }
                done()
            }
            Calls::additionalStorages(_) => Ok(self.additional_storages.abi_encode()),
            Calls::addRoleType(call) => {
                self.ownable.only_owner(ctx.sender)?;
                if !self.role_types.insert(call.roleType) {
                    return Err(Revert::new(ROLE_TYPE_EXISTS));
                }
                done()
            }
            Calls::isRoleType(call) => Ok(self.role_types.contains(&call.roleType).abi_encode()),
            Calls::grantRole(call) => {
                self.ownable.only_owner(ctx.sender)?;
                if !self.role_types.contains(&call.roleType) {
                    return Err(Revert::new(UNKNOWN_ROLE_TYPE));
                }
                self.roles.insert((call.roleType, call.account));
                done()
            }
            Calls::revokeRole(call) => {
                self.ownable.only_owner(ctx.sender)?;
                self.roles.remove(&(call.roleType, call.account));
                done()
            }
            Calls::hasRole(call) => {
                Ok(self.roles.contains(&(call.roleType, call.account)).abi_encode())
            }
            Calls::setPaused(call) => {
                self.ownable.only_owner(ctx.sender)?;
                self.paused = call.state;
                done()
            }
            Calls::paused(_) => Ok(self.paused.abi_encode()),
        }
    }
}

// ============================================================================
// KIP7 STORAGE
// ============================================================================

#[derive(Debug, Clone)]
pub struct Kip7Storage {
    ownable: Ownable,
    name: String,
    symbol: String,
    decimals: u8,
    total_supply: U256,
    balances: HashMap<Address, U256>,
    initialized: bool,
}

impl Kip7Storage {
    fn new(owner: Address) -> Self {
        Self {
            ownable: Ownable { owner },
            name: String::new(),
            symbol: String::new(),
            decimals: 0,
            total_supply: U256::ZERO,
            balances: HashMap::new(),
            initialized: false,
        }
    }

    fn execute(&mut self, world: &mut World, ctx: Context, data: &[u8]) -> ExecResult<Vec<u8>> {
        use IKIP7Storage::IKIP7StorageCalls as Calls;

        match decode::<Calls>(data)? {
            Calls::owner(_) => Ok(self.ownable.owner.abi_encode()),
            Calls::transferOwnership(call) => {
                self.ownable.transfer_ownership(world, ctx, call.newOwner)?;
                done()
            }
            Calls::updateTokenDetails(call) => {
                self.ownable.only_owner(ctx.sender)?;
                self.name = call.tokenName;
                self.symbol = call.tokenSymbol;
                self.decimals = call.tokenDecimals;
                done()
            }
            Calls::name(_) => Ok(self.name.abi_encode()),
            Calls::symbol(_) => Ok(self.symbol.abi_encode()),
            Calls::decimals(_) => Ok(U256::from(self.decimals).abi_encode()),
            Calls::totalSupply(_) => Ok(self.total_supply.abi_encode()),
            Calls::balanceOf(call) => Ok(self.balance(call.account).abi_encode()),
            Calls::setBalance(call) => {
                self.ownable.only_owner(ctx.sender)?;
                if call.amount.is_zero() {
                    self.balances.remove(&call.account);
                } else {
                    self.balances.insert(call.account, call.amount);
                }
                done()
            }
            Calls::setTotalSupply(call) => {
                self.ownable.only_owner(ctx.sender)?;
                self.total_supply = call.amount;
                done()
            }
            Calls::initialized(_) => Ok(self.initialized.abi_encode()),
            Calls::setInitialized(call) => {
                self.ownable.only_owner(ctx.sender)?;
                self.initialized = call.state;
                done()
            }
        }
    }

    fn balance(&self, account: Address) -> U256 {
        self.balances.get(&account).copied().unwrap_or(U256::ZERO)
    }
}

// ============================================================================
// PROXY
// ============================================================================

#[derive(Debug, Clone)]
pub struct Proxy {
    operator: Address,
    primary_storage: Address,
}

impl Proxy {
    fn execute(&mut self, world: &mut World, ctx: Context, data: &[u8]) -> ExecResult<Vec<u8>> {
        use IProxy::IProxyCalls as Calls;

        if data.len() < 4 {
            return self.delegate(world, ctx, data);
        }
        let call = match Calls::abi_decode(data, true) {
            Ok(call) => call,
            Err(alloy_sol_types::Error::UnknownSelector { .. }) => {
                return self.delegate(world, ctx, data);
            }
            Err(_) => return Err(Revert::new("Proxy: invalid calldata")),
        };

        let primary = self.primary_storage;
        match call {
            Calls::owner(_) => Ok(self.operator.abi_encode()),
            Calls::primaryStorage(_) => Ok(primary.abi_encode()),
            Calls::addAdditionalStorage(call) => {
                self.only_operator(ctx.sender)?;
                if !world.has_code(call.storageAddress) {
                    return Err(Revert::new(STORAGE_NOT_CONTRACT));
                }
                world.send_typed(
                    ctx.this,
                    primary,
                    &IPrimaryStorage::addAdditionalStorageCall {
                        storageAddress: call.storageAddress,
                    },
                )?;
                done()
            }
            Calls::updateLogicContract(call) => {
                self.only_operator(ctx.sender)?;
                if !world.has_code(call.logic) {
                    return Err(Revert::new(LOGIC_NOT_CONTRACT));
                }
                world.send_typed(
                    ctx.this,
                    primary,
                    &IPrimaryStorage::setLogicContractCall {
                        logic: call.logic,
                        version: call.version.clone(),
                    },
                )?;
                world.emit(
                    ctx.this,
                    IProxy::LogicContractUpdated {
                        logic: call.logic,
                        version: call.version,
                    }
                    .encode_log_data(),
                );
                done()
            }
            Calls::logicContract(_) => {
                let logic = world.call_typed(ctx.this, primary, &IPrimaryStorage::logicContractCall {})?;
                Ok(logic._0.abi_encode())
            }
            Calls::version(_) => {
                let version = world.call_typed(ctx.this, primary, &IPrimaryStorage::versionCall {})?;
                Ok(version._0.abi_encode())
            }
            Calls::addRoleType(call) => {
                self.only_operator(ctx.sender)?;
                world.send_typed(
                    ctx.this,
                    primary,
                    &IPrimaryStorage::addRoleTypeCall {
                        roleType: call.roleType,
                    },
                )?;
                done()
            }
            Calls::grantRole(call) => {
                self.only_operator(ctx.sender)?;
                world.send_typed(
                    ctx.this,
                    primary,
                    &IPrimaryStorage::grantRoleCall {
                        roleType: call.roleType,
                        account: call.account,
                    },
                )?;
                done()
            }
            Calls::revokeRole(call) => {
                self.only_operator(ctx.sender)?;
                world.send_typed(
                    ctx.this,
                    primary,
                    &IPrimaryStorage::revokeRoleCall {
                        roleType: call.roleType,
                        account: call.account,
                    },
                )?;
                done()
            }
            Calls::hasRole(call) => {
                let granted = has_role(world, ctx.this, primary, call.roleType, call.account)?;
                Ok(granted.abi_encode())
            }
            Calls::pause(_) => {
                self.only_operator(ctx.sender)?;
                if is_paused(world, ctx.this, primary)? {
                    return Err(Revert::new(PAUSED));
                }
                world.send_typed(ctx.this, primary, &IPrimaryStorage::setPausedCall { state: true })?;
                world.emit(
                    ctx.this,
                    IProxy::Paused {
                        account: ctx.sender,
                    }
                    .encode_log_data(),
                );
                done()
            }
            Calls::unpause(_) => {
                self.only_operator(ctx.sender)?;
                if !is_paused(world, ctx.this, primary)? {
                    return Err(Revert::new(NOT_PAUSED));
                }
                world.send_typed(ctx.this, primary, &IPrimaryStorage::setPausedCall { state: false })?;
                world.emit(
                    ctx.this,
                    IProxy::Unpaused {
                        account: ctx.sender,
                    }
                    .encode_log_data(),
                );
                done()
            }
            Calls::paused(_) => Ok(is_paused(world, ctx.this, primary)?.abi_encode()),
        }
    }

    fn only_operator(&self, sender: Address) -> ExecResult<()> {
        if sender != self.operator {
            return Err(Revert::new(NOT_OPERATOR));
        }
        Ok(())
    }

    /// Fallback: run the logic contract's code against this proxy
    fn delegate(&self, world: &mut World, ctx: Context, data: &[u8]) -> ExecResult<Vec<u8>> {
        let logic = world
            .call_typed(ctx.this, self.primary_storage, &IPrimaryStorage::logicContractCall {})?
            ._0;
        if logic == Address::ZERO {
            return Err(Revert::new(LOGIC_NOT_SET));
        }
        if world.kind_of(logic) != Some(ContractKind::Kip7Logic) {
            return Err(Revert::new(LOGIC_NOT_CONTRACT));
        }
        let token = TokenContext {
            this: ctx.this,
            sender: ctx.sender,
            operator: self.operator,
            primary_storage: self.primary_storage,
        };
        token.execute(world, data)
    }
}

fn is_paused(world: &mut World, this: Address, primary: Address) -> ExecResult<bool> {
    Ok(world
        .call_typed(this, primary, &IPrimaryStorage::pausedCall {})?
        ._0)
}

fn has_role(
    world: &mut World,
    this: Address,
    primary: Address,
    role_type: B256,
    account: Address,
) -> ExecResult<bool> {
    Ok(world
        .call_typed(
            this,
            primary,
            &IPrimaryStorage::hasRoleCall {
                roleType: role_type,
                account,
            },
        )?
        ._0)
}

// ============================================================================
// KIP7 LOGIC (executed in the proxy's context)
// ============================================================================

struct TokenContext {
    this: Address,
    sender: Address,
    operator: Address,
    primary_storage: Address,
}

impl TokenContext {
    fn execute(&self, world: &mut World, data: &[u8]) -> ExecResult<Vec<u8>> {
        use IKIP7Logic::IKIP7LogicCalls as Calls;

        let call = decode::<Calls>(data)?;
        let storage = self.token_storage(world)?;
        match call {
            Calls::initialize(_) => {
                if self.sender != self.operator {
                    return Err(Revert::new(NOT_OPERATOR));
                }
                if self.is_initialized(world, storage)? {
                    return Err(Revert::new(ALREADY_INITIALIZED));
                }
                world.send_typed(self.this, storage, &IKIP7Storage::setInitializedCall { state: true })?;
                done()
            }
            Calls::name(_) => {
                let name = world.call_typed(self.this, storage, &IKIP7Storage::nameCall {})?;
                Ok(name._0.abi_encode())
            }
            Calls::symbol(_) => {
                let symbol = world.call_typed(self.this, storage, &IKIP7Storage::symbolCall {})?;
                Ok(symbol._0.abi_encode())
            }
            Calls::decimals(_) => {
                let decimals = world.call_typed(self.this, storage, &IKIP7Storage::decimalsCall {})?;
                Ok(U256::from(decimals._0).abi_encode())
            }
            Calls::totalSupply(_) => Ok(self.total_supply(world, storage)?.abi_encode()),
            Calls::balanceOf(call) => Ok(self.balance_of(world, storage, call.account)?.abi_encode()),
            Calls::mint(call) => {
                self.require_role(world, TYPE_MINTER, NOT_MINTER)?;
                if call.amount.is_zero() {
                    return Err(Revert::new(ZERO_MINT));
                }
                self.require_initialized(world, storage)?;
                self.when_not_paused(world)?;
                if call.account == Address::ZERO {
                    return Err(Revert::new(MINT_TO_ZERO));
                }

                let supply = self
                    .total_supply(world, storage)?
                    .checked_add(call.amount)
                    .ok_or_else(|| Revert::new(OVERFLOW))?;
                let balance = self
                    .balance_of(world, storage, call.account)?
                    .checked_add(call.amount)
                    .ok_or_else(|| Revert::new(OVERFLOW))?;
                self.set_total_supply(world, storage, supply)?;
                self.set_balance(world, storage, call.account, balance)?;

                self.emit_transfer(world, Address::ZERO, call.account, call.amount);
                Ok(true.abi_encode())
            }
            Calls::burn(call) => {
                self.require_role(world, TYPE_BURNER, NOT_BURNER)?;
                if call.amount.is_zero() {
                    return Err(Revert::new(ZERO_BURN));
                }
                self.require_initialized(world, storage)?;
                self.when_not_paused(world)?;
                if call.account == Address::ZERO {
                    return Err(Revert::new(BURN_FROM_ZERO));
                }

                let balance = self
                    .balance_of(world, storage, call.account)?
                    .checked_sub(call.amount)
                    .ok_or_else(|| Revert::new(BURN_EXCEEDS_BALANCE))?;
                let supply = self
                    .total_supply(world, storage)?
                    .checked_sub(call.amount)
                    .ok_or_else(|| Revert::new(OVERFLOW))?;
                self.set_balance(world, storage, call.account, balance)?;
                self.set_total_supply(world, storage, supply)?;

                self.emit_transfer(world, call.account, Address::ZERO, call.amount);
                Ok(true.abi_encode())
            }
            Calls::transfer(call) => {
                self.when_not_paused(world)?;
                self.require_initialized(world, storage)?;
                if call.recipient == Address::ZERO {
                    return Err(Revert::new(TRANSFER_TO_ZERO));
                }

                let from = self.sender;
                let from_balance = self
                    .balance_of(world, storage, from)?
                    .checked_sub(call.amount)
                    .ok_or_else(|| Revert::new(TRANSFER_EXCEEDS_BALANCE))?;
                self.set_balance(world, storage, from, from_balance)?;
                let to_balance = self
                    .balance_of(world, storage, call.recipient)?
                    .checked_add(call.amount)
                    .ok_or_else(|| Revert::new(OVERFLOW))?;
                self.set_balance(world, storage, call.recipient, to_balance)?;

                self.emit_transfer(world, from, call.recipient, call.amount);
                Ok(true.abi_encode())
            }
        }
    }

    /// First additional storage registered on the proxy
    fn token_storage(&self, world: &mut World) -> ExecResult<Address> {
        let storages = world
            .call_typed(self.this, self.primary_storage, &IPrimaryStorage::additionalStoragesCall {})?
            ._0;
        storages
            .first()
            .copied()
            .ok_or_else(|| Revert::new(TOKEN_STORAGE_NOT_SET))
    }

    fn require_role(&self, world: &mut World, role_type: B256, reason: &str) -> ExecResult<()> {
        if !has_role(world, self.this, self.primary_storage, role_type, self.sender)? {
            return Err(Revert::new(reason));
        }
        Ok(())
    }

    fn when_not_paused(&self, world: &mut World) -> ExecResult<()> {
        if is_paused(world, self.this, self.primary_storage)? {
            return Err(Revert::new(PAUSED));
        }
        Ok(())
    }

    fn is_initialized(&self, world: &mut World, storage: Address) -> ExecResult<bool> {
        Ok(world
            .call_typed(self.this, storage, &IKIP7Storage::initializedCall {})?
            ._0)
    }

    fn require_initialized(&self, world: &mut World, storage: Address) -> ExecResult<()> {
        if !self.is_initialized(world, storage)? {
            return Err(Revert::new(NOT_INITIALIZED));
        }
        Ok(())
    }

    fn total_supply(&self, world: &mut World, storage: Address) -> ExecResult<U256> {
        Ok(world
            .call_typed(self.this, storage, &IKIP7Storage::totalSupplyCall {})?
            ._0)
    }

    fn balance_of(&self, world: &mut World, storage: Address, account: Address) -> ExecResult<U256> {
        Ok(world
            .call_typed(self.this, storage, &IKIP7Storage::balanceOfCall { account })?
            ._0)
    }

    fn set_total_supply(&self, world: &mut World, storage: Address, amount: U256) -> ExecResult<()> {
        world.send_typed(self.this, storage, &IKIP7Storage::setTotalSupplyCall { amount })
    }

    fn set_balance(
        &self,
        world: &mut World,
        storage: Address,
        account: Address,
        amount: U256,
    ) -> ExecResult<()> {
        world.send_typed(self.this, storage, &IKIP7Storage::setBalanceCall { account, amount })
    }

    fn emit_transfer(&self, world: &mut World, from: Address, to: Address, value: U256) {
        world.emit(
            self.this,
            IKIP7Logic::Transfer { from, to, value }.encode_log_data(),
        );
    }
}
