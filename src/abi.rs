// src/abi.rs - Solidity interfaces of the Point token contracts

use alloy_primitives::{b256, B256};
use alloy_sol_types::{sol, Revert, SolError};

// ============================================================================
// ROLE TYPES
// ============================================================================

pub const TYPE_MINTER: B256 =
    b256!("a8791d3acb7f4f152c41f3308e90b16e68a23666347d9c4c5ce8535dffead10d");
pub const TYPE_BURNER: B256 =
    b256!("9a433df5d818859975655002918d19fe2ba4567432e52f0cec8426ddf4dc2ada");

// ============================================================================
// CONTRACT INTERFACES
// ============================================================================

sol! {
    /// Ownership shared by both storage contracts
    interface IOwnable {
        event OwnershipTransferred(address indexed previousOwner, address indexed newOwner);

        function owner() external view returns (address);
        function transferOwnership(address newOwner) external;
    }

    /// Upgradeable entry point. Unknown selectors are delegated to the logic contract.
    interface IProxy {
        event Paused(address account);
        event Unpaused(address account);
        event LogicContractUpdated(address indexed logic, string version);

        function owner() external view returns (address);
        function primaryStorage() external view returns (address);
        function addAdditionalStorage(address storageAddress) external;
        function updateLogicContract(address logic, string version) external;
        function logicContract() external view returns (address);
        function version() external view returns (string);
        function addRoleType(bytes32 roleType) external;
        function grantRole(bytes32 roleType, address account) external;
        function revokeRole(bytes32 roleType, address account) external;
        function hasRole(bytes32 roleType, address account) external view returns (bool);
        function pause() external;
        function unpause() external;
        function paused() external view returns (bool);
    }

    /// Routing and access-control state owned by the proxy
    interface IPrimaryStorage {
        function owner() external view returns (address);
        function transferOwnership(address newOwner) external;
        function setLogicContract(address logic, string version) external;
        function logicContract() external view returns (address);
        function version() external view returns (string);
        function addAdditionalStorage(address storageAddress) external;
        function additionalStorages() external view returns (address[]);
        function addRoleType(bytes32 roleType) external;
        function isRoleType(bytes32 roleType) external view returns (bool);
        function grantRole(bytes32 roleType, address account) external;
        function revokeRole(bytes32 roleType, address account) external;
        function hasRole(bytes32 roleType, address account) external view returns (bool);
        function setPaused(bool state) external;
        function paused() external view returns (bool);
    }

    /// Token state owned by the proxy
    interface IKIP7Storage {
        function owner() external view returns (address);
        function transferOwnership(address newOwner) external;
        function updateTokenDetails(string tokenName, string tokenSymbol, uint8 tokenDecimals) external;
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function totalSupply() external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
        function setBalance(address account, uint256 amount) external;
        function setTotalSupply(uint256 amount) external;
        function initialized() external view returns (bool);
        function setInitialized(bool state) external;
    }

    /// Token surface, called at the proxy address
    interface IKIP7Logic {
        event Transfer(address indexed from, address indexed to, uint256 value);

        function initialize() external;
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function totalSupply() external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
        function mint(address account, uint256 amount) external returns (bool);
        function burn(address account, uint256 amount) external returns (bool);
        function transfer(address recipient, uint256 amount) external returns (bool);
    }
}

// ============================================================================
// REVERT DATA
// ============================================================================

/// Decodes an `Error(string)` revert payload into its reason
pub fn decode_revert_reason(data: &[u8]) -> Option<String> {
    Revert::abi_decode(data, true).ok().map(|revert| revert.reason)
}

/// Encodes `reason` as an `Error(string)` revert payload
pub fn encode_revert_reason(reason: &str) -> Vec<u8> {
    Revert {
        reason: reason.to_string(),
    }
    .abi_encode()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{keccak256, Address, U256};
    use alloy_sol_types::{SolCall, SolEvent};

    #[test]
    fn test_revert_reason_roundtrip() {
        let payload = encode_revert_reason("Pausable: paused");
        assert_eq!(&payload[..4], &[0x08, 0xc3, 0x79, 0xa0]);
        assert_eq!(decode_revert_reason(&payload).as_deref(), Some("Pausable: paused"));
        assert_eq!(decode_revert_reason(&[0xde, 0xad]), None);
    }

    #[test]
    fn test_selectors_match_solidity_signatures() {
        assert_eq!(
            IOwnable::transferOwnershipCall::SELECTOR,
            keccak256("transferOwnership(address)")[..4]
        );
        assert_eq!(
            IProxy::updateLogicContractCall::SELECTOR,
            keccak256("updateLogicContract(address,string)")[..4]
        );
        assert_eq!(
            IKIP7Storage::updateTokenDetailsCall::SELECTOR,
            keccak256("updateTokenDetails(string,string,uint8)")[..4]
        );
        assert_eq!(IKIP7Logic::mintCall::SELECTOR, keccak256("mint(address,uint256)")[..4]);
    }

    #[test]
    fn test_transfer_event_signature() {
        assert_eq!(
            IKIP7Logic::Transfer::SIGNATURE_HASH,
            keccak256("Transfer(address,address,uint256)")
        );
        let event = IKIP7Logic::Transfer {
            from: Address::ZERO,
            to: Address::repeat_byte(1),
            value: U256::from(1_000_000u64),
        };
        let data = event.encode_log_data();
        assert_eq!(data.topics().len(), 3);
        let decoded = IKIP7Logic::Transfer::decode_log_data(&data, true).unwrap();
        assert_eq!(decoded.value, U256::from(1_000_000u64));
    }

    #[test]
    fn test_role_types_are_distinct() {
        assert_ne!(TYPE_MINTER, TYPE_BURNER);
        assert_ne!(TYPE_MINTER, B256::ZERO);
    }
}
