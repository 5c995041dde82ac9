// src/keyring.rs - Private key handling and legacy (EIP-155) transaction signing

use std::fmt;

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use k256::ecdsa::SigningKey;

use crate::error::{Error, Result};
use crate::rlp::RlpList;

/// Unsigned legacy transaction, the format Klaytn accepts through
/// `klay_sendRawTransaction`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyTransaction {
    pub nonce: u64,
    pub gas_price: U256,
    pub gas_limit: u64,
    pub to: Option<Address>,
    pub value: U256,
    pub data: Bytes,
}

impl LegacyTransaction {
    /// Hash signed over by EIP-155: the six fields followed by `chain_id, 0, 0`
    pub fn signing_hash(&self, chain_id: u64) -> B256 {
        let encoded = self.fields().uint(chain_id).uint(0).uint(0).finish();
        keccak256(encoded)
    }

    fn fields(&self) -> RlpList {
        RlpList::new()
            .uint(self.nonce)
            .u256(self.gas_price)
            .uint(self.gas_limit)
            .address(self.to)
            .u256(self.value)
            .bytes(&self.data)
    }
}

/// Raw signed transaction and its hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub raw: Bytes,
    pub hash: B256,
}

/// Signing account created from a hex private key
#[derive(Clone)]
pub struct Keyring {
    signing_key: SigningKey,
    address: Address,
}

impl Keyring {
    /// Accepts a 32-byte key in hex, with or without the `0x` prefix
    pub fn from_private_key(private_key: &str) -> Result<Self> {
        let trimmed = private_key.trim();
        let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(stripped)
            .map_err(|e| Error::InvalidKey(format!("not valid hex: {e}")))?;
        if bytes.len() != 32 {
            return Err(Error::InvalidKey(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            )));
        }
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let signing_key =
            SigningKey::from_slice(bytes).map_err(|e| Error::InvalidKey(e.to_string()))?;
        let address = public_key_address(&signing_key);
        Ok(Self {
            signing_key,
            address,
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Signs `tx` for `chain_id` and returns the RLP-encoded signed transaction
    pub fn sign_legacy(&self, tx: &LegacyTransaction, chain_id: u64) -> Result<SignedTransaction> {
        let hash = tx.signing_hash(chain_id);
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(hash.as_slice())
            .map_err(|e| Error::Signing(e.to_string()))?;

        let sig_bytes = signature.to_bytes();
        let r = U256::from_be_slice(&sig_bytes[..32]);
        let s = U256::from_be_slice(&sig_bytes[32..]);
        let v = u64::from(recovery_id.to_byte()) + chain_id * 2 + 35;

        let raw = tx.fields().uint(v).u256(r).u256(s).finish();
        let hash = keccak256(&raw);
        Ok(SignedTransaction {
            raw: raw.into(),
            hash,
        })
    }
}

impl fmt::Debug for Keyring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keyring")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

fn public_key_address(signing_key: &SigningKey) -> Address {
    let point = signing_key.verifying_key().to_encoded_point(false);
    // skip the 0x04 SEC1 tag
    let hash = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    // Vector from EIP-155
    const EIP155_KEY: &str = "4646464646464646464646464646464646464646464646464646464646464646";

    fn eip155_tx() -> LegacyTransaction {
        LegacyTransaction {
            nonce: 9,
            gas_price: U256::from(20_000_000_000u64),
            gas_limit: 21_000,
            to: Some(Address::repeat_byte(0x35)),
            value: U256::from(1_000_000_000_000_000_000u64),
            data: Bytes::new(),
        }
    }

    #[test]
    fn test_address_derivation() {
        let keyring = Keyring::from_private_key(
            "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318",
        )
        .unwrap();
        assert_eq!(
            keyring.address(),
            Address::from_str("0x2c7536e3605d9c16a7a3d7b1898e529396a65c23").unwrap()
        );
    }

    #[test]
    fn test_prefix_is_optional() {
        let with = Keyring::from_private_key(&format!("0x{EIP155_KEY}")).unwrap();
        let without = Keyring::from_private_key(EIP155_KEY).unwrap();
        assert_eq!(with.address(), without.address());
    }

    #[test]
    fn test_rejects_bad_keys() {
        assert!(matches!(
            Keyring::from_private_key("0x1234"),
            Err(Error::InvalidKey(_))
        ));
        assert!(matches!(
            Keyring::from_private_key("zz"),
            Err(Error::InvalidKey(_))
        ));
        // zero is not a valid secp256k1 scalar
        assert!(matches!(
            Keyring::from_private_key(&"00".repeat(32)),
            Err(Error::InvalidKey(_))
        ));
    }

    #[test]
    fn test_debug_hides_key() {
        let keyring = Keyring::from_private_key(EIP155_KEY).unwrap();
        let printed = format!("{keyring:?}");
        assert!(!printed.contains(EIP155_KEY));
        assert!(printed.contains("address"));
    }

    #[test]
    fn test_eip155_signing_hash() {
        let hash = eip155_tx().signing_hash(1);
        assert_eq!(
            hash,
            B256::from_str("0xdaf5a779ae972f972197303d7b574746c7ef83eadac0f2791ad23db92e4c8e53")
                .unwrap()
        );
    }

    #[test]
    fn test_eip155_signed_transaction() {
        let keyring = Keyring::from_private_key(EIP155_KEY).unwrap();
        let signed = keyring.sign_legacy(&eip155_tx(), 1).unwrap();
        let expected = hex::decode(
            "f86c098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a76400008025a028ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276a067cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83",
        )
        .unwrap();
        assert_eq!(&signed.raw[..], expected.as_slice());
        assert_eq!(signed.hash, keccak256(&expected));
    }
}
