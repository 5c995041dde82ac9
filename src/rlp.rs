// src/rlp.rs - Minimal RLP encoder for legacy transactions and CREATE addresses

use alloy_primitives::{Address, U256};

/// Builder for a single RLP list
#[derive(Debug, Default, Clone)]
pub struct RlpList {
    payload: Vec<u8>,
}

impl RlpList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bytes(mut self, data: &[u8]) -> Self {
        encode_bytes(data, &mut self.payload);
        self
    }

    pub fn uint(mut self, value: u64) -> Self {
        encode_bytes(trim_leading_zeros(&value.to_be_bytes()), &mut self.payload);
        self
    }

    pub fn u256(mut self, value: U256) -> Self {
        encode_bytes(trim_leading_zeros(&value.to_be_bytes::<32>()), &mut self.payload);
        self
    }

    /// Contract creation encodes the recipient as the empty string
    pub fn address(self, address: Option<Address>) -> Self {
        match address {
            Some(address) => self.bytes(address.as_slice()),
            None => self.bytes(&[]),
        }
    }

    pub fn finish(self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.payload.len() + 9);
        encode_header(0xc0, self.payload.len(), &mut out);
        out.extend_from_slice(&self.payload);
        out
    }
}

/// Encodes a byte string
pub fn encode_bytes(data: &[u8], out: &mut Vec<u8>) {
    if data.len() == 1 && data[0] < 0x80 {
        out.push(data[0]);
        return;
    }
    encode_header(0x80, data.len(), out);
    out.extend_from_slice(data);
}

fn encode_header(offset: u8, len: usize, out: &mut Vec<u8>) {
    if len < 56 {
        out.push(offset + len as u8);
    } else {
        let len_bytes = (len as u64).to_be_bytes();
        let len_bytes = trim_leading_zeros(&len_bytes);
        out.push(offset + 55 + len_bytes.len() as u8);
        out.extend_from_slice(len_bytes);
    }
}

fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    &bytes[start..]
}
