// src/error.rs - Error type shared by the deployer, the RPC client and the devnet

use std::path::PathBuf;

use alloy_primitives::{Address, B256};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error("Artifact error ({path}): {message}")]
    Artifact { path: PathBuf, message: String },

    #[error("Failed to access {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Unexpected RPC response: {0}")]
    InvalidResponse(String),

    #[error("ABI error: {0}")]
    Abi(#[from] alloy_sol_types::Error),

    #[error("Hex decoding error: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Transaction reverted: {}", .reason.as_deref().unwrap_or("no reason given"))]
    Reverted { reason: Option<String> },

    #[error("Out of gas: limit {limit}, required {required}")]
    OutOfGas { limit: u64, required: u64 },

    #[error("Nonce mismatch for {account}: expected {expected}, got {provided}")]
    NonceMismatch {
        account: Address,
        expected: u64,
        provided: u64,
    },

    #[error("Sender {0} is not an unlocked account")]
    UnknownSender(Address),

    #[error("Timed out waiting for the receipt of {0}")]
    ReceiptTimeout(B256),

    #[error("Deployment of {0} returned no contract address")]
    MissingContractAddress(String),

    #[error("Deployment verification failed: {0}")]
    Verification(String),
}

impl Error {
    pub(crate) fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::File {
            path: path.into(),
            source,
        }
    }

    /// Revert reason carried by this error, if it is a revert
    pub fn revert_reason(&self) -> Option<&str> {
        match self {
            Error::Reverted { reason } => reason.as_deref(),
            _ => None,
        }
    }

    /// Returns the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_) | Error::InvalidKey(_) => 2,
            Error::Artifact { .. } | Error::File { .. } | Error::Json(_) | Error::Hex(_) => 3,
            Error::Http(_)
            | Error::Rpc { .. }
            | Error::InvalidResponse(_)
            | Error::ReceiptTimeout(_) => 4,
            Error::Reverted { .. }
            | Error::OutOfGas { .. }
            | Error::NonceMismatch { .. }
            | Error::UnknownSender(_)
            | Error::MissingContractAddress(_) => 5,
            Error::Verification(_) => 6,
            Error::Abi(_) | Error::Signing(_) => 1,
        }
    }
}
