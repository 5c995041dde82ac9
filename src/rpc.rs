// src/rpc.rs - Klaytn JSON-RPC client (klay_ namespace) implementing Chain

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use alloy_primitives::{Address, Bytes, Log, LogData, B256, U256};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::OnceCell;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::abi::decode_revert_reason;
use crate::chain::{Chain, TransactionReceipt, TransactionRequest};
use crate::error::{Error, Result};
use crate::keyring::{Keyring, LegacyTransaction};

/// Timeouts for requests and receipt polling
#[derive(Debug, Clone)]
pub struct RpcConfig {
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub receipt_poll_interval: Duration,
    pub receipt_timeout: Duration,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            receipt_poll_interval: Duration::from_millis(1000),
            receipt_timeout: Duration::from_secs(120),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    result: Option<Value>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
    data: Option<Value>,
}

impl JsonRpcError {
    /// Reverts surface as `Error::Reverted` with the decoded reason when the
    /// node returns the revert payload in `data`, else with the node's message
    fn into_error(self) -> Error {
        let decoded = self
            .data
            .as_ref()
            .and_then(Value::as_str)
            .and_then(|data| hex::decode(data.trim_start_matches("0x")).ok())
            .and_then(|data| decode_revert_reason(&data));
        if let Some(reason) = decoded {
            return Error::Reverted {
                reason: Some(reason),
            };
        }
        if self.message.contains("reverted") {
            return Error::Reverted {
                reason: Some(self.message),
            };
        }
        Error::Rpc {
            code: self.code,
            message: self.message,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    transaction_hash: B256,
    contract_address: Option<Address>,
    status: String,
    gas_used: String,
    #[serde(default)]
    logs: Vec<RawLog>,
    tx_error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLog {
    address: Address,
    topics: Vec<B256>,
    data: Bytes,
}

impl RawReceipt {
    fn into_receipt(self) -> Result<TransactionReceipt> {
        let status = parse_quantity(&self.status)? == 1;
        if !status {
            return Err(Error::Reverted {
                reason: self.tx_error.map(|code| format!("klaytn txError {code}")),
            });
        }
        Ok(TransactionReceipt {
            transaction_hash: self.transaction_hash,
            contract_address: self.contract_address,
            status,
            gas_used: parse_quantity(&self.gas_used)?,
            logs: self
                .logs
                .into_iter()
                .map(|log| Log {
                    address: log.address,
                    data: LogData::new_unchecked(log.topics, log.data),
                })
                .collect(),
        })
    }
}

/// Parses a hex quantity such as `0x1a`
pub fn parse_quantity(value: &str) -> Result<u64> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    u64::from_str_radix(digits, 16)
        .map_err(|e| Error::InvalidResponse(format!("invalid quantity {value:?}: {e}")))
}

fn quantity(value: u64) -> String {
    format!("0x{value:x}")
}

/// Transaction object accepted by `klay_estimateGas` and `klay_call`
fn call_object(request: &TransactionRequest) -> Value {
    let mut object = json!({
        "from": request.from,
        "data": format!("0x{}", hex::encode(&request.data)),
        "value": format!("0x{:x}", request.value),
    });
    if let Some(to) = request.to {
        object["to"] = json!(to);
    }
    if let Some(gas) = request.gas {
        object["gas"] = json!(quantity(gas));
    }
    object
}

/// JSON-RPC client that signs transactions locally with a single keyring
pub struct KlaytnRpc {
    client: Client,
    url: String,
    keyring: Keyring,
    config: RpcConfig,
    next_id: AtomicU64,
    chain_id: OnceCell<u64>,
}

impl KlaytnRpc {
    pub fn new(url: &str, keyring: Keyring, config: RpcConfig) -> Result<Self> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::Config(format!("unsupported RPC url {url:?}")));
        }
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;
        Ok(Self {
            client,
            url: url.to_string(),
            keyring,
            config,
            next_id: AtomicU64::new(1),
            chain_id: OnceCell::new(),
        })
    }

    pub fn address(&self) -> Address {
        self.keyring.address()
    }

    async fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        debug!(url = %self.url, method, id = request.id, "rpc request");

        let response: JsonRpcResponse = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(error.into_error());
        }
        Ok(serde_json::from_value(response.result.unwrap_or(Value::Null))?)
    }

    pub async fn gas_price(&self) -> Result<U256> {
        let price: String = self.request("klay_gasPrice", json!([])).await?;
        Ok(U256::from(parse_quantity(&price)?))
    }

    async fn wait_for_receipt(&self, hash: B256) -> Result<TransactionReceipt> {
        let started = Instant::now();
        loop {
            let receipt: Option<RawReceipt> = self
                .request("klay_getTransactionReceipt", json!([hash]))
                .await?;
            if let Some(receipt) = receipt {
                return receipt.into_receipt();
            }
            if started.elapsed() >= self.config.receipt_timeout {
                return Err(Error::ReceiptTimeout(hash));
            }
            sleep(self.config.receipt_poll_interval).await;
        }
    }
}

#[async_trait]
impl Chain for KlaytnRpc {
    async fn chain_id(&self) -> Result<u64> {
        let id = self
            .chain_id
            .get_or_try_init(|| async {
                let id: String = self.request("klay_chainID", json!([])).await?;
                parse_quantity(&id)
            })
            .await?;
        Ok(*id)
    }

    async fn transaction_count(&self, address: Address) -> Result<u64> {
        let count: String = self
            .request("klay_getTransactionCount", json!([address, "pending"]))
            .await?;
        parse_quantity(&count)
    }

    async fn estimate_gas(&self, request: &TransactionRequest) -> Result<u64> {
        let gas: String = self
            .request("klay_estimateGas", json!([call_object(request)]))
            .await?;
        parse_quantity(&gas)
    }

    async fn send_transaction(&self, request: TransactionRequest) -> Result<TransactionReceipt> {
        if request.from != self.keyring.address() {
            return Err(Error::UnknownSender(request.from));
        }
        let nonce = match request.nonce {
            Some(nonce) => nonce,
            None => self.transaction_count(request.from).await?,
        };
        let gas_limit = match request.gas {
            Some(gas) => gas,
            None => self.estimate_gas(&request).await?,
        };
        let gas_price = self.gas_price().await?;
        let chain_id = self.chain_id().await?;

        let tx = LegacyTransaction {
            nonce,
            gas_price,
            gas_limit,
            to: request.to,
            value: request.value,
            data: request.data,
        };
        let signed = self.keyring.sign_legacy(&tx, chain_id)?;
        let hash: B256 = self
            .request(
                "klay_sendRawTransaction",
                json!([format!("0x{}", hex::encode(&signed.raw))]),
            )
            .await?;
        if hash != signed.hash {
            warn!(expected = %signed.hash, returned = %hash, "node returned an unexpected transaction hash");
        }
        info!(tx = %hash, nonce, gas_limit, "transaction submitted");

        self.wait_for_receipt(hash).await
    }

    async fn call(&self, request: &TransactionRequest) -> Result<Bytes> {
        let output: Bytes = self
            .request("klay_call", json!([call_object(request), "latest"]))
            .await?;
        Ok(output)
    }
}
