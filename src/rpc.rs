//! JSON-RPC 2.0 wire types and the HTTP wallet provider

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::provider::{parse_hash, WalletProvider};
use crate::units::{parse_quantity, parse_u64_quantity};
use crate::LedgerError;

/// JSON-RPC request envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// JSON-RPC error object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}

/// JSON-RPC response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorObject>,
}

impl RpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, error: RpcErrorObject) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }

    /// Turn the envelope into the `result` value or a typed error
    ///
    /// A missing `result` is read as `null` (pending receipts).
    pub fn into_result(self) -> Result<Value, LedgerError> {
        match self.error {
            Some(error) => Err(LedgerError::from_rpc(error.code, error.message)),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

/// Wallet provider speaking JSON-RPC over HTTP
///
/// Points at a wallet bridge, a development node (see `ledger-mock`) or a
/// hosted RPC endpoint. Cloning shares the connection pool and id counter.
#[derive(Clone, Debug)]
pub struct HttpProvider {
    url: String,
    /// reqwest::Client is internally Arc-based
    http_client: reqwest::Client,
    next_id: Arc<AtomicU64>,
}

impl HttpProvider {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http_client: reqwest::Client::new(),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl WalletProvider for HttpProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, LedgerError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest {
            jsonrpc: "2.0".to_string(),
            id: json!(id),
            method: method.to_string(),
            params,
        };
        log::debug!("RPC -> {} (id {})", method, id);

        let response = self
            .http_client
            .post(&self.url)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LedgerError::transport(format!(
                "{} returned HTTP {}",
                self.url,
                response.status()
            )));
        }

        let envelope: RpcResponse = response.json().await?;
        envelope.into_result()
    }
}

/// Transaction receipt fields this crate relies on
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    #[serde(default)]
    pub block_number: Option<String>,
    /// `0x1` success, `0x0` failure
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub contract_address: Option<Address>,
}

impl TransactionReceipt {
    /// False only when the node reports status `0x0`
    pub fn succeeded(&self) -> bool {
        match &self.status {
            Some(status) => parse_quantity(status).map(|s| !s.is_zero()).unwrap_or(false),
            None => true,
        }
    }
}

/// `eth_chainId`
pub async fn chain_id<P: WalletProvider>(provider: &P) -> Result<u64, LedgerError> {
    let result = provider.request("eth_chainId", json!([])).await?;
    parse_u64_quantity(expect_str(&result, "chain id")?)
}

/// `eth_call` against `to` with ABI-encoded `data`
pub async fn call<P: WalletProvider>(
    provider: &P,
    from: Option<Address>,
    to: Address,
    data: &[u8],
) -> Result<Vec<u8>, LedgerError> {
    let mut tx = json!({
        "to": to.to_string(),
        "data": format!("0x{}", hex::encode(data)),
    });
    if let Some(from) = from {
        tx["from"] = json!(from.to_string());
    }

    let result = provider.request("eth_call", json!([tx, "latest"])).await?;
    decode_hex(expect_str(&result, "call result")?)
}

/// `eth_getTransactionReceipt`, `None` while pending
pub async fn transaction_receipt<P: WalletProvider>(
    provider: &P,
    hash: B256,
) -> Result<Option<TransactionReceipt>, LedgerError> {
    let result = provider
        .request("eth_getTransactionReceipt", json!([hash.to_string()]))
        .await?;
    if result.is_null() {
        return Ok(None);
    }
    serde_json::from_value(result)
        .map(Some)
        .map_err(|e| LedgerError::malformed(format!("receipt: {}", e)))
}

/// `eth_getTransactionCount` at the pending block
pub async fn transaction_count<P: WalletProvider>(
    provider: &P,
    address: Address,
) -> Result<u64, LedgerError> {
    let result = provider
        .request(
            "eth_getTransactionCount",
            json!([address.to_string(), "pending"]),
        )
        .await?;
    parse_u64_quantity(expect_str(&result, "nonce")?)
}

/// `eth_gasPrice`
pub async fn gas_price<P: WalletProvider>(provider: &P) -> Result<U256, LedgerError> {
    let result = provider.request("eth_gasPrice", json!([])).await?;
    parse_quantity(expect_str(&result, "gas price")?)
}

/// `eth_estimateGas` for a transaction with no recipient (contract creation)
/// or a call to `to`
pub async fn estimate_gas<P: WalletProvider>(
    provider: &P,
    from: Address,
    to: Option<Address>,
    data: &[u8],
) -> Result<u64, LedgerError> {
    let mut tx = json!({
        "from": from.to_string(),
        "data": format!("0x{}", hex::encode(data)),
    });
    if let Some(to) = to {
        tx["to"] = json!(to.to_string());
    }

    let result = provider.request("eth_estimateGas", json!([tx])).await?;
    parse_u64_quantity(expect_str(&result, "gas estimate")?)
}

/// `eth_sendRawTransaction`
pub async fn send_raw_transaction<P: WalletProvider>(
    provider: &P,
    raw: &Bytes,
) -> Result<B256, LedgerError> {
    let result = provider
        .request(
            "eth_sendRawTransaction",
            json!([format!("0x{}", hex::encode(raw))]),
        )
        .await?;
    parse_hash(&result)
}

fn expect_str<'a>(value: &'a Value, what: &str) -> Result<&'a str, LedgerError> {
    value
        .as_str()
        .ok_or_else(|| LedgerError::malformed(format!("expected {} string, got {}", what, value)))
}

pub(crate) fn decode_hex(value: &str) -> Result<Vec<u8>, LedgerError> {
    hex::decode(value.trim_start_matches("0x"))
        .map_err(|e| LedgerError::malformed(format!("invalid hex '{}': {}", value, e)))
}
