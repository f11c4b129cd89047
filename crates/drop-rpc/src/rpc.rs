//! Minimal blocking Ethereum JSON-RPC client.

use std::sync::atomic::{AtomicU64, Ordering};

use alloy_primitives::{hex, Address, Bytes, U256};
use claim_core::SdkError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::abi::revert_reason;

/// Method not found.
pub const METHOD_NOT_FOUND: i64 = -32601;

#[derive(Serialize)]
struct Request<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct Response {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<ErrorObject>,
}

#[derive(Debug, Deserialize)]
struct ErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

impl ErrorObject {
    /// Revert data comes back either as a hex string or nested one level
    /// (`{"data": "0x..."}`) depending on the node.
    fn revert_data(&self) -> Option<Vec<u8>> {
        let raw = match self.data.as_ref()? {
            Value::String(s) => s.as_str(),
            Value::Object(map) => map.get("data")?.as_str()?,
            _ => return None,
        };
        hex::decode(raw).ok()
    }

    fn into_sdk_error(self) -> SdkError {
        let reason = self
            .revert_data()
            .and_then(|data| revert_reason(&data))
            .or_else(|| {
                self.message
                    .strip_prefix("execution reverted: ")
                    .map(str::to_string)
            })
            .or_else(|| {
                self.message
                    .starts_with("insufficient funds")
                    .then(|| "insufficient funds".to_string())
            });
        SdkError::Rpc {
            code: self.code,
            message: self.message,
            reason,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub transaction_hash: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl Receipt {
    pub fn succeeded(&self) -> bool {
        self.status.as_deref() != Some("0x0")
    }
}

pub struct RpcClient {
    url: String,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, SdkError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = serde_json::to_string(&Request {
            jsonrpc: "2.0",
            id,
            method,
            params,
        })
        .map_err(|e| SdkError::Transport(e.to_string()))?;

        tracing::trace!(url = %self.url, method, id, "rpc request");
        let body: String = ureq::post(self.url.as_str())
            .header("Content-Type", "application/json")
            .send(payload.as_str())
            .map_err(|e| SdkError::Transport(format!("{method}: {e}")))?
            .into_body()
            .read_to_string()
            .map_err(|e| SdkError::Transport(format!("{method}: failed to read response: {e}")))?;

        let response: Response = serde_json::from_str(&body).map_err(|e| SdkError::Decode {
            what: "json-rpc response",
            detail: e.to_string(),
        })?;
        if let Some(error) = response.error {
            tracing::debug!(method, code = error.code, message = %error.message, "rpc error");
            return Err(error.into_sdk_error());
        }
        serde_json::from_value(response.result.unwrap_or(Value::Null)).map_err(|e| SdkError::Decode {
            what: "json-rpc result",
            detail: format!("{method}: {e}"),
        })
    }

    /// `eth_call` against the latest block.
    pub fn call(&self, to: Address, data: Vec<u8>, from: Option<Address>) -> Result<Vec<u8>, SdkError> {
        let mut tx = json!({
            "to": to.to_checksum(None),
            "data": hex::encode_prefixed(&data),
        });
        if let Some(from) = from {
            tx["from"] = json!(from.to_checksum(None));
        }
        let result: Bytes = self.request("eth_call", json!([tx, "latest"]))?;
        Ok(result.to_vec())
    }

    pub fn balance(&self, owner: Address) -> Result<U256, SdkError> {
        self.request("eth_getBalance", json!([owner.to_checksum(None), "latest"]))
    }

    /// Accounts exposed by the wallet endpoint, asking for access first when
    /// the endpoint supports it.
    pub fn accounts(&self) -> Result<Vec<Address>, SdkError> {
        match self.request::<Vec<Address>>("eth_requestAccounts", json!([])) {
            Err(SdkError::Rpc { code, .. }) if code == METHOD_NOT_FOUND => {
                self.request("eth_accounts", json!([]))
            }
            other => other,
        }
    }

    pub fn send_transaction(&self, tx: Value) -> Result<String, SdkError> {
        self.request("eth_sendTransaction", json!([tx]))
    }

    pub fn receipt(&self, tx_hash: &str) -> Result<Option<Receipt>, SdkError> {
        self.request("eth_getTransactionReceipt", json!([tx_hash]))
    }
}

#[cfg(test)]
mod tests {
    use alloy_sol_types::{Revert, SolError};

    use super::*;

    fn error(value: Value) -> SdkError {
        serde_json::from_value::<ErrorObject>(value).unwrap().into_sdk_error()
    }

    #[test]
    fn test_revert_data_string() {
        let data = hex::encode_prefixed(
            Revert {
                reason: "!MaxSupply".to_string(),
            }
            .abi_encode(),
        );
        let err = error(json!({"code": 3, "message": "execution reverted", "data": data}));
        assert_eq!(err.reason(), Some("!MaxSupply"));
    }

    #[test]
    fn test_revert_data_nested() {
        let data = hex::encode_prefixed(
            Revert {
                reason: "!PriceOrCurrency".to_string(),
            }
            .abi_encode(),
        );
        let err = error(json!({
            "code": -32603,
            "message": "Internal error",
            "data": {"message": "reverted", "data": data}
        }));
        assert_eq!(err.reason(), Some("!PriceOrCurrency"));
    }

    #[test]
    fn test_reason_from_message() {
        let err = error(json!({"code": -32000, "message": "execution reverted: !Qty"}));
        assert_eq!(err.reason(), Some("!Qty"));

        let err = error(json!({"code": -32000, "message": "insufficient funds for gas * price + value"}));
        assert_eq!(err.reason(), Some("insufficient funds"));

        let err = error(json!({"code": -32601, "message": "the method does not exist"}));
        assert_eq!(err.reason(), None);
    }

    #[test]
    fn test_receipt_status() {
        let ok: Receipt = serde_json::from_value(json!({"transactionHash": "0x1", "status": "0x1"})).unwrap();
        assert!(ok.succeeded());
        let failed: Receipt = serde_json::from_value(json!({"transactionHash": "0x1", "status": "0x0"})).unwrap();
        assert!(!failed.succeeded());
    }
}
