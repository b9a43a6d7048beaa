//! Blocking JSON-RPC client for the chain node hosting the verifier.
//!
//! Only two methods are used: `eth_estimateGas` for live cost figures and
//! `eth_call` for verification. Timeouts are the HTTP client's defaults and
//! nothing is retried.

use attestbench_canonical::Address;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::cell::Cell;
use thiserror::Error;

use crate::call::EncodedCall;
use crate::cost::CostEstimator;
use crate::interface::decode_verdict;

/// Errors from the external chain node.
#[derive(Error, Debug)]
pub enum RpcError {
    /// The request never produced a response.
    #[error("{method} request failed: {message}")]
    Transport {
        /// JSON-RPC method.
        method: &'static str,
        /// Transport error.
        message: String,
    },
    /// Non-success HTTP status.
    #[error("{method} returned HTTP {status}: {body}")]
    Status {
        /// JSON-RPC method.
        method: &'static str,
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },
    /// The node answered with a JSON-RPC error object.
    #[error("{method} failed with code {code}: {message}")]
    Node {
        /// JSON-RPC method.
        method: &'static str,
        /// Error code.
        code: i64,
        /// Error message.
        message: String,
    },
    /// The response could not be interpreted.
    #[error("{method} response parse: {message}")]
    Decode {
        /// JSON-RPC method.
        method: &'static str,
        /// Parse error.
        message: String,
    },
    /// The return data is not what the verifier interface promises.
    #[error("verifier return data: {0}")]
    ReturnData(#[from] alloy_sol_types::Error),
}

/// Transaction object passed to `eth_estimateGas` and `eth_call`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallRequest {
    /// Sender, when configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Verifier contract.
    pub to: String,
    /// `0x`-prefixed calldata.
    pub data: String,
}

impl CallRequest {
    /// Builds a request for `calldata` against `to`.
    pub fn new(to: &Address, from: Option<&Address>, calldata: &[u8]) -> Self {
        Self {
            from: from.map(Address::to_string),
            to: to.to_string(),
            data: format!("0x{}", hex::encode(calldata)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

/// JSON-RPC 2.0 over HTTP, blocking.
pub struct JsonRpcClient {
    http: reqwest::blocking::Client,
    url: String,
    next_id: Cell<u64>,
}

impl JsonRpcClient {
    /// Creates a client for `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            url: url.into(),
            next_id: Cell::new(1),
        }
    }

    /// Endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Sends one request and decodes its `result`.
    pub fn request<T: DeserializeOwned>(
        &self,
        method: &'static str,
        params: Value,
    ) -> Result<T, RpcError> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let resp = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .map_err(|e| RpcError::Transport {
                method,
                message: e.to_string(),
            })?;

        let status = resp.status();
        let text = resp.text().map_err(|e| RpcError::Transport {
            method,
            message: e.to_string(),
        })?;
        if !status.is_success() {
            return Err(RpcError::Status {
                method,
                status: status.as_u16(),
                body: text,
            });
        }

        tracing::debug!(method, id, "json-rpc response received");
        decode_response(method, &text)
    }

    /// `eth_estimateGas` for `call`.
    pub fn estimate_gas(&self, call: &CallRequest) -> Result<u64, RpcError> {
        let quantity: String = self.request("eth_estimateGas", json!([call]))?;
        parse_quantity("eth_estimateGas", &quantity)
    }

    /// `eth_call` for `call` at the latest block; returns raw return data.
    pub fn call(&self, call: &CallRequest) -> Result<Vec<u8>, RpcError> {
        let data: String = self.request("eth_call", json!([call, "latest"]))?;
        parse_data("eth_call", &data)
    }
}

/// Decodes a JSON-RPC response body.
pub fn decode_response<T: DeserializeOwned>(method: &'static str, body: &str) -> Result<T, RpcError> {
    let decode = |message: String| RpcError::Decode { method, message };

    let resp: RpcResponse = serde_json::from_str(body).map_err(|e| decode(e.to_string()))?;
    if let Some(err) = resp.error {
        return Err(RpcError::Node {
            method,
            code: err.code,
            message: err.message,
        });
    }
    let result = resp
        .result
        .ok_or_else(|| decode("response has neither result nor error".to_string()))?;
    serde_json::from_value(result).map_err(|e| decode(e.to_string()))
}

/// Parses a `0x`-prefixed hex quantity.
pub fn parse_quantity(method: &'static str, quantity: &str) -> Result<u64, RpcError> {
    let digits = quantity.strip_prefix("0x").unwrap_or(quantity);
    u64::from_str_radix(digits, 16).map_err(|e| RpcError::Decode {
        method,
        message: format!("bad quantity '{}': {}", quantity, e),
    })
}

/// Parses `0x`-prefixed hex data.
pub fn parse_data(method: &'static str, data: &str) -> Result<Vec<u8>, RpcError> {
    let digits = data.strip_prefix("0x").unwrap_or(data);
    hex::decode(digits).map_err(|e| RpcError::Decode {
        method,
        message: format!("bad data: {}", e),
    })
}

/// Live cost figures from `eth_estimateGas`.
pub struct RpcEstimator<'a> {
    client: &'a JsonRpcClient,
    verifier: Address,
    from: Option<Address>,
}

impl<'a> RpcEstimator<'a> {
    /// Estimates calls against `verifier`, optionally from `from`.
    pub fn new(client: &'a JsonRpcClient, verifier: Address, from: Option<Address>) -> Self {
        Self {
            client,
            verifier,
            from,
        }
    }
}

impl CostEstimator for RpcEstimator<'_> {
    fn name(&self) -> &'static str {
        "eth_estimateGas"
    }

    fn estimate(&self, call: &EncodedCall) -> Result<u64, RpcError> {
        let request = CallRequest::new(&self.verifier, self.from.as_ref(), &call.calldata);
        self.client.estimate_gas(&request)
    }
}

/// Evaluates verifier calls.
pub trait Verifier {
    /// Whether the verifier accepts `call`.
    fn verify(&self, call: &EncodedCall) -> Result<bool, RpcError>;
}

/// Verification through `eth_call`.
pub struct RpcVerifier<'a> {
    client: &'a JsonRpcClient,
    verifier: Address,
    from: Option<Address>,
}

impl<'a> RpcVerifier<'a> {
    /// Verifies calls against `verifier`, optionally from `from`.
    pub fn new(client: &'a JsonRpcClient, verifier: Address, from: Option<Address>) -> Self {
        Self {
            client,
            verifier,
            from,
        }
    }
}

impl Verifier for RpcVerifier<'_> {
    fn verify(&self, call: &EncodedCall) -> Result<bool, RpcError> {
        let request = CallRequest::new(&self.verifier, self.from.as_ref(), &call.calldata);
        let data = self.client.call(&request)?;
        Ok(decode_verdict(&data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_result_and_error_envelopes() {
        let ok: String = decode_response("eth_estimateGas", r#"{"jsonrpc":"2.0","id":1,"result":"0x5208"}"#).unwrap();
        assert_eq!(parse_quantity("eth_estimateGas", &ok).unwrap(), 21_000);

        let err = decode_response::<String>(
            "eth_call",
            r#"{"jsonrpc":"2.0","id":2,"error":{"code":3,"message":"execution reverted"}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, RpcError::Node { code: 3, .. }));
        assert!(err.to_string().contains("execution reverted"));

        let empty = decode_response::<String>("eth_call", r#"{"jsonrpc":"2.0","id":3}"#);
        assert!(matches!(empty, Err(RpcError::Decode { .. })));
    }

    #[test]
    fn call_request_serializes_hex_fields() {
        let to = Address([0x11; 20]);
        let request = CallRequest::new(&to, None, &[0xde, 0xad]);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["data"], "0xdead");
        assert_eq!(value["to"], format!("0x{}", "11".repeat(20)));
        assert!(value.get("from").is_none());
    }

    #[test]
    fn parses_hex_data() {
        assert_eq!(parse_data("eth_call", "0x0001").unwrap(), vec![0, 1]);
        assert!(parse_data("eth_call", "0xzz").is_err());
        assert!(parse_quantity("eth_estimateGas", "0x").is_err());
    }
}
