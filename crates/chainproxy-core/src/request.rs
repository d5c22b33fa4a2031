//! JSON-RPC 2.0 envelope handling.
//!
//! The proxy never interprets `method` or `params`. It only needs the outer
//! `error` object of a response to decide whether a provider is unhealthy.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProxyError;

/// Error codes that indicate a node-level problem rather than bad input.
///
/// - `-32002`: resource unavailable (node still syncing)
/// - `-32603`: internal error
pub const RETRYABLE_RPC_CODES: [i64; 2] = [-32002, -32603];

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    /// Extract the `error` object from a response body, if it has a usable one.
    ///
    /// Only `error.code` decides. It may be an integer or an integral float
    /// (`-32603.0`). A `message` of any other JSON type is rendered as text
    /// and a missing or `null` one becomes empty. Bodies that are not objects
    /// (batch arrays, scalars) and `error` fields without a numeric `code`
    /// yield `None`.
    pub fn from_envelope(body: &Value) -> Option<Self> {
        let error = body.as_object()?.get("error")?.as_object()?;
        let code = error.get("code").and_then(integral_code)?;
        let message = match error.get("message") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(message)) => message.clone(),
            Some(other) => other.to_string(),
        };
        Some(Self {
            code,
            message,
            data: error.get("data").cloned(),
        })
    }

    /// Returns `true` if this code means the node is unhealthy and another
    /// provider may answer differently.
    pub fn is_retryable(&self) -> bool {
        RETRYABLE_RPC_CODES.contains(&self.code)
    }
}

fn integral_code(code: &Value) -> Option<i64> {
    if let Some(code) = code.as_i64() {
        return Some(code);
    }
    let code = code.as_f64()?;
    (code.fract() == 0.0 && code >= i64::MIN as f64 && code <= i64::MAX as f64)
        .then_some(code as i64)
}

impl std::fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JSON-RPC error {}: {}", self.code, self.message)
    }
}

/// An inbound request body, forwarded to providers byte-for-byte.
///
/// Construction checks that the bytes are JSON; nothing else is inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcPayload(Bytes);

impl RpcPayload {
    /// Wrap a raw body, rejecting anything that is not valid JSON.
    ///
    /// A zero-length body stands for the empty object and is forwarded as `{}`.
    pub fn from_bytes(body: impl Into<Bytes>) -> Result<Self, ProxyError> {
        let body = body.into();
        if body.is_empty() {
            return Ok(Self(Bytes::from_static(b"{}")));
        }
        serde_json::from_slice::<serde::de::IgnoredAny>(&body).map_err(|e| {
            ProxyError::InvalidPayload {
                reason: e.to_string(),
            }
        })?;
        Ok(Self(body))
    }

    /// Build a JSON-RPC 2.0 call envelope.
    pub fn call(id: u64, method: &str, params: Vec<Value>) -> Self {
        let envelope = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        });
        Self(Bytes::from(envelope.to_string()))
    }

    pub fn as_bytes(&self) -> &Bytes {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
