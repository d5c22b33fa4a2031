//! The `UpstreamDispatcher` trait and response classification.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{AttemptError, TransportError};
use crate::registry::ProviderEndpoint;
use crate::request::{JsonRpcError, RpcPayload};

/// Result of one attempt against one provider.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// Usable response, returned to the caller verbatim. May itself carry a
    /// non-retryable JSON-RPC error such as invalid params.
    Success { payload: Value },
    /// Connection error, timeout, non-2xx status or non-JSON body.
    TransportFailure { cause: TransportError },
    /// HTTP 200 with a retry-worthy JSON-RPC error code.
    SemanticFailure { code: i64, message: String },
}

impl DispatchOutcome {
    /// Classify a 2xx response body.
    ///
    /// 1. Not JSON → `TransportFailure`
    /// 2. `error.code` in the retry-worthy set → `SemanticFailure`
    /// 3. Anything else → `Success`
    pub fn from_body(body: &[u8]) -> Self {
        let payload: Value = match serde_json::from_slice(body) {
            Ok(v) => v,
            Err(e) => {
                return Self::TransportFailure {
                    cause: TransportError::InvalidBody(e.to_string()),
                }
            }
        };

        match JsonRpcError::from_envelope(&payload) {
            Some(err) if err.is_retryable() => Self::SemanticFailure {
                code: err.code,
                message: err.message,
            },
            _ => Self::Success { payload },
        }
    }

    /// Label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::TransportFailure { .. } => "transport_failure",
            Self::SemanticFailure { .. } => "semantic_failure",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Split into the payload or the per-attempt error.
    pub fn into_result(self) -> Result<Value, AttemptError> {
        match self {
            Self::Success { payload } => Ok(payload),
            Self::TransportFailure { cause } => Err(AttemptError::Transport(cause)),
            Self::SemanticFailure { code, message } => Err(AttemptError::Rpc { code, message }),
        }
    }
}

impl From<TransportError> for DispatchOutcome {
    fn from(cause: TransportError) -> Self {
        Self::TransportFailure { cause }
    }
}

/// Performs one bounded-time call to a single provider.
///
/// Implementations never return errors: every failure is folded into a
/// [`DispatchOutcome`] so the failover loop is plain control flow.
///
/// # Thread Safety
/// Implementations must be `Send + Sync`; one dispatcher (and its connection
/// pool) is shared by all concurrent requests.
#[async_trait]
pub trait UpstreamDispatcher: Send + Sync + 'static {
    async fn dispatch(&self, endpoint: &ProviderEndpoint, payload: &RpcPayload) -> DispatchOutcome;
}
