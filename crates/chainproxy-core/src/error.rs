//! Error types for routing, dispatch and configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Transport-level failure talking to a single provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Connection refused, DNS or TLS failure, or a non-2xx status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The per-attempt deadline expired.
    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// The provider answered 2xx but the body was not JSON.
    #[error("Invalid response body: {0}")]
    InvalidBody(String),
}

/// Why one attempt against one provider did not produce a usable response.
///
/// Both variants are recovered locally by failing over to the next candidate.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AttemptError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// HTTP 200, but the envelope carries a retry-worthy JSON-RPC error.
    #[error("RPC Error: {message}")]
    Rpc { code: i64, message: String },
}

impl AttemptError {
    /// Short label for logs: `"transport"` or `"semantic"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Rpc { .. } => "semantic",
        }
    }
}

/// Registry lookup failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// Unknown chain, or unknown network under a known chain.
    #[error("Chain '{chain}' or network '{network}' not configured.")]
    RouteNotFound { chain: String, network: String },

    /// The route exists but its provider list is empty.
    #[error("No providers configured for this chain/network.")]
    NoProvidersConfigured { chain: String, network: String },
}

/// Errors that cross the core boundary. Each maps to exactly one HTTP status.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProxyError {
    #[error("Chain '{chain}' or network '{network}' not configured.")]
    RouteNotFound { chain: String, network: String },

    #[error("No providers configured for this chain/network.")]
    NoProvidersConfigured { chain: String, network: String },

    /// Every candidate was tried; `details` is the last error observed.
    #[error("All providers failed.")]
    AllProvidersFailed { details: String },

    /// The inbound body is not JSON. Raised before any provider is contacted.
    #[error("Invalid JSON body: {reason}")]
    InvalidPayload { reason: String },
}

impl From<ResolveError> for ProxyError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::RouteNotFound { chain, network } => {
                Self::RouteNotFound { chain, network }
            }
            ResolveError::NoProvidersConfigured { chain, network } => {
                Self::NoProvidersConfigured { chain, network }
            }
        }
    }
}

/// Unrecoverable configuration errors raised at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid endpoint '{url}' for {chain}/{network}: {reason}")]
    InvalidEndpoint {
        chain: String,
        network: String,
        url: String,
        reason: String,
    },

    #[error("port must be non-zero")]
    InvalidPort,

    #[error("request_timeout_ms must be non-zero")]
    InvalidTimeout,

    #[error("max_attempts must be non-zero when set")]
    InvalidMaxAttempts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semantic_failure_message_is_prefixed() {
        let err = AttemptError::Rpc {
            code: -32603,
            message: "internal error".into(),
        };
        assert_eq!(err.to_string(), "RPC Error: internal error");
        assert_eq!(err.kind(), "semantic");
    }

    #[test]
    fn transport_failure_is_transparent() {
        let err = AttemptError::from(TransportError::Timeout { ms: 5000 });
        assert_eq!(err.to_string(), "Request timed out after 5000ms");
        assert_eq!(err.kind(), "transport");
    }

    #[test]
    fn resolve_error_maps_to_proxy_error() {
        let err: ProxyError = ResolveError::RouteNotFound {
            chain: "eth".into(),
            network: "goerli".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Chain 'eth' or network 'goerli' not configured."
        );
    }
}
