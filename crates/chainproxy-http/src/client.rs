//! HTTP JSON-RPC dispatcher backed by `reqwest`.
//!
//! Each call is a single POST bounded by the per-attempt timeout. Retrying
//! is the failover controller's job, not the dispatcher's.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;

use chainproxy_core::config::DEFAULT_REQUEST_TIMEOUT_MS;
use chainproxy_core::dispatch::{DispatchOutcome, UpstreamDispatcher};
use chainproxy_core::error::TransportError;
use chainproxy_core::registry::ProviderEndpoint;
use chainproxy_core::request::RpcPayload;

/// Longest slice of a non-2xx body kept in the failure message.
const MAX_ERROR_BODY_CHARS: usize = 256;

/// Configuration for [`HttpDispatcher`].
#[derive(Debug, Clone)]
pub struct HttpDispatcherConfig {
    /// Deadline for one attempt, connect through body read.
    pub request_timeout: Duration,
}

impl Default for HttpDispatcherConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }
}

#[derive(Debug, Error)]
pub enum HttpDispatcherError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Shared HTTP dispatcher with a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpDispatcher {
    http: reqwest::Client,
    request_timeout: Duration,
}

impl HttpDispatcher {
    pub fn new(config: HttpDispatcherConfig) -> Result<Self, HttpDispatcherError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            request_timeout: config.request_timeout,
        })
    }

    /// Create with default configuration (5 second attempts).
    pub fn with_defaults() -> Result<Self, HttpDispatcherError> {
        Self::new(HttpDispatcherConfig::default())
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    async fn send_once(
        &self,
        endpoint: &ProviderEndpoint,
        payload: &RpcPayload,
    ) -> Result<DispatchOutcome, TransportError> {
        let resp = self
            .http
            .post(endpoint.as_str())
            .header(CONTENT_TYPE, "application/json")
            .body(payload.as_bytes().clone())
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            let body: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
            return Err(TransportError::Http(format!("HTTP {status}: {body}")));
        }

        let body = resp.bytes().await.map_err(|e| self.transport_error(e))?;
        Ok(DispatchOutcome::from_body(&body))
    }

    fn transport_error(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout {
                ms: self.request_timeout.as_millis() as u64,
            }
        } else {
            TransportError::Http(err.to_string())
        }
    }
}

#[async_trait]
impl UpstreamDispatcher for HttpDispatcher {
    async fn dispatch(&self, endpoint: &ProviderEndpoint, payload: &RpcPayload) -> DispatchOutcome {
        let start = Instant::now();
        let outcome = match self.send_once(endpoint, payload).await {
            Ok(outcome) => outcome,
            Err(cause) => DispatchOutcome::from(cause),
        };
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        match &outcome {
            DispatchOutcome::Success { .. } => {
                tracing::info!(%endpoint, elapsed_ms, outcome = outcome.kind(), "upstream attempt");
            }
            DispatchOutcome::TransportFailure { cause } => {
                tracing::warn!(
                    %endpoint,
                    elapsed_ms,
                    outcome = outcome.kind(),
                    error = %cause,
                    "upstream attempt"
                );
            }
            DispatchOutcome::SemanticFailure { code, message } => {
                tracing::warn!(
                    %endpoint,
                    elapsed_ms,
                    outcome = outcome.kind(),
                    code,
                    %message,
                    "upstream attempt"
                );
            }
        }
        outcome
    }
}
