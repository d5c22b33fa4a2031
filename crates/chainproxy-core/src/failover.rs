//! Sequential failover across a route's providers.
//!
//! ```text
//! Pending ──Success──────────────▶ Succeeded
//!    │
//!    └─Transport/Semantic failure─▶ next candidate, or Exhausted when none remain
//! ```
//!
//! Candidates are tried strictly one after another in the order produced by
//! the [`OrderingStrategy`]. The first success wins; each endpoint is tried at
//! most once per request.

use std::sync::Arc;

use serde_json::Value;

use crate::dispatch::UpstreamDispatcher;
use crate::error::{AttemptError, ProxyError};
use crate::ordering::OrderingStrategy;
use crate::registry::{ProviderEndpoint, ProviderRegistry, RouteKey};
use crate::request::RpcPayload;

/// Reported when a request reached exhaustion without a single attempt.
pub const NO_AVAILABLE_PROVIDERS: &str = "No available providers";

/// One failed attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt {
    pub endpoint: ProviderEndpoint,
    pub error: AttemptError,
}

/// Terminal state of one request.
#[derive(Debug, Clone, PartialEq)]
pub enum FailoverResult {
    Succeeded {
        payload: Value,
        /// Provider that served the response.
        provider: ProviderEndpoint,
        /// Attempts made, including the successful one.
        attempts: usize,
    },
    Exhausted {
        /// Failed attempts in the order they were made.
        failures: Vec<Attempt>,
    },
}

impl FailoverResult {
    /// The error reported to the caller: the last one observed.
    pub fn last_error(&self) -> Option<&AttemptError> {
        match self {
            Self::Succeeded { .. } => None,
            Self::Exhausted { failures } => failures.last().map(|a| &a.error),
        }
    }

    /// Number of providers contacted.
    pub fn attempts(&self) -> usize {
        match self {
            Self::Succeeded { attempts, .. } => *attempts,
            Self::Exhausted { failures } => failures.len(),
        }
    }

    /// Map exhaustion to [`ProxyError::AllProvidersFailed`].
    pub fn into_result(self) -> Result<(Value, ProviderEndpoint), ProxyError> {
        match self {
            Self::Succeeded {
                payload, provider, ..
            } => Ok((payload, provider)),
            Self::Exhausted { failures } => {
                let details = failures
                    .last()
                    .map(|a| a.error.to_string())
                    .unwrap_or_else(|| NO_AVAILABLE_PROVIDERS.to_string());
                Err(ProxyError::AllProvidersFailed { details })
            }
        }
    }
}

/// Drives the dispatcher across a permuted candidate list.
pub struct FailoverController {
    dispatcher: Arc<dyn UpstreamDispatcher>,
    ordering: Arc<dyn OrderingStrategy>,
    max_attempts: Option<usize>,
}

impl FailoverController {
    pub fn new(
        dispatcher: Arc<dyn UpstreamDispatcher>,
        ordering: Arc<dyn OrderingStrategy>,
    ) -> Self {
        Self {
            dispatcher,
            ordering,
            max_attempts: None,
        }
    }

    /// Stop after `max` providers. `None` tries every candidate.
    pub fn with_max_attempts(mut self, max: Option<usize>) -> Self {
        self.max_attempts = max;
        self
    }

    /// Resolve `key`, then run failover over its providers.
    pub async fn forward(
        &self,
        registry: &ProviderRegistry,
        key: &RouteKey,
        payload: &RpcPayload,
    ) -> Result<FailoverResult, ProxyError> {
        let providers = registry.resolve(key)?;
        Ok(self.execute(providers, payload).await)
    }

    /// Try `providers` in a fresh order until one succeeds or all have failed.
    pub async fn execute(&self, providers: &[ProviderEndpoint], payload: &RpcPayload) -> FailoverResult {
        let candidates = self.ordering.order(providers);
        let limit = self.max_attempts.unwrap_or(candidates.len());
        let total = candidates.len().min(limit);

        let mut failures = Vec::new();
        for (index, endpoint) in candidates.into_iter().take(limit).enumerate() {
            let attempt = index + 1;
            match self.dispatcher.dispatch(&endpoint, payload).await.into_result() {
                Ok(body) => {
                    tracing::debug!(%endpoint, attempt, "request served");
                    return FailoverResult::Succeeded {
                        payload: body,
                        provider: endpoint,
                        attempts: attempt,
                    };
                }
                Err(error) => {
                    tracing::warn!(
                        %endpoint,
                        attempt,
                        remaining = total - attempt,
                        kind = error.kind(),
                        error = %error,
                        "provider failed, failing over"
                    );
                    failures.push(Attempt { endpoint, error });
                }
            }
        }

        if failures.is_empty() {
            tracing::error!("no candidate providers to try");
        } else {
            tracing::error!(attempts = failures.len(), "all providers failed");
        }
        FailoverResult::Exhausted { failures }
    }
}
