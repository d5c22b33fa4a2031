//! chainproxy-core: routing and failover engine for ChainProxy.
//!
//! # Overview
//!
//! ChainProxy exposes one stable JSON-RPC endpoint per chain/network pair and
//! forwards every request to one of several configured upstream providers,
//! failing over to the next provider when one is down, times out, or reports
//! that its node is unhealthy. The core crate defines:
//!
//! - [`ProviderRegistry`]: immutable `(chain, network)` → providers mapping
//! - [`OrderingStrategy`]: per-request permutation of the candidate list
//! - [`UpstreamDispatcher`]: one bounded attempt, classified as a [`DispatchOutcome`]
//! - [`FailoverController`]: the sequential retry loop producing a [`FailoverResult`]
//! - [`config`] module: the on-disk configuration the registry is built from
//! - [`ProxyError`]: the user-visible error kinds

pub mod config;
pub mod dispatch;
pub mod error;
pub mod failover;
pub mod ordering;
pub mod registry;
pub mod request;

pub use config::{LogConfig, ProxyConfig};
pub use dispatch::{DispatchOutcome, UpstreamDispatcher};
pub use error::{AttemptError, ConfigError, ProxyError, ResolveError, TransportError};
pub use failover::{Attempt, FailoverController, FailoverResult, NO_AVAILABLE_PROVIDERS};
pub use ordering::{ConfiguredOrdering, OrderingStrategy, RandomOrdering, SeededOrdering};
pub use registry::{ProviderEndpoint, ProviderRegistry, RouteKey};
pub use request::{JsonRpcError, RpcPayload, RETRYABLE_RPC_CODES};
