//! Route table and the shared state every handler reads.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use chainproxy_core::{
    FailoverController, ProviderRegistry, ProxyConfig, RandomOrdering, UpstreamDispatcher,
};
use chainproxy_http::{HttpDispatcher, HttpDispatcherConfig, HttpDispatcherError};
use tower_http::trace::TraceLayer;

use crate::handlers;

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ProviderRegistry>,
    pub controller: Arc<FailoverController>,
}

impl AppState {
    pub fn new(registry: ProviderRegistry, controller: FailoverController) -> Self {
        Self {
            registry: Arc::new(registry),
            controller: Arc::new(controller),
        }
    }

    /// Production wiring: HTTP dispatcher, random ordering, configured limits.
    pub fn from_config(config: &ProxyConfig) -> Result<Self, HttpDispatcherError> {
        let dispatcher: Arc<dyn UpstreamDispatcher> =
            Arc::new(HttpDispatcher::new(HttpDispatcherConfig {
                request_timeout: config.request_timeout(),
            })?);
        let controller = FailoverController::new(dispatcher, Arc::new(RandomOrdering))
            .with_max_attempts(config.max_attempts);
        Ok(Self::new(ProviderRegistry::from_config(config), controller))
    }
}

/// `GET /health` and `POST /{chain}/{network}`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/:chain/:network", post(handlers::proxy))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
