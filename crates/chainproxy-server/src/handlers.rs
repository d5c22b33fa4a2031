//! Request handlers and the [`ProxyError`] → HTTP status mapping.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chainproxy_core::{ProxyError, RouteKey, RpcPayload};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use crate::router::AppState;

/// A [`ProxyError`] rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub ProxyError);

impl From<ProxyError> for ApiError {
    fn from(err: ProxyError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            ProxyError::InvalidPayload { .. } => StatusCode::BAD_REQUEST,
            ProxyError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            ProxyError::NoProvidersConfigured { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::AllProvidersFailed { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self.0 {
            ProxyError::AllProvidersFailed { details } => json!({
                "error": self.0.to_string(),
                "details": details,
            }),
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub chains: Vec<String>,
}

/// Reports the configured chains. Never touches a provider.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        chains: state.registry.chains().map(str::to_string).collect(),
    })
}

/// Forwards the body to the route's providers with failover.
pub async fn proxy(
    State(state): State<AppState>,
    Path((chain, network)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let payload = RpcPayload::from_bytes(body)?;
    let key = RouteKey::new(chain, network);

    let result = state
        .controller
        .forward(&state.registry, &key, &payload)
        .await?;
    let attempts = result.attempts();
    let (response, provider) = result.into_result()?;

    info!(route = %key, %provider, attempts, "request proxied");
    Ok(Json(response))
}
