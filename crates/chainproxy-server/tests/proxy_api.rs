//! End-to-end tests of the HTTP surface with a recording stub dispatcher.
//!
//! The stub answers by call index, so assertions hold for any random
//! provider ordering.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chainproxy_core::{
    DispatchOutcome, FailoverController, ProviderEndpoint, ProviderRegistry, RandomOrdering,
    RpcPayload, TransportError, UpstreamDispatcher,
};
use chainproxy_server::{build_router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

// ─── Stub upstream ────────────────────────────────────────────────────────────

/// What the n-th contacted provider (0-based) replies.
enum Reply {
    Body(String),
    Down(String),
}

type Script = dyn Fn(usize, &ProviderEndpoint) -> Reply + Send + Sync;

struct StubUpstream {
    script: Box<Script>,
    calls: Mutex<Vec<(String, Vec<u8>)>>,
}

impl StubUpstream {
    fn new(script: impl Fn(usize, &ProviderEndpoint) -> Reply + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            script: Box::new(script),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn contacted(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(url, _)| url.clone()).collect()
    }

    fn bodies(&self) -> Vec<Vec<u8>> {
        self.calls.lock().unwrap().iter().map(|(_, b)| b.clone()).collect()
    }
}

#[async_trait]
impl UpstreamDispatcher for StubUpstream {
    async fn dispatch(&self, endpoint: &ProviderEndpoint, payload: &RpcPayload) -> DispatchOutcome {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((endpoint.to_string(), payload.as_bytes().to_vec()));
            calls.len() - 1
        };
        match (self.script)(index, endpoint) {
            Reply::Body(body) => DispatchOutcome::from_body(body.as_bytes()),
            Reply::Down(reason) => TransportError::Http(reason).into(),
        }
    }
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

const PROVIDERS: [&str; 3] = [
    "https://rpc-a.example",
    "https://rpc-b.example",
    "https://rpc-c.example",
];

fn registry() -> ProviderRegistry {
    ProviderRegistry::new()
        .with_route("ethereum", "mainnet", PROVIDERS)
        .with_route("ethereum", "sepolia", ["https://sepolia.example"])
        .with_route("base", "mainnet", ["https://base.example"])
        .with_route("mnt", "mainnet", Vec::<String>::new())
}

fn app(upstream: Arc<StubUpstream>) -> Router {
    let controller = FailoverController::new(upstream, Arc::new(RandomOrdering));
    build_router(AppState::new(registry(), controller))
}

fn result_body(result: &str) -> String {
    json!({ "jsonrpc": "2.0", "id": 1, "result": result }).to_string()
}

const BLOCK_NUMBER: &str = r#"{"jsonrpc":"2.0","method":"eth_blockNumber","params":[],"id":1}"#;

async fn post(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

// ─── Routing ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn success_contacts_exactly_one_provider() {
    let upstream = StubUpstream::new(|_, _| Reply::Body(result_body("0x123")));
    let (status, body) = post(app(upstream.clone()), "/ethereum/mainnet", BLOCK_NUMBER).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "jsonrpc": "2.0", "id": 1, "result": "0x123" }));
    let contacted = upstream.contacted();
    assert_eq!(contacted.len(), 1);
    assert!(PROVIDERS.contains(&contacted[0].as_str()));
}

#[tokio::test]
async fn body_is_forwarded_byte_for_byte() {
    let upstream = StubUpstream::new(|_, _| Reply::Body(result_body("0x1")));
    let raw = "{ \"jsonrpc\": \"2.0\",\n  \"method\": \"eth_chainId\", \"id\": \"abc\" }";
    let (status, _) = post(app(upstream.clone()), "/base/mainnet", raw).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(upstream.bodies(), vec![raw.as_bytes().to_vec()]);
    assert_eq!(upstream.contacted(), vec!["https://base.example"]);
}

#[tokio::test]
async fn unknown_chain_is_404() {
    let upstream = StubUpstream::new(|_, _| Reply::Body(result_body("0x1")));
    let (status, body) = post(app(upstream.clone()), "/invalid_chain/mainnet", BLOCK_NUMBER).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({ "error": "Chain 'invalid_chain' or network 'mainnet' not configured." })
    );
    assert!(upstream.contacted().is_empty());
}

#[tokio::test]
async fn unknown_network_is_404() {
    let upstream = StubUpstream::new(|_, _| Reply::Body(result_body("0x1")));
    let (status, body) = post(app(upstream.clone()), "/ethereum/bad_network", BLOCK_NUMBER).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["error"],
        "Chain 'ethereum' or network 'bad_network' not configured."
    );
    assert!(upstream.contacted().is_empty());
}

#[tokio::test]
async fn empty_provider_list_is_500() {
    let upstream = StubUpstream::new(|_, _| Reply::Body(result_body("0x1")));
    let (status, body) = post(app(upstream.clone()), "/mnt/mainnet", BLOCK_NUMBER).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "error": "No providers configured for this chain/network." })
    );
    assert!(upstream.contacted().is_empty());
}

#[tokio::test]
async fn invalid_json_is_400() {
    let upstream = StubUpstream::new(|_, _| Reply::Body(result_body("0x1")));
    let (status, body) = post(app(upstream.clone()), "/ethereum/mainnet", "{not json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid JSON body:"));
    assert!(upstream.contacted().is_empty());
}

#[tokio::test]
async fn empty_body_is_forwarded_as_empty_object() {
    let upstream = StubUpstream::new(|_, _| {
        Reply::Body(r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32600,"message":"invalid request"}}"#.into())
    });
    let (status, body) = post(app(upstream.clone()), "/base/mainnet", "").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"]["code"], -32600);
    assert_eq!(upstream.bodies(), vec![b"{}".to_vec()]);
}

// ─── Failover ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn transport_failure_fails_over_to_second_provider() {
    let upstream = StubUpstream::new(|n, _| match n {
        0 => Reply::Down("Network Error".into()),
        _ => Reply::Body(result_body("0x456")),
    });
    let (status, body) = post(app(upstream.clone()), "/ethereum/mainnet", BLOCK_NUMBER).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "0x456");
    let contacted = upstream.contacted();
    assert_eq!(contacted.len(), 2);
    assert_ne!(contacted[0], contacted[1]);
}

#[tokio::test]
async fn all_providers_down_is_502_with_last_error() {
    let upstream = StubUpstream::new(|_, endpoint| Reply::Down(format!("{endpoint} refused")));
    let (status, body) = post(app(upstream.clone()), "/ethereum/mainnet", BLOCK_NUMBER).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let contacted = upstream.contacted();
    assert_eq!(contacted.len(), PROVIDERS.len());

    let mut unique = contacted.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), PROVIDERS.len());

    let last = contacted.last().unwrap();
    assert_eq!(
        body,
        json!({
            "error": "All providers failed.",
            "details": format!("HTTP error: {last} refused"),
        })
    );
}

#[tokio::test]
async fn invalid_params_error_is_returned_verbatim_without_retry() {
    let error_body = r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32602,"message":"invalid params"}}"#;
    let upstream = StubUpstream::new(move |_, _| Reply::Body(error_body.to_string()));
    let (status, body) = post(app(upstream.clone()), "/ethereum/mainnet", BLOCK_NUMBER).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::from_str::<Value>(error_body).unwrap());
    assert_eq!(upstream.contacted().len(), 1);
}

#[tokio::test]
async fn internal_error_triggers_failover() {
    let upstream = StubUpstream::new(|n, _| match n {
        0 => Reply::Body(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32603,"message":"internal error"}}"#.into(),
        ),
        _ => Reply::Body(result_body("0x789")),
    });
    let (status, body) = post(app(upstream.clone()), "/ethereum/mainnet", BLOCK_NUMBER).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "0x789");
    assert_eq!(upstream.contacted().len(), 2);
}

#[tokio::test]
async fn semantic_failures_everywhere_report_rpc_message() {
    let upstream = StubUpstream::new(|_, _| {
        Reply::Body(r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32002,"message":"syncing"}}"#.into())
    });
    let (status, body) = post(app(upstream.clone()), "/ethereum/sepolia", BLOCK_NUMBER).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["details"], "RPC Error: syncing");
    assert_eq!(upstream.contacted().len(), 1);
}

// ─── Health ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_lists_configured_chains_without_upstream_calls() {
    let upstream = StubUpstream::new(|_, _| Reply::Down("unreachable".into()));
    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app(upstream.clone()), req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "status": "ok", "chains": ["ethereum", "base", "mnt"] })
    );
    assert!(upstream.contacted().is_empty());
}
