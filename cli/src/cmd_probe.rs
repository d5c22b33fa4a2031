//! `chainproxy probe`: one dispatch against one endpoint, classified the way
//! the proxy would classify it during failover.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chainproxy_core::{DispatchOutcome, ProviderEndpoint, RpcPayload, UpstreamDispatcher};
use chainproxy_http::{HttpDispatcher, HttpDispatcherConfig};
use serde_json::Value;

pub async fn run(url: &str, method: &str, params: &str, timeout_ms: u64) -> Result<()> {
    let params = parse_params(params)?;
    let dispatcher = HttpDispatcher::new(HttpDispatcherConfig {
        request_timeout: Duration::from_millis(timeout_ms),
    })?;

    println!("Probing {url} ({method})...");

    let start = Instant::now();
    let outcome = dispatcher
        .dispatch(&ProviderEndpoint::new(url), &RpcPayload::call(1, method, params))
        .await;
    let latency = start.elapsed();

    println!("  Outcome:  {}", outcome.kind());
    println!("  Latency:  {}ms", latency.as_millis());
    match outcome {
        DispatchOutcome::Success { payload } => {
            println!("  Failover: no (response is served as-is)");
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        DispatchOutcome::TransportFailure { cause } => {
            println!("  Failover: yes");
            println!("  Error:    {cause}");
        }
        DispatchOutcome::SemanticFailure { code, message } => {
            println!("  Failover: yes (retry-worthy RPC error)");
            println!("  Error:    {code} {message}");
        }
    }
    Ok(())
}

fn parse_params(raw: &str) -> Result<Vec<Value>> {
    serde_json::from_str(raw).context("--params must be a JSON array")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn params_parse_as_array() {
        assert_eq!(
            parse_params(r#"["0xabc", "latest"]"#).unwrap(),
            vec![json!("0xabc"), json!("latest")]
        );
        assert!(parse_params("[]").unwrap().is_empty());
    }

    #[test]
    fn non_array_params_are_rejected() {
        assert!(parse_params(r#"{"a": 1}"#).is_err());
        assert!(parse_params("latest").is_err());
    }
}
