//! chainproxy-server: multi-chain JSON-RPC proxy with provider failover.
//!
//! Usage:
//! ```bash
//! chainproxy-server --config ./config.json
//! CHAINPROXY_CONFIG=/etc/chainproxy.json PORT=8545 chainproxy-server
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chainproxy_core::ProxyConfig;
use chainproxy_server::{build_router, telemetry, AppState};
use clap::Parser;
use tokio::{net::TcpListener, signal};
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(
    name = "chainproxy-server",
    about = "Multi-chain JSON-RPC proxy with provider failover",
    version
)]
struct Args {
    /// Path to the JSON configuration file
    #[arg(short, long, env = "CHAINPROXY_CONFIG", default_value = "config.json")]
    config: PathBuf,

    /// Listen port (overrides `port` in the config file)
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ProxyConfig::load(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;
    if let Some(port) = args.port {
        config.port = port;
        config.validate().context("invalid --port")?;
    }

    telemetry::init_tracing(&config.log).context("failed to initialise logging")?;

    let state = AppState::from_config(&config)?;
    for (route, providers) in state.registry.routes() {
        if providers == 0 {
            warn!(%route, "route has no providers configured");
        }
    }
    let chains: Vec<String> = state.registry.chains().map(str::to_string).collect();
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(address = %addr, "Multi-chain RPC proxy listening");
    info!(chains = %chains.join(", "), "Available chains");
    info!(
        timeout_ms = config.request_timeout_ms,
        max_attempts = ?config.max_attempts,
        "Failover settings"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received, draining in-flight requests");
}
