//! chainproxy CLI: operator tooling for ChainProxy.
//!
//! Usage:
//! ```bash
//! # Regenerate config.json from public chain metadata
//! chainproxy fetch-rpcs --output config.json
//!
//! # Show the routes a config file defines
//! chainproxy routes --config config.json
//!
//! # Send one request to an endpoint and show how the proxy would classify it
//! chainproxy probe --url https://rpc.monad.xyz --method eth_blockNumber
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd_fetch;
mod cmd_probe;
mod cmd_routes;

#[derive(Parser)]
#[command(
    name = "chainproxy",
    about = "ChainProxy operator CLI: provider configs and endpoint probes",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Regenerate the provider config from chain metadata
    #[command(name = "fetch-rpcs")]
    FetchRpcs {
        /// Output file
        #[arg(short, long, default_value = "config.json")]
        output: PathBuf,
        /// Chain metadata source (JSON array of chains)
        #[arg(long, default_value = cmd_fetch::DEFAULT_SOURCE)]
        source: String,
        /// Maximum providers kept per chain
        #[arg(long, default_value_t = cmd_fetch::DEFAULT_LIMIT)]
        limit: usize,
        /// Print the config instead of writing it
        #[arg(long)]
        dry_run: bool,
    },

    /// List the routes defined by a config file
    Routes {
        /// Path to the JSON configuration file
        #[arg(short, long, env = "CHAINPROXY_CONFIG", default_value = "config.json")]
        config: PathBuf,
    },

    /// Send one JSON-RPC call to an endpoint and classify the outcome
    Probe {
        /// RPC endpoint URL
        #[arg(long)]
        url: String,
        /// JSON-RPC method
        #[arg(long, default_value = "eth_blockNumber")]
        method: String,
        /// JSON array of params, e.g. '["0xabc", "latest"]'
        #[arg(long, default_value = "[]")]
        params: String,
        /// Per-attempt timeout in milliseconds
        #[arg(long, default_value_t = chainproxy_core::config::DEFAULT_REQUEST_TIMEOUT_MS)]
        timeout_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::FetchRpcs {
            output,
            source,
            limit,
            dry_run,
        } => {
            cmd_fetch::run(cmd_fetch::FetchOptions {
                output,
                source,
                limit,
                dry_run,
            })
            .await
        }
        Commands::Routes { config } => cmd_routes::run(&config),
        Commands::Probe {
            url,
            method,
            params,
            timeout_ms,
        } => cmd_probe::run(&url, &method, &params, timeout_ms).await,
    }
}
