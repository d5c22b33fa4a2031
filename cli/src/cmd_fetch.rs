//! `chainproxy fetch-rpcs`: rebuild the provider table from chain metadata.
//!
//! Standard chains are looked up by chain id in the metadata list and keep
//! their first few public HTTPS endpoints. Manual chains, missing from the
//! public list, are always added with a fixed endpoint set.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chainproxy_core::ProxyConfig;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

pub const DEFAULT_SOURCE: &str = "https://chainid.network/chains.json";
pub const DEFAULT_LIMIT: usize = 5;

/// Every generated route is registered under this network key.
const NETWORK: &str = "mainnet";

/// proxy chain key → EVM chain id.
pub const STANDARD_CHAINS: &[(&str, u64)] = &[
    ("eth", 1),
    ("bnb", 56),
    ("arb", 42161),
    ("mnt", 5000),
    ("avax", 43114),
    ("base", 8453),
];

pub struct ManualChain {
    pub key: &'static str,
    pub name: &'static str,
    pub chain_id: u64,
    pub rpcs: &'static [&'static str],
}

pub const MANUAL_CHAINS: &[ManualChain] = &[
    ManualChain {
        key: "mon",
        name: "Monad Mainnet",
        chain_id: 143,
        rpcs: &[
            "https://rpc.monad.xyz",
            "https://monad-mainnet.drpc.org",
            "https://rpc-mainnet.monadinfra.com",
        ],
    },
    ManualChain {
        key: "hype",
        name: "Hyperliquid EVM Mainnet",
        chain_id: 999,
        rpcs: &[
            "https://rpc.hyperliquid.xyz/evm",
            "https://hyperliquid.drpc.org",
            "https://rpc.hypurrscan.io",
        ],
    },
];

/// One entry of the chain metadata list. `rpc` items are either plain URL
/// strings or `{ "url": ... }` objects depending on the source.
#[derive(Debug, Deserialize)]
pub struct ChainMetadata {
    #[serde(rename = "chainId")]
    pub chain_id: u64,
    #[serde(default)]
    pub rpc: Vec<Value>,
}

#[derive(Debug)]
pub struct FetchOptions {
    pub output: PathBuf,
    pub source: String,
    pub limit: usize,
    pub dry_run: bool,
}

#[derive(Debug)]
pub struct FetchReport {
    pub config: ProxyConfig,
    /// Standard chains whose id was not in the metadata.
    pub missing: Vec<(&'static str, u64)>,
}

pub async fn run(opts: FetchOptions) -> Result<()> {
    println!("Fetching chains from {} ...", opts.source);
    let chains = fetch_chains(&opts.source).await?;
    println!("  {} chains in metadata", chains.len());

    let report = build_config(&chains, opts.limit);
    for (key, id) in &report.missing {
        eprintln!("  warning: chain {key} (id {id}) not found, skipped");
    }
    for (key, networks) in &report.config.chains {
        let count: usize = networks.values().map(Vec::len).sum();
        match MANUAL_CHAINS.iter().find(|m| m.key == key.as_str()) {
            Some(m) => println!("  {key:<6} {count} RPCs (manual: {}, id {})", m.name, m.chain_id),
            None => println!("  {key:<6} {count} RPCs"),
        }
    }

    let json = report.config.to_json_pretty()?;
    if opts.dry_run {
        println!("{json}");
    } else {
        std::fs::write(&opts.output, json + "\n")
            .with_context(|| format!("writing {}", opts.output.display()))?;
        println!("Wrote {}", opts.output.display());
    }
    Ok(())
}

async fn fetch_chains(source: &str) -> Result<Vec<ChainMetadata>> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;
    let resp = client
        .get(source)
        .send()
        .await
        .with_context(|| format!("fetching {source}"))?;

    if !resp.status().is_success() {
        bail!("fetching {source}: HTTP {}", resp.status());
    }
    resp.json::<Vec<ChainMetadata>>()
        .await
        .context("decoding chain metadata")
}

/// Build a config (port 3000) from metadata. Pure; performs no I/O.
pub fn build_config(chains: &[ChainMetadata], limit: usize) -> FetchReport {
    let mut config = ProxyConfig::default();
    let mut missing = Vec::new();

    for &(key, id) in STANDARD_CHAINS {
        match chains.iter().find(|c| c.chain_id == id) {
            Some(chain) => {
                let rpcs = usable_rpcs(&chain.rpc, limit);
                config
                    .chains
                    .insert(key.to_string(), IndexMap::from([(NETWORK.to_string(), rpcs)]));
            }
            None => missing.push((key, id)),
        }
    }

    for manual in MANUAL_CHAINS {
        let rpcs = manual.rpcs.iter().map(|u| u.to_string()).collect();
        config
            .chains
            .insert(manual.key.to_string(), IndexMap::from([(NETWORK.to_string(), rpcs)]));
    }

    FetchReport { config, missing }
}

/// Keep HTTPS endpoints that need no API key, in source order, up to `limit`.
pub fn usable_rpcs(rpc: &[Value], limit: usize) -> Vec<String> {
    rpc.iter()
        .filter_map(rpc_url)
        .filter(|url| url.starts_with("https://"))
        .filter(|url| !url.contains("${"))
        .filter(|url| Url::parse(url).is_ok())
        .take(limit)
        .map(str::to_string)
        .collect()
}

fn rpc_url(entry: &Value) -> Option<&str> {
    match entry {
        Value::String(url) => Some(url.as_str()),
        Value::Object(obj) => obj.get("url").and_then(Value::as_str),
        _ => None,
    }
}
