//! `chainproxy routes`: validate a config file and list its routes.

use std::path::Path;

use anyhow::{Context, Result};
use chainproxy_core::{ProviderRegistry, ProxyConfig};

pub fn run(path: &Path) -> Result<()> {
    let config =
        ProxyConfig::load(path).with_context(|| format!("failed to load {}", path.display()))?;
    let registry = ProviderRegistry::from_config(&config);

    println!("{} (port {})", path.display(), config.port);
    println!(
        "  timeout {}ms, max attempts {}",
        config.request_timeout_ms,
        config.max_attempts.map_or("unbounded".to_string(), |n| n.to_string())
    );
    println!();
    for (route, providers) in registry.routes() {
        let note = if providers == 0 { "  <- no providers, requests get 500" } else { "" };
        println!("  POST /{:<24} {providers} provider(s){note}", route.to_string());
    }
    println!();
    println!("  {} chain(s)", registry.len());
    Ok(())
}
