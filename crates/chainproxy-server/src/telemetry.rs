//! Tracing / logging initialisation.

use chainproxy_core::LogConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter directive string, e.g. `"info,chainproxy_http=debug"`.
///
/// Component overrides are emitted in name order.
pub fn directives(config: &LogConfig) -> String {
    let mut components: Vec<_> = config.components.iter().collect();
    components.sort();

    let mut directives = config.level.clone();
    for (component, level) in components {
        directives.push_str(&format!(",{}={}", component.replace('-', "_"), level));
    }
    directives
}

/// Install the global subscriber. Call once at startup.
///
/// `RUST_LOG`, when set and valid, takes precedence over the configured levels.
pub fn init_tracing(config: &LogConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directives(config)))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    if config.json {
        registry.with(fmt::layer().json()).try_init()?;
    } else {
        registry.with(fmt::layer()).try_init()?;
    }
    Ok(())
}
