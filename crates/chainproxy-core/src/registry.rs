//! Immutable `(chain, network)` → provider list mapping.
//!
//! Built once at startup and shared read-only by every request; no locking.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::config::ProxyConfig;
use crate::error::ResolveError;

/// One upstream JSON-RPC HTTP endpoint. Identity is the URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProviderEndpoint(Arc<str>);

impl ProviderEndpoint {
    pub fn new(url: impl AsRef<str>) -> Self {
        Self(Arc::from(url.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProviderEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProviderEndpoint {
    fn from(url: &str) -> Self {
        Self::new(url)
    }
}

/// Case-sensitive routing key taken from the request path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    pub chain: String,
    pub network: String,
}

impl RouteKey {
    pub fn new(chain: impl Into<String>, network: impl Into<String>) -> Self {
        Self {
            chain: chain.into(),
            network: network.into(),
        }
    }
}

impl std::fmt::Display for RouteKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.chain, self.network)
    }
}

/// Read-only provider registry, in configuration order.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    chains: IndexMap<String, IndexMap<String, Vec<ProviderEndpoint>>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an already validated configuration. A URL listed twice
    /// for one route becomes a single endpoint.
    pub fn from_config(config: &ProxyConfig) -> Self {
        let chains = config
            .chains
            .iter()
            .map(|(chain, networks)| {
                let networks = networks
                    .iter()
                    .map(|(network, urls)| (network.clone(), unique_endpoints(urls)))
                    .collect();
                (chain.clone(), networks)
            })
            .collect();
        Self { chains }
    }

    /// Register (or replace) a route. Intended for construction only.
    ///
    /// Repeated URLs are kept once, at their first position.
    pub fn with_route<I, S>(mut self, chain: &str, network: &str, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let endpoints = unique_endpoints(urls);
        self.chains
            .entry(chain.to_string())
            .or_default()
            .insert(network.to_string(), endpoints);
        self
    }

    /// Look up the candidate providers for a route.
    ///
    /// Never blocks and performs no I/O.
    pub fn resolve(&self, key: &RouteKey) -> Result<&[ProviderEndpoint], ResolveError> {
        let providers = self
            .chains
            .get(&key.chain)
            .and_then(|networks| networks.get(&key.network))
            .ok_or_else(|| ResolveError::RouteNotFound {
                chain: key.chain.clone(),
                network: key.network.clone(),
            })?;

        if providers.is_empty() {
            return Err(ResolveError::NoProvidersConfigured {
                chain: key.chain.clone(),
                network: key.network.clone(),
            });
        }
        Ok(providers)
    }

    /// Configured chain keys, in configuration order.
    pub fn chains(&self) -> impl Iterator<Item = &str> {
        self.chains.keys().map(String::as_str)
    }

    /// Every configured route with its provider count.
    pub fn routes(&self) -> impl Iterator<Item = (RouteKey, usize)> + '_ {
        self.chains.iter().flat_map(|(chain, networks)| {
            networks
                .iter()
                .map(move |(network, providers)| (RouteKey::new(chain, network), providers.len()))
        })
    }

    /// Number of configured chains.
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

/// Endpoint identity is the URL, so each one is tried at most once per request.
fn unique_endpoints<I, S>(urls: I) -> Vec<ProviderEndpoint>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    urls.into_iter()
        .map(ProviderEndpoint::new)
        .filter(|endpoint| seen.insert(endpoint.clone()))
        .collect()
}
