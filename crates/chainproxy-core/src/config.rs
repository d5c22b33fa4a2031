//! On-disk configuration: listen port, timeouts, logging and the
//! chain → network → providers table the registry is built from.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;

/// chain key → network key → ordered provider URLs.
pub type ChainsConfig = IndexMap<String, IndexMap<String, Vec<String>>>;

/// Log level per component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Global default level: "trace" | "debug" | "info" | "warn" | "error"
    #[serde(default = "default_level")]
    pub level: String,
    /// Override per component: component_name → level
    #[serde(default)]
    pub components: HashMap<String, String>,
    /// Emit JSON structured logs (true) or human-readable text (false)
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            components: HashMap::new(),
            json: false,
        }
    }
}

/// Top-level proxy configuration, usually read from `config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Deadline for a single attempt against a single provider.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Cap on providers tried per request. `None` tries every candidate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<usize>,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub chains: ChainsConfig,
}

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            max_attempts: None,
            log: LogConfig::default(),
            chains: ChainsConfig::new(),
        }
    }
}

impl ProxyConfig {
    /// Read, parse and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Parse and validate a configuration document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check structural invariants the registry relies on.
    ///
    /// Empty provider lists are accepted so the route stays known and is
    /// reported as misconfigured at request time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        if self.max_attempts == Some(0) {
            return Err(ConfigError::InvalidMaxAttempts);
        }

        for (chain, networks) in &self.chains {
            for (network, urls) in networks {
                for url in urls {
                    check_endpoint(url).map_err(|reason| ConfigError::InvalidEndpoint {
                        chain: chain.clone(),
                        network: network.clone(),
                        url: url.clone(),
                        reason,
                    })?;
                }
            }
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Serialize as pretty-printed JSON, the format `load` reads.
    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn check_endpoint(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("unsupported scheme '{other}'")),
    }
}
