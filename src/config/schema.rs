//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the auction gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Interface to bind. Empty means all interfaces.
    pub host: String,

    /// Port for the public auction API.
    pub port: u16,

    /// Port for the admin listener (version, metrics).
    pub admin_port: u16,

    /// Body returned by `GET /status`. Empty yields `204 No Content`.
    pub status_response: String,

    /// Maximum accepted request body, in bytes.
    pub max_request_size: usize,

    /// Bid cache location.
    pub cache: CacheConfig,

    /// Demand adapters keyed by bidder name.
    pub adapters: BTreeMap<String, AdapterConfig>,

    /// Shutdown behaviour.
    pub shutdown: ShutdownConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 8000,
            admin_port: 6060,
            status_response: String::new(),
            max_request_size: 1024 * 256,
            cache: CacheConfig::default(),
            adapters: BTreeMap::new(),
            shutdown: ShutdownConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Address of the public listener, e.g. `0.0.0.0:8000`.
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_host(), self.port)
    }

    /// Address of the admin listener.
    pub fn admin_address(&self) -> String {
        format!("{}:{}", self.bind_host(), self.admin_port)
    }

    fn bind_host(&self) -> &str {
        if self.host.is_empty() {
            "0.0.0.0"
        } else {
            &self.host
        }
    }
}

/// Bid cache location.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// `http` or `https`.
    pub scheme: String,

    /// Host and optional port, e.g. `cache.example.com:2424`.
    pub host: String,

    /// Query of the retrieval URL handed back for each stored value.
    /// `%PBS_CACHE_UUID%` is replaced by the cache key.
    pub query: String,
}

/// Placeholder in [`CacheConfig::query`] that stands for the cache key.
pub const CACHE_UUID_PLACEHOLDER: &str = "%PBS_CACHE_UUID%";

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            host: "localhost:2424".to_string(),
            query: format!("uuid={CACHE_UUID_PLACEHOLDER}"),
        }
    }
}

impl CacheConfig {
    /// Base URL handed to the cache client, `scheme://host`.
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }

    /// Where a client fetches the value stored under `uuid`.
    pub fn asset_url(&self, uuid: &str) -> String {
        format!(
            "{}/cache?{}",
            self.base_url(),
            self.query.replace(CACHE_UUID_PLACEHOLDER, uuid)
        )
    }
}

/// A single demand adapter.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Bid request endpoint.
    pub endpoint: String,

    /// Disabled adapters are skipped when the router is built.
    pub disabled: bool,
}

/// Shutdown behaviour.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// Upper bound on the router drain. Absent means wait until drained.
    pub drain_timeout_secs: Option<u64>,
}

impl ShutdownConfig {
    pub fn drain_timeout(&self) -> Option<Duration> {
        self.drain_timeout_secs.map(Duration::from_secs)
    }
}
