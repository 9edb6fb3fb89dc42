//! Adapter registry.
//!
//! # Responsibilities
//! - Compile enabled adapters into a name → endpoint map
//! - Reject endpoints that are not absolute http(s) URLs
//!
//! # Design Decisions
//! - Immutable after construction (shared via Arc, no locks)
//! - BTreeMap keeps listing order deterministic

use std::collections::BTreeMap;

use url::Url;

use crate::config::AdapterConfig;
use crate::routing::router::RouterError;

/// Enabled demand adapters and their bid endpoints.
#[derive(Debug, Clone, Default)]
pub struct AdapterRegistry {
    endpoints: BTreeMap<String, Url>,
}

impl AdapterRegistry {
    pub fn from_config(adapters: &BTreeMap<String, AdapterConfig>) -> Result<Self, RouterError> {
        let mut endpoints = BTreeMap::new();

        for (name, adapter) in adapters {
            if adapter.disabled {
                tracing::debug!(adapter = %name, "Adapter disabled, skipping");
                continue;
            }

            let url = Url::parse(&adapter.endpoint).map_err(|source| {
                RouterError::InvalidEndpoint {
                    adapter: name.clone(),
                    source,
                }
            })?;

            if !matches!(url.scheme(), "http" | "https") {
                return Err(RouterError::UnsupportedScheme {
                    adapter: name.clone(),
                    scheme: url.scheme().to_string(),
                });
            }

            endpoints.insert(name.clone(), url);
        }

        Ok(Self { endpoints })
    }

    /// Enabled adapter names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.endpoints.keys().map(String::as_str)
    }

    pub fn endpoint(&self, name: &str) -> Option<&Url> {
        self.endpoints.get(name)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
