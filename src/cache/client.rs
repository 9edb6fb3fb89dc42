//! Bid cache client.
//!
//! # Responsibilities
//! - Hold the cache base URL once initialized
//! - Store JSON values and return their cache keys
//!
//! # Design Decisions
//! - Initialization is best effort and never fails the caller
//! - Clones share one initialization slot, so a handle given out before
//!   `init` observes the endpoint afterwards

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use url::Url;

/// Errors from cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache client has not been initialized")]
    NotInitialized,

    #[error("cache request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("cache responded with {0}")]
    Status(StatusCode),

    #[error("cache returned {got} keys for {expected} values")]
    KeyCount { expected: usize, got: usize },
}

#[derive(Debug)]
struct Endpoint {
    base: Url,
    cache: Url,
}

#[derive(Serialize)]
struct PutRequest<'a> {
    puts: Vec<PutObject<'a>>,
}

#[derive(Serialize)]
struct PutObject<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    value: &'a Value,
}

#[derive(Deserialize)]
struct PutResponse {
    responses: Vec<PutKey>,
}

#[derive(Deserialize)]
struct PutKey {
    uuid: String,
}

/// Client for the external bid cache.
#[derive(Clone, Default)]
pub struct CacheClient {
    endpoint: Arc<ArcSwapOption<Endpoint>>,
    http: reqwest::Client,
}

impl CacheClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the client at `base_url`. An unusable URL is logged and leaves
    /// the client uninitialized.
    pub fn init(&self, base_url: &str) {
        let parsed = Url::parse(base_url).and_then(|base| {
            let cache = base.join("cache")?;
            Ok(Endpoint { base, cache })
        });

        match parsed {
            Ok(endpoint) => {
                tracing::info!(base_url = %endpoint.base, "Cache client initialized");
                self.endpoint.store(Some(Arc::new(endpoint)));
            }
            Err(e) => {
                tracing::warn!(base_url, error = %e, "Cache base URL unusable, caching disabled");
            }
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.endpoint.load().is_some()
    }

    /// Store `values` and return one cache key per value, in order.
    pub async fn put(&self, values: &[Value]) -> Result<Vec<String>, CacheError> {
        let endpoint = self.endpoint.load_full().ok_or(CacheError::NotInitialized)?;
        if values.is_empty() {
            return Ok(Vec::new());
        }

        let body = PutRequest {
            puts: values
                .iter()
                .map(|value| PutObject { kind: "json", value })
                .collect(),
        };

        let response = self
            .http
            .post(endpoint.cache.clone())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CacheError::Status(status));
        }

        let parsed: PutResponse = response.json().await?;
        if parsed.responses.len() != values.len() {
            return Err(CacheError::KeyCount {
                expected: values.len(),
                got: parsed.responses.len(),
            });
        }

        tracing::debug!(count = values.len(), "Stored values in cache");
        Ok(parsed.responses.into_iter().map(|k| k.uuid).collect())
    }
}

impl std::fmt::Debug for CacheClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheClient")
            .field("endpoint", &self.endpoint.load_full().map(|e| e.base.as_str().to_owned()))
            .finish()
    }
}
