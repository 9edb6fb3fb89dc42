//! Auction API router.
//!
//! # Responsibilities
//! - Compile the adapter registry from configuration
//! - Expose the public endpoints as an axum `Router`
//! - Track in-flight requests and record per-request metrics
//! - Drain in-flight work on shutdown
//!
//! # Design Decisions
//! - Build fails as a whole: no partially constructed router escapes
//! - `shutdown` consumes the router, so it runs at most once
//! - The cache handle is held before the cache is initialized

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use thiserror::Error;
use tokio::task::JoinHandle;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::cache::{CacheClient, CacheError};
use crate::config::{CacheConfig, GatewayConfig};
use crate::http::request::assign_request_id;
use crate::observability::metrics::{MetricsEngine, UPKEEP_INTERVAL};
use crate::random::RandomSource;
use crate::routing::adapters::AdapterRegistry;
use crate::routing::drain::InFlight;

/// Error type for router construction.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("adapter {adapter} has an invalid endpoint: {source}")]
    InvalidEndpoint {
        adapter: String,
        #[source]
        source: url::ParseError,
    },

    #[error("adapter {adapter} uses unsupported scheme {scheme:?}")]
    UnsupportedScheme { adapter: String, scheme: String },
}

#[derive(Clone)]
struct RouterState {
    adapters: Arc<AdapterRegistry>,
    cache: CacheClient,
    cache_location: Arc<CacheConfig>,
    status_response: Arc<str>,
}

#[derive(Clone)]
struct Tracking {
    metrics: MetricsEngine,
    in_flight: InFlight,
}

/// The public request router plus the resources it owns.
pub struct AuctionRouter {
    app: Router,
    metrics: MetricsEngine,
    in_flight: InFlight,
    upkeep: JoinHandle<()>,
}

impl AuctionRouter {
    /// Build the router. Must be called from within a Tokio runtime.
    pub fn build(
        config: &GatewayConfig,
        rng: RandomSource,
        cache: CacheClient,
    ) -> Result<Self, RouterError> {
        let adapters = AdapterRegistry::from_config(&config.adapters)?;
        tracing::info!(adapters = adapters.len(), "Adapter registry compiled");

        let metrics = MetricsEngine::new();
        let in_flight = InFlight::new();

        let state = RouterState {
            adapters: Arc::new(adapters),
            cache,
            cache_location: Arc::new(config.cache.clone()),
            status_response: Arc::from(config.status_response.as_str()),
        };
        let tracking = Tracking {
            metrics: metrics.clone(),
            in_flight: in_flight.clone(),
        };

        let app = Router::new()
            .route("/status", get(status))
            .route("/info/bidders", get(list_bidders))
            .route("/info/bidders/{name}", get(bidder_details))
            .route("/cache", post(put_cache))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.max_request_size))
            .layer(middleware::from_fn_with_state(tracking, track_request))
            .layer(middleware::from_fn_with_state(rng, assign_request_id))
            .layer(TraceLayer::new_for_http());

        let upkeep = {
            let metrics = metrics.clone();
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(UPKEEP_INTERVAL);
                loop {
                    interval.tick().await;
                    metrics.run_upkeep();
                }
            })
        };

        Ok(Self {
            app,
            metrics,
            in_flight,
            upkeep,
        })
    }

    /// The request handler to serve.
    pub fn handler(&self) -> Router {
        self.app.clone()
    }

    pub fn metrics_engine(&self) -> MetricsEngine {
        self.metrics.clone()
    }

    /// Wait for in-flight requests to finish and stop background work.
    pub async fn shutdown(self) {
        let pending = self.in_flight.current();
        if pending > 0 {
            tracing::info!(pending, "Draining in-flight requests");
        }
        self.in_flight.drained().await;
        self.upkeep.abort();
        self.metrics.run_upkeep();
        tracing::info!("Router shut down");
    }
}

impl Drop for AuctionRouter {
    fn drop(&mut self) {
        self.upkeep.abort();
    }
}

async fn track_request(State(tracking): State<Tracking>, request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let started = Instant::now();

    let guard = tracking.in_flight.enter();
    tracking.metrics.set_in_flight(tracking.in_flight.current());

    let response = next.run(request).await;

    drop(guard);
    tracking.metrics.set_in_flight(tracking.in_flight.current());
    tracking
        .metrics
        .record_request(&method, response.status().as_u16(), started.elapsed());

    response
}

async fn status(State(state): State<RouterState>) -> Response {
    if state.status_response.is_empty() {
        StatusCode::NO_CONTENT.into_response()
    } else {
        state.status_response.to_string().into_response()
    }
}

async fn list_bidders(State(state): State<RouterState>) -> Json<Vec<String>> {
    Json(state.adapters.names().map(str::to_string).collect())
}

async fn bidder_details(State(state): State<RouterState>, Path(name): Path<String>) -> Response {
    match state.adapters.endpoint(&name) {
        Some(endpoint) => Json(json!({ "name": name, "endpoint": endpoint.as_str() })).into_response(),
        None => (StatusCode::NOT_FOUND, format!("Unknown bidder: {name}")).into_response(),
    }
}

async fn put_cache(State(state): State<RouterState>, Json(values): Json<Vec<Value>>) -> Response {
    match state.cache.put(&values).await {
        Ok(keys) => {
            let responses: Vec<Value> = keys
                .into_iter()
                .map(|uuid| {
                    let url = state.cache_location.asset_url(&uuid);
                    json!({ "uuid": uuid, "url": url })
                })
                .collect();
            Json(json!({ "responses": responses })).into_response()
        }
        Err(CacheError::NotInitialized) => {
            (StatusCode::SERVICE_UNAVAILABLE, "Cache unavailable").into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Cache put failed");
            (StatusCode::BAD_GATEWAY, "Cache request failed").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AdapterConfig;
    use axum::body::Body;
    use tower::ServiceExt;

    fn config() -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.adapters.insert(
            "appnexus".into(),
            AdapterConfig {
                endpoint: "http://ib.adnxs.com/openrtb2".into(),
                disabled: false,
            },
        );
        config.adapters.insert(
            "audienceNetwork".into(),
            AdapterConfig {
                endpoint: "https://an.facebook.com/placementbid.ortb".into(),
                disabled: false,
            },
        );
        config
    }

    fn build(config: &GatewayConfig) -> AuctionRouter {
        AuctionRouter::build(config, RandomSource::seeded(5), CacheClient::new()).unwrap()
    }

    async fn get_body(router: &AuctionRouter, uri: &str) -> (StatusCode, String) {
        let response = router
            .handler()
            .oneshot(axum::http::Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_build_rejects_bad_endpoint() {
        let mut config = config();
        config.adapters.get_mut("appnexus").unwrap().endpoint = "::".into();

        let result = AuctionRouter::build(&config, RandomSource::seeded(1), CacheClient::new());
        assert!(matches!(result, Err(RouterError::InvalidEndpoint { .. })));
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let router = build(&config());
        let (status, body) = get_body(&router, "/status").await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_empty());

        let mut config = config();
        config.status_response = "ok".into();
        let router = build(&config);
        assert_eq!(get_body(&router, "/status").await, (StatusCode::OK, "ok".to_string()));
    }

    #[tokio::test]
    async fn test_bidder_info() {
        let router = build(&config());

        let (status, body) = get_body(&router, "/info/bidders").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"["appnexus","audienceNetwork"]"#);

        let (status, body) = get_body(&router, "/info/bidders/appnexus").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("ib.adnxs.com"));

        let (status, _) = get_body(&router, "/info/bidders/nobody").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cache_put_without_cache() {
        let router = build(&config());
        let response = router
            .handler()
            .oneshot(
                axum::http::Request::post("/cache")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"[{"price": 1.5}]"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_requests_are_measured_and_tagged() {
        let router = build(&config());
        let response = router
            .handler()
            .oneshot(axum::http::Request::get("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.headers().contains_key("x-request-id"));

        let scrape = router.metrics_engine().render();
        assert!(scrape.contains("gateway_requests_total"));
        assert!(scrape.contains("status=\"204\""));
    }

    #[tokio::test]
    async fn test_body_limit() {
        let mut config = config();
        config.max_request_size = 8;
        let router = build(&config);

        let response = router
            .handler()
            .oneshot(
                axum::http::Request::post("/cache")
                    .header("content-type", "application/json")
                    .header("content-length", "32")
                    .body(Body::from(r#"[{"price": 1.5}, {"price": 2.5}]"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_shutdown_when_idle() {
        let router = build(&config());
        tokio::time::timeout(std::time::Duration::from_secs(1), router.shutdown())
            .await
            .expect("idle router should shut down promptly");
    }
}
