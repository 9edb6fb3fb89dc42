//! Serve orchestration.
//!
//! # Sequence
//! ```text
//! build router ──✗──▶ return RouterError (nothing else runs)
//!     │
//!     ▼
//! init cache client (best effort)
//!     │
//!     ▼
//! wrap handler: CORS → no-cache
//!     │
//!     ▼
//! listen(config, handler, admin(revision), metrics)   blocks until shutdown
//!     │  (errors logged, never returned)
//!     ▼
//! router shutdown / drain, exactly once
//! ```

use std::future::Future;

use axum::Router;

use crate::admin::admin_router;
use crate::cache::CacheClient;
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::http::middleware::wrap_handler;
use crate::http::server::{HttpServer, ServeError};
use crate::lifecycle::shutdown::ShutdownSignal;
use crate::observability::MetricsEngine;
use crate::random::RandomSource;
use crate::revision::Revision;
use crate::routing::{AuctionRouter, RouterError};

/// A router as seen by the orchestrator.
pub trait GatewayRouter: Send {
    fn handler(&self) -> Router;

    fn metrics_engine(&self) -> MetricsEngine;

    /// Drain and release. Consumes the router.
    fn shutdown(self) -> impl Future<Output = ()> + Send;
}

impl GatewayRouter for AuctionRouter {
    fn handler(&self) -> Router {
        AuctionRouter::handler(self)
    }

    fn metrics_engine(&self) -> MetricsEngine {
        AuctionRouter::metrics_engine(self)
    }

    fn shutdown(self) -> impl Future<Output = ()> + Send {
        AuctionRouter::shutdown(self)
    }
}

/// The collaborators one serve cycle is assembled from.
pub trait Components: Send + Sync {
    type Router: GatewayRouter;

    fn build_router(&self, config: &GatewayConfig) -> Result<Self::Router, RouterError>;

    fn init_cache(&self, base_url: &str);

    /// Serve until `shutdown` fires or the listener fails.
    fn listen(
        &self,
        config: &GatewayConfig,
        handler: Router,
        admin: Router,
        metrics: MetricsEngine,
        shutdown: ShutdownSignal,
    ) -> impl Future<Output = Result<(), ServeError>> + Send;
}

/// Production collaborators.
#[derive(Debug, Clone)]
pub struct GatewayComponents {
    rng: RandomSource,
    cache: CacheClient,
}

impl GatewayComponents {
    pub fn new(rng: RandomSource) -> Self {
        Self {
            rng,
            cache: CacheClient::new(),
        }
    }
}

impl Components for GatewayComponents {
    type Router = AuctionRouter;

    fn build_router(&self, config: &GatewayConfig) -> Result<AuctionRouter, RouterError> {
        AuctionRouter::build(config, self.rng.clone(), self.cache.clone())
    }

    fn init_cache(&self, base_url: &str) {
        self.cache.init(base_url);
    }

    async fn listen(
        &self,
        config: &GatewayConfig,
        handler: Router,
        admin: Router,
        metrics: MetricsEngine,
        shutdown: ShutdownSignal,
    ) -> Result<(), ServeError> {
        HttpServer::bind(config)
            .await?
            .run(handler, admin, metrics, shutdown)
            .await
    }
}

/// Runs one serve cycle per call.
pub struct ServeOrchestrator<C> {
    components: C,
    revision: Revision,
}

impl<C: Components> ServeOrchestrator<C> {
    pub fn new(components: C, revision: Revision) -> Self {
        Self {
            components,
            revision,
        }
    }

    pub fn revision(&self) -> &Revision {
        &self.revision
    }

    /// Build, serve until `shutdown`, then drain. Only router construction
    /// failures are returned.
    pub async fn run(
        &self,
        config: &GatewayConfig,
        shutdown: ShutdownSignal,
    ) -> Result<(), GatewayError> {
        let router = self.components.build_router(config)?;

        self.components.init_cache(&config.cache.base_url());

        let handler = wrap_handler(router.handler());
        let admin = admin_router(&self.revision);

        tracing::info!(revision = %self.revision, "Serving");
        if let Err(e) = self
            .components
            .listen(config, handler, admin, router.metrics_engine(), shutdown)
            .await
        {
            tracing::error!(error = %e, "Listener stopped with error");
        }

        match config.shutdown.drain_timeout() {
            Some(limit) => {
                if tokio::time::timeout(limit, router.shutdown()).await.is_err() {
                    tracing::warn!(timeout = ?limit, "Router drain timed out");
                }
            }
            None => router.shutdown().await,
        }

        Ok(())
    }
}
