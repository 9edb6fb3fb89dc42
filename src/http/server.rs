//! HTTP server setup.
//!
//! # Responsibilities
//! - Bind the public and admin listeners
//! - Serve the wrapped request handler and the admin handler
//! - Expose the router's metrics engine at `/metrics` on the admin listener
//! - Stop both listeners when the shutdown signal fires

use std::net::SocketAddr;

use axum::{routing::get, Router};
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::GatewayConfig;
use crate::lifecycle::shutdown::ShutdownSignal;
use crate::observability::MetricsEngine;

/// Error type for serving.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Bound public and admin listeners, ready to serve.
pub struct HttpServer {
    listener: TcpListener,
    admin_listener: TcpListener,
}

impl HttpServer {
    /// Bind both listeners so address problems surface before serving starts.
    pub async fn bind(config: &GatewayConfig) -> Result<Self, ServeError> {
        let listener = bind(config.listen_address()).await?;
        let admin_listener = bind(config.admin_address()).await?;
        Ok(Self {
            listener,
            admin_listener,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn admin_addr(&self) -> std::io::Result<SocketAddr> {
        self.admin_listener.local_addr()
    }

    /// Serve until `shutdown` fires. Open connections are allowed to finish.
    pub async fn run(
        self,
        handler: Router,
        admin: Router,
        metrics: MetricsEngine,
        shutdown: ShutdownSignal,
    ) -> Result<(), ServeError> {
        let addr = self.local_addr()?;
        let admin_addr = self.admin_addr()?;
        tracing::info!(address = %addr, admin_address = %admin_addr, "HTTP server starting");

        let admin = admin.route("/metrics", get(move || async move { metrics.render() }));

        let public = axum::serve(
            self.listener,
            handler.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown.clone().wait());
        let admin = axum::serve(self.admin_listener, admin).with_graceful_shutdown(shutdown.wait());

        let (public, admin) = tokio::join!(async { public.await }, async { admin.await });

        if let Err(e) = &admin {
            tracing::error!(error = %e, "Admin listener failed");
        }
        public?;
        admin?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn bind(address: String) -> Result<TcpListener, ServeError> {
    match TcpListener::bind(&address).await {
        Ok(listener) => Ok(listener),
        Err(source) => Err(ServeError::Bind { address, source }),
    }
}
