//! Recording fakes for the serve-cycle collaborators.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;

use crate::config::GatewayConfig;
use crate::http::server::ServeError;
use crate::lifecycle::serve::{Components, GatewayRouter};
use crate::lifecycle::shutdown::ShutdownSignal;
use crate::observability::MetricsEngine;
use crate::routing::RouterError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Build,
    InitCache(String),
    Listen,
    RouterShutdown,
}

#[derive(Clone, Copy)]
pub(crate) enum ListenOutcome {
    UntilShutdown,
    Fail,
}

/// Shared, ordered log of collaborator calls.
#[derive(Clone, Default)]
pub(crate) struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub(crate) fn snapshot(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }
}

pub(crate) struct Recorder {
    pub(crate) log: CallLog,
    pub(crate) fail_build: bool,
    pub(crate) listen: ListenOutcome,
    pub(crate) drain_for: Duration,
}

impl Recorder {
    pub(crate) fn new() -> Self {
        Self {
            log: CallLog::default(),
            fail_build: false,
            listen: ListenOutcome::UntilShutdown,
            drain_for: Duration::ZERO,
        }
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.log.snapshot()
    }
}

pub(crate) struct FakeRouter {
    log: CallLog,
    drain_for: Duration,
}

impl GatewayRouter for FakeRouter {
    fn handler(&self) -> Router {
        Router::new()
    }

    fn metrics_engine(&self) -> MetricsEngine {
        MetricsEngine::new()
    }

    async fn shutdown(self) {
        tokio::time::sleep(self.drain_for).await;
        self.log.push(Call::RouterShutdown);
    }
}

impl Components for Recorder {
    type Router = FakeRouter;

    fn build_router(&self, _config: &GatewayConfig) -> Result<FakeRouter, RouterError> {
        self.log.push(Call::Build);
        if self.fail_build {
            return Err(RouterError::UnsupportedScheme {
                adapter: "broken".into(),
                scheme: "ftp".into(),
            });
        }
        Ok(FakeRouter {
            log: self.log.clone(),
            drain_for: self.drain_for,
        })
    }

    fn init_cache(&self, base_url: &str) {
        self.log.push(Call::InitCache(base_url.to_string()));
    }

    async fn listen(
        &self,
        _config: &GatewayConfig,
        _handler: Router,
        _admin: Router,
        _metrics: MetricsEngine,
        shutdown: ShutdownSignal,
    ) -> Result<(), ServeError> {
        self.log.push(Call::Listen);
        match self.listen {
            ListenOutcome::UntilShutdown => {
                shutdown.wait().await;
                Ok(())
            }
            ListenOutcome::Fail => Err(ServeError::Io(std::io::Error::other("accept failed"))),
        }
    }
}
