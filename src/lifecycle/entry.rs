//! Process entry composition.
//!
//! Exactly one of the two paths runs per process:
//! - managed: the service controller drives one serve cycle, loading the
//!   configuration inside the serve activity
//! - interactive: configuration is loaded up front and the serve cycle runs
//!   until Ctrl-C / SIGTERM

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::load_config;
use crate::error::GatewayError;
use crate::lifecycle::mode::RunMode;
use crate::lifecycle::serve::{Components, ServeOrchestrator};
use crate::lifecycle::service::{run_service, ServiceExit, ServiceHost, SERVICE_NAME};
use crate::lifecycle::shutdown::Shutdown;

/// Configuration file used when none is given on the command line.
pub const DEFAULT_CONFIG: &str = "gateway.toml";

/// Resolve the `--config` argument before the working directory changes.
///
/// An explicit relative path is anchored at the launch directory. The
/// default stays relative so it is found next to the executable.
pub fn resolve_config_path(explicit: Option<PathBuf>) -> Result<PathBuf, GatewayError> {
    resolve_config_path_from(explicit, std::env::current_dir)
}

fn resolve_config_path_from<F>(explicit: Option<PathBuf>, launch_dir: F) -> Result<PathBuf, GatewayError>
where
    F: FnOnce() -> io::Result<PathBuf>,
{
    match explicit {
        Some(path) if path.is_relative() => {
            let base = launch_dir()
                .map_err(GatewayError::WorkingDirectory)
                .inspect_err(|e| tracing::error!(error = %e, "Launch directory unavailable"))?;
            Ok(base.join(path))
        }
        Some(path) => Ok(path),
        None => Ok(PathBuf::from(DEFAULT_CONFIG)),
    }
}

/// Run the path selected by `mode`.
pub async fn dispatch<M, MF, I, IF>(mode: RunMode, managed: M, interactive: I) -> Result<(), GatewayError>
where
    M: FnOnce() -> MF,
    MF: Future<Output = Result<(), GatewayError>>,
    I: FnOnce() -> IF,
    IF: Future<Output = Result<(), GatewayError>>,
{
    tracing::info!(%mode, "Run mode detected");
    match mode {
        RunMode::Managed => managed().await,
        RunMode::Interactive => interactive().await,
    }
}

/// Interactive path: load configuration, serve until `shutdown` fires.
///
/// A configuration failure is logged and returned; a serve failure is logged
/// only.
pub async fn run_interactive<C: Components>(
    config_path: &Path,
    orchestrator: &ServeOrchestrator<C>,
    shutdown: &Shutdown,
) -> Result<(), GatewayError> {
    let config = load_config(config_path).inspect_err(|e| {
        tracing::error!(
            path = %config_path.display(),
            error = %e,
            "Configuration could not be loaded or did not pass validation"
        );
    })?;
    tracing::info!(path = %config_path.display(), "Configuration loaded");

    if let Err(e) = orchestrator.run(&config, shutdown.subscribe()).await {
        tracing::error!(error = %e, "{SERVICE_NAME} failed");
    }
    Ok(())
}

/// Managed path: hand control to the service controller.
pub async fn run_managed<C, H>(
    config_path: PathBuf,
    orchestrator: Arc<ServeOrchestrator<C>>,
    host: H,
) -> Result<ServiceExit, GatewayError>
where
    C: Components + 'static,
    H: ServiceHost,
{
    let exit = run_service(SERVICE_NAME, host, move |signal| async move {
        let config = load_config(&config_path)?;
        tracing::info!(path = %config_path.display(), "Configuration loaded");
        orchestrator.run(&config, signal).await
    })
    .await?;
    Ok(exit)
}
