//! OS signal handling for interactive runs.
//!
//! # Responsibilities
//! - Wait for Ctrl-C (and SIGTERM on unix)
//! - Translate the first signal into a shutdown trigger
//!
//! Managed runs take signals through the service host instead.

use tokio::task::JoinHandle;

use crate::lifecycle::shutdown::Shutdown;

/// Resolve when the process is asked to terminate.
pub async fn terminate_requested() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Trigger `shutdown` on the first termination signal.
pub fn trigger_on_signal(shutdown: Shutdown) -> JoinHandle<()> {
    tokio::spawn(async move {
        terminate_requested().await;
        tracing::info!("Shutdown signal received");
        shutdown.trigger();
    })
}
