//! Service-manager state machine.
//!
//! # States
//! ```text
//! StartPending ──▶ Running ──▶ StopPending ──▶ Stopped
//!   (entry)      (serve task     (Stop or       (reported by
//!                 spawned)        Shutdown)      run_service)
//! ```
//!
//! # Design Decisions
//! - The serve activity runs as its own task; the control loop never blocks on it
//! - A failed serve activity is logged and the loop keeps accepting control
//!   requests, so the manager can still stop the service cleanly
//! - On loop exit the serve activity is told to stop and awaited, so its
//!   drain finishes before StopPending is followed by Stopped
//! - Platform integration lives behind [`ServiceHost`]

use std::fmt;
use std::future::Future;
use std::ops::BitOr;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinError;

use crate::error::GatewayError;
use crate::lifecycle::shutdown::{Shutdown, ShutdownSignal};

/// Name the service registers under.
pub const SERVICE_NAME: &str = "auction-gateway";

/// Lifecycle state reported to the service manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ServiceStatus {
    StartPending,
    Running,
    StopPending,
    Stopped,
}

impl ServiceStatus {
    /// The only state allowed to follow this one.
    pub fn successor(self) -> Option<ServiceStatus> {
        match self {
            ServiceStatus::StartPending => Some(ServiceStatus::Running),
            ServiceStatus::Running => Some(ServiceStatus::StopPending),
            ServiceStatus::StopPending => Some(ServiceStatus::Stopped),
            ServiceStatus::Stopped => None,
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServiceStatus::StartPending => "start-pending",
            ServiceStatus::Running => "running",
            ServiceStatus::StopPending => "stop-pending",
            ServiceStatus::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Inbound request from the service manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlRequest {
    Stop,
    Shutdown,
    Interrogate,
    ParamChange,
    Pause,
    Continue,
}

impl ControlRequest {
    /// Whether this request ends the control loop.
    pub fn is_stop(self) -> bool {
        matches!(self, ControlRequest::Stop | ControlRequest::Shutdown)
    }
}

/// Set of control requests the service advertises as accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Accepts(u8);

impl Accepts {
    pub const NONE: Accepts = Accepts(0);
    pub const STOP: Accepts = Accepts(1);
    pub const SHUTDOWN: Accepts = Accepts(1 << 1);

    pub fn contains(self, other: Accepts) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Accepts {
    type Output = Accepts;

    fn bitor(self, rhs: Accepts) -> Accepts {
        Accepts(self.0 | rhs.0)
    }
}

/// One status transition as sent to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusReport {
    pub state: ServiceStatus,
    pub accepts: Accepts,
}

impl StatusReport {
    pub fn new(state: ServiceStatus) -> Self {
        Self {
            state,
            accepts: Accepts::NONE,
        }
    }

    pub fn accepting(mut self, accepts: Accepts) -> Self {
        self.accepts = accepts;
        self
    }
}

/// Errors raised while talking to the service manager.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("{service} service failed to register: {source}")]
    Register {
        service: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to report status {state}: {source}")]
    Report {
        state: ServiceStatus,
        #[source]
        source: std::io::Error,
    },

    #[error("service manager is no longer listening")]
    Disconnected,
}

/// Invalid status transition attempted by the controller.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("status cannot move from {from} to {to}")]
pub struct LifecycleError {
    pub from: ServiceStatus,
    pub to: ServiceStatus,
}

/// The capability the controller needs from the OS service manager.
pub trait ServiceHost: Send {
    fn report(&mut self, status: StatusReport) -> Result<(), HostError>;

    /// Next control request. `None` means the host closed the channel.
    fn recv_control(&mut self) -> impl Future<Output = Option<ControlRequest>> + Send;
}

/// Enforces StartPending → Running → StopPending → Stopped.
#[derive(Debug, Default)]
pub struct StatusTracker {
    current: Option<ServiceStatus>,
}

impl StatusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<ServiceStatus> {
        self.current
    }

    pub fn advance(&mut self, next: ServiceStatus) -> Result<(), LifecycleError> {
        let allowed = match self.current {
            None => next == ServiceStatus::StartPending,
            Some(from) => from.successor() == Some(next),
        };
        if !allowed {
            return Err(LifecycleError {
                from: self.current.unwrap_or(ServiceStatus::StartPending),
                to: next,
            });
        }
        self.current = Some(next);
        Ok(())
    }
}

/// How the serve activity ended.
#[derive(Debug)]
pub enum ServiceExit {
    Clean,
    ServeFailed(GatewayError),
    ServePanicked(JoinError),
}

/// Drives one managed run of the service, from StartPending to Stopped.
pub struct ServiceController<'h, H> {
    host: &'h mut H,
    tracker: StatusTracker,
}

impl<'h, H: ServiceHost> ServiceController<'h, H> {
    pub const ACCEPTS: Accepts = Accepts(Accepts::STOP.0 | Accepts::SHUTDOWN.0);

    pub fn new(host: &'h mut H) -> Self {
        Self {
            host,
            tracker: StatusTracker::new(),
        }
    }

    /// Run the state machine around `serve`, which is spawned with a signal
    /// that fires once the control loop exits. Ends in StopPending; call
    /// [`finish`](Self::finish) to report Stopped.
    pub async fn execute<F, Fut>(&mut self, serve: F) -> Result<ServiceExit, LifecycleError>
    where
        F: FnOnce(ShutdownSignal) -> Fut,
        Fut: Future<Output = Result<(), GatewayError>> + Send + 'static,
    {
        self.emit(StatusReport::new(ServiceStatus::StartPending))?;

        let shutdown = Shutdown::new();
        let activity = serve(shutdown.subscribe());
        let serving = tokio::spawn(async move {
            let result = activity.await;
            if let Err(e) = &result {
                tracing::error!(error = %e, "Serve activity failed");
            }
            result
        });

        self.emit(StatusReport::new(ServiceStatus::Running).accepting(Self::ACCEPTS))?;

        loop {
            match self.host.recv_control().await {
                Some(request) if request.is_stop() => {
                    tracing::info!(?request, "Stop requested by service manager");
                    break;
                }
                Some(request) => {
                    tracing::debug!(?request, "Ignoring control request");
                }
                None => {
                    tracing::warn!("Control channel closed, stopping");
                    break;
                }
            }
        }

        self.emit(StatusReport::new(ServiceStatus::StopPending))?;

        shutdown.trigger();
        let exit = match serving.await {
            Ok(Ok(())) => ServiceExit::Clean,
            Ok(Err(e)) => ServiceExit::ServeFailed(e),
            Err(e) => {
                tracing::error!(error = %e, "Serve activity panicked");
                ServiceExit::ServePanicked(e)
            }
        };
        Ok(exit)
    }

    /// Report the terminal Stopped status.
    pub fn finish(mut self) -> Result<(), LifecycleError> {
        self.emit(StatusReport::new(ServiceStatus::Stopped))
    }

    fn emit(&mut self, report: StatusReport) -> Result<(), LifecycleError> {
        self.tracker.advance(report.state)?;
        tracing::debug!(status = %report.state, "Reporting service status");
        if let Err(e) = self.host.report(report) {
            tracing::warn!(error = %e, status = %report.state, "Service manager did not accept status");
        }
        Ok(())
    }
}

/// Register-and-run glue: executes the controller, then reports `Stopped`
/// on the host's behalf.
pub async fn run_service<H, F, Fut>(
    name: &str,
    mut host: H,
    serve: F,
) -> Result<ServiceExit, LifecycleError>
where
    H: ServiceHost,
    F: FnOnce(ShutdownSignal) -> Fut,
    Fut: Future<Output = Result<(), GatewayError>> + Send + 'static,
{
    tracing::info!(service = name, "Running under service manager");

    let mut controller = ServiceController::new(&mut host);
    let exit = controller
        .execute(serve)
        .await
        .and_then(|exit| controller.finish().map(|()| exit))
        .inspect_err(|e| tracing::error!(service = name, error = %e, "{name} service failed"))?;

    tracing::info!(service = name, "{name} service stopped");
    Ok(exit)
}

/// In-process host over channels: statuses out, control requests in.
pub struct ChannelHost {
    status_tx: mpsc::UnboundedSender<StatusReport>,
    control_rx: mpsc::UnboundedReceiver<ControlRequest>,
}

/// The manager's side of a [`ChannelHost`].
pub struct HostHandle {
    pub control: mpsc::UnboundedSender<ControlRequest>,
    pub status: mpsc::UnboundedReceiver<StatusReport>,
}

impl ChannelHost {
    pub fn new() -> (Self, HostHandle) {
        let (status_tx, status_rx) = mpsc::unbounded_channel();
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        (
            Self {
                status_tx,
                control_rx,
            },
            HostHandle {
                control: control_tx,
                status: status_rx,
            },
        )
    }
}

impl ServiceHost for ChannelHost {
    fn report(&mut self, status: StatusReport) -> Result<(), HostError> {
        self.status_tx
            .send(status)
            .map_err(|_| HostError::Disconnected)
    }

    fn recv_control(&mut self) -> impl Future<Output = Option<ControlRequest>> + Send {
        self.control_rx.recv()
    }
}
