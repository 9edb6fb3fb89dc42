//! Operating-system service host.
//!
//! # Responsibilities
//! - Report status transitions over the manager's notification socket
//! - Translate process signals into control requests
//!
//! # Signal mapping
//! - SIGINT  → Stop
//! - SIGTERM → Shutdown
//! - SIGHUP  → ParamChange (no-op for the controller)

use std::future::Future;

use crate::lifecycle::service::{ControlRequest, HostError, ServiceHost, ServiceStatus, StatusReport};

/// Notification payload for a status transition.
pub fn notify_message(report: &StatusReport) -> String {
    match report.state {
        ServiceStatus::StartPending => "STATUS=starting".to_string(),
        ServiceStatus::Running => "READY=1\nSTATUS=running".to_string(),
        ServiceStatus::StopPending => "STOPPING=1\nSTATUS=stopping".to_string(),
        ServiceStatus::Stopped => "STATUS=stopped".to_string(),
    }
}

#[cfg(unix)]
pub use self::unix::SystemHost;

#[cfg(unix)]
mod unix {
    use super::*;
    use std::os::unix::net::UnixDatagram;

    use tokio::signal::unix::{signal, Signal, SignalKind};

    use crate::lifecycle::mode::NOTIFY_SOCKET;

    /// Service host backed by the notification socket and unix signals.
    pub struct SystemHost {
        name: String,
        notify: Option<Notifier>,
        interrupt: Signal,
        terminate: Signal,
        hangup: Signal,
    }

    struct Notifier {
        socket: UnixDatagram,
        path: String,
    }

    impl Notifier {
        fn send(&self, message: &str) -> std::io::Result<usize> {
            #[cfg(target_os = "linux")]
            if let Some(name) = self.path.strip_prefix('@') {
                use std::os::linux::net::SocketAddrExt;
                let addr = std::os::unix::net::SocketAddr::from_abstract_name(name.as_bytes())?;
                return self.socket.send_to_addr(message.as_bytes(), &addr);
            }
            self.socket.send_to(message.as_bytes(), &self.path)
        }
    }

    impl SystemHost {
        /// Register with the service manager. Must be called inside a Tokio runtime.
        pub fn register(name: &str) -> Result<Self, HostError> {
            let register_err = |source| HostError::Register {
                service: name.to_string(),
                source,
            };

            let notify = match std::env::var(NOTIFY_SOCKET) {
                Ok(path) if !path.is_empty() => Some(Notifier {
                    socket: UnixDatagram::unbound().map_err(register_err)?,
                    path,
                }),
                _ => None,
            };
            if notify.is_none() {
                tracing::debug!("No notification socket, status reports are logged only");
            }

            Ok(Self {
                name: name.to_string(),
                notify,
                interrupt: signal(SignalKind::interrupt()).map_err(register_err)?,
                terminate: signal(SignalKind::terminate()).map_err(register_err)?,
                hangup: signal(SignalKind::hangup()).map_err(register_err)?,
            })
        }
    }

    impl ServiceHost for SystemHost {
        fn report(&mut self, status: StatusReport) -> Result<(), HostError> {
            tracing::info!(service = %self.name, status = %status.state, "Service status");
            let Some(notifier) = &self.notify else {
                return Ok(());
            };
            notifier
                .send(&notify_message(&status))
                .map(|_| ())
                .map_err(|source| HostError::Report {
                    state: status.state,
                    source,
                })
        }

        fn recv_control(&mut self) -> impl Future<Output = Option<ControlRequest>> + Send {
            async move {
                tokio::select! {
                    received = self.interrupt.recv() => received.map(|_| ControlRequest::Stop),
                    received = self.terminate.recv() => received.map(|_| ControlRequest::Shutdown),
                    received = self.hangup.recv() => received.map(|_| ControlRequest::ParamChange),
                }
            }
        }
    }

}

#[cfg(not(unix))]
pub use self::fallback::SystemHost;

#[cfg(not(unix))]
mod fallback {
    use super::*;

    /// Minimal host for platforms without a notification protocol: reports
    /// are logged and Ctrl-C maps to Stop.
    pub struct SystemHost {
        name: String,
    }

    impl SystemHost {
        pub fn register(name: &str) -> Result<Self, HostError> {
            Ok(Self {
                name: name.to_string(),
            })
        }
    }

    impl ServiceHost for SystemHost {
        fn report(&mut self, status: StatusReport) -> Result<(), HostError> {
            tracing::info!(service = %self.name, status = %status.state, "Service status");
            Ok(())
        }

        fn recv_control(&mut self) -> impl Future<Output = Option<ControlRequest>> + Send {
            async {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => Some(ControlRequest::Stop),
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
                        None
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notify_messages() {
        let running = StatusReport::new(ServiceStatus::Running);
        assert_eq!(notify_message(&running), "READY=1\nSTATUS=running");

        let stopping = StatusReport::new(ServiceStatus::StopPending);
        assert!(notify_message(&stopping).starts_with("STOPPING=1"));
    }
}
