//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! main
//!     → mode.rs (interactive or managed, decided once)
//!     → entry.rs (dispatch exactly one path)
//!         managed:     service.rs state machine ⇄ host.rs (status out, control in)
//!                          └─ spawns serve.rs, stops it via shutdown.rs
//!         interactive: signals.rs → shutdown.rs → serve.rs
//!
//! Serve cycle (serve.rs):
//!     Build router → Init cache → Wrap handler → Listen → Drain router
//! ```
//!
//! # Design Decisions
//! - Ordered startup: router first, then cache, then listeners
//! - Ordered shutdown: stop accept, drain, report stopped
//! - Drain is unbounded unless `shutdown.drain_timeout_secs` is set

pub mod entry;
pub mod host;
pub mod mode;
pub mod serve;
pub mod service;
pub mod shutdown;
pub mod signals;

#[cfg(test)]
pub(crate) mod testing;

pub use mode::RunMode;
pub use serve::{Components, GatewayComponents, ServeOrchestrator};
pub use service::{ControlRequest, ServiceController, ServiceHost, ServiceStatus, SERVICE_NAME};
pub use shutdown::{Shutdown, ShutdownSignal};
