//! Crate-level error taxonomy.
//!
//! | Variant         | Policy                                                   |
//! |-----------------|----------------------------------------------------------|
//! | `ModeDetection` | fatal before anything starts                             |
//! | `Config`        | fatal in interactive mode; ends the serve activity when managed |
//! | `Router`        | fatal to one serve cycle, returned to the caller         |
//! | `Serve`         | logged by the orchestrator, drain still runs             |
//! | `ServiceHost`   | fatal, logged before exit                                |
//! | `Lifecycle`     | status order violated, managed run aborted               |
//! | `WorkingDirectory` | fatal before mode detection                           |

use thiserror::Error;

use crate::config::ConfigError;
use crate::http::server::ServeError;
use crate::lifecycle::mode::ModeError;
use crate::lifecycle::service::{HostError, LifecycleError};
use crate::routing::RouterError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("failed to determine if we are running in an interactive session: {0}")]
    ModeDetection(#[from] ModeError),

    #[error("configuration could not be loaded or did not pass validation: {0}")]
    Config(#[from] ConfigError),

    #[error("router could not be built: {0}")]
    Router(#[from] RouterError),

    #[error("serving failed: {0}")]
    Serve(#[from] ServeError),

    #[error(transparent)]
    ServiceHost(#[from] HostError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("working directory unavailable: {0}")]
    WorkingDirectory(#[source] std::io::Error),
}
