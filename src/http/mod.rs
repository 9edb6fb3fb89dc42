//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (public + admin listeners, graceful shutdown)
//!     → middleware/ (CORS, no-cache headers)
//!     → request.rs (request ID)
//!     → routing layer (auction endpoints)
//! ```

pub mod middleware;
pub mod request;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{HttpServer, ServeError};
