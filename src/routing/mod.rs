//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Router build (once per serve cycle):
//!     GatewayConfig.adapters
//!     → adapters.rs (compile enabled adapters, parse endpoints)
//!     → router.rs (axum routes + request id, metrics, body limit layers)
//!     → AuctionRouter (immutable while serving)
//!
//! Shutdown:
//!     AuctionRouter::shutdown
//!     → drain.rs (wait for in-flight count to reach zero)
//!     → stop metrics upkeep
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same config always yields the same registry

pub mod adapters;
pub mod drain;
pub mod router;

pub use adapters::AdapterRegistry;
pub use router::{AuctionRouter, RouterError};
