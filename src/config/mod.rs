//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! gateway.toml
//!     → loader.rs (parse & deserialize, GATEWAY_* overrides)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc with the serve cycle
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no hot reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{AdapterConfig, CacheConfig, GatewayConfig, ShutdownConfig};
pub use validation::ValidationError;
