//! Auction Gateway Library

pub mod admin;
pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod random;
pub mod revision;
pub mod routing;

pub use config::schema::GatewayConfig;
pub use error::GatewayError;
pub use http::HttpServer;
pub use lifecycle::{ServeOrchestrator, Shutdown};
pub use random::RandomSource;
pub use revision::Revision;
