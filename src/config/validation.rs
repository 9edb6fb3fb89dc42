//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (sizes > 0, timeouts > 0, distinct ports)
//! - Check the cache location is usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::{GatewayConfig, CACHE_UUID_PLACEHOLDER};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("port and admin_port must differ (both are {0})")]
    PortCollision(u16),

    #[error("cache.scheme must be http or https, got {0:?}")]
    CacheScheme(String),

    #[error("cache.host must not be empty")]
    EmptyCacheHost,

    #[error("cache.query must contain %PBS_CACHE_UUID%, got {0:?}")]
    CacheQueryPlaceholder(String),

    #[error("max_request_size must be greater than zero")]
    ZeroRequestSize,

    #[error("adapters.{0}.endpoint must not be empty")]
    EmptyAdapterEndpoint(String),

    #[error("shutdown.drain_timeout_secs must be greater than zero when set")]
    ZeroDrainTimeout,
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    // Port 0 asks the OS for an ephemeral port, so two zeros never collide.
    if config.port == config.admin_port && config.port != 0 {
        errors.push(ValidationError::PortCollision(config.port));
    }

    if !matches!(config.cache.scheme.as_str(), "http" | "https") {
        errors.push(ValidationError::CacheScheme(config.cache.scheme.clone()));
    }

    if config.cache.host.trim().is_empty() {
        errors.push(ValidationError::EmptyCacheHost);
    }

    if !config.cache.query.contains(CACHE_UUID_PLACEHOLDER) {
        errors.push(ValidationError::CacheQueryPlaceholder(config.cache.query.clone()));
    }

    if config.max_request_size == 0 {
        errors.push(ValidationError::ZeroRequestSize);
    }

    for (name, adapter) in &config.adapters {
        if !adapter.disabled && adapter.endpoint.trim().is_empty() {
            errors.push(ValidationError::EmptyAdapterEndpoint(name.clone()));
        }
    }

    if config.shutdown.drain_timeout_secs == Some(0) {
        errors.push(ValidationError::ZeroDrainTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
