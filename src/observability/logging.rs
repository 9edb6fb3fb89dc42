//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once per process
//! - Map CLI verbosity onto a default filter
//! - Select the output format
//!
//! # Design Decisions
//! - `RUST_LOG` always wins over the verbosity flag
//! - JSON format for production, pretty format for development

use clap::ValueEnum;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

/// Default filter directive for a `-v` count.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "auction_gateway=info,tower_http=warn",
        1 => "auction_gateway=debug,tower_http=debug",
        _ => "auction_gateway=trace,tower_http=trace",
    }
}

/// Install the global subscriber.
pub fn init(verbosity: u8, format: LogFormat) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directive(verbosity).into());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
        LogFormat::Compact => registry
            .with(tracing_subscriber::fmt::layer().compact())
            .try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_directives() {
        assert!(default_directive(0).contains("=info"));
        assert!(default_directive(1).contains("=debug"));
        assert_eq!(default_directive(2), default_directive(9));
    }
}
