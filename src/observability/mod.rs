//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges, histograms per router)
//!
//! Consumers:
//!     → stdout (pretty, compact or JSON)
//!     → admin listener GET /metrics (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;

pub use self::logging::LogFormat;
pub use self::metrics::MetricsEngine;
