//! Bid cache subsystem.
//!
//! # Data Flow
//! ```text
//! ServeOrchestrator
//!     → CacheClient::init(cache base URL)   (after router build, before listen)
//!
//! POST /cache (router)
//!     → CacheClient::put
//!     → <base>/cache   {"puts": [...]}
//!     ← {"responses": [{"uuid": ...}]}
//! ```

pub mod client;

pub use client::{CacheClient, CacheError};
