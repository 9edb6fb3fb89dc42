//! Handler wrappers applied around the router before serving.
//!
//! Order matters: CORS wraps the router, then no-cache wraps the result, so
//! preflight responses carry the no-cache headers as well.

pub mod cors;
pub mod no_cache;

pub use cors::support_cors;
pub use no_cache::no_cache;

use axum::Router;

/// The full public handler chain: CORS, then no-cache.
pub fn wrap_handler(router: Router) -> Router {
    no_cache(support_cors(router))
}
