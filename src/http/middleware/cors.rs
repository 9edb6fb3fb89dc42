//! Cross-origin request support.
//!
//! Browsers embedding the auction script call the gateway from arbitrary
//! publisher origins with credentials, so the request origin is mirrored
//! back rather than answered with a wildcard.

use axum::http::{header, HeaderName, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};

const X_REQUESTED_WITH: HeaderName = HeaderName::from_static("x-requested-with");

/// The CORS policy applied to the public handler.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::HEAD])
        .allow_headers([
            header::ORIGIN,
            X_REQUESTED_WITH,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ])
}

/// Wrap `router` with [`cors_layer`].
pub fn support_cors(router: Router) -> Router {
    router.layer(cors_layer())
}
