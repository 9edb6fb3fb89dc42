//! Request identification.
//!
//! # Responsibilities
//! - Assign a unique request ID to every request without one
//! - Echo the ID on the response for client-side correlation
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - IDs come from the injected random source, never a global generator
//! - A caller-supplied ID is preserved

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};

use crate::random::RandomSource;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Middleware that guarantees an `x-request-id` header on request and response.
pub async fn assign_request_id(
    State(rng): State<RandomSource>,
    mut request: Request,
    next: Next,
) -> Response {
    let id = match request.headers().get(X_REQUEST_ID) {
        Some(existing) => existing.clone(),
        None => {
            // A hyphenated UUID is always a valid header value.
            let generated = HeaderValue::from_str(&rng.uuid().to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("unknown"));
            request.headers_mut().insert(X_REQUEST_ID, generated.clone());
            generated
        }
    };

    let mut response = next.run(request).await;
    response.headers_mut().insert(X_REQUEST_ID, id);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, middleware, routing::get, Router};
    use tower::ServiceExt;

    fn app(rng: RandomSource) -> Router {
        Router::new()
            .route(
                "/",
                get(|request: Request| async move {
                    request
                        .headers()
                        .get(X_REQUEST_ID)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string()
                }),
            )
            .layer(middleware::from_fn_with_state(rng, assign_request_id))
    }

    #[tokio::test]
    async fn test_generates_id_from_source() {
        let expected = RandomSource::seeded(11).uuid().to_string();

        let response = app(RandomSource::seeded(11))
            .oneshot(axum::http::Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.headers()[X_REQUEST_ID], expected.as_str());
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body, expected.as_bytes());
    }

    #[tokio::test]
    async fn test_preserves_incoming_id() {
        let response = app(RandomSource::seeded(3))
            .oneshot(
                axum::http::Request::get("/")
                    .header(X_REQUEST_ID, "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()[X_REQUEST_ID], "abc-123");
    }
}
