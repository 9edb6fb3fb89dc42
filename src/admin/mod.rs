//! Admin endpoints served on the admin listener.
//!
//! The HTTP server adds `/metrics` from the router's metrics engine when it
//! starts listening.

pub mod handlers;

use axum::{routing::get, Router};

use self::handlers::get_version;
use crate::revision::Revision;

pub fn admin_router(revision: &Revision) -> Router {
    Router::new()
        .route("/version", get(get_version))
        .with_state(revision.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    async fn version_body(revision: Revision) -> serde_json::Value {
        let response = admin_router(&revision)
            .oneshot(Request::get("/version").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_version_reports_revision() {
        let body = version_body(Revision::new("9f8e7d6")).await;
        assert_eq!(body["revision"], "9f8e7d6");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_version_without_revision() {
        let body = version_body(Revision::default()).await;
        assert_eq!(body["revision"], "not-set");
    }
}
