//! Xaudi Storefront library.
//!
//! The server half of the storefront: the product feed consumed by catalog
//! pages at startup and the upload shim that appends to it. Exposed as a
//! library so the router can be driven in tests without binding a socket.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod feed;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::{
    Router,
    extract::{DefaultBodyLimit, Request},
    http::Method,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use state::AppState;

/// Build the full application router.
///
/// Sentry layers are added by the binary so tests run without a client.
pub fn app(state: AppState) -> Router {
    let uploads = ServeDir::new(state.feed().upload_dir());
    let body_limit = state.config().max_upload_bytes;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST]);

    Router::new()
        .merge(routes::routes())
        .nest_service("/uploads", uploads)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;
    use crate::config::StorefrontConfig;

    fn test_app(dir: &std::path::Path, max_upload_bytes: usize) -> Router {
        let mut config = StorefrontConfig::with_data_dir(dir);
        config.max_upload_bytes = max_upload_bytes;
        app(AppState::new(config))
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let dir = tempfile::tempdir().unwrap();
        let response = test_app(dir.path(), 1024)
            .oneshot(
                Request::get("/products.json")
                    .header(header::ORIGIN, "http://localhost:8080")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn test_oversized_upload_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let boundary = "limit";
        let mut body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"cover\"; filename=\"big.png\"\r\n\r\n"
        )
        .into_bytes();
        body.extend(std::iter::repeat_n(b'x', 4096));
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        let response = test_app(dir.path(), 1024)
            .oneshot(
                Request::post("/upload")
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={boundary}"),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["success"], false);
        assert!(!dir.path().join("products.json").exists());
    }
}
