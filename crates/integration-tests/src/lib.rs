//! Integration tests for Xaudi.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p xaudi-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `storefront_api` - Router driven in-process against a temporary data dir
//! - `local_storage` - Catalog and cart behaviour over file-backed storage
//! - `preview_playback` - Switching previews through the shared channel
//!
//! The helpers below build a router over a fresh data directory and encode
//! multipart upload bodies by hand.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use axum::{
    Router,
    body::{Body, Bytes},
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;
use xaudi_storefront::{app, config::StorefrontConfig, state::AppState};

/// Boundary used by [`MultipartBody`].
pub const BOUNDARY: &str = "xaudi-test-boundary";

/// A storefront router over its own temporary data directory.
pub struct TestStorefront {
    pub dir: TempDir,
    pub state: AppState,
}

impl TestStorefront {
    /// Prepare directories the way the binary does at startup.
    pub async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let state = AppState::new(StorefrontConfig::with_data_dir(dir.path()));
        state.feed().ensure_dirs().await.unwrap();
        Self { dir, state }
    }

    /// A fresh router sharing this storefront's state.
    #[must_use]
    pub fn router(&self) -> Router {
        app(self.state.clone())
    }

    /// Send one request and collect the response.
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Bytes) {
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, body)
    }

    /// `GET` a path.
    pub async fn get(&self, uri: &str) -> (StatusCode, Bytes) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    /// `GET` a path and parse the body as JSON.
    pub async fn get_json(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let (status, body) = self.get(uri).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    /// `POST /upload` and parse the JSON reply.
    pub async fn upload(&self, body: MultipartBody) -> (StatusCode, serde_json::Value) {
        let (status, body) = self.send(body.into_request("/upload")).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    /// Number of files in the upload directory.
    #[must_use]
    pub fn stored_files(&self) -> usize {
        std::fs::read_dir(self.state.feed().upload_dir())
            .map(Iterator::count)
            .unwrap_or(0)
    }
}

/// Builder for a `multipart/form-data` body.
#[derive(Debug, Default)]
pub struct MultipartBody {
    bytes: Vec<u8>,
}

impl MultipartBody {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text field.
    #[must_use]
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    /// Add a file field.
    #[must_use]
    pub fn file(mut self, name: &str, file_name: &str, content: &[u8]) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\n\
                 Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        self.bytes.extend_from_slice(content);
        self.bytes.extend_from_slice(b"\r\n");
        self
    }

    /// Finish the body and wrap it in a `POST` request.
    #[must_use]
    pub fn into_request(mut self, uri: &str) -> Request<Body> {
        self.bytes
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Request::post(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(self.bytes))
            .unwrap()
    }
}
