//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health            - Liveness check
//! GET  /health/ready      - Readiness check (data directory writable)
//!
//! # Catalog
//! GET  /products.json     - Uploaded product records (JSON array)
//!
//! # Upload
//! POST /upload            - Multipart product upload
//!
//! # Assets
//! GET  /uploads/{file}    - Uploaded covers, previews and downloads
//! ```

pub mod health;
pub mod products;
pub mod upload;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/products.json", get(products::index))
        .route("/upload", post(upload::create))
}
