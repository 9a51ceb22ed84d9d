//! Product feed handler.

use axum::{Json, extract::State};
use tracing::instrument;
use xaudi_core::Product;

use crate::state::AppState;

/// Serve every uploaded product record.
///
/// Never fails: an unreadable feed is served as an empty array.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Json<Vec<Product>> {
    Json(state.feed().load().await)
}
