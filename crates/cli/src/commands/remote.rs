//! One-shot fetch of a storefront's `products.json` feed.

use thiserror::Error;
use tracing::{info, warn};
use url::Url;
use xaudi_core::{CatalogStore, Category, Product, Storage};

/// Errors fetching the remote feed.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("invalid feed URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("feed request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Resolve the feed URL for a storefront base URL.
///
/// # Errors
///
/// Returns an error if the joined URL is invalid.
pub fn feed_url(base: &Url) -> Result<Url, RemoteError> {
    Ok(base.join("products.json")?)
}

/// Fetch every product the storefront serves.
///
/// # Errors
///
/// Returns an error on any network, status, or decoding failure.
pub async fn fetch_products(base: &Url) -> Result<Vec<Product>, RemoteError> {
    let url = feed_url(base)?;
    let products = reqwest::get(url)
        .await?
        .error_for_status()?
        .json::<Vec<Product>>()
        .await?;
    Ok(products)
}

/// A category's products as a catalog page would show them at startup.
///
/// With a remote, the server's list replaces local data for this run only.
/// Any failure falls back to the local catalog without retrying.
pub async fn startup_catalog<S: Storage>(
    store: &CatalogStore<S>,
    category: Category,
    remote: Option<&Url>,
) -> Vec<Product> {
    let Some(base) = remote else {
        return store.catalog(category);
    };

    match fetch_products(base).await {
        Ok(products) => {
            info!(count = products.len(), "loaded remote product feed");
            select_category(products, category)
        }
        Err(e) => {
            warn!(error = %e, "remote feed unavailable, using local catalog");
            store.catalog(category)
        }
    }
}

/// Keep the products tagged with `category`.
#[must_use]
pub fn select_category(products: Vec<Product>, category: Category) -> Vec<Product> {
    products
        .into_iter()
        .filter(|p| p.category == category)
        .collect()
}
