//! Catalog browsing commands.

use chrono::Utc;
use tracing::info;
use url::Url;
use xaudi_core::{
    CatalogQuery, CatalogStore, Category, Price, Product, SortOrder, Storage, StorageError,
};

use super::remote;

/// Log one product as a catalog card line.
fn log_card(product: &Product) {
    let tags = if product.tags.is_empty() {
        String::new()
    } else {
        format!("  [{}]", product.tags.join(", "))
    };
    info!(
        "{:<12} {:<28} {:>9}  {}{}",
        product.id.as_str(),
        product.title,
        product.price.to_string(),
        product.subtitle(),
        tags
    );
}

/// List a category as its catalog page would render it.
pub async fn list<S: Storage>(
    storage: S,
    category: Category,
    search: String,
    sort: SortOrder,
    remote: Option<&Url>,
) {
    let store = CatalogStore::new(storage);
    let products = remote::startup_catalog(&store, category, remote).await;
    let query = CatalogQuery { search, sort };
    let shown = query.apply(&products);

    if shown.is_empty() {
        info!("No {category} match your search");
        return;
    }
    info!("{} of {} {category}", shown.len(), products.len());
    shown.iter().for_each(log_card);
}

/// Show the first `count` beats.
pub fn featured<S: Storage>(storage: S, count: usize) {
    let store = CatalogStore::new(storage);
    info!("Featured beats");
    store.featured(count).iter().for_each(log_card);
}

/// Fields for a locally added product.
#[derive(Debug, Clone)]
pub struct Draft {
    pub category: Category,
    pub title: String,
    pub price: Price,
    pub bpm: Option<u32>,
    pub key: Option<String>,
    pub daw: Option<String>,
    pub files: Option<u32>,
    pub tags: String,
    pub audio: Option<String>,
    pub cover: String,
}

impl Draft {
    /// Build the record, minting an id from the clock.
    #[must_use]
    pub fn into_product(self) -> Product {
        let id = format!("{}-{}", self.category.id_prefix(), Utc::now().timestamp_millis());
        let title = if self.title.trim().is_empty() {
            "Untitled".to_string()
        } else {
            self.title.trim().to_string()
        };

        let mut product = Product::new(id, title, self.price, self.category);
        product.bpm = self.bpm;
        product.key = self.key;
        product.daw = self.daw;
        product.files = self.files;
        product.audio = self.audio;
        product.cover = self.cover;
        product.tags = self
            .tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        product.date_added = Some(Utc::now());
        product
    }
}

/// Add a product to the local catalog.
///
/// # Errors
///
/// Returns an error if the catalog cannot be written.
pub fn add<S: Storage>(storage: S, draft: Draft) -> Result<(), StorageError> {
    let store = CatalogStore::new(storage);
    let product = draft.into_product();
    let id = product.id.clone();
    store.add_product(product)?;
    info!("Added {id}");
    Ok(())
}
