//! Catalog Store: persisted product collections.
//!
//! Collections live under one storage key per category plus a unified
//! `catalogProducts` list. Reads never fail: missing or corrupt data falls
//! back to a caller-supplied default. Search and sort are pure functions over
//! an in-memory slice and never touch storage.

use core::str::FromStr;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::product::Product;
use crate::seed;
use crate::storage::{Storage, StorageError, keys};
use crate::types::{Category, ProductId};

/// Storage key holding one category's collection.
#[must_use]
pub const fn key_for(category: Category) -> &'static str {
    match category {
        Category::Beats => keys::CATALOG_BEATS,
        Category::Music => keys::CATALOG_MUSIC,
        Category::SamplePacks => keys::CATALOG_PACKS,
        Category::VocalPresets => keys::CATALOG_PRESETS,
    }
}

/// Listing order for a catalog page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Cheapest first.
    PriceLow,
    /// Most expensive first.
    PriceHigh,
    /// Most recently added first.
    #[default]
    Newest,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "priceLow" | "price-low" => Ok(Self::PriceLow),
            "priceHigh" | "price-high" => Ok(Self::PriceHigh),
            "newest" => Ok(Self::Newest),
            _ => Err(format!("invalid sort order: {s}")),
        }
    }
}

/// Keep products whose title or any tag contains `term`, ignoring case.
#[must_use]
pub fn filter(products: &[Product], term: &str) -> Vec<Product> {
    let needle = term.trim().to_lowercase();
    products
        .iter()
        .filter(|p| p.matches(&needle))
        .cloned()
        .collect()
}

/// Reorder products. Insertion order is oldest first.
#[must_use]
pub fn sort(mut products: Vec<Product>, order: SortOrder) -> Vec<Product> {
    match order {
        SortOrder::PriceLow => products.sort_by(|a, b| a.price.cmp(&b.price)),
        SortOrder::PriceHigh => products.sort_by(|a, b| b.price.cmp(&a.price)),
        SortOrder::Newest => products.reverse(),
    }
    products
}

/// Search box and sort dropdown of a catalog page.
#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    pub search: String,
    pub sort: SortOrder,
}

impl CatalogQuery {
    /// Produce the list a catalog page shows for this query.
    #[must_use]
    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        sort(filter(products, &self.search), self.sort)
    }
}

/// Which keys a [`CatalogStore::seed`] call populated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub seeded: Vec<&'static str>,
}

impl SeedReport {
    /// Whether the call wrote anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seeded.is_empty()
    }
}

/// Typed access to catalog collections in a [`Storage`].
#[derive(Debug, Clone)]
pub struct CatalogStore<S> {
    storage: S,
}

impl<S: Storage> CatalogStore<S> {
    /// Wrap a storage backend.
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Read and parse the value under `key`, or return `fallback`.
    ///
    /// Absent keys, JSON `null`, unreadable backends and unparsable content
    /// all yield the fallback.
    pub fn get<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        self.try_get(key).unwrap_or(fallback)
    }

    /// Serialize `value` and store it under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the backend write fails.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let text = serde_json::to_string(value)?;
        self.storage.write(key, &text)
    }

    fn try_get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.storage.read(key) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(key, error = %e, "storage read failed, using fallback");
                return None;
            }
        };
        match serde_json::from_str::<Option<T>>(&raw) {
            Ok(value) => value,
            Err(e) => {
                debug!(key, error = %e, "stored value did not parse, using fallback");
                None
            }
        }
    }

    /// Write the default collections for every catalog key that has none.
    ///
    /// Keys holding a readable value (even an empty list) are left alone, so
    /// repeated calls never replace user-added records.
    ///
    /// # Errors
    ///
    /// Returns an error if writing a default collection fails.
    pub fn seed(&self) -> Result<SeedReport, StorageError> {
        let mut report = SeedReport::default();

        for category in Category::ALL {
            let key = key_for(category);
            if self.try_get::<Vec<Value>>(key).is_none() {
                self.set(key, &seed::for_category(category))?;
                report.seeded.push(key);
            }
        }

        if self.try_get::<Vec<Value>>(keys::CATALOG_PRODUCTS).is_none() {
            self.set(keys::CATALOG_PRODUCTS, &seed::all())?;
            report.seeded.push(keys::CATALOG_PRODUCTS);
        }

        if !report.is_empty() {
            info!(keys = ?report.seeded, "seeded default catalog");
        }
        Ok(report)
    }

    /// One category's collection, in insertion order.
    ///
    /// Records without a `category` field inherit the key's category.
    /// Records that do not parse are skipped one at a time.
    #[must_use]
    pub fn catalog(&self, category: Category) -> Vec<Product> {
        let key = key_for(category);
        let records = self.get(key, Vec::new());
        parse_records(key, records, Some(category))
    }

    /// The unified, category-tagged product list.
    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        let records = self.get(keys::CATALOG_PRODUCTS, Vec::new());
        parse_records(keys::CATALOG_PRODUCTS, records, None)
    }

    /// First product in `category` with the given id.
    #[must_use]
    pub fn find(&self, category: Category, id: &ProductId) -> Option<Product> {
        self.catalog(category).into_iter().find(|p| &p.id == id)
    }

    /// The first `count` beats, for the home page.
    #[must_use]
    pub fn featured(&self, count: usize) -> Vec<Product> {
        let mut beats = self.catalog(Category::Beats);
        beats.truncate(count);
        beats
    }

    /// Append a product to its category and to the unified list.
    ///
    /// Existing records are kept as stored, including ones that no longer
    /// parse as a [`Product`].
    ///
    /// # Errors
    ///
    /// Returns an error if either write fails.
    pub fn add_product(&self, product: Product) -> Result<(), StorageError> {
        let record = serde_json::to_value(&product)?;

        for key in [key_for(product.category), keys::CATALOG_PRODUCTS] {
            let mut records: Vec<Value> = self.get(key, Vec::new());
            records.push(record.clone());
            self.set(key, &records)?;
        }
        Ok(())
    }
}

fn parse_records(key: &str, records: Vec<Value>, category: Option<Category>) -> Vec<Product> {
    records
        .into_iter()
        .filter_map(|mut record| {
            if let (Some(category), Value::Object(fields)) = (category, &mut record) {
                fields
                    .entry("category")
                    .or_insert_with(|| Value::String(category.as_str().to_string()));
            }
            match serde_json::from_value::<Product>(record) {
                Ok(product) => Some(product),
                Err(e) => {
                    debug!(key, error = %e, "skipping unparsable catalog record");
                    None
                }
            }
        })
        .collect()
}
