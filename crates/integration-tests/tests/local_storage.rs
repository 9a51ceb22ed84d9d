//! Catalog and cart behaviour over file-backed storage.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use tempfile::TempDir;
use xaudi_core::{
    CartItem, CartManager, CatalogQuery, CatalogStore, Category, FileStorage, Price, Product,
    ProductId, SortOrder, keys,
};

fn open(dir: &TempDir) -> FileStorage {
    FileStorage::open(dir.path()).unwrap()
}

#[test]
fn test_seed_once_then_persist_edits() {
    let dir = TempDir::new().unwrap();
    let storage = open(&dir);
    let store = CatalogStore::new(&storage);

    let first = store.seed().unwrap();
    assert_eq!(first.seeded.len(), 5);
    assert_eq!(store.catalog(Category::Beats).len(), 3);

    let late = Product::new("beat-99", "Late Upload", Price::from_cents(5000), Category::Beats);
    store.add_product(late).unwrap();

    // A fresh handle on the same directory sees the edit and does not reseed.
    let reopened = open(&dir);
    let store = CatalogStore::new(&reopened);
    assert!(store.seed().unwrap().is_empty());
    assert_eq!(store.catalog(Category::Beats).len(), 4);
    assert!(store.products().iter().any(|p| p.id.as_str() == "beat-99"));
}

#[test]
fn test_corrupt_catalog_file_is_reseeded() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(format!("{}.json", keys::CATALOG_PACKS)), "{oops").unwrap();

    let storage = open(&dir);
    let store = CatalogStore::new(&storage);
    let report = store.seed().unwrap();

    assert!(report.seeded.contains(&keys::CATALOG_PACKS));
    assert_eq!(store.catalog(Category::SamplePacks).len(), 2);
}

#[test]
fn test_catalog_page_queries() {
    let dir = TempDir::new().unwrap();
    let storage = open(&dir);
    let store = CatalogStore::new(&storage);
    store.seed().unwrap();
    let beats = store.catalog(Category::Beats);

    let cheapest = CatalogQuery {
        search: String::new(),
        sort: SortOrder::PriceLow,
    }
    .apply(&beats);
    let prices: Vec<Price> = cheapest.iter().map(|p| p.price).collect();
    assert_eq!(
        prices,
        [Price::from_cents(19900), Price::from_cents(24900), Price::from_cents(29900)]
    );

    let afro = CatalogQuery {
        search: "AFRO".to_string(),
        sort: SortOrder::Newest,
    }
    .apply(&beats);
    assert_eq!(afro.len(), 1);
    assert_eq!(afro[0].title, "Sunset Bounce");

    let none = CatalogQuery {
        search: "zzz".to_string(),
        sort: SortOrder::Newest,
    }
    .apply(&beats);
    assert!(none.is_empty());
}

#[test]
fn test_cart_survives_reopen_and_checkout_clears_it() {
    let dir = TempDir::new().unwrap();
    let storage = open(&dir);
    let store = CatalogStore::new(&storage);
    store.seed().unwrap();

    let cart = CartManager::new(&storage);
    let beat = store.find(Category::Beats, &ProductId::new("beat-01")).unwrap();
    let pack = store.find(Category::SamplePacks, &ProductId::new("pack-01")).unwrap();
    cart.add(CartItem::from(&beat)).unwrap();
    cart.add(CartItem::from(&beat)).unwrap();
    cart.add(CartItem::from(&pack)).unwrap();

    let reopened = open(&dir);
    let cart = CartManager::new(&reopened);
    assert_eq!(cart.count(), 3);
    assert_eq!(cart.total(), Price::from_cents(2 * 24900 + 14900));

    let receipt = cart.checkout().unwrap();
    assert_eq!(receipt.total, Price::from_cents(2 * 24900 + 14900));
    assert_eq!(receipt.lines.len(), 2);

    let cart = CartManager::new(open(&dir));
    assert!(cart.is_empty());
    assert_eq!(
        std::fs::read_to_string(dir.path().join(format!("{}.json", keys::CART))).unwrap(),
        "[]"
    );
}
