//! Xaudi Core - catalog, cart, and preview playback.
//!
//! This crate holds everything the storefront does on the client side:
//! - [`catalog`] - persisted product collections, seeding, search and sort
//! - [`cart`] - the shopping cart and the simulated checkout
//! - [`playback`] - the single-channel audio preview controller
//! - [`storage`] - the key/value store standing in for browser local storage
//!
//! # Architecture
//!
//! The core crate does no network I/O. Persistence goes through the
//! [`Storage`] trait so the same catalog and cart logic runs against an
//! in-memory map in tests and a directory of JSON files in the CLI.
//!
//! Used by:
//! - `storefront` - upload shim and product feed
//! - `cli` - local storefront driver

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod playback;
pub mod product;
pub mod seed;
pub mod storage;
pub mod types;

pub use cart::{CartError, CartItem, CartLine, CartManager, Receipt, ReceiptLine};
pub use catalog::{CatalogQuery, CatalogStore, SeedReport, SortOrder};
pub use playback::{
    AudioChannel, ControlState, PlaybackController, PlaybackError, PlaybackState, Progress,
    TimedChannel, Track, Transition,
};
pub use product::Product;
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError, keys};
pub use types::*;
