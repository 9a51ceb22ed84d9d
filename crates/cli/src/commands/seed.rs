//! Seed local storage with the default catalog.

use tracing::info;
use xaudi_core::{CatalogStore, SeedReport, Storage, StorageError};

/// Write defaults for every catalog key that has none.
///
/// # Errors
///
/// Returns an error if a default collection cannot be written.
pub fn run<S: Storage>(storage: S) -> Result<SeedReport, StorageError> {
    CatalogStore::new(storage).seed()
}

/// Log what a seed pass did.
pub fn summarize(report: &SeedReport) {
    if report.is_empty() {
        info!("Catalog already seeded, nothing to do");
        return;
    }
    for key in &report.seeded {
        info!("  seeded {key}");
    }
}
