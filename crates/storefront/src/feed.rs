//! Server-side product feed: a JSON file of uploaded records plus the
//! directory their assets live in.
//!
//! Reads are lenient: a missing or corrupt file is an empty feed, and
//! individual records that do not parse are skipped. Appends are strict:
//! they refuse to overwrite a file they cannot parse, hold an in-process
//! lock for the read-modify-write, and replace the file atomically. Other
//! processes writing the same file can still race.

use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;
use xaudi_core::Product;

/// URL prefix uploaded assets are served under.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

/// Errors writing to the feed.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("products file is not a JSON array: {0}")]
    Corrupt(#[source] serde_json::Error),

    #[error("failed to encode product: {0}")]
    Encode(#[from] serde_json::Error),
}

/// The products file and upload directory.
#[derive(Debug)]
pub struct ProductFeed {
    products_file: PathBuf,
    upload_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl ProductFeed {
    /// Create a feed over the given file and directory.
    #[must_use]
    pub fn new(products_file: impl Into<PathBuf>, upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            products_file: products_file.into(),
            upload_dir: upload_dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Get the products file path.
    #[must_use]
    pub fn products_file(&self) -> &Path {
        &self.products_file
    }

    /// Get the upload directory.
    #[must_use]
    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Create the upload directory and the products file's parent.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created.
    pub async fn ensure_dirs(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.upload_dir).await?;
        if let Some(parent) = self.products_file.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Every product in the feed, in upload order.
    pub async fn load(&self) -> Vec<Product> {
        let records = match self.read_records().await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %self.products_file.display(),
                    "products file unreadable, serving empty feed"
                );
                return Vec::new();
            }
        };

        records
            .into_iter()
            .filter_map(|record| match serde_json::from_value::<Product>(record) {
                Ok(product) => Some(product),
                Err(e) => {
                    tracing::debug!(error = %e, "skipping unparsable product record");
                    None
                }
            })
            .collect()
    }

    /// Append a product record.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or replaced.
    pub async fn append(&self, product: &Product) -> Result<(), FeedError> {
        let _guard = self.write_lock.lock().await;

        let mut records = self.read_records().await?;
        records.push(serde_json::to_value(product)?);

        let body = serde_json::to_vec_pretty(&records)?;
        let tmp = self.products_file.with_extension("json.tmp");
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &self.products_file).await?;

        tracing::info!(id = %product.id, total = records.len(), "product appended to feed");
        Ok(())
    }

    async fn read_records(&self) -> Result<Vec<Value>, FeedError> {
        let content = match tokio::fs::read_to_string(&self.products_file).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(FeedError::Corrupt)
    }

    /// Write an uploaded file and return the URL it is served at.
    ///
    /// The stored name is `<uuid>_<sanitized original name>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save_asset(&self, original_name: &str, bytes: &[u8]) -> io::Result<StoredAsset> {
        tokio::fs::create_dir_all(&self.upload_dir).await?;

        let name = format!("{}_{}", Uuid::new_v4().simple(), sanitize_file_name(original_name));
        let path = self.upload_dir.join(&name);
        tokio::fs::write(&path, bytes).await?;

        Ok(StoredAsset {
            url: format!("{UPLOADS_URL_PREFIX}/{name}"),
            path,
        })
    }

    /// Whether the feed's directories exist and accept writes.
    pub async fn is_writable(&self) -> bool {
        match tokio::fs::metadata(&self.upload_dir).await {
            Ok(meta) => meta.is_dir() && !meta.permissions().readonly(),
            Err(_) => false,
        }
    }
}

/// An asset written to the upload directory.
#[derive(Debug, Clone)]
pub struct StoredAsset {
    /// Public URL.
    pub url: String,
    /// Location on disk.
    pub path: PathBuf,
}

/// Reduce a client-supplied file name to a safe single path component.
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use xaudi_core::{Category, Price};

    fn feed_in(dir: &Path) -> ProductFeed {
        ProductFeed::new(dir.join("products.json"), dir.join("uploads"))
    }

    fn product(id: &str) -> Product {
        Product::new(id, "Upload", Price::from_cents(1000), Category::Beats)
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("beat one.wav"), "beat_one.wav");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\music\\loop.mp3"), "loop.mp3");
        assert_eq!(sanitize_file_name(".."), "file");
        assert_eq!(sanitize_file_name(""), "file");
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(feed_in(dir.path()).load().await.is_empty());
    }

    #[tokio::test]
    async fn test_load_corrupt_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("products.json"), "{oops").unwrap();
        assert!(feed_in(dir.path()).load().await.is_empty());
    }

    #[tokio::test]
    async fn test_load_skips_bad_records() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("products.json"),
            r#"[{"id":"a","title":"Ok","price":1,"category":"beats"},{"id":"b"}]"#,
        )
        .unwrap();
        let products = feed_in(dir.path()).load().await;
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id.as_str(), "a");
    }

    #[tokio::test]
    async fn test_load_serves_legacy_upload_records() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("products.json"),
            r#"[
                {
                    "id": "65f1c0a2b3d4e",
                    "title": "Old Upload",
                    "category": "beats",
                    "price": 150,
                    "bpm": "90",
                    "key": "Am",
                    "tags": null,
                    "cover": "uploads/65f1c0a2b3d4e_cover.jpg",
                    "audio": "",
                    "downloadLink": "",
                    "dateAdded": "2024-03-13 14:05:09"
                },
                {"id": "b", "title": "Blank", "price": 1, "category": "packs", "bpm": ""}
            ]"#,
        )
        .unwrap();

        let products = feed_in(dir.path()).load().await;
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].bpm, Some(90));
        assert!(products[0].tags.is_empty());
        assert!(products[0].date_added.is_some());
        assert_eq!(products[1].category, Category::SamplePacks);
        assert_eq!(products[1].bpm, None);
    }

    #[tokio::test]
    async fn test_append_preserves_existing_records() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("products.json"),
            r#"[{"id":"legacy","bpm":"90"}]"#,
        )
        .unwrap();
        let feed = feed_in(dir.path());

        feed.append(&product("beat-new")).await.unwrap();

        let raw: Vec<Value> =
            serde_json::from_str(&std::fs::read_to_string(feed.products_file()).unwrap()).unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(raw[0]["id"], "legacy");
        assert_eq!(raw[1]["id"], "beat-new");
    }

    #[tokio::test]
    async fn test_append_refuses_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("products.json"), "not json").unwrap();
        let feed = feed_in(dir.path());

        let err = feed.append(&product("x")).await.unwrap_err();
        assert!(matches!(err, FeedError::Corrupt(_)));
        assert_eq!(std::fs::read_to_string(feed.products_file()).unwrap(), "not json");
    }

    #[tokio::test]
    async fn test_concurrent_appends_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let feed = std::sync::Arc::new(feed_in(dir.path()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let feed = feed.clone();
                tokio::spawn(async move { feed.append(&product(&format!("p{i}"))).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(feed.load().await.len(), 8);
    }

    #[tokio::test]
    async fn test_save_asset() {
        let dir = tempfile::tempdir().unwrap();
        let feed = feed_in(dir.path());

        let asset = feed.save_asset("cover art.png", b"png").await.unwrap();

        assert!(asset.url.starts_with("/uploads/"));
        assert!(asset.url.ends_with("_cover_art.png"));
        assert_eq!(std::fs::read(&asset.path).unwrap(), b"png");
        assert!(feed.is_writable().await);
    }
}
