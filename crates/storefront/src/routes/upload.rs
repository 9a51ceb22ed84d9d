//! Product upload handler.
//!
//! Accepts a multipart form with the product's text fields and up to three
//! files. Validation happens before anything touches disk; if a later step
//! fails, files already written for the request are removed again.

use std::collections::HashMap;
use std::path::PathBuf;

use axum::{
    Json,
    body::Bytes,
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
};
use chrono::Utc;
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;
use xaudi_core::{Category, Price, Product};

use crate::error::{AppError, Result};
use crate::feed::ProductFeed;
use crate::state::AppState;

/// Body returned for a successful upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub product: Product,
}

/// Which product attribute a file part fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetRole {
    Cover,
    Audio,
    Download,
}

impl AssetRole {
    /// Map a form field name to a role. `file` is the single-file form's name.
    #[must_use]
    pub fn from_field(name: &str) -> Option<Self> {
        match name {
            "cover" => Some(Self::Cover),
            "audio" | "file" => Some(Self::Audio),
            "product" => Some(Self::Download),
            _ => None,
        }
    }
}

/// A file part held in memory until validation passes.
#[derive(Debug)]
struct FilePart {
    role: AssetRole,
    file_name: String,
    bytes: Bytes,
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::BadRequest(e.body_text())
    }
}

/// Raw form contents.
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    files: Vec<FilePart>,
}

impl UploadForm {
    /// Drain a multipart stream.
    async fn read(multipart: &mut Multipart) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(multipart_error)?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if let Some(file_name) = field.file_name().map(str::to_string) {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(multipart_error)?;
                form.add_file(&name, file_name, bytes);
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(multipart_error)?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    fn add_file(&mut self, field: &str, file_name: String, bytes: Bytes) {
        // Browsers send an empty part for file inputs left blank.
        if file_name.is_empty() && bytes.is_empty() {
            return;
        }
        let Some(role) = AssetRole::from_field(field) else {
            tracing::debug!(field, "ignoring unexpected file field");
            return;
        };
        if self.files.iter().any(|f| f.role == role) {
            return;
        }
        self.files.push(FilePart {
            role,
            file_name,
            bytes,
        });
    }

    fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, name: &str) -> Result<&str> {
        self.text(name)
            .ok_or_else(|| AppError::BadRequest(format!("missing required field: {name}")))
    }

    fn number(&self, name: &str) -> Result<Option<u32>> {
        self.text(name)
            .map(|v| {
                v.parse::<u32>()
                    .map_err(|_| AppError::BadRequest(format!("{name} must be a whole number")))
            })
            .transpose()
    }

    /// Check the text fields and build the record, minus its assets.
    pub fn validate(&self) -> Result<Product> {
        let title = self.required("title")?;
        let category: Category = self
            .required("category")?
            .parse()
            .map_err(|e: xaudi_core::CategoryError| AppError::BadRequest(e.to_string()))?;
        let price = Price::parse(self.required("price")?)
            .map_err(|e| AppError::BadRequest(format!("invalid price: {e}")))?;

        let id = format!("{}-{}", category.id_prefix(), Uuid::new_v4().simple());
        let mut product = Product::new(id, title, price, category);
        product.bpm = self.number("bpm")?;
        product.files = self.number("files")?;
        product.key = self.text("key").map(str::to_string);
        product.daw = self.text("daw").map(str::to_string);
        product.tags = self.text("tags").map(parse_tags).transpose()?.unwrap_or_default();
        product.date_added = Some(Utc::now());
        Ok(product)
    }
}

/// Parse tags given as `"Trap, Dark"` or as a JSON array.
fn parse_tags(raw: &str) -> Result<Vec<String>> {
    if raw.starts_with('[') {
        let tags: Vec<String> = serde_json::from_str(raw)
            .map_err(|_| AppError::BadRequest("tags must be a JSON array of strings".to_string()))?;
        return Ok(tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect());
    }
    Ok(raw
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect())
}

/// Write each file and point the product at it.
async fn store_assets(
    feed: &ProductFeed,
    files: &[FilePart],
    product: &mut Product,
    written: &mut Vec<PathBuf>,
) -> std::io::Result<()> {
    for file in files {
        let asset = feed.save_asset(&file.file_name, &file.bytes).await?;
        written.push(asset.path);
        match file.role {
            AssetRole::Cover => product.cover = asset.url,
            AssetRole::Audio => product.audio = Some(asset.url),
            AssetRole::Download => product.download_link = Some(asset.url),
        }
    }
    Ok(())
}

async fn discard(paths: &[PathBuf]) {
    for path in paths {
        if let Err(e) = tokio::fs::remove_file(path).await {
            tracing::debug!(error = %e, path = %path.display(), "failed to remove orphaned upload");
        }
    }
}

/// Handle a product upload.
#[instrument(skip(state, multipart))]
pub async fn create(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadResponse>)> {
    let mut multipart = multipart.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let form = UploadForm::read(&mut multipart).await?;
    let mut product = form.validate()?;

    let feed = state.feed();
    let mut written = Vec::new();

    if let Err(e) = store_assets(feed, &form.files, &mut product, &mut written).await {
        discard(&written).await;
        return Err(e.into());
    }

    if let Err(e) = feed.append(&product).await {
        discard(&written).await;
        return Err(e.into());
    }

    tracing::info!(
        id = %product.id,
        category = %product.category,
        files = written.len(),
        "product uploaded"
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            success: true,
            product,
        }),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn form(fields: &[(&str, &str)]) -> UploadForm {
        UploadForm {
            fields: fields
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            files: Vec::new(),
        }
    }

    fn bad_request_message(result: Result<Product>) -> String {
        match result {
            Err(AppError::BadRequest(msg)) => msg,
            other => panic!("expected bad request, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_full_form() {
        let product = form(&[
            ("title", " Night Shift "),
            ("category", "beats"),
            ("price", "199.50"),
            ("bpm", "128"),
            ("key", "Gm"),
            ("tags", "House, Deep ,"),
        ])
        .validate()
        .unwrap();

        assert_eq!(product.title, "Night Shift");
        assert_eq!(product.category, Category::Beats);
        assert_eq!(product.price, Price::from_cents(19950));
        assert_eq!(product.bpm, Some(128));
        assert_eq!(product.tags, ["House", "Deep"]);
        assert!(product.id.as_str().starts_with("beat-"));
        assert!(product.date_added.is_some());
    }

    #[test]
    fn test_validate_missing_fields() {
        let msg = bad_request_message(form(&[("category", "beats"), ("price", "1")]).validate());
        assert_eq!(msg, "missing required field: title");

        let blank_price = form(&[("title", "x"), ("category", "beats"), ("price", "  ")]);
        let msg = bad_request_message(blank_price.validate());
        assert_eq!(msg, "missing required field: price");
    }

    #[test]
    fn test_validate_bad_values() {
        let loops = form(&[("title", "x"), ("category", "loops"), ("price", "1")]);
        let msg = bad_request_message(loops.validate());
        assert_eq!(msg, "unknown category: loops");

        let negative = form(&[("title", "x"), ("category", "packs"), ("price", "-3")]);
        let msg = bad_request_message(negative.validate());
        assert_eq!(msg, "invalid price: price cannot be negative");

        let many = form(&[
            ("title", "x"),
            ("category", "packs"),
            ("price", "3"),
            ("files", "many"),
        ]);
        let msg = bad_request_message(many.validate());
        assert_eq!(msg, "files must be a whole number");
    }

    #[test]
    fn test_parse_tags_json_array() {
        assert_eq!(parse_tags(r#"["Afro", " Vocal "]"#).unwrap(), ["Afro", "Vocal"]);
        assert!(parse_tags("[not json").is_err());
    }

    #[test]
    fn test_asset_roles() {
        assert_eq!(AssetRole::from_field("file"), Some(AssetRole::Audio));
        assert_eq!(AssetRole::from_field("product"), Some(AssetRole::Download));
        assert_eq!(AssetRole::from_field("password"), None);
    }

    #[test]
    fn test_add_file_skips_blank_and_duplicates() {
        let mut form = UploadForm::default();
        form.add_file("cover", String::new(), Bytes::new());
        form.add_file("cover", "a.png".to_string(), Bytes::from_static(b"1"));
        form.add_file("cover", "b.png".to_string(), Bytes::from_static(b"2"));
        form.add_file("notes", "n.txt".to_string(), Bytes::from_static(b"3"));

        assert_eq!(form.files.len(), 1);
        assert_eq!(form.files[0].file_name, "a.png");
    }
}
