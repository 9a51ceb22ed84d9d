//! Product records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Category, Price, ProductId};

/// A catalog entry: a beat, a music track, a sample pack, or a vocal preset.
///
/// Category-specific attributes are optional fields rather than an enum so
/// that records written by older pages (which omit fields freely) still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    /// Cover image URL.
    #[serde(default)]
    pub cover: String,
    pub category: Category,
    /// Tempo, for beats and music.
    #[serde(
        default,
        deserialize_with = "lenient::count",
        skip_serializing_if = "Option::is_none"
    )]
    pub bpm: Option<u32>,
    /// Musical key, for beats and music.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Target DAW, for vocal presets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daw: Option<String>,
    /// Number of files, for sample packs.
    #[serde(
        default,
        deserialize_with = "lenient::count",
        skip_serializing_if = "Option::is_none"
    )]
    pub files: Option<u32>,
    /// Audio preview reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    #[serde(default, deserialize_with = "lenient::tags")]
    pub tags: Vec<String>,
    /// Deliverable asset, set by the server uploader.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_link: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_added: Option<DateTime<Utc>>,
}

impl Product {
    /// Create a product with only the required fields set.
    #[must_use]
    pub fn new(
        id: impl Into<ProductId>,
        title: impl Into<String>,
        price: Price,
        category: Category,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            price,
            cover: String::new(),
            category,
            bpm: None,
            key: None,
            daw: None,
            files: None,
            audio: None,
            tags: Vec::new(),
            download_link: None,
            date_added: None,
        }
    }

    /// The secondary line shown under the title on a product card.
    ///
    /// Returns an empty string when the category's attributes are missing.
    #[must_use]
    pub fn subtitle(&self) -> String {
        match self.category {
            Category::Beats | Category::Music => match (self.bpm, self.key.as_deref()) {
                (Some(bpm), Some(key)) => format!("{bpm} BPM • {key}"),
                (Some(bpm), None) => format!("{bpm} BPM"),
                (None, Some(key)) => key.to_string(),
                (None, None) => String::new(),
            },
            Category::SamplePacks => self
                .files
                .map(|n| format!("{n} files"))
                .unwrap_or_default(),
            Category::VocalPresets => self.daw.clone().unwrap_or_default(),
        }
    }

    /// Case-insensitive substring match on the title or any tag.
    ///
    /// `needle` must already be lowercase.
    #[must_use]
    pub fn matches(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.title.to_lowercase().contains(needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(needle))
    }
}

/// Field readers for records from the legacy form uploader. It stored counts
/// as form strings and tags as `null`, with `Y-m-d H:i:s` timestamps.
mod lenient {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};

    const PHP_TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S";

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(u64),
        Text(String),
    }

    /// A count given as a number or numeric text. Blank or non-numeric text
    /// reads as absent.
    pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
        let value = match Option::<NumberOrText>::deserialize(deserializer)? {
            None => None,
            Some(NumberOrText::Number(n)) => u32::try_from(n).ok(),
            Some(NumberOrText::Text(text)) => text.trim().parse().ok(),
        };
        Ok(value)
    }

    /// Tags, with `null` read as no tags.
    pub fn tags<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
    }

    /// RFC 3339, or the uploader's `Y-m-d H:i:s` taken as UTC. Anything else
    /// reads as absent.
    pub fn timestamp<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let Some(text) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        let parsed = DateTime::parse_from_rfc3339(&text)
            .map(|t| t.with_timezone(&Utc))
            .or_else(|_| NaiveDateTime::parse_from_str(&text, PHP_TIMESTAMP).map(|t| t.and_utc()))
            .ok();
        Ok(parsed)
    }
}
