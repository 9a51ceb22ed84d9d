//! Product categories.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a category name is not recognised.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown category: {0}")]
pub struct CategoryError(pub String);

/// The kind of digital good a product is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Beats,
    Music,
    #[serde(alias = "packs")]
    SamplePacks,
    #[serde(alias = "presets")]
    VocalPresets,
}

impl Category {
    /// All categories, in storefront navigation order.
    pub const ALL: [Self; 4] = [Self::Beats, Self::Music, Self::SamplePacks, Self::VocalPresets];

    /// Wire name used in JSON and query strings.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Beats => "beats",
            Self::Music => "music",
            Self::SamplePacks => "sample-packs",
            Self::VocalPresets => "vocal-presets",
        }
    }

    /// Prefix used when minting product ids (`beat-01`, `pack-01`).
    #[must_use]
    pub const fn id_prefix(&self) -> &'static str {
        match self {
            Self::Beats => "beat",
            Self::Music => "track",
            Self::SamplePacks => "pack",
            Self::VocalPresets => "preset",
        }
    }

    /// Whether products in this category carry a playable preview.
    #[must_use]
    pub const fn has_previews(&self) -> bool {
        matches!(self, Self::Beats | Self::Music)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beats" | "beat" => Ok(Self::Beats),
            "music" => Ok(Self::Music),
            "sample-packs" | "packs" | "pack" => Ok(Self::SamplePacks),
            "vocal-presets" | "presets" | "preset" => Ok(Self::VocalPresets),
            other => Err(CategoryError(other.to_string())),
        }
    }
}
