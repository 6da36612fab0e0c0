//! Item identifiers and the normalized record produced by one lookup.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Marketing annotations stripped from catalog titles
const TITLE_SUFFIXES: &[&str] = &[" [Blu-ray]", " (Ultimate Edition)"];

/// Catalog identifier for a product.
///
/// Used both as the memory cache key and as the disk entry file name, so it
/// is restricted to characters that cannot escape the cache directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(String);

impl ItemId {
    pub fn parse(raw: &str) -> Result<Self> {
        let id = raw.trim();
        let invalid = |reason: &str| Error::InvalidItemId {
            id: raw.to_string(),
            reason: reason.to_string(),
        };

        if id.is_empty() {
            return Err(invalid("must not be empty"));
        }
        if id.starts_with('.') {
            return Err(invalid("must not start with '.'"));
        }
        if let Some(c) = id
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        {
            return Err(invalid(&format!("contains disallowed character {c:?}")));
        }

        Ok(Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ItemId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Raw item payload as returned by the catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail_page_url: Option<String>,
    #[serde(default)]
    pub small_image_url: Option<String>,
    #[serde(default)]
    pub medium_image_url: Option<String>,
    #[serde(default)]
    pub large_image_url: Option<String>,
}

/// Normalized result of one successful lookup.
///
/// The title is normalized once at construction; fields are read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    title: String,
    item_page_url: String,
    small_image_url: String,
    medium_image_url: String,
    large_image_url: String,
}

impl ItemRecord {
    pub fn new(
        title: &str,
        item_page_url: impl Into<String>,
        small_image_url: impl Into<String>,
        medium_image_url: impl Into<String>,
        large_image_url: impl Into<String>,
    ) -> Self {
        Self {
            title: normalize_title(title),
            item_page_url: item_page_url.into(),
            small_image_url: small_image_url.into(),
            medium_image_url: medium_image_url.into(),
            large_image_url: large_image_url.into(),
        }
    }

    /// Missing payload fields become empty strings.
    pub fn from_raw(raw: RawItem) -> Self {
        Self::new(
            raw.title.as_deref().unwrap_or_default(),
            raw.detail_page_url.unwrap_or_default(),
            raw.small_image_url.unwrap_or_default(),
            raw.medium_image_url.unwrap_or_default(),
            raw.large_image_url.unwrap_or_default(),
        )
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn item_page_url(&self) -> &str {
        &self.item_page_url
    }

    pub fn small_image_url(&self) -> &str {
        &self.small_image_url
    }

    pub fn medium_image_url(&self) -> &str {
        &self.medium_image_url
    }

    pub fn large_image_url(&self) -> &str {
        &self.large_image_url
    }
}

/// Strip known edition/format annotations from a catalog title.
pub fn normalize_title(title: &str) -> String {
    let mut normalized = title.to_string();
    for suffix in TITLE_SUFFIXES {
        normalized = normalized.replace(suffix, "");
    }
    normalized.trim().to_string()
}
