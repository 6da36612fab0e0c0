//! Render instructions of the form `<variant> <item-id>` into HTML fragments.
//!
//! Variants:
//! - `text` - title link
//! - `{small,medium,large}_image` - image link
//! - `{small,medium,large}_image_{left,right}` - image link with `align`

use std::sync::Arc;

use crate::cache::{LookupCache, RetryPolicy};
use crate::catalog::create_client;
use crate::config::SiteConfig;
use crate::error::{Error, Result};
use crate::record::{ItemId, ItemRecord};

/// Quote markers stripped from item ids, including the HTML entities
/// Markdown renderers substitute for curly quotes.
const QUOTE_MARKERS: &[&str] = &[
    "&ldquo;",
    "&rdquo;",
    "&quot;",
    "\"",
    "'",
    "\u{201c}",
    "\u{201d}",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Size {
    Small,
    Medium,
    Large,
}

impl Size {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }

    fn image_url(self, record: &ItemRecord) -> &str {
        match self {
            Self::Small => record.small_image_url(),
            Self::Medium => record.medium_image_url(),
            Self::Large => record.large_image_url(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

impl Align {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Render form selected by the instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Text,
    Image { size: Size, align: Option<Align> },
}

impl Variant {
    /// All recognized variants
    pub const ALL: [Self; 10] = [
        Self::Text,
        Self::image(Size::Small, None),
        Self::image(Size::Small, Some(Align::Left)),
        Self::image(Size::Small, Some(Align::Right)),
        Self::image(Size::Medium, None),
        Self::image(Size::Medium, Some(Align::Left)),
        Self::image(Size::Medium, Some(Align::Right)),
        Self::image(Size::Large, None),
        Self::image(Size::Large, Some(Align::Left)),
        Self::image(Size::Large, Some(Align::Right)),
    ];

    pub const fn image(size: Size, align: Option<Align>) -> Self {
        Self::Image { size, align }
    }

    /// Case-insensitive name lookup
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|variant| variant.name().eq_ignore_ascii_case(name))
    }

    pub fn name(self) -> String {
        match self {
            Self::Text => "text".to_string(),
            Self::Image { size, align: None } => format!("{}_image", size.as_str()),
            Self::Image {
                size,
                align: Some(align),
            } => format!("{}_image_{}", size.as_str(), align.as_str()),
        }
    }

    /// Format a record. Field values are emitted as-is.
    pub fn render(self, record: &ItemRecord) -> String {
        let url = record.item_page_url();
        match self {
            Self::Text => format!(r#"<a href="{url}">{}</a>"#, record.title()),
            Self::Image { size, align } => {
                let image_url = size.image_url(record);
                let align = align
                    .map(|a| format!(r#" align="{}""#, a.as_str()))
                    .unwrap_or_default();
                format!(r#"<a href="{url}"><img src="{image_url}"{align}/></a>"#)
            }
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}

/// A parsed `<variant> <item-id>` instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub variant: Variant,
    pub id: ItemId,
}

impl Instruction {
    pub fn parse(input: &str) -> Result<Self> {
        let mut parts = input.split_whitespace();
        let (Some(variant_name), Some(raw_id), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(Error::Parameter(format!(
                "expected '<variant> <item-id>', got {:?}",
                input.trim()
            )));
        };

        let variant = Variant::from_name(variant_name)
            .ok_or_else(|| Error::Parameter(format!("unknown variant {variant_name:?}")))?;

        let id = ItemId::parse(&unquote(raw_id)).map_err(|e| Error::Parameter(e.to_string()))?;

        Ok(Self { variant, id })
    }
}

fn unquote(raw: &str) -> String {
    QUOTE_MARKERS
        .iter()
        .fold(raw.to_string(), |id, marker| id.replace(marker, ""))
}

/// Renders instructions against a shared [`LookupCache`].
///
/// Holds no caching state of its own.
pub struct TagRenderer {
    cache: Arc<LookupCache>,
    site: SiteConfig,
}

impl TagRenderer {
    pub fn new(cache: Arc<LookupCache>, site: SiteConfig) -> Self {
        Self { cache, site }
    }

    /// Build the HTTP catalog client and a fresh cache from configuration
    pub fn from_config(site: SiteConfig) -> Result<Self> {
        site.validate()?;
        let client = create_client(&site.catalog)?;
        let cache = LookupCache::new(client).with_retry_policy(RetryPolicy::from(site.retry));
        Ok(Self::new(Arc::new(cache), site))
    }

    pub fn cache(&self) -> &Arc<LookupCache> {
        &self.cache
    }

    pub const fn site(&self) -> &SiteConfig {
        &self.site
    }

    /// Parse, look up and format one instruction.
    ///
    /// Parameter errors are reported before the cache is touched. Fields
    /// missing from the catalog item render as empty attributes.
    pub async fn render(&self, instruction: &str) -> Result<String> {
        let Instruction { variant, id } = Instruction::parse(instruction)?;

        let record = self
            .cache
            .lookup(&id, &self.site.lookup, &self.site.cache)
            .await?;

        Ok(variant.render(&record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ItemRecord {
        ItemRecord::new(
            "Foo [Blu-ray]",
            "http://x/y",
            "http://img/s.jpg",
            "http://img/m.jpg",
            "http://img/l.jpg",
        )
    }

    #[test]
    fn test_variant_names_round_trip() {
        for variant in Variant::ALL {
            assert_eq!(Variant::from_name(&variant.name()), Some(variant));
        }
        assert_eq!(
            Variant::from_name("Large_Image_Right"),
            Some(Variant::image(Size::Large, Some(Align::Right)))
        );
    }

    #[test]
    fn test_unknown_variants() {
        for name in ["banner", "image", "small", "small_image_center", "texts"] {
            assert_eq!(Variant::from_name(name), None, "{name}");
        }
    }

    #[test]
    fn test_render_text() {
        assert_eq!(Variant::Text.render(&record()), r#"<a href="http://x/y">Foo</a>"#);
    }

    #[test]
    fn test_render_plain_image() {
        let variant = Variant::from_name("medium_image").unwrap();
        assert_eq!(
            variant.render(&record()),
            r#"<a href="http://x/y"><img src="http://img/m.jpg"/></a>"#
        );
    }

    #[test]
    fn test_render_aligned_images() {
        assert_eq!(
            Variant::from_name("small_image_left").unwrap().render(&record()),
            r#"<a href="http://x/y"><img src="http://img/s.jpg" align="left"/></a>"#
        );
        assert_eq!(
            Variant::from_name("large_image_right").unwrap().render(&record()),
            r#"<a href="http://x/y"><img src="http://img/l.jpg" align="right"/></a>"#
        );
    }

    #[test]
    fn test_parse_strips_quotes() {
        for input in [
            r#"small_image_left "B000XYZ987""#,
            "small_image_left \u{201c}B000XYZ987\u{201d}",
            "small_image_left &ldquo;B000XYZ987&rdquo;",
            "  small_image_left\tB000XYZ987  ",
        ] {
            let parsed = Instruction::parse(input).unwrap();
            assert_eq!(parsed.id.as_str(), "B000XYZ987", "{input}");
            assert_eq!(parsed.variant.name(), "small_image_left");
        }
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for input in [
            "",
            "text",
            "banner B000AAA111",
            "text B000 extra",
            r#"text """#,
            "text ../secret",
        ] {
            assert!(
                matches!(Instruction::parse(input), Err(Error::Parameter(_))),
                "{input:?} should be a parameter error"
            );
        }
    }
}
