use async_trait::async_trait;

use crate::config::LookupOptions;
use crate::error::Result;
use crate::record::{ItemId, RawItem};

/// Trait for remote catalog backends
///
/// Implementations report failures as [`Error::UpstreamTransient`] when a
/// later attempt may succeed and [`Error::UpstreamPermanent`] otherwise.
///
/// [`Error::UpstreamTransient`]: crate::Error::UpstreamTransient
/// [`Error::UpstreamPermanent`]: crate::Error::UpstreamPermanent
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &'static str;

    /// Look up one item id. Zero or more payloads; order carries no meaning.
    async fn item_lookup(&self, id: &ItemId, options: &LookupOptions) -> Result<Vec<RawItem>>;
}
