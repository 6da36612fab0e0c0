//! Product Tag Core Library
//!
//! Renders catalog product references (title links, images) for static-site
//! templates:
//! - Item records normalized from catalog payloads
//! - Lookup caching (process memory and per-item disk entries)
//! - Bounded retry for temporarily unavailable catalogs
//! - Render instruction parsing and HTML fragment formatting

pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod record;
pub mod render;
pub mod util;

pub use cache::{DiskStore, LookupCache, LookupSource, MemoryCache, RetryPolicy};
pub use catalog::{CatalogClient, HttpCatalogClient, create_client};
pub use config::{CacheConfig, CatalogConfig, LookupOptions, RetryConfig, SiteConfig};
pub use error::{Error, Result};
pub use record::{ItemId, ItemRecord, RawItem, normalize_title};
pub use render::{Align, Instruction, Size, TagRenderer, Variant};
